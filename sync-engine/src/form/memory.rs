//! In-memory form.
//!
//! Holds field values behind a shared lock, notifies subscribers on edits,
//! and counts silent patches for verification.

use super::FormHandle;
use formurl_sync_core::neutral_value;
use formurl_sync_types::{FieldValue, Schema, Snapshot};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

const CHANGE_CAPACITY: usize = 64;

/// In-memory form.
///
/// Cloning shares state, so a test can keep a handle while the engine owns
/// another.
#[derive(Debug, Clone)]
pub struct MemoryForm {
    inner: Arc<Mutex<MemoryFormInner>>,
    changes: broadcast::Sender<Snapshot>,
}

#[derive(Debug, Default)]
struct MemoryFormInner {
    values: Snapshot,
    disabled: BTreeSet<String>,
    silent_patches: usize,
}

impl MemoryForm {
    /// Create a form with the given fields and initial values.
    pub fn new(initial: Snapshot) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(MemoryFormInner {
                values: initial,
                ..Default::default()
            })),
            changes,
        }
    }

    /// Create a form with one field per schema entry, each at its neutral value.
    pub fn for_schema(schema: &Schema) -> Self {
        Self::new(
            schema
                .iter()
                .map(|(name, kind)| (name.to_string(), neutral_value(kind)))
                .collect(),
        )
    }

    /// Edit one field the way a user would, notifying subscribers.
    ///
    /// Returns `false` (and changes nothing) if the form has no such field.
    pub fn set_value(&self, field: &str, value: FieldValue) -> bool {
        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            match inner.values.get_mut(field) {
                Some(slot) => *slot = value,
                None => return false,
            }
            inner.values.clone()
        };
        // No subscribers is fine
        let _ = self.changes.send(snapshot);
        true
    }

    /// Edit several fields at once, notifying subscribers once.
    pub fn set_values(&self, values: &Snapshot) {
        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            apply_known_fields(&mut inner.values, values);
            inner.values.clone()
        };
        let _ = self.changes.send(snapshot);
    }

    /// Current value of one field.
    pub fn get(&self, field: &str) -> Option<FieldValue> {
        let inner = self.inner.lock().unwrap();
        inner.values.get(field).cloned()
    }

    /// Number of silent patches applied so far.
    pub fn silent_patch_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.silent_patches
    }
}

impl FormHandle for MemoryForm {
    fn value(&self) -> Snapshot {
        let inner = self.inner.lock().unwrap();
        inner.values.clone()
    }

    fn patch_silent(&self, patch: &Snapshot) {
        let mut inner = self.inner.lock().unwrap();
        apply_known_fields(&mut inner.values, patch);
        inner.silent_patches += 1;
    }

    fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.changes.subscribe()
    }

    fn set_enabled(&self, field: &str, enabled: bool) {
        let mut inner = self.inner.lock().unwrap();
        if enabled {
            inner.disabled.remove(field);
        } else {
            inner.disabled.insert(field.to_string());
        }
    }

    fn is_enabled(&self, field: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        !inner.disabled.contains(field)
    }
}

fn apply_known_fields(values: &mut Snapshot, patch: &Snapshot) {
    for (field, value) in patch {
        if let Some(slot) = values.get_mut(field) {
            *slot = value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formurl_sync_types::FieldKind;
    use tokio::sync::broadcast::error::TryRecvError;

    fn schema() -> Schema {
        Schema::new()
            .with_field("title", FieldKind::Scalar)
            .with_field("level", FieldKind::Array)
    }

    #[test]
    fn for_schema_starts_neutral() {
        let form = MemoryForm::for_schema(&schema());
        assert_eq!(form.get("title"), Some(FieldValue::null()));
        assert_eq!(form.get("level"), Some(FieldValue::List(vec![])));
        assert_eq!(form.get("page"), None);
    }

    #[tokio::test]
    async fn set_value_notifies_with_full_value() {
        let form = MemoryForm::for_schema(&schema());
        let mut changes = form.subscribe();

        assert!(form.set_value("title", FieldValue::text("Bug")));

        let value = changes.recv().await.unwrap();
        assert_eq!(value["title"], FieldValue::text("Bug"));
        assert_eq!(value["level"], FieldValue::List(vec![]));
    }

    #[test]
    fn set_value_rejects_unknown_field() {
        let form = MemoryForm::for_schema(&schema());
        let mut changes = form.subscribe();

        assert!(!form.set_value("page", FieldValue::number(2.0)));
        assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn patch_silent_does_not_notify() {
        let form = MemoryForm::for_schema(&schema());
        let mut changes = form.subscribe();

        let mut patch = Snapshot::new();
        patch.insert("title".into(), FieldValue::text("Remote"));
        patch.insert("unknown".into(), FieldValue::text("ignored"));
        form.patch_silent(&patch);

        assert_eq!(form.get("title"), Some(FieldValue::text("Remote")));
        assert_eq!(form.get("unknown"), None);
        assert_eq!(form.silent_patch_count(), 1);
        assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn set_values_notifies_once() {
        let form = MemoryForm::for_schema(&schema());
        let mut changes = form.subscribe();

        let mut values = Snapshot::new();
        values.insert("title".into(), FieldValue::text("a"));
        values.insert("level".into(), FieldValue::list(&["x"]));
        form.set_values(&values);

        assert!(changes.try_recv().is_ok());
        assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn enable_toggle() {
        let form = MemoryForm::for_schema(&schema());
        assert!(form.is_enabled("title"));

        form.set_enabled("title", false);
        assert!(!form.is_enabled("title"));
        // Disabled fields still read through value()
        assert!(form.value().contains_key("title"));

        form.set_enabled("title", true);
        assert!(form.is_enabled("title"));
    }

    #[test]
    fn clone_shares_state() {
        let form1 = MemoryForm::for_schema(&schema());
        let form2 = form1.clone();

        form1.set_value("title", FieldValue::text("shared"));
        assert_eq!(form2.get("title"), Some(FieldValue::text("shared")));
    }
}
