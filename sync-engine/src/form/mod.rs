//! Form abstraction for formurl-sync.
//!
//! This module abstracts the UI form that holds the filter state, so the
//! engine works the same against a real widget tree or an in-memory form.
//!
//! # Design
//!
//! The form is snapshot-oriented:
//! - `value()` reads every field at once
//! - `patch_silent()` writes fields without notifying subscribers
//! - `subscribe()` delivers the full value after every user edit
//! - `set_enabled()` toggles individual fields for feature logic
//!
//! # Example
//!
//! ```ignore
//! let form = MemoryForm::for_schema(&schema);
//! let mut changes = form.subscribe();
//! form.set_value("title", FieldValue::text("Bug"));
//! let value = changes.recv().await?;
//! ```

mod memory;

pub use memory::MemoryForm;

use formurl_sync_types::Snapshot;
use tokio::sync::broadcast;

/// A form whose state the engine mirrors into the URL.
///
/// Implementations hold one value per field; the engine never adds fields.
pub trait FormHandle: Send + Sync {
    /// Read the current value of every field, disabled ones included.
    fn value(&self) -> Snapshot;

    /// Update the named fields without emitting a change notification.
    ///
    /// Fields in `patch` that the form does not have are ignored.
    fn patch_silent(&self, patch: &Snapshot);

    /// Subscribe to change notifications.
    ///
    /// Each notification carries the full form value after the change.
    fn subscribe(&self) -> broadcast::Receiver<Snapshot>;

    /// Enable or disable a single field.
    fn set_enabled(&self, field: &str, enabled: bool);

    /// Check whether a field is enabled.
    fn is_enabled(&self, field: &str) -> bool;
}
