//! SyncSession - the form ⇄ URL synchronization engine.
//!
//! A session runs two one-directional pipelines over one form and one
//! router:
//!
//! ```text
//!            debounce → distinct → encode → navigate (merge, replace-url)
//! Form ─────────────────────────────────────────────────────────────► Router
//!      ◄─────────────────────────────────────────────────────────────
//!            silent patch ← defaults ← decode ← navigation completed
//! ```
//!
//! Each pipeline raises its own suppression flag around the single write it
//! performs, and the other pipeline skips its work while that flag is up.
//! Both pipelines, the debounce timer, and shutdown are multiplexed on one
//! task, so a guarded write and its flag toggle never interleave with the
//! other pipeline.
//!
//! # Example
//!
//! ```ignore
//! let config = SyncConfig::new(schema)
//!     .with_default("periodRange", last_two_weeks.into())
//!     .with_exclude_keys(|_| vec!["comparePeriodRange".to_string()]);
//! let session = SyncSession::activate(form, router, config).expect("valid config");
//! // ...
//! session.shutdown().await;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use formurl_sync_core::{deep_equal, params_to_snapshot, snapshot_to_params, ExcludeKeysFn};
use formurl_sync_types::{
    FieldValue, NavigationEnd, NavigationRequest, QueryParams, Schema, Snapshot,
};
use thiserror::Error;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::events::SyncEvent;
use crate::form::FormHandle;
use crate::router::Router;
use crate::suppress::SuppressFlag;

/// Quiet period before a burst of form changes is written to the URL.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

const EVENT_CAPACITY: usize = 64;

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The schema names no fields, so there is nothing to synchronize.
    #[error("schema has no fields")]
    EmptySchema,
}

/// Configuration for a [`SyncSession`].
#[derive(Clone)]
pub struct SyncConfig {
    /// Fields that take part, and how each is encoded.
    pub schema: Schema,
    /// Fallback values for fields the URL does not (validly) supply.
    pub defaults: Snapshot,
    /// Hook naming fields to keep out of the URL for a given form value.
    pub exclude_keys: Option<Arc<ExcludeKeysFn>>,
    /// Quiet period for form changes.
    pub debounce: Duration,
}

impl SyncConfig {
    /// Create a configuration with no defaults, no exclusions, and the
    /// default debounce.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            defaults: Snapshot::new(),
            exclude_keys: None,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Set all defaults.
    pub fn with_defaults(mut self, defaults: Snapshot) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set the default for one field.
    pub fn with_default(mut self, field: &str, value: FieldValue) -> Self {
        self.defaults.insert(field.to_string(), value);
        self
    }

    /// Set the exclusion hook.
    pub fn with_exclude_keys<F>(mut self, exclude: F) -> Self
    where
        F: Fn(&Snapshot) -> Vec<String> + Send + Sync + 'static,
    {
        self.exclude_keys = Some(Arc::new(exclude));
        self
    }

    /// Set the debounce quiet period.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Check that the configuration can drive a session.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.schema.is_empty() {
            return Err(EngineError::EmptySchema);
        }
        Ok(())
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("schema", &self.schema)
            .field("defaults", &self.defaults)
            .field(
                "exclude_keys",
                &self.exclude_keys.as_ref().map(|_| "<fn>"),
            )
            .field("debounce", &self.debounce)
            .finish()
    }
}

/// A running synchronization between one form and one router.
///
/// Dropping the session aborts its task; [`SyncSession::shutdown`] stops it
/// gracefully. Either way both subscriptions are released together.
pub struct SyncSession {
    task: Option<JoinHandle<()>>,
    shutdown: Option<oneshot::Sender<()>>,
    events: broadcast::Sender<SyncEvent>,
}

impl SyncSession {
    /// Start synchronizing `form` and `router`.
    ///
    /// Before returning, the current URL has been decoded and patched into
    /// the form. Returns `None`, after logging a warning, when the
    /// configuration is unusable; the form and URL are then left alone.
    ///
    /// Must be called from within a tokio runtime.
    pub fn activate<F, R>(form: Arc<F>, router: Arc<R>, config: SyncConfig) -> Option<Self>
    where
        F: FormHandle + 'static,
        R: Router + 'static,
    {
        if let Err(e) = config.validate() {
            tracing::warn!("Form/URL sync not activated: {}", e);
            return None;
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        // Subscribe before the initial read so no notification is missed.
        let form_changes = form.subscribe();
        let navigations = router.subscribe();

        let fields = config.schema.len();
        let debounce = config.debounce;
        let mut task = SyncTask {
            form,
            router,
            config,
            suppress_url_write: SuppressFlag::default(),
            suppress_form_patch: SuppressFlag::default(),
            last_processed: None,
            events: events.clone(),
        };

        // Seed the form from a deep-linked or bookmarked URL.
        task.apply_url_to_form();
        let initial = task.form.value();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(task.run(initial, form_changes, navigations, shutdown_rx));

        tracing::info!(
            "Form/URL sync activated ({} fields, debounce {}ms)",
            fields,
            debounce.as_millis()
        );

        Some(Self {
            task: Some(handle),
            shutdown: Some(shutdown_tx),
            events,
        })
    }

    /// Subscribe to session events from now on.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Check whether the session task is still running.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop both pipelines and wait for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSession")
            .field("active", &self.is_active())
            .finish()
    }
}

/// State owned by the session task.
struct SyncTask<F, R> {
    form: Arc<F>,
    router: Arc<R>,
    config: SyncConfig,
    /// Raised while URL state is patched into the form.
    suppress_url_write: SuppressFlag,
    /// Raised while the session's own navigation is in flight.
    suppress_form_patch: SuppressFlag,
    /// Last form value that passed the change check.
    last_processed: Option<Snapshot>,
    events: broadcast::Sender<SyncEvent>,
}

impl<F: FormHandle, R: Router> SyncTask<F, R> {
    async fn run(
        mut self,
        initial: Snapshot,
        mut form_changes: broadcast::Receiver<Snapshot>,
        mut navigations: broadcast::Receiver<NavigationEnd>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let debounce = self.config.debounce;
        // The current value counts as the first change, so defaults reach
        // the URL without an edit.
        let mut pending = Some(initial);
        let mut deadline = Instant::now() + debounce;
        let mut form_open = true;
        let mut router_open = true;

        loop {
            tokio::select! {
                _ = &mut shutdown => break,

                change = form_changes.recv(), if form_open => match change {
                    Ok(value) => {
                        pending = Some(value);
                        deadline = Instant::now() + debounce;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Form changes lagged by {}, reading current value", skipped);
                        pending = Some(self.form.value());
                        deadline = Instant::now() + debounce;
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Form change stream closed");
                        form_open = false;
                    }
                },

                navigation = navigations.recv(), if router_open => match navigation {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        // The URL overwrote every schema field; a value
                        // still waiting for the quiet period is stale.
                        if self.on_navigation_end() {
                            pending = None;
                        }
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Navigation stream closed");
                        router_open = false;
                    }
                },

                _ = sleep_until(deadline), if pending.is_some() => {
                    if let Some(value) = pending.take() {
                        self.on_form_value(value, &mut navigations).await;
                    }
                }
            }
        }

        tracing::info!("Form/URL sync stopped");
    }

    /// State → URL, after the quiet period.
    async fn on_form_value(
        &mut self,
        value: Snapshot,
        navigations: &mut broadcast::Receiver<NavigationEnd>,
    ) {
        if let Some(previous) = &self.last_processed {
            if deep_equal(previous, &value) {
                tracing::debug!("Form value unchanged, skipping URL write");
                return;
            }
        }
        self.last_processed = Some(value.clone());

        // Never raised here while patches and writes share this task.
        if self.suppress_url_write.is_raised() {
            tracing::debug!("URL write suppressed while applying URL state");
            return;
        }

        self.emit(SyncEvent::Evaluated {
            value: value.clone(),
        });

        let target = snapshot_to_params(
            &value,
            &self.config.schema,
            self.config.exclude_keys.as_deref(),
        );
        let current = self.current_schema_params();
        if deep_equal(&current, &target) {
            tracing::debug!("URL already matches form state");
            return;
        }

        let request = navigation_request(&current, &target);
        let _guard = self.suppress_form_patch.raise();
        match self.router.navigate(request).await {
            Ok(()) => {
                tracing::info!("URL updated ({} filter params)", target.len());
                self.emit(SyncEvent::UrlWritten { params: target });
            }
            Err(e) => {
                tracing::error!("Navigation rejected: {}", e);
                self.emit(SyncEvent::NavigationRejected {
                    error: e.to_string(),
                });
            }
        }
        self.skip_own_navigations(navigations);
    }

    /// URL → State, on every navigation the session did not issue.
    ///
    /// Returns whether the form was patched.
    fn on_navigation_end(&mut self) -> bool {
        // Own navigations are drained by `skip_own_navigations` before the
        // flag drops, so this is a backstop only.
        if self.suppress_form_patch.is_raised() {
            tracing::debug!("Skipping form patch for own navigation");
            return false;
        }
        self.apply_url_to_form();
        // The applied state is now what the URL says; treat it as processed.
        self.last_processed = Some(self.form.value());
        true
    }

    /// Decode the current URL and patch it into the form without notifying.
    fn apply_url_to_form(&self) {
        let params = self.router.query_params();
        let snapshot = params_to_snapshot(&params, &self.config.schema, &self.config.defaults);
        {
            let _guard = self.suppress_url_write.raise();
            self.form.patch_silent(&snapshot);
        }
        tracing::debug!("Applied URL state to form ({} fields)", snapshot.len());
        self.emit(SyncEvent::StateApplied { snapshot });
    }

    /// Consume the notifications published for a navigation this session
    /// just issued. Called while the patch-suppression flag is raised.
    ///
    /// Only sound because [`Router::navigate`] publishes its
    /// [`NavigationEnd`] before resolving. A router that publishes later
    /// would have its notification read as an outside navigation.
    fn skip_own_navigations(&self, navigations: &mut broadcast::Receiver<NavigationEnd>) {
        loop {
            match navigations.try_recv() {
                Ok(end) => {
                    tracing::debug!("Skipping form patch for own navigation {}", end.id);
                }
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    /// Current URL parameters restricted to schema fields.
    fn current_schema_params(&self) -> QueryParams {
        self.router
            .query_params()
            .into_iter()
            .filter(|(key, _)| self.config.schema.contains(key))
            .collect()
    }

    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Build a merge request that turns `current` into `target`.
///
/// Schema keys present in the URL but absent from `target` are removed.
/// Keys outside the schema are never mentioned, so the merge keeps them.
fn navigation_request(current: &QueryParams, target: &QueryParams) -> NavigationRequest {
    let mut query: BTreeMap<String, Option<String>> = target
        .iter()
        .map(|(key, value)| (key.clone(), Some(value.clone())))
        .collect();
    for key in current.keys() {
        if !target.contains_key(key) {
            query.insert(key.clone(), None);
        }
    }
    NavigationRequest::merge_replace(query)
}
