//! Events published by a running sync session.

use formurl_sync_types::{QueryParams, Snapshot};

/// What a session did, in order, for hosts and tests to observe.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// URL parameters were applied to the form as a silent patch.
    StateApplied {
        /// The complete snapshot that was patched in.
        snapshot: Snapshot,
    },
    /// A debounced, changed form value reached the write path.
    Evaluated {
        /// The form value being evaluated.
        value: Snapshot,
    },
    /// The URL was updated to reflect the form.
    UrlWritten {
        /// The cleaned parameters for schema fields.
        params: QueryParams,
    },
    /// The router refused a navigation. It is not retried.
    NavigationRejected {
        /// Error message from the router.
        error: String,
    },
}
