//! Routing abstraction for formurl-sync.
//!
//! This module abstracts the application router that owns the address bar
//! (browser history, a desktop shell's location, in-memory for tests).
//!
//! # Design
//!
//! The router is consulted, never bypassed:
//! - `query_params()` reads the current query parameters synchronously
//! - `navigate()` applies a [`NavigationRequest`] (merge, replace-url)
//! - `subscribe()` delivers a [`NavigationEnd`] after every navigation
//!
//! Percent-encoding belongs to the router; the engine only sees decoded
//! parameter values.
//!
//! # Example
//!
//! ```ignore
//! let router = MemoryRouter::new();
//! let mut ends = router.subscribe();
//! router.navigate(NavigationRequest::merge_replace(query)).await?;
//! let end = ends.recv().await?;
//! ```

mod memory;

pub use memory::MemoryRouter;

use async_trait::async_trait;
use formurl_sync_types::{NavigationEnd, NavigationRequest, QueryParams};
use thiserror::Error;
use tokio::sync::broadcast;

/// Navigation errors.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The router refused the navigation (guard, invalid state).
    #[error("navigation rejected: {0}")]
    Rejected(String),
}

/// Router trait for reading and replacing query parameters.
///
/// Implementations must publish the [`NavigationEnd`] for a navigation
/// before the future returned by [`Router::navigate`] resolves. The engine
/// relies on this to recognise notifications for its own writes.
#[async_trait]
pub trait Router: Send + Sync {
    /// Current query parameters, already percent-decoded.
    fn query_params(&self) -> QueryParams;

    /// Change the query parameters as described by `request`.
    async fn navigate(&self, request: NavigationRequest) -> Result<(), NavigationError>;

    /// Subscribe to "navigation completed" notifications.
    fn subscribe(&self) -> broadcast::Receiver<NavigationEnd>;
}
