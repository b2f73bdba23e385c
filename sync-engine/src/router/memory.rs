//! In-memory router.
//!
//! Keeps a history stack of query-parameter maps, records every navigation
//! request for verification, and can be told to reject the next navigation.

use super::{NavigationError, Router};
use async_trait::async_trait;
use formurl_sync_types::{NavigationEnd, NavigationRequest, QueryParams};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

const NAVIGATION_CAPACITY: usize = 64;

/// In-memory router.
///
/// Cloning shares state.
#[derive(Debug, Clone)]
pub struct MemoryRouter {
    inner: Arc<Mutex<MemoryRouterInner>>,
    ends: broadcast::Sender<NavigationEnd>,
}

#[derive(Debug)]
struct MemoryRouterInner {
    /// Never empty; the last entry is the current location.
    history: Vec<QueryParams>,
    navigations: Vec<NavigationRequest>,
    next_id: u64,
    fail_next_navigate: Option<String>,
}

impl MemoryRouter {
    /// Create a router at a location without query parameters.
    pub fn new() -> Self {
        Self::with_params(QueryParams::new())
    }

    /// Create a router at a location with the given query parameters.
    pub fn with_params(params: QueryParams) -> Self {
        let (ends, _) = broadcast::channel(NAVIGATION_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(MemoryRouterInner {
                history: vec![params],
                navigations: Vec::new(),
                next_id: 1,
                fail_next_navigate: None,
            })),
            ends,
        }
    }

    /// Simulate an outside navigation (pasted link, menu click).
    ///
    /// Pushes a history entry and notifies subscribers.
    pub fn visit(&self, params: QueryParams) {
        let id = {
            let mut inner = self.inner.lock().unwrap();
            inner.history.push(params);
            inner.take_id()
        };
        let _ = self.ends.send(NavigationEnd { id });
    }

    /// Simulate the browser back button.
    ///
    /// Returns `false` if there is no earlier entry.
    pub fn back(&self) -> bool {
        let id = {
            let mut inner = self.inner.lock().unwrap();
            if inner.history.len() < 2 {
                return false;
            }
            inner.history.pop();
            inner.take_id()
        };
        let _ = self.ends.send(NavigationEnd { id });
        true
    }

    /// All navigation requests received through [`Router::navigate`].
    pub fn navigations(&self) -> Vec<NavigationRequest> {
        let inner = self.inner.lock().unwrap();
        inner.navigations.clone()
    }

    /// Number of navigation requests received.
    pub fn navigation_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.navigations.len()
    }

    /// The most recent navigation request.
    pub fn last_navigation(&self) -> Option<NavigationRequest> {
        let inner = self.inner.lock().unwrap();
        inner.navigations.last().cloned()
    }

    /// Number of history entries.
    pub fn history_len(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.history.len()
    }

    /// Cause the next navigate() to fail with the given reason.
    pub fn fail_next_navigate(&self, reason: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_navigate = Some(reason.to_string());
    }
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRouterInner {
    fn current(&self) -> QueryParams {
        self.history.last().cloned().unwrap_or_default()
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[async_trait]
impl Router for MemoryRouter {
    fn query_params(&self) -> QueryParams {
        let inner = self.inner.lock().unwrap();
        inner.current()
    }

    async fn navigate(&self, request: NavigationRequest) -> Result<(), NavigationError> {
        let id = {
            let mut inner = self.inner.lock().unwrap();

            // Check for forced failure
            if let Some(reason) = inner.fail_next_navigate.take() {
                return Err(NavigationError::Rejected(reason));
            }

            let next = request.apply_to(&inner.current());
            if request.replace_url {
                if let Some(top) = inner.history.last_mut() {
                    *top = next;
                }
            } else {
                inner.history.push(next);
            }
            inner.navigations.push(request);
            inner.take_id()
        };

        // Published before returning, as the Router contract requires.
        let _ = self.ends.send(NavigationEnd { id });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<NavigationEnd> {
        self.ends.subscribe()
    }
}
