//! # sync-engine
//!
//! Keeps a form's filter state and the address bar's query string in step.
//!
//! ## Features
//!
//! - **Deep links**: the URL seeds the form when a session is activated
//! - **State → URL**: debounced, deduplicated, history-neutral URL writes
//! - **URL → State**: back/forward and pasted links patch the form silently
//! - **No feedback loops**: each direction suppresses the other while it writes
//! - **Collaborator Abstraction**: pluggable form and router (in-memory for tests)
//!
//! ## Example
//!
//! ```ignore
//! use formurl_sync_engine::{MemoryForm, MemoryRouter, SyncConfig, SyncSession};
//!
//! let schema = Schema::new()
//!     .with_field("title", FieldKind::Scalar)
//!     .with_field("level", FieldKind::Array);
//! let form = Arc::new(MemoryForm::for_schema(&schema));
//! let router = Arc::new(MemoryRouter::new());
//!
//! let session = SyncSession::activate(form.clone(), router.clone(), SyncConfig::new(schema))
//!     .expect("schema is not empty");
//!
//! form.set_value("title", FieldValue::text("Bug"));
//! // ~200ms later the URL reads ?title=Bug
//! session.shutdown().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod events;
pub mod form;
pub mod router;
mod suppress;

pub use engine::{EngineError, SyncConfig, SyncSession, DEFAULT_DEBOUNCE};
pub use events::SyncEvent;
pub use form::{FormHandle, MemoryForm};
pub use router::{MemoryRouter, NavigationError, Router};
