//! # sync-core
//!
//! Pure logic for formurl-sync (no I/O, instant tests).
//!
//! This crate implements the codec, the snapshot builder, and the change
//! detector without any router, form, or timer, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Malformed input is resolved locally, never raised
//!
//! The live data flows (form changes, navigations, debounce) are driven by
//! `sync-engine`, which calls into these functions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod change;
pub mod codec;
pub mod snapshot;

pub use change::{deep_equal, AsShape, Shape};
pub use codec::{decode, encode, format_date, parse_date};
pub use snapshot::{
    clean_params, neutral_value, params_to_snapshot, snapshot_to_params, ExcludeKeysFn,
};
