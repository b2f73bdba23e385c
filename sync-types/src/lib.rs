//! # sync-types
//!
//! Value model for form-state / URL query-parameter synchronization.
//!
//! This crate provides the foundational types used across all formurl-sync crates:
//! - [`FieldKind`], [`Schema`] - Which fields take part and how they are encoded
//! - [`Scalar`], [`DateRange`], [`FieldValue`] - Typed field values
//! - [`Snapshot`], [`QueryParams`] - Whole-form state and its wire form
//! - [`NavigationRequest`], [`NavigationEnd`] - Router interface types
//! - [`TypesError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod kind;
mod navigation;
mod value;

pub use error::TypesError;
pub use kind::{FieldKind, Schema};
pub use navigation::{NavigationEnd, NavigationRequest, QueryParamsHandling};
pub use value::{DateRange, FieldValue, QueryParams, Scalar, Snapshot};
