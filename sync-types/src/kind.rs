//! Field kinds and the schema that maps field names to them.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// How a field's value is encoded in the query string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// A single value: text, number, boolean or calendar date.
    Scalar,
    /// A `from..to` pair of calendar dates.
    DateRange,
    /// A set of strings, encoded sorted and comma-joined.
    Array,
}

impl FieldKind {
    /// The name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::DateRange => "dateRange",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scalar" => Ok(Self::Scalar),
            "dateRange" => Ok(Self::DateRange),
            "array" => Ok(Self::Array),
            other => Err(TypesError::UnknownKind(other.to_string())),
        }
    }
}

/// Mapping from field name to [`FieldKind`].
///
/// Only fields named here are ever read from or written to the URL.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(BTreeMap<String, FieldKind>);

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder style).
    pub fn with_field(mut self, name: &str, kind: FieldKind) -> Self {
        self.0.insert(name.to_string(), kind);
        self
    }

    /// Add or replace a field.
    pub fn insert(&mut self, name: &str, kind: FieldKind) {
        self.0.insert(name.to_string(), kind);
    }

    /// Kind of the named field, if it takes part.
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.0.get(name).copied()
    }

    /// Check whether the named field takes part.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterate over `(name, kind)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.0.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Iterate over field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, FieldKind)> for Schema {
    fn from_iter<I: IntoIterator<Item = (&'a str, FieldKind)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, kind)| (name.to_string(), kind))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = (&'a String, &'a FieldKind);
    type IntoIter = btree_map::Iter<'a, String, FieldKind>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
