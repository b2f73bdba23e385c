//! Structural equality for change detection.
//!
//! Values are projected into a small closed set of [`Shape`]s and compared
//! shape by shape:
//! 1. both null → equal; exactly one null → not equal
//! 2. differing shapes (array vs object, number vs text, ...) → not equal
//! 3. arrays → same length and pairwise equal
//! 4. objects → same key set (order-independent) and pairwise equal values
//!
//! There is no cycle detection. Every [`AsShape`] implementation in this
//! crate projects a tree, so the precondition holds for the value model.

use chrono::NaiveDate;
use formurl_sync_types::{DateRange, FieldValue, Scalar};
use std::collections::{BTreeMap, HashMap};

/// Structural view of a value.
pub enum Shape<'a> {
    /// Absent value.
    Null,
    /// Boolean primitive.
    Bool(bool),
    /// Numeric primitive (IEEE equality, so `NaN` never equals itself).
    Number(f64),
    /// String primitive.
    Text(&'a str),
    /// Calendar date, compared by value.
    Date(NaiveDate),
    /// Ordered sequence.
    Array(Vec<&'a dyn AsShape>),
    /// Keyed record.
    Object(BTreeMap<&'a str, &'a dyn AsShape>),
}

/// Projection of a value into a [`Shape`].
pub trait AsShape {
    /// The structural view of `self`.
    fn shape(&self) -> Shape<'_>;
}

/// Structural equality between any two shape-projectable values.
pub fn deep_equal<A, B>(a: &A, b: &B) -> bool
where
    A: AsShape + ?Sized,
    B: AsShape + ?Sized,
{
    shapes_equal(&a.shape(), &b.shape())
}

fn shapes_equal(a: &Shape<'_>, b: &Shape<'_>) -> bool {
    match (a, b) {
        (Shape::Null, Shape::Null) => true,
        (Shape::Null, _) | (_, Shape::Null) => false,
        (Shape::Bool(x), Shape::Bool(y)) => x == y,
        (Shape::Number(x), Shape::Number(y)) => x == y,
        (Shape::Text(x), Shape::Text(y)) => x == y,
        (Shape::Date(x), Shape::Date(y)) => x == y,
        (Shape::Array(xs), Shape::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(*x, *y))
        }
        (Shape::Object(xs), Shape::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| deep_equal(*x, *y)))
        }
        _ => false,
    }
}

impl AsShape for Scalar {
    fn shape(&self) -> Shape<'_> {
        match self {
            Scalar::Null => Shape::Null,
            Scalar::Text(text) => Shape::Text(text),
            Scalar::Number(n) => Shape::Number(*n),
            Scalar::Bool(b) => Shape::Bool(*b),
            Scalar::Date(date) => Shape::Date(*date),
        }
    }
}

impl AsShape for DateRange {
    fn shape(&self) -> Shape<'_> {
        let mut fields: BTreeMap<&str, &dyn AsShape> = BTreeMap::new();
        fields.insert("from", &self.from);
        fields.insert("to", &self.to);
        Shape::Object(fields)
    }
}

impl AsShape for FieldValue {
    fn shape(&self) -> Shape<'_> {
        match self {
            FieldValue::Scalar(scalar) => scalar.shape(),
            FieldValue::Range(range) => range.shape(),
            FieldValue::List(items) => items.shape(),
        }
    }
}

impl AsShape for NaiveDate {
    fn shape(&self) -> Shape<'_> {
        Shape::Date(*self)
    }
}

impl AsShape for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Text(self)
    }
}

impl AsShape for bool {
    fn shape(&self) -> Shape<'_> {
        Shape::Bool(*self)
    }
}

impl AsShape for f64 {
    fn shape(&self) -> Shape<'_> {
        Shape::Number(*self)
    }
}

impl<T: AsShape> AsShape for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => value.shape(),
            None => Shape::Null,
        }
    }
}

impl<T: AsShape> AsShape for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Array(self.iter().map(|item| item as &dyn AsShape).collect())
    }
}

impl<V: AsShape> AsShape for BTreeMap<String, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Object(
            self.iter()
                .map(|(key, value)| (key.as_str(), value as &dyn AsShape))
                .collect(),
        )
    }
}

impl<V: AsShape> AsShape for HashMap<String, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Object(
            self.iter()
                .map(|(key, value)| (key.as_str(), value as &dyn AsShape))
                .collect(),
        )
    }
}

impl AsShape for serde_json::Value {
    fn shape(&self) -> Shape<'_> {
        use serde_json::Value;

        match self {
            Value::Null => Shape::Null,
            Value::Bool(b) => Shape::Bool(*b),
            Value::Number(n) => Shape::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Shape::Text(s),
            Value::Array(items) => {
                Shape::Array(items.iter().map(|item| item as &dyn AsShape).collect())
            }
            Value::Object(map) => Shape::Object(
                map.iter()
                    .map(|(key, value)| (key.as_str(), value as &dyn AsShape))
                    .collect(),
            ),
        }
    }
}
