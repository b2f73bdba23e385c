//! Typed field values, whole-form snapshots, and the encoded parameter map.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::TypesError;

/// Complete in-memory form state, keyed by field name.
///
/// Also used for caller-supplied defaults.
pub type Snapshot = BTreeMap<String, FieldValue>;

/// Encoded query parameters, keyed by field name.
pub type QueryParams = BTreeMap<String, String>;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Value of a `scalar` field.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Scalar {
    /// No value.
    #[default]
    Null,
    /// Free text.
    Text(String),
    /// A number.
    Number(f64),
    /// A boolean flag.
    Bool(bool),
    /// A calendar date (UTC).
    Date(NaiveDate),
}

impl Scalar {
    /// Convenience constructor for text values.
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    /// Parse a `YYYY-MM-DD` string into a date scalar.
    pub fn date(value: &str) -> Result<Self, TypesError> {
        parse_date(value).map(Self::Date)
    }

    /// Check for [`Scalar::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Truthiness as a filter toggle would read it.
    ///
    /// `Null`, `false`, `0`, `NaN` and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Text(text) => !text.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
            Self::Date(_) => true,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Date(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
        }
    }
}

/// Value of a `dateRange` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// First day of the range.
    pub from: Option<NaiveDate>,
    /// Last day of the range.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Create a complete range.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// The neutral range with neither side set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse both sides from `YYYY-MM-DD` strings.
    pub fn parse(from: &str, to: &str) -> Result<Self, TypesError> {
        Ok(Self::new(parse_date(from)?, parse_date(to)?))
    }

    /// Check whether both sides are set.
    pub fn is_complete(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }
}

/// A typed field value; the variant matches the field's [`FieldKind`](crate::FieldKind).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Value of a `scalar` field.
    Scalar(Scalar),
    /// Value of a `dateRange` field.
    Range(DateRange),
    /// Value of an `array` field.
    List(Vec<String>),
}

impl FieldValue {
    /// Text scalar.
    pub fn text(value: &str) -> Self {
        Self::Scalar(Scalar::text(value))
    }

    /// Number scalar.
    pub fn number(value: f64) -> Self {
        Self::Scalar(Scalar::Number(value))
    }

    /// Boolean scalar.
    pub fn flag(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }

    /// Null scalar.
    pub fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// List from string slices, kept in the given order.
    pub fn list<S: AsRef<str>>(items: &[S]) -> Self {
        Self::List(items.iter().map(|s| s.as_ref().to_string()).collect())
    }
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<DateRange> for FieldValue {
    fn from(value: DateRange) -> Self {
        Self::Range(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, TypesError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| TypesError::InvalidDate(value.to_string()))
}

/// Render a number the way a browser's `String(n)` does.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else if (1e-6..1e21).contains(&n.abs()) {
        n.to_string()
    } else {
        // 1.5e-7 -> "1.5e-7", 1e21 -> "1e+21"
        let exp = format!("{:e}", n);
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        }
    }
}
