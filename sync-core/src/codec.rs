//! Query-string codec for the three field kinds.
//!
//! Wire format:
//! - scalar: `String(value)`, dates as `YYYY-MM-DD`
//! - dateRange: `YYYY-MM-DD..YYYY-MM-DD`, only when both sides are set
//! - array: sorted, deduplicated, comma-joined
//!
//! Encoding returns `None` for "omit from the parameter map". Decoding never
//! fails: scalars fall back to the raw text, and only a malformed range
//! decodes to `None` so that the caller can use its default.

use chrono::{DateTime, NaiveDate, Utc};
use formurl_sync_types::{DateRange, FieldKind, FieldValue, Scalar};
use std::collections::BTreeSet;

const DATE_FORMAT: &str = "%Y-%m-%d";
const RANGE_SEPARATOR: &str = "..";
const LIST_SEPARATOR: char = ',';

/// Encode a field value for the query string.
///
/// Returns `None` when the value must be left out: a null scalar, an
/// incomplete range, an empty list, or a value whose variant does not match
/// `kind`.
pub fn encode(value: &FieldValue, kind: FieldKind) -> Option<String> {
    match (kind, value) {
        (FieldKind::Scalar, FieldValue::Scalar(scalar)) => encode_scalar(scalar),
        (FieldKind::DateRange, FieldValue::Range(range)) => encode_range(range),
        (FieldKind::Array, FieldValue::List(items)) => encode_list(items),
        _ => None,
    }
}

/// Decode a raw query-string value as `kind`.
///
/// Only `dateRange` can return `None` (either side missing or not a date).
pub fn decode(raw: &str, kind: FieldKind) -> Option<FieldValue> {
    match kind {
        FieldKind::Scalar => Some(FieldValue::Scalar(decode_scalar(raw))),
        FieldKind::DateRange => decode_range(raw).map(FieldValue::Range),
        FieldKind::Array => Some(FieldValue::List(decode_list(raw))),
    }
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse one side of a date range.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (reduced to its UTC date).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if has_iso_date_shape(raw) {
        return NaiveDate::parse_from_str(raw, DATE_FORMAT).ok();
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

fn encode_scalar(scalar: &Scalar) -> Option<String> {
    match scalar {
        Scalar::Null => None,
        Scalar::Date(date) => Some(format_date(*date)),
        other => Some(other.to_string()),
    }
}

fn encode_range(range: &DateRange) -> Option<String> {
    // Ranges are all-or-nothing: a one-sided range is not encoded.
    match (range.from, range.to) {
        (Some(from), Some(to)) => Some(format!(
            "{}{}{}",
            format_date(from),
            RANGE_SEPARATOR,
            format_date(to)
        )),
        _ => None,
    }
}

fn encode_list(items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let unique: BTreeSet<&str> = items.iter().map(String::as_str).collect();
    let joined = unique.into_iter().collect::<Vec<_>>().join(",");
    // Items made only of separators and blanks decode back to an empty list.
    if decode_list(&joined).is_empty() {
        return None;
    }
    Some(joined)
}

fn decode_scalar(raw: &str) -> Scalar {
    if has_iso_date_shape(raw) {
        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            return Scalar::Date(date);
        }
    }
    if let Some(n) = parse_number(raw) {
        return Scalar::Number(n);
    }
    match raw {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        _ => Scalar::Text(raw.to_string()),
    }
}

fn decode_range(raw: &str) -> Option<DateRange> {
    if !raw.contains(RANGE_SEPARATOR) {
        return None;
    }
    let mut sides = raw.split(RANGE_SEPARATOR);
    let from = parse_date(sides.next()?)?;
    let to = parse_date(sides.next()?)?;
    Some(DateRange::new(from, to))
}

fn decode_list(raw: &str) -> Vec<String> {
    if !raw.contains(LIST_SEPARATOR) {
        return vec![raw.to_string()];
    }
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// `^\d{4}-\d{2}-\d{2}$`
fn has_iso_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    match trimmed {
        "" => return None,
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    if let Some(n) = parse_radix_literal(trimmed) {
        return Some(n);
    }
    // Rust also accepts "inf" and "nan"; a query string does not.
    let numeric_chars = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !numeric_chars {
        return None;
    }
    trimmed.parse().ok()
}

/// Unsigned `0x1F`, `0b101` and `0o17` literals.
fn parse_radix_literal(raw: &str) -> Option<f64> {
    let prefix = raw.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0b" | "0B" => 2,
        "0o" | "0O" => 8,
        _ => return None,
    };
    let digits = &raw[2..];
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix)
            .map(|d| acc * f64::from(radix) + f64::from(d))
    })
}
