//! JSON ⇄ snapshot conversion, directed by the schema.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use formurl_sync_core::{neutral_value, parse_date};
use formurl_sync_types::{DateRange, FieldKind, FieldValue, Scalar, Schema, Snapshot};
use serde_json::Value;

/// Build a snapshot from a JSON object.
///
/// Schema fields missing from the object take their neutral value; keys
/// outside the schema are ignored.
pub fn snapshot_from_json(json: &str, schema: &Schema) -> Result<Snapshot> {
    let value: Value = serde_json::from_str(json).context("Form value is not valid JSON")?;
    let Value::Object(object) = value else {
        bail!("Form value must be a JSON object");
    };

    for key in object.keys().filter(|key| !schema.contains(key)) {
        tracing::debug!("Ignoring non-schema key: {}", key);
    }

    schema
        .iter()
        .map(|(name, kind)| {
            let value = match object.get(name) {
                Some(json) => field_from_json(json, kind)
                    .with_context(|| format!("Invalid value for '{}'", name))?,
                None => neutral_value(kind),
            };
            Ok((name.to_string(), value))
        })
        .collect()
}

/// Render a snapshot as pretty-printed JSON.
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).context("Failed to render snapshot")
}

fn field_from_json(json: &Value, kind: FieldKind) -> Result<FieldValue> {
    match kind {
        FieldKind::Scalar => scalar_from_json(json).map(FieldValue::Scalar),
        FieldKind::DateRange => range_from_json(json).map(FieldValue::Range),
        FieldKind::Array => list_from_json(json).map(FieldValue::List),
    }
}

fn scalar_from_json(json: &Value) -> Result<Scalar> {
    Ok(match json {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Bool(*b),
        Value::Number(n) => Scalar::Number(n.as_f64().context("Number out of range")?),
        Value::String(s) => Scalar::Text(s.clone()),
        _ => bail!("expected a scalar, found {}", json),
    })
}

fn range_from_json(json: &Value) -> Result<DateRange> {
    match json {
        Value::Null => Ok(DateRange::empty()),
        Value::Object(object) => Ok(DateRange {
            from: date_side(object.get("from"))?,
            to: date_side(object.get("to"))?,
        }),
        _ => bail!("expected {{\"from\": .., \"to\": ..}}, found {}", json),
    }
}

fn date_side(json: Option<&Value>) -> Result<Option<NaiveDate>> {
    match json {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse_date(s)
            .map(Some)
            .with_context(|| format!("'{}' is not a date", s)),
        Some(other) => bail!("expected a date string, found {}", other),
    }
}

fn list_from_json(json: &Value) -> Result<Vec<String>> {
    match json {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                Value::Bool(b) => Ok(b.to_string()),
                other => bail!("expected a string item, found {}", other),
            })
            .collect(),
        _ => bail!("expected an array, found {}", json),
    }
}
