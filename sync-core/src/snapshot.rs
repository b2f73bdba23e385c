//! Snapshot builder: query parameters ⇄ complete form snapshots.
//!
//! `params_to_snapshot` always yields every schema field, filling gaps from
//! the caller's defaults or the kind's neutral value. `snapshot_to_params`
//! yields the smallest parameter map that describes the snapshot: excluded
//! keys, nulls, incomplete ranges, and empty lists never reach the URL.

use formurl_sync_types::{
    DateRange, FieldKind, FieldValue, QueryParams, Scalar, Schema, Snapshot,
};

use crate::codec::{decode, encode};

/// Caller-supplied hook naming the fields to hide for a given snapshot.
///
/// Typical use: hide a comparison range while comparison mode is off.
pub type ExcludeKeysFn = dyn Fn(&Snapshot) -> Vec<String> + Send + Sync;

/// The value a field takes when neither the URL nor the defaults supply one.
pub fn neutral_value(kind: FieldKind) -> FieldValue {
    match kind {
        FieldKind::Scalar => FieldValue::Scalar(Scalar::Null),
        FieldKind::DateRange => FieldValue::Range(DateRange::empty()),
        FieldKind::Array => FieldValue::List(Vec::new()),
    }
}

/// Build a complete snapshot from query parameters.
///
/// For each schema field: the decoded parameter if present, non-empty and
/// decodable; else the default for that field; else the neutral value.
/// Parameters outside the schema are ignored.
pub fn params_to_snapshot(
    params: &QueryParams,
    schema: &Schema,
    defaults: &Snapshot,
) -> Snapshot {
    schema
        .iter()
        .map(|(name, kind)| {
            let decoded = params
                .get(name)
                .filter(|raw| !raw.is_empty())
                .and_then(|raw| decode(raw, kind));
            let value = decoded
                .or_else(|| defaults.get(name).cloned())
                .unwrap_or_else(|| neutral_value(kind));
            (name.to_string(), value)
        })
        .collect()
}

/// Build the cleaned parameter map for a snapshot.
///
/// Keys named by `exclude` are never present in the result, whatever their
/// value. Schema fields missing from the snapshot are treated as absent.
pub fn snapshot_to_params(
    snapshot: &Snapshot,
    schema: &Schema,
    exclude: Option<&ExcludeKeysFn>,
) -> QueryParams {
    let excluded = exclude.map(|f| f(snapshot)).unwrap_or_default();

    let params = schema
        .iter()
        .filter(|(name, _)| !excluded.iter().any(|key| key.as_str() == *name))
        .filter_map(|(name, kind)| {
            let value = snapshot.get(name)?;
            encode(value, kind).map(|encoded| (name.to_string(), encoded))
        })
        .collect();

    clean_params(params)
}

/// Drop parameters that carry no information.
pub fn clean_params(params: QueryParams) -> QueryParams {
    params
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn logger_schema() -> Schema {
        Schema::new()
            .with_field("accountId", FieldKind::Scalar)
            .with_field("level", FieldKind::Array)
            .with_field("title", FieldKind::Scalar)
            .with_field("createdDateRange", FieldKind::DateRange)
    }

    // ===========================================
    // params_to_snapshot
    // ===========================================

    #[test]
    fn scalar_and_array_scenario() {
        let schema = Schema::new()
            .with_field("title", FieldKind::Scalar)
            .with_field("level", FieldKind::Array);
        let snapshot = params_to_snapshot(
            &params(&[("title", "Bug"), ("level", "b,a,a")]),
            &schema,
            &Snapshot::new(),
        );

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["title"], FieldValue::text("Bug"));
        assert_eq!(snapshot["level"], FieldValue::list(&["a", "b"]));
    }

    #[test]
    fn every_schema_field_is_present() {
        let snapshot =
            params_to_snapshot(&QueryParams::new(), &logger_schema(), &Snapshot::new());

        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot["accountId"], FieldValue::null());
        assert_eq!(snapshot["level"], FieldValue::List(vec![]));
        assert_eq!(
            snapshot["createdDateRange"],
            FieldValue::Range(DateRange::empty())
        );
    }

    #[test]
    fn unknown_params_are_ignored() {
        let snapshot = params_to_snapshot(
            &params(&[("page", "3"), ("title", "x")]),
            &logger_schema(),
            &Snapshot::new(),
        );
        assert!(!snapshot.contains_key("page"));
    }

    #[test]
    fn empty_param_uses_default() {
        let mut defaults = Snapshot::new();
        defaults.insert("title".into(), FieldValue::text("fallback"));

        let snapshot =
            params_to_snapshot(&params(&[("title", "")]), &logger_schema(), &defaults);
        assert_eq!(snapshot["title"], FieldValue::text("fallback"));
    }

    #[test]
    fn invalid_range_falls_back_to_neutral() {
        let schema = Schema::new().with_field("range", FieldKind::DateRange);
        let snapshot = params_to_snapshot(
            &params(&[("range", "2024-13-40..2024-01-10")]),
            &schema,
            &Snapshot::new(),
        );
        assert_eq!(snapshot["range"], FieldValue::Range(DateRange::empty()));
    }

    #[test]
    fn invalid_range_falls_back_to_default() {
        let schema = Schema::new().with_field("range", FieldKind::DateRange);
        let fallback = DateRange::new(date("2024-01-01"), date("2024-01-15"));
        let mut defaults = Snapshot::new();
        defaults.insert("range".into(), fallback.into());

        let snapshot = params_to_snapshot(
            &params(&[("range", "2024-13-40..2024-01-10")]),
            &schema,
            &defaults,
        );
        assert_eq!(snapshot["range"], FieldValue::Range(fallback));
    }

    // ===========================================
    // snapshot_to_params
    // ===========================================

    #[test]
    fn complete_range_is_encoded() {
        let schema = Schema::new().with_field("range", FieldKind::DateRange);
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "range".into(),
            DateRange::new(date("2024-01-01"), date("2024-01-10")).into(),
        );

        assert_eq!(
            snapshot_to_params(&snapshot, &schema, None),
            params(&[("range", "2024-01-01..2024-01-10")])
        );
    }

    #[test]
    fn one_sided_range_is_omitted() {
        let schema = Schema::new().with_field("range", FieldKind::DateRange);
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "range".into(),
            DateRange {
                from: Some(date("2024-01-01")),
                to: None,
            }
            .into(),
        );

        assert!(snapshot_to_params(&snapshot, &schema, None).is_empty());
    }

    #[test]
    fn neutral_values_never_reach_the_url() {
        let schema = logger_schema();
        let snapshot = params_to_snapshot(&QueryParams::new(), &schema, &Snapshot::new());
        let mut with_empty_text = snapshot.clone();
        with_empty_text.insert("title".into(), FieldValue::text(""));

        assert!(snapshot_to_params(&snapshot, &schema, None).is_empty());
        assert!(snapshot_to_params(&with_empty_text, &schema, None).is_empty());
    }

    #[test]
    fn blank_list_items_never_reach_the_url() {
        let schema = logger_schema();
        for items in [vec![","], vec!["", " "], vec![" , "]] {
            let mut snapshot = params_to_snapshot(&QueryParams::new(), &schema, &Snapshot::new());
            snapshot.insert("level".into(), FieldValue::list(&items));

            let written = snapshot_to_params(&snapshot, &schema, None);
            assert!(!written.contains_key("level"), "{:?} wrote {:?}", items, written);
        }
    }

    #[test]
    fn excluded_keys_are_absent_whatever_their_value() {
        let schema = Schema::new()
            .with_field("periodRange", FieldKind::DateRange)
            .with_field("comparePeriodRange", FieldKind::DateRange);
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "periodRange".into(),
            DateRange::new(date("2024-01-01"), date("2024-01-14")).into(),
        );
        snapshot.insert(
            "comparePeriodRange".into(),
            DateRange::new(date("2023-12-18"), date("2023-12-31")).into(),
        );

        let hide_compare = |_: &Snapshot| vec!["comparePeriodRange".to_string()];
        let result = snapshot_to_params(&snapshot, &schema, Some(&hide_compare));

        assert_eq!(
            result,
            params(&[("periodRange", "2024-01-01..2024-01-14")])
        );
    }

    #[test]
    fn exclusion_can_depend_on_snapshot() {
        let schema = Schema::new()
            .with_field("compare", FieldKind::Scalar)
            .with_field("title", FieldKind::Scalar);
        let hide_title_unless_compare = |s: &Snapshot| match s.get("compare") {
            Some(FieldValue::Scalar(flag)) if flag.is_truthy() => vec![],
            _ => vec!["title".to_string()],
        };

        let mut snapshot = Snapshot::new();
        snapshot.insert("compare".into(), FieldValue::flag(false));
        snapshot.insert("title".into(), FieldValue::text("x"));
        let off = snapshot_to_params(&snapshot, &schema, Some(&hide_title_unless_compare));
        assert_eq!(off, params(&[("compare", "false")]));

        snapshot.insert("compare".into(), FieldValue::flag(true));
        let on = snapshot_to_params(&snapshot, &schema, Some(&hide_title_unless_compare));
        assert_eq!(on, params(&[("compare", "true"), ("title", "x")]));
    }

    #[test]
    fn fields_outside_schema_are_not_written() {
        let schema = Schema::new().with_field("title", FieldKind::Scalar);
        let mut snapshot = Snapshot::new();
        snapshot.insert("title".into(), FieldValue::text("x"));
        snapshot.insert("secret".into(), FieldValue::text("y"));

        assert_eq!(
            snapshot_to_params(&snapshot, &schema, None),
            params(&[("title", "x")])
        );
    }

    #[test]
    fn canonical_params_survive_a_round_trip() {
        let schema = logger_schema();
        let original = params(&[
            ("accountId", "abc"),
            ("createdDateRange", "2024-01-01..2024-01-10"),
            ("level", "error,info,warn"),
            ("title", "Crash on save"),
        ]);

        let snapshot = params_to_snapshot(&original, &schema, &Snapshot::new());
        assert_eq!(snapshot_to_params(&snapshot, &schema, None), original);
    }

    #[test]
    fn clean_params_drops_empty_values() {
        let cleaned = clean_params(params(&[("a", ""), ("b", "1")]));
        assert_eq!(cleaned, params(&[("b", "1")]));
    }
}
