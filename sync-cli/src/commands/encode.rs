//! Encode a form value into the query string the engine would write.

use anyhow::Result;
use formurl_sync_core::snapshot_to_params;

use crate::config::FilterConfig;
use crate::json::snapshot_from_json;
use crate::query::render_query;

/// Run the encode command.
pub fn run(config: &FilterConfig, form_json: &str) -> Result<()> {
    println!("{}", render(config, form_json)?);
    Ok(())
}

/// Encode a JSON form value, applying exclusion rules and cleaning.
pub fn render(config: &FilterConfig, form_json: &str) -> Result<String> {
    let sync = config.sync_config()?;
    let snapshot = snapshot_from_json(form_json, &sync.schema)?;
    let params = snapshot_to_params(&snapshot, &sync.schema, sync.exclude_keys.as_deref());
    Ok(render_query(&params))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS: &str = r#"
[schema]
periodRange = "dateRange"
comparePeriodRange = "dateRange"
compare = "scalar"
level = "array"

[[exclude]]
field = "comparePeriodRange"
unless = "compare"
"#;

    fn encode(json: &str) -> String {
        let config: FilterConfig = STATS.parse().unwrap();
        render(&config, json).unwrap()
    }

    #[test]
    fn encodes_sorted_list_and_range() {
        let query = encode(
            r#"{"level": ["warn", "error", "warn"], "periodRange": {"from": "2024-01-01", "to": "2024-01-14"}}"#,
        );
        assert_eq!(query, "level=error%2Cwarn&periodRange=2024-01-01..2024-01-14");
    }

    #[test]
    fn neutral_form_encodes_to_nothing() {
        assert_eq!(encode("{}"), "");
    }

    #[test]
    fn one_sided_range_is_omitted() {
        assert_eq!(encode(r#"{"periodRange": {"from": "2024-01-01"}}"#), "");
    }

    #[test]
    fn exclusion_rule_applies() {
        let range = r#"{"from": "2023-12-18", "to": "2023-12-31"}"#;

        let off = encode(&format!(r#"{{"compare": false, "comparePeriodRange": {}}}"#, range));
        assert_eq!(off, "compare=false");

        let on = encode(&format!(r#"{{"compare": true, "comparePeriodRange": {}}}"#, range));
        assert_eq!(on, "compare=true&comparePeriodRange=2023-12-18..2023-12-31");
    }

    #[test]
    fn invalid_json_is_an_error() {
        let config: FilterConfig = STATS.parse().unwrap();
        assert!(render(&config, "{").is_err());
    }
}
