//! Decode a query string into the form state it describes.

use anyhow::Result;
use formurl_sync_core::params_to_snapshot;

use crate::config::FilterConfig;
use crate::json::snapshot_to_json;
use crate::query::parse_query;

/// Run the decode command.
pub fn run(config: &FilterConfig, query: &str) -> Result<()> {
    println!("{}", render(config, query)?);
    Ok(())
}

/// Decode `query` against the configured schema and defaults, as JSON.
pub fn render(config: &FilterConfig, query: &str) -> Result<String> {
    let defaults = config.decoded_defaults()?;
    let params = parse_query(query);
    let snapshot = params_to_snapshot(&params, &config.schema, &defaults);
    snapshot_to_json(&snapshot)
}
