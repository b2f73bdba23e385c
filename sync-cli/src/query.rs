//! Percent-encoded query strings.
//!
//! The engine works on decoded parameter maps; this is the only place the
//! address-bar encoding appears.

use formurl_sync_types::QueryParams;
use url::form_urlencoded;

/// Parse `?a=1&b=x%2Cy` (leading `?` optional). A repeated key keeps its
/// last value.
pub fn parse_query(query: &str) -> QueryParams {
    let query = query.trim().trim_start_matches('?');
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Render parameters as a query string without the leading `?`.
pub fn render_query(params: &QueryParams) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}
