//! Query string building for the replay listing endpoint.
//!
//! Values are trusted to already be URL-safe and are emitted verbatim.

use std::collections::BTreeMap;

/// Listing filter parameters, ordered by name so the rendered query is deterministic.
pub type QueryParams = BTreeMap<String, String>;

/// Render parameters as `?name=value&name=value`.
///
/// An empty map renders as a lone `?`.
pub fn build_query(params: &QueryParams) -> String {
    let pairs: Vec<String> = params
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    format!("?{}", pairs.join("&"))
}

/// Parse a single `name=value` argument.
///
/// Only the first `=` separates name from value, so values may themselves
/// contain `=`.
pub fn parse_param(input: &str) -> Result<(String, String), String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("'{input}' is not in name=value form"))?;

    if name.is_empty() {
        return Err(format!("'{input}' has an empty parameter name"));
    }

    Ok((name.to_string(), value.to_string()))
}
