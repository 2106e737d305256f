use super::ast::Term;

/// Serialize compiled terms to a pretty-printed JSON string.
pub fn to_pretty_json(terms: &[Term]) -> String {
    // Terms hold only strings and maps with string keys.
    serde_json::to_string_pretty(terms).unwrap_or_default()
}
