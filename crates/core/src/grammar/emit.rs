//! Canonical grammar text.
//!
//! Canonical text is what [`crate::TreeBuilder`] compares when deciding
//! whether two commands share a node: parameters are sorted by key, values
//! are quoted only when they need it, and whitespace is normalized.

use super::ast::{Term, TermKind};

/// Render a whole grammar line in canonical form.
pub fn grammar_text(terms: &[Term]) -> String {
    terms.iter().map(term_text).collect::<Vec<_>>().join(" ")
}

/// Render one term in canonical form.
pub fn term_text(term: &Term) -> String {
    match &term.kind {
        TermKind::Literal { options } => options.join("|"),
        TermKind::Parser { name, params } if params.is_empty() => format!("@{name}"),
        TermKind::Parser { name, params } => {
            let params = params
                .iter()
                .map(|(k, v)| format!("{k}={}", quote_value(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("@{name}({params})")
        }
    }
}

/// Quote a parameter value if it would not lex back as a single word.
fn quote_value(value: &str) -> String {
    let plain = !value.is_empty()
        && !value.bytes().any(|b| {
            b.is_ascii_whitespace() || matches!(b, b'(' | b')' | b',' | b'=' | b'"' | b'\'' | b'\\')
        });
    if plain {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
