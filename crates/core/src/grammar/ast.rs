use std::collections::BTreeMap;

use argtree_diagnostics::Span;
use serde::Serialize;

/// One term of a grammar line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    /// What the term matches.
    #[serde(flatten)]
    pub kind: TermKind,
    /// Byte range of the term in the grammar text.
    pub span: Span,
}

/// Variant of a [`Term`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TermKind {
    /// A bare word: one of the `|`-separated alternatives, or `*`.
    Literal {
        /// The alternatives, in declared order.
        options: Vec<String>,
    },
    /// `@name(params)`: a registered parser.
    Parser {
        /// Registry name (without the `@`).
        name: String,
        /// Parameters, unquoted. A key written without `=` maps to `"true"`.
        params: BTreeMap<String, String>,
    },
}

impl Term {
    /// Whether the term declares a switch (`switch=` parameter).
    pub fn is_switch(&self) -> bool {
        matches!(&self.kind, TermKind::Parser { params, .. } if params.contains_key("switch"))
    }
}
