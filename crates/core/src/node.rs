//! Compiled grammar terms.

use std::fmt;

use crate::completion::CandidateGroup;
use crate::config::EngineConfig;
use crate::error::{ErrorKind, GrammarError};
use crate::grammar::ast::{Term, TermKind};
use crate::grammar::emit::term_text;
use crate::line::ParsedLine;
use crate::params::Params;
use crate::parsers::{ArgParser, LiteralParser, ParserArgs, ParserRegistry};
use crate::value::Value;

/// One grammar term compiled against a [`ParserRegistry`]: the parser plus
/// the node-level parameters every parser understands (`name`, `default`,
/// `required`, `switch`, `suppress`, `description`).
pub struct ArgNode {
    parser_name: String,
    name: String,
    parser: Box<dyn ArgParser>,
    params: Params,
    literal: bool,
    default: Option<Value>,
    required: bool,
    suppress: bool,
    description: Option<String>,
    switch_names: Vec<String>,
    switch_prefix: char,
    signature: String,
}

impl ArgNode {
    /// Compile `term`. Errors carry the term's span.
    pub fn compile(
        term: &Term,
        registry: &ParserRegistry,
        config: &EngineConfig,
    ) -> Result<Self, GrammarError> {
        Self::compile_inner(term, registry, config).map_err(|e| e.at(term.span))
    }

    fn compile_inner(
        term: &Term,
        registry: &ParserRegistry,
        config: &EngineConfig,
    ) -> Result<Self, GrammarError> {
        let (parser_name, params, parser, literal): (_, _, Box<dyn ArgParser>, _) =
            match &term.kind {
                TermKind::Literal { options } => (
                    "literal".to_string(),
                    Params::new("literal", Default::default()),
                    Box::new(LiteralParser::new(options.clone())),
                    true,
                ),
                TermKind::Parser { name, params } => {
                    let params = Params::new(name.as_str(), params.clone());
                    let parser = registry.create(&ParserArgs {
                        name,
                        params: &params,
                        config,
                    })?;
                    (name.clone(), params, parser, false)
                }
            };

        let switch_names = params.list("switch")?.unwrap_or_default();
        let name = match (&term.kind, params.get("name")) {
            (_, Some(name)) => name.to_string(),
            (TermKind::Literal { options }, None) => options.join("|"),
            (TermKind::Parser { .. }, None) => switch_names
                .first()
                .cloned()
                .unwrap_or_else(|| parser_name.clone()),
        };
        let default = match params.get("default") {
            Some(text) => Some(parse_default(parser.as_ref(), &parser_name, text)?),
            None => parser.implicit_default(),
        };
        let required = params
            .flag("required")?
            .unwrap_or(switch_names.is_empty());
        let suppress = params.flag("suppress")?.unwrap_or(literal);

        Ok(Self {
            parser_name,
            name,
            parser,
            literal,
            default,
            required,
            suppress,
            description: params.get("description").map(str::to_string),
            switch_names,
            switch_prefix: config.switch_prefix,
            signature: term_text(term),
            params,
        })
    }

    /// Name reported in [`crate::ParsedArg::name`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry name of the parser (`literal` for bare words).
    pub fn parser_name(&self) -> &str {
        &self.parser_name
    }

    /// The term's parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Canonical term text; equal signatures share a tree node.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Free-text description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether this term is matched by name rather than by position.
    pub fn is_switch(&self) -> bool {
        !self.switch_names.is_empty()
    }

    /// Switch names, without prefix.
    pub fn switch_names(&self) -> &[String] {
        &self.switch_names
    }

    /// Whether `name` (prefix stripped) selects this switch.
    pub fn matches_switch(&self, name: &str) -> bool {
        self.switch_names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// Whether the argument may be omitted.
    pub fn is_optional(&self) -> bool {
        !self.required || self.default.is_some()
    }

    /// Whether a switch must be supplied.
    pub fn is_required_switch(&self) -> bool {
        self.is_switch() && !self.is_optional()
    }

    /// Whether the value is hidden from the invocation's visible arguments.
    pub fn is_suppressed(&self) -> bool {
        self.suppress
    }

    /// Whether the parser reads a value word.
    pub fn takes_value(&self) -> bool {
        self.parser.takes_value()
    }

    /// Value used when the argument is omitted.
    pub fn default_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }

    /// Parse the argument's value from `line`.
    pub fn parse(&self, line: &mut ParsedLine) -> Result<Value, ErrorKind> {
        if self.takes_value() && line.is_eol() {
            return Err(ErrorKind::input_expected(self.usage()));
        }
        match self.parser.parse(line) {
            Err(ErrorKind::InputExpected { expected }) if expected.is_empty() => {
                Err(ErrorKind::input_expected(self.usage()))
            }
            other => other,
        }
    }

    /// Weight at which a rejection of present input is recorded, given the
    /// branch weight before this node.
    ///
    /// A value parser that rejects a word counts as having reached its unit
    /// (`weight + 1`). A literal that does not match only means the word
    /// names a different path, so it stays at `weight` and loses to any
    /// branch that got further.
    pub fn rejection_weight(&self, weight: u32) -> u32 {
        if self.parser_name == "literal" {
            weight
        } else {
            weight + 1
        }
    }

    /// Usage fragment: `give`, `on|off`, `<amount>`, `[amount]`,
    /// `[-a|-all <int>]`, `[-v|-verbose]`.
    pub fn usage(&self) -> String {
        if self.is_switch() {
            let names = self
                .switch_names
                .iter()
                .map(|n| format!("{}{n}", self.switch_prefix))
                .collect::<Vec<_>>()
                .join("|");
            let body = if self.takes_value() {
                format!("{names} <{}>", self.placeholder())
            } else {
                names
            };
            return if self.is_optional() {
                format!("[{body}]")
            } else {
                body
            };
        }
        if self.literal {
            return self.name.clone();
        }
        if self.is_optional() {
            format!("[{}]", self.name)
        } else {
            format!("<{}>", self.name)
        }
    }

    fn placeholder(&self) -> &str {
        match self.params.get("name") {
            Some(name) => name,
            None => &self.parser_name,
        }
    }

    /// Candidates for the word under the cursor, tagged with this argument.
    pub(crate) fn complete_group(&self, line: &ParsedLine) -> CandidateGroup {
        let label = if self.is_switch() {
            self.placeholder().to_string()
        } else {
            self.name.clone()
        };
        let candidates = self
            .parser
            .complete(line)
            .into_iter()
            .map(|mut c| {
                if c.hint {
                    c.value = format!("<{label}>");
                }
                if c.description.is_none() {
                    c.description.clone_from(&self.description);
                }
                c
            })
            .collect();
        CandidateGroup {
            title: self.usage(),
            description: self.description.clone(),
            partial: line.current_word().to_string(),
            candidates,
        }
    }
}

/// Run a default through the node's own parser. The default must be
/// consumed entirely; an empty default is one empty word.
fn parse_default(
    parser: &dyn ArgParser,
    parser_name: &str,
    text: &str,
) -> Result<Value, GrammarError> {
    let invalid = |reason: String| GrammarError::InvalidDefault {
        parser: parser_name.to_string(),
        value: text.to_string(),
        reason,
        span: None,
    };
    let mut line = if text.is_empty() {
        ParsedLine::new("\"\"")
    } else {
        ParsedLine::new(&escape_quotes(text))
    };
    let value = parser.parse(&mut line).map_err(|e| invalid(e.to_string()))?;
    if !line.is_eol() {
        return Err(invalid(format!(
            "unexpected '{}' after the value",
            line.remaining_line()
        )));
    }
    Ok(value)
}

/// Escape quotes and backslashes so tokenizing `text` only splits on
/// whitespace.
fn escape_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '\'' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl fmt::Debug for ArgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgNode")
            .field("signature", &self.signature)
            .field("name", &self.name)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("suppress", &self.suppress)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parser::parse_grammar;

    fn compile(grammar: &str) -> Result<ArgNode, GrammarError> {
        let terms = parse_grammar(grammar).unwrap();
        ArgNode::compile(&terms[0], &ParserRegistry::builtin(), &EngineConfig::default())
    }

    #[test]
    fn literal_defaults() {
        let node = compile("give").unwrap();
        assert!(node.is_suppressed());
        assert!(!node.is_optional());
        assert_eq!(node.usage(), "give");
        assert_eq!(node.name(), "give");
    }

    #[test]
    fn positional_with_default_is_optional() {
        let node = compile("@int(name=amount, default=1, max=64)").unwrap();
        assert!(node.is_optional());
        assert_eq!(node.default_value(), Value::Int(1));
        assert_eq!(node.usage(), "[amount]");
        assert!(!node.is_suppressed());
    }

    #[test]
    fn invalid_default_is_rejected_with_span() {
        let err = compile("@int(default=x)").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::InvalidDefault { ref parser, .. } if parser == "int"
        ));
        assert!(err.span().is_some());
        assert!(compile("@int(max=3, default=9)").is_err());
    }

    #[test]
    fn default_must_be_consumed_entirely() {
        let err = compile(r#"@string(name=who, default="big world")"#).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidDefault { ref value, .. } if value == "big world"));
        assert!(err.to_string().contains("'world'"), "{err}");

        let text = compile(r#"@text(name=msg, default="big world")"#).unwrap();
        assert_eq!(text.default_value(), Value::Str("big world".into()));
        let quoted = compile(r#"@text(name=msg, default="it's \"fine\"")"#).unwrap();
        assert_eq!(quoted.default_value(), Value::Str(r#"it's "fine""#.into()));
    }

    #[test]
    fn empty_default_goes_through_the_parser() {
        assert!(matches!(
            compile(r#"@int(name=n, default="")"#),
            Err(GrammarError::InvalidDefault { .. })
        ));
        let text = compile(r#"@text(name=reason, default="")"#).unwrap();
        assert_eq!(text.default_value(), Value::Str(String::new()));
        let word = compile(r#"@string(name=who, default="")"#).unwrap();
        assert_eq!(word.default_value(), Value::Str(String::new()));
    }

    #[test]
    fn switches_default_to_optional() {
        let node = compile("@int(switch=a|all)").unwrap();
        assert!(node.is_switch());
        assert!(node.is_optional());
        assert!(node.matches_switch("ALL"));
        assert_eq!(node.name(), "a");
        assert_eq!(node.usage(), "[-a|-all <int>]");

        let required = compile("@int(switch=n, required, name=count)").unwrap();
        assert!(required.is_required_switch());
        assert_eq!(required.usage(), "-n <count>");
    }

    #[test]
    fn flag_switch() {
        let node = compile("@flag(switch=v|verbose)").unwrap();
        assert_eq!(node.default_value(), Value::Bool(false));
        assert_eq!(node.usage(), "[-v|-verbose]");
        let mut line = ParsedLine::new("");
        assert_eq!(node.parse(&mut line), Ok(Value::Bool(true)));
        assert!(compile("@flag").is_err());
    }

    #[test]
    fn end_of_input_names_the_argument() {
        let node = compile("@string(name=player)").unwrap();
        let mut line = ParsedLine::new("");
        assert_eq!(
            node.parse(&mut line),
            Err(ErrorKind::input_expected("<player>"))
        );
    }

    #[test]
    fn unknown_parser_carries_span() {
        let terms = parse_grammar("go @nope").unwrap();
        let err = ArgNode::compile(
            &terms[1],
            &ParserRegistry::builtin(),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.span(), Some(terms[1].span));
    }

    #[test]
    fn hints_are_relabelled() {
        let node = compile("@int(name=amount)").unwrap();
        let group = node.complete_group(&ParsedLine::new(""));
        assert_eq!(group.title, "<amount>");
        assert_eq!(group.candidates[0].value, "<amount>");
        assert!(group.candidates[0].hint);
    }
}
