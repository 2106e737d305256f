//! Grammar language and tree construction tests: canonical text, JSON dump,
//! construction errors with spans, and custom parsers.

use std::borrow::Cow;

use argtree_core::grammar::emit::grammar_text;
use argtree_core::grammar::parser::parse_grammar;
use argtree_core::{
    ArgParser, Candidate, EngineConfig, ErrorKind, GrammarError, ParsedLine, ParserRegistry,
    Span, TreeBuilder, Value, codes, to_pretty_json,
};

// ─── 1. Canonical text and dump ─────────────────────────────────────────────

#[test]
fn canonical_text_is_stable() {
    let terms = parse_grammar("tp  @int( name = x,min=0 ) @int(name=y)  here|there").unwrap();
    let text = grammar_text(&terms);
    assert_eq!(text, "tp @int(min=0, name=x) @int(name=y) here|there");
    assert_eq!(grammar_text(&parse_grammar(&text).unwrap()), text);
}

#[test]
fn dump_lists_terms_as_json() {
    let terms = parse_grammar("say @text(name=msg)").unwrap();
    let json: serde_json::Value = serde_json::from_str(&to_pretty_json(&terms)).unwrap();
    assert_eq!(json[0]["kind"], "literal");
    assert_eq!(json[0]["options"][0], "say");
    assert_eq!(json[1]["kind"], "parser");
    assert_eq!(json[1]["name"], "text");
    assert_eq!(json[1]["params"]["name"], "msg");
}

// ─── 2. Construction errors ─────────────────────────────────────────────────

#[test]
fn unknown_parser_points_at_term() {
    let mut b = TreeBuilder::<(), ()>::new();
    let err = b.command("give @player").err().unwrap();
    assert_eq!(err.code(), codes::UNKNOWN_PARSER);
    assert_eq!(err.span(), Some(Span::new(5, 12)));
    assert_eq!(err.to_string(), "unknown parser '@player'");
}

#[test]
fn invalid_parameter_points_at_term() {
    let mut b = TreeBuilder::<(), ()>::new();
    let err = b.command("give @int(min=x)").err().unwrap();
    assert!(matches!(
        &err,
        GrammarError::InvalidParameter { key, value, .. } if key == "min" && value == "x"
    ));
    assert_eq!(err.span(), Some(Span::new(5, 16)));
}

#[test]
fn inverted_bounds_are_rejected() {
    let mut b = TreeBuilder::<(), ()>::new();
    let err = b.command("x @int(min=5, max=1)").err().unwrap();
    assert_eq!(err.code(), codes::INVALID_PARAMETER);
}

#[test]
fn default_must_satisfy_its_parser() {
    let mut b = TreeBuilder::<(), ()>::new();
    let err = b.command("x @int(max=10, default=50)").err().unwrap();
    assert_eq!(err.code(), codes::INVALID_DEFAULT);
    assert!(err.to_string().contains("too big"), "{err}");
}

#[test]
fn syntax_error_carries_offset() {
    let mut b = TreeBuilder::<(), ()>::new();
    let err = b.command("x @int(min=1").err().unwrap();
    assert!(matches!(err, GrammarError::Syntax { offset: 6, .. }));
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.id, codes::GRAMMAR_SYNTAX);
    assert_eq!(diagnostic.span, Some(Span::empty(6)));
}

#[test]
fn flag_requires_a_switch_name() {
    let mut b = TreeBuilder::<(), ()>::new();
    assert!(b.command("x @flag").is_err());
    assert!(b.command("x @flag(switch=v)").is_ok());
}

#[test]
fn failed_command_leaves_tree_untouched() {
    let mut b = TreeBuilder::<(), ()>::new();
    assert!(b.command("x @int(min=oops)").is_err());
    let tree = b.build();
    assert!(tree.usages().is_empty());
}

// ─── 3. Custom parsers and configuration ────────────────────────────────────

/// Accepts `#rrggbb` colors.
struct ColorParser;

impl ArgParser for ColorParser {
    fn parse(&self, line: &mut ParsedLine) -> Result<Value, ErrorKind> {
        let word = line.next()?;
        let hex = word.strip_prefix('#').unwrap_or_default();
        if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Value::Str(word.to_ascii_lowercase()))
        } else {
            Err(ErrorKind::rejected(format!("'{word}' is not a #rrggbb color")))
        }
    }

    fn complete(&self, _line: &ParsedLine) -> Vec<Candidate> {
        vec![Candidate::new("#ff0000"), Candidate::new("#00ff00")]
    }

    fn format(&self) -> Cow<'_, str> {
        Cow::Borrowed("color")
    }
}

fn color_builder() -> TreeBuilder<(), String> {
    let mut registry = ParserRegistry::builtin();
    registry.register("color", |_args| Ok(Box::new(ColorParser) as Box<dyn ArgParser>));
    TreeBuilder::new().with_registry(registry)
}

#[test]
fn custom_parser_participates_in_parsing() {
    let mut b = color_builder();
    b.command("paint @color(name=fill)")
        .unwrap()
        .executes(|inv| inv.get_str("fill").unwrap_or_default().to_string());
    let tree = b.build();

    let out = tree.parse(ParsedLine::new("paint #AABBCC"), &()).invoke().unwrap();
    assert_eq!(out, "#aabbcc");

    let outcome = tree.parse(ParsedLine::new("paint red"), &());
    assert!(outcome.errors().has_code(codes::PARSER_REJECTED));
    assert_eq!(outcome.errors().message(), "'red' is not a #rrggbb color");
}

#[test]
fn custom_parser_participates_in_completion() {
    let mut b = color_builder();
    b.command("paint @color(name=fill)").unwrap().executes(|_| String::new());
    let tree = b.build();

    let completions = tree.complete(ParsedLine::new("paint #f"), &());
    assert_eq!(completions.suggestions(), ["#ff0000"]);
}

#[test]
fn switch_prefix_is_configurable() {
    let config = EngineConfig {
        switch_prefix: '/',
        ..EngineConfig::default()
    };
    let mut b = TreeBuilder::<(), i64>::new().with_config(config);
    b.command("wait @int(switch=t, default=1)")
        .unwrap()
        .executes(|inv| inv.get_i64("t").unwrap_or(0));
    let tree = b.build();

    assert_eq!(tree.usages(), ["wait [/t <int>]"]);
    assert_eq!(tree.parse(ParsedLine::new("wait /t 9"), &()).invoke().unwrap(), 9);
    assert!(!tree.parse(ParsedLine::new("wait -t 9"), &()).is_matched());
}
