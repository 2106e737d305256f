//! argtree core library.
//!
//! A grammar-driven command argument parser. Commands are declared as
//! grammar lines (`give @string(name=player) @int(name=amount, default=1)`)
//! and compiled into one [`ParserTree`]. Matching input against the tree
//! explores every branch that could apply and keeps the one that consumed
//! the most grammar units; the same tree answers tab-completion requests.
//! The main entry points are [`TreeBuilder`] for building, [`Engine`] for
//! string-in parsing and completion, and [`ParseOutcome::invoke`] for
//! running the selected handler.

#![warn(missing_docs)]

/// Tree construction from grammar lines.
pub mod builder;
/// Completion candidates and groups.
pub mod completion;
/// Engine-wide settings.
pub mod config;
/// Per-branch parse state and handler input.
pub mod context;
/// String-in driver with aliases.
pub mod engine;
/// Parse errors, aggregation, and construction errors.
pub mod error;
/// Grammar language: lexer, parser, terms, canonical text.
pub mod grammar;
/// Tokenized input line.
pub mod line;
/// Compiled grammar terms.
pub mod node;
/// Term parameters.
pub mod params;
/// Argument parsers and their registry.
pub mod parsers;
/// The parser tree and its traversals.
pub mod tree;
/// Parsed values.
pub mod value;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Building
pub use builder::{CommandBuilder, TreeBuilder};
pub use config::EngineConfig;
pub use parsers::{ArgParser, ParserArgs, ParserRegistry};

// Running
pub use context::{Invocation, ParseContext};
pub use engine::Engine;
pub use line::{EndOfInput, ParsedLine};
pub use tree::{ErrorHandler, Handler, ParseOutcome, ParserTree, Usage};
pub use value::{ArgOrigin, ParsedArg, Value};

// Completion
pub use completion::{Candidate, CandidateGroup, Completions};

// Errors
pub use error::{Bound, ErrorCollector, ErrorKind, ErrorReport, GrammarError, InvocationError, ParseError};

// Diagnostics (re-exported from the diagnostics crate)
pub use argtree_diagnostics::{Diagnostic, Severity, Span, codes};

// Serialization helpers
pub use grammar::dump::to_pretty_json;
