//! Argument parsers and the registry that resolves `@name` terms.
//!
//! Every grammar term compiles to a boxed [`ArgParser`]. Bare words become
//! [`LiteralParser`]s; `@name(...)` terms are built by the factory registered
//! under `name`. Applications add their own parsers with
//! [`ParserRegistry::register`] before compiling grammars.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::completion::Candidate;
use crate::config::EngineConfig;
use crate::error::{ErrorKind, GrammarError};
use crate::line::ParsedLine;
use crate::params::Params;
use crate::value::Value;

mod boolean;
mod literal;
mod number;
mod text;

pub use boolean::{BoolParser, FlagParser};
pub use literal::LiteralParser;
pub use number::{DoubleParser, IntParser};
pub use text::{StringParser, TextParser};

/// One parsing unit.
///
/// Implementations must be pure with respect to the line: the engine hands
/// each branch its own copy, so consuming words on failure is harmless.
pub trait ArgParser: Send + Sync {
    /// Consume words from `line` and produce a value.
    fn parse(&self, line: &mut ParsedLine) -> Result<Value, ErrorKind>;

    /// Suggestions for the word under the cursor. The engine filters them by
    /// prefix again, so returning every option is fine.
    fn complete(&self, line: &ParsedLine) -> Vec<Candidate>;

    /// Short description of the accepted input (`integer`, `on|off`).
    fn format(&self) -> Cow<'_, str>;

    /// Whether a switch using this parser is followed by a value word.
    fn takes_value(&self) -> bool {
        true
    }

    /// Value used when the argument is omitted and no `default` is given.
    fn implicit_default(&self) -> Option<Value> {
        None
    }
}

/// Everything a factory sees when compiling one `@name(...)` term.
#[derive(Debug, Clone, Copy)]
pub struct ParserArgs<'a> {
    /// The registered name the term used.
    pub name: &'a str,
    /// The term's parameters.
    pub params: &'a Params,
    /// Engine-wide settings.
    pub config: &'a EngineConfig,
}

/// Builds a parser from a term's parameters.
pub type ParserFactory =
    Arc<dyn Fn(&ParserArgs<'_>) -> Result<Box<dyn ArgParser>, GrammarError> + Send + Sync>;

/// Name → factory table consulted while compiling grammars.
#[derive(Clone)]
pub struct ParserRegistry {
    factories: BTreeMap<String, ParserFactory>,
}

impl ParserRegistry {
    /// A registry with no parsers at all.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with the builtin parsers: `literal`, `int`, `double`,
    /// `string`, `text`, `bool`, `flag`.
    pub fn builtin() -> Self {
        Self::empty()
            .with("literal", literal::factory)
            .with("int", number::int_factory)
            .with("double", number::double_factory)
            .with("string", text::string_factory)
            .with("text", text::text_factory)
            .with("bool", boolean::bool_factory)
            .with("flag", boolean::flag_factory)
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ParserArgs<'_>) -> Result<Box<dyn ArgParser>, GrammarError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Builder-style [`ParserRegistry::register`].
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ParserArgs<'_>) -> Result<Box<dyn ArgParser>, GrammarError>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Compile one term. Fails with [`GrammarError::UnknownParser`] when the
    /// name is not registered.
    pub fn create(&self, args: &ParserArgs<'_>) -> Result<Box<dyn ArgParser>, GrammarError> {
        let factory = self
            .factories
            .get(args.name)
            .ok_or_else(|| GrammarError::UnknownParser {
                name: args.name.to_string(),
                span: None,
            })?;
        factory(args)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}
