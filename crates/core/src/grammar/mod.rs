//! Grammar definition language.
//!
//! A grammar is a line of space-separated terms: a bare word is a literal
//! (`give`, `on|off`, `*`), `@name` invokes a registered parser, and
//! `@name(key=value, key2="quoted value")` passes parameters to it.

/// Grammar term types.
pub mod ast;
/// JSON serialization helpers for compiled terms.
pub mod dump;
/// Canonical text and usage rendering for terms.
pub mod emit;
/// Grammar lexer: tokenizes grammar text into borrowed tokens.
pub mod lexer;
/// Grammar parser: converts tokens into terms.
pub mod parser;
