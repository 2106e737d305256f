use std::borrow::Cow;

use crate::completion::Candidate;
use crate::error::{ErrorKind, GrammarError};
use crate::line::ParsedLine;
use crate::value::Value;

use super::{ArgParser, ParserArgs};

/// `@bool`: `true|false|yes|no|on|off|1|0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolParser;

impl ArgParser for BoolParser {
    fn parse(&self, line: &mut ParsedLine) -> Result<Value, ErrorKind> {
        let word = line.next()?;
        match word.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(ErrorKind::invalid_format(word, self.format())),
        }
    }

    fn complete(&self, _line: &ParsedLine) -> Vec<Candidate> {
        vec![Candidate::new("true"), Candidate::new("false")]
    }

    fn format(&self) -> Cow<'_, str> {
        Cow::Borrowed("true|false")
    }
}

/// `@flag(switch=...)`: a valueless switch. Present means `true`, absent
/// means `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagParser;

impl ArgParser for FlagParser {
    fn parse(&self, _line: &mut ParsedLine) -> Result<Value, ErrorKind> {
        Ok(Value::Bool(true))
    }

    fn complete(&self, _line: &ParsedLine) -> Vec<Candidate> {
        Vec::new()
    }

    fn format(&self) -> Cow<'_, str> {
        Cow::Borrowed("flag")
    }

    fn takes_value(&self) -> bool {
        false
    }

    fn implicit_default(&self) -> Option<Value> {
        Some(Value::Bool(false))
    }
}

pub(super) fn bool_factory(_args: &ParserArgs<'_>) -> Result<Box<dyn ArgParser>, GrammarError> {
    Ok(Box::new(BoolParser))
}

pub(super) fn flag_factory(args: &ParserArgs<'_>) -> Result<Box<dyn ArgParser>, GrammarError> {
    if !args.params.contains("switch") {
        return Err(GrammarError::invalid_parameter(
            args.name,
            "switch",
            "",
            "a flag must be declared as a switch",
        ));
    }
    Ok(Box::new(FlagParser))
}
