use std::borrow::Cow;

use crate::completion::Candidate;
use crate::error::{ErrorKind, GrammarError};
use crate::line::ParsedLine;
use crate::value::Value;

use super::{ArgParser, ParserArgs};

/// `@string(min_length=, max_length=)`: one word, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringParser {
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl StringParser {
    /// A single-word parser with optional length limits (in characters).
    pub fn new(min_length: Option<usize>, max_length: Option<usize>) -> Self {
        Self {
            min_length,
            max_length,
        }
    }
}

impl ArgParser for StringParser {
    fn parse(&self, line: &mut ParsedLine) -> Result<Value, ErrorKind> {
        let word = line.next()?;
        let len = word.chars().count();
        if let Some(min) = self.min_length.filter(|min| len < *min) {
            return Err(ErrorKind::rejected(format!(
                "'{word}' is shorter than {min} characters"
            )));
        }
        if let Some(max) = self.max_length.filter(|max| len > *max) {
            return Err(ErrorKind::rejected(format!(
                "'{word}' is longer than {max} characters"
            )));
        }
        Ok(Value::Str(word))
    }

    fn complete(&self, _line: &ParsedLine) -> Vec<Candidate> {
        vec![Candidate::hint("word")]
    }

    fn format(&self) -> Cow<'_, str> {
        Cow::Borrowed("word")
    }
}

/// `@text`: the rest of the line as one string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextParser;

impl ArgParser for TextParser {
    fn parse(&self, line: &mut ParsedLine) -> Result<Value, ErrorKind> {
        Ok(Value::Str(line.take_rest()?))
    }

    fn complete(&self, _line: &ParsedLine) -> Vec<Candidate> {
        vec![Candidate::hint("text")]
    }

    fn format(&self) -> Cow<'_, str> {
        Cow::Borrowed("text")
    }
}

pub(super) fn string_factory(args: &ParserArgs<'_>) -> Result<Box<dyn ArgParser>, GrammarError> {
    let min = args.params.count("min_length")?;
    let max = args.params.count("max_length")?;
    if min.zip(max).is_some_and(|(lo, hi)| lo > hi) {
        let value = args.params.get("max_length").unwrap_or_default();
        return Err(GrammarError::invalid_parameter(
            args.name,
            "max_length",
            value,
            "max_length is below min_length",
        ));
    }
    Ok(Box::new(StringParser::new(min, max)))
}

pub(super) fn text_factory(_args: &ParserArgs<'_>) -> Result<Box<dyn ArgParser>, GrammarError> {
    Ok(Box::new(TextParser))
}
