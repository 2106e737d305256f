use std::borrow::Cow;

use crate::completion::{Candidate, starts_with_ignore_case};
use crate::error::{ErrorKind, GrammarError};
use crate::line::ParsedLine;
use crate::value::Value;

use super::{ArgParser, ParserArgs};

/// Matches one word against fixed alternatives, case-insensitively.
///
/// The single alternative `*` accepts any word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralParser {
    options: Vec<String>,
}

impl LiteralParser {
    /// A literal accepting any of `options`.
    pub fn new(options: Vec<String>) -> Self {
        Self { options }
    }

    /// The alternatives, as declared.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    fn is_wildcard(&self) -> bool {
        matches!(self.options.as_slice(), [only] if only == "*")
    }
}

impl ArgParser for LiteralParser {
    fn parse(&self, line: &mut ParsedLine) -> Result<Value, ErrorKind> {
        let word = line.next()?;
        if self.is_wildcard() {
            return Ok(Value::Str(word));
        }
        self.options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(&word))
            .map(|option| Value::Str(option.clone()))
            .ok_or_else(|| ErrorKind::invalid_format(word, self.format()))
    }

    fn complete(&self, line: &ParsedLine) -> Vec<Candidate> {
        let partial = line.current_word();
        if self.is_wildcard() {
            return if partial.is_empty() {
                Vec::new()
            } else {
                vec![Candidate::new(partial)]
            };
        }
        self.options
            .iter()
            .filter(|option| starts_with_ignore_case(option, partial))
            .map(Candidate::new)
            .collect()
    }

    fn format(&self) -> Cow<'_, str> {
        if self.is_wildcard() {
            Cow::Borrowed("any word")
        } else {
            Cow::Owned(self.options.join("|"))
        }
    }
}

pub(super) fn factory(args: &ParserArgs<'_>) -> Result<Box<dyn ArgParser>, GrammarError> {
    let options = args.params.list("options")?.ok_or_else(|| {
        GrammarError::invalid_parameter(args.name, "options", "", "options are required")
    })?;
    Ok(Box::new(LiteralParser::new(options)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(options: &[&str]) -> LiteralParser {
        LiteralParser::new(options.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn returns_canonical_spelling() {
        let mut line = ParsedLine::new("ON");
        assert_eq!(lit(&["on", "off"]).parse(&mut line), Ok(Value::from("on")));
    }

    #[test]
    fn mismatch_lists_alternatives() {
        let mut line = ParsedLine::new("maybe");
        assert_eq!(
            lit(&["on", "off"]).parse(&mut line),
            Err(ErrorKind::invalid_format("maybe", "on|off"))
        );
    }

    #[test]
    fn wildcard_echoes_input() {
        let mut line = ParsedLine::new("Anything");
        assert_eq!(lit(&["*"]).parse(&mut line), Ok(Value::from("Anything")));
        assert_eq!(
            lit(&["*"]).complete(&ParsedLine::new("ab")),
            [Candidate::new("ab")]
        );
    }

    #[test]
    fn completes_by_prefix() {
        let values: Vec<String> = lit(&["give", "gamemode", "kill"])
            .complete(&ParsedLine::new("g"))
            .into_iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, ["give", "gamemode"]);
    }

    #[test]
    fn end_of_input() {
        let mut line = ParsedLine::new("");
        assert!(matches!(
            lit(&["a"]).parse(&mut line),
            Err(ErrorKind::InputExpected { .. })
        ));
    }
}
