use std::borrow::Cow;

use crate::completion::Candidate;
use crate::error::{ErrorKind, GrammarError};
use crate::line::ParsedLine;
use crate::value::Value;

use super::{ArgParser, ParserArgs};

/// Ranges wider than this are never enumerated as suggestions.
const ENUMERABLE_SPAN: i64 = 10_000;

/// `@int(min=, max=)`: a signed 64-bit integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntParser {
    min: Option<i64>,
    max: Option<i64>,
    suggestions: usize,
}

impl IntParser {
    /// An integer parser with optional inclusive bounds, enumerating at most
    /// `suggestions` values when completing a bounded range.
    pub fn new(min: Option<i64>, max: Option<i64>, suggestions: usize) -> Self {
        Self {
            min,
            max,
            suggestions,
        }
    }
}

impl ArgParser for IntParser {
    fn parse(&self, line: &mut ParsedLine) -> Result<Value, ErrorKind> {
        let word = line.next()?;
        let n: i64 = word
            .parse()
            .map_err(|_| ErrorKind::invalid_format(word.as_str(), "integer"))?;
        if let Some(min) = self.min.filter(|min| n < *min) {
            return Err(ErrorKind::too_small(word, min));
        }
        if let Some(max) = self.max.filter(|max| n > *max) {
            return Err(ErrorKind::too_big(word, max));
        }
        Ok(Value::Int(n))
    }

    fn complete(&self, line: &ParsedLine) -> Vec<Candidate> {
        let (Some(min), Some(max)) = (self.min, self.max) else {
            return vec![Candidate::hint("integer")];
        };
        if !max.checked_sub(min).is_some_and(|span| span < ENUMERABLE_SPAN) {
            return vec![Candidate::hint("integer")];
        }
        let partial = line.current_word();
        (min..=max)
            .map(|n| n.to_string())
            .filter(|n| n.starts_with(partial))
            .take(self.suggestions)
            .map(Candidate::new)
            .collect()
    }

    fn format(&self) -> Cow<'_, str> {
        Cow::Borrowed("integer")
    }
}

/// `@double(min=, max=)`: a finite floating-point number.
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleParser {
    min: Option<f64>,
    max: Option<f64>,
}

impl DoubleParser {
    /// A number parser with optional inclusive bounds.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

impl ArgParser for DoubleParser {
    fn parse(&self, line: &mut ParsedLine) -> Result<Value, ErrorKind> {
        let word = line.next()?;
        let n = word
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| ErrorKind::invalid_format(word.as_str(), "number"))?;
        if let Some(min) = self.min.filter(|min| n < *min) {
            return Err(ErrorKind::too_small(word, min));
        }
        if let Some(max) = self.max.filter(|max| n > *max) {
            return Err(ErrorKind::too_big(word, max));
        }
        Ok(Value::Double(n))
    }

    fn complete(&self, _line: &ParsedLine) -> Vec<Candidate> {
        vec![Candidate::hint("number")]
    }

    fn format(&self) -> Cow<'_, str> {
        Cow::Borrowed("number")
    }
}

pub(super) fn int_factory(args: &ParserArgs<'_>) -> Result<Box<dyn ArgParser>, GrammarError> {
    let min = args.params.int("min")?;
    let max = args.params.int("max")?;
    check_bounds(args, min.zip(max).is_some_and(|(lo, hi)| lo > hi))?;
    Ok(Box::new(IntParser::new(
        min,
        max,
        args.config.completion_limit,
    )))
}

pub(super) fn double_factory(args: &ParserArgs<'_>) -> Result<Box<dyn ArgParser>, GrammarError> {
    let min = args.params.number("min")?;
    let max = args.params.number("max")?;
    check_bounds(args, min.zip(max).is_some_and(|(lo, hi)| lo > hi))?;
    Ok(Box::new(DoubleParser::new(min, max)))
}

fn check_bounds(args: &ParserArgs<'_>, inverted: bool) -> Result<(), GrammarError> {
    if inverted {
        let value = args.params.get("max").unwrap_or_default();
        return Err(GrammarError::invalid_parameter(
            args.name,
            "max",
            value,
            "max is below min",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(parser: &dyn ArgParser, input: &str) -> Result<Value, ErrorKind> {
        parser.parse(&mut ParsedLine::new(input))
    }

    #[test]
    fn int_bounds_beyond_f64_precision_report_exact_limit() {
        let p = IntParser::new(None, Some(9_007_199_254_740_993), 20);
        let err = parse(&p, "9007199254740994").unwrap_err();
        assert_eq!(
            err.to_string(),
            "number 9007199254740994 is too big (max 9007199254740993)"
        );
        assert_eq!(parse(&p, "9007199254740993"), Ok(Value::Int(9_007_199_254_740_993)));
    }

    #[test]
    fn int_bounds() {
        let p = IntParser::new(Some(1), Some(64), 20);
        assert_eq!(parse(&p, "64"), Ok(Value::Int(64)));
        assert_eq!(parse(&p, "65"), Err(ErrorKind::too_big("65", 64)));
        assert_eq!(parse(&p, "0"), Err(ErrorKind::too_small("0", 1)));
        assert_eq!(
            parse(&p, "x"),
            Err(ErrorKind::invalid_format("x", "integer"))
        );
    }

    #[test]
    fn int_rejects_fractions() {
        let p = IntParser::new(None, None, 20);
        assert!(matches!(
            parse(&p, "1.5"),
            Err(ErrorKind::InvalidFormat { .. })
        ));
    }

    #[test]
    fn bounded_int_enumerates_by_prefix() {
        let p = IntParser::new(Some(1), Some(30), 5);
        let values: Vec<String> = p
            .complete(&ParsedLine::new("2"))
            .into_iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, ["2", "20", "21", "22", "23"]);
    }

    #[test]
    fn unbounded_or_huge_int_gives_hint() {
        let unbounded = IntParser::new(Some(0), None, 20);
        assert_eq!(
            unbounded.complete(&ParsedLine::new("")),
            [Candidate::hint("integer")]
        );
        let huge = IntParser::new(Some(i64::MIN), Some(i64::MAX), 20);
        assert!(huge.complete(&ParsedLine::new(""))[0].hint);
    }

    #[test]
    fn double_rejects_non_finite() {
        let p = DoubleParser::new(None, Some(1.5));
        assert_eq!(parse(&p, "0.5"), Ok(Value::Double(0.5)));
        assert_eq!(parse(&p, "2"), Err(ErrorKind::too_big("2", 1.5)));
        assert!(matches!(
            parse(&p, "NaN"),
            Err(ErrorKind::InvalidFormat { .. })
        ));
    }
}
