//! Parse errors, heaviest-wins aggregation, and construction errors.
//!
//! Per-parse failures are plain data ([`ErrorKind`]) collected by an
//! [`ErrorCollector`] shared across every branch of one parse. Only errors at
//! the greatest weight survive: the deepest competing interpretations are
//! the ones closest to what the user meant. Errors of the same kind at that
//! weight merge so the final message lists each alternative once.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use argtree_diagnostics::{Diagnostic, Span, codes};

use crate::line::{EndOfInput, ParsedLine};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

// ─── Per-parse errors ───────────────────────────────────────────────────────

/// What went wrong while matching input, with the data needed to merge
/// equal-weight errors of the same kind.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Input ended where an argument was required.
    InputExpected {
        /// Usage fragments of the arguments that could have come next.
        expected: BTreeSet<String>,
    },
    /// A required switch was never supplied.
    MissingRequired {
        /// Names of the missing switches.
        names: BTreeSet<String>,
    },
    /// A word was rejected by every parser that could consume it.
    InvalidFormat {
        /// The rejected word.
        input: String,
        /// Accepted formats (`integer`, literal alternatives, ...).
        expected: BTreeSet<String>,
    },
    /// A number above the argument's `max`.
    NumberTooBig {
        /// The rejected word.
        input: String,
        /// Largest permitted value.
        limit: Bound,
    },
    /// A number below the argument's `min`.
    NumberTooSmall {
        /// The rejected word.
        input: String,
        /// Smallest permitted value.
        limit: Bound,
    },
    /// A guard denied access to a command path.
    InsufficientPermission {
        /// Permission names reported by the guards.
        permissions: BTreeSet<String>,
    },
    /// Words remained after a complete command.
    TooManyArguments {
        /// The first leftover word.
        input: String,
    },
    /// An application parser rejected the word with its own message.
    Rejected {
        /// Messages reported by the parsers.
        messages: BTreeSet<String>,
    },
}

impl ErrorKind {
    /// Input ended where `expected` was required.
    pub fn input_expected(expected: impl Into<String>) -> Self {
        ErrorKind::InputExpected {
            expected: BTreeSet::from([expected.into()]),
        }
    }

    /// The switch `name` was required but not supplied.
    pub fn missing_required(name: impl Into<String>) -> Self {
        ErrorKind::MissingRequired {
            names: BTreeSet::from([name.into()]),
        }
    }

    /// `input` is not a valid `expected`.
    pub fn invalid_format(input: impl Into<String>, expected: impl Into<String>) -> Self {
        ErrorKind::InvalidFormat {
            input: input.into(),
            expected: BTreeSet::from([expected.into()]),
        }
    }

    /// `input` exceeds `limit`.
    pub fn too_big(input: impl Into<String>, limit: impl Into<Bound>) -> Self {
        ErrorKind::NumberTooBig {
            input: input.into(),
            limit: limit.into(),
        }
    }

    /// `input` is below `limit`.
    pub fn too_small(input: impl Into<String>, limit: impl Into<Bound>) -> Self {
        ErrorKind::NumberTooSmall {
            input: input.into(),
            limit: limit.into(),
        }
    }

    /// The caller lacks `permission`.
    pub fn insufficient_permission(permission: impl Into<String>) -> Self {
        ErrorKind::InsufficientPermission {
            permissions: BTreeSet::from([permission.into()]),
        }
    }

    /// `input` was left over after a complete command.
    pub fn too_many_arguments(input: impl Into<String>) -> Self {
        ErrorKind::TooManyArguments {
            input: input.into(),
        }
    }

    /// A custom parser rejection.
    pub fn rejected(message: impl Into<String>) -> Self {
        ErrorKind::Rejected {
            messages: BTreeSet::from([message.into()]),
        }
    }

    /// Stable diagnostic code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InputExpected { .. } => codes::INPUT_EXPECTED,
            ErrorKind::MissingRequired { .. } => codes::MISSING_REQUIRED,
            ErrorKind::InvalidFormat { .. } => codes::INVALID_FORMAT,
            ErrorKind::NumberTooBig { .. } => codes::NUMBER_TOO_BIG,
            ErrorKind::NumberTooSmall { .. } => codes::NUMBER_TOO_SMALL,
            ErrorKind::InsufficientPermission { .. } => codes::INSUFFICIENT_PERMISSION,
            ErrorKind::TooManyArguments { .. } => codes::TOO_MANY_ARGUMENTS,
            ErrorKind::Rejected { .. } => codes::PARSER_REJECTED,
        }
    }

    /// Fold `other` into `self` when both are the same kind.
    ///
    /// Returns `other` unchanged when the kinds differ.
    pub fn merge(&mut self, other: ErrorKind) -> Result<(), ErrorKind> {
        match (self, other) {
            (
                ErrorKind::InputExpected { expected },
                ErrorKind::InputExpected { expected: more },
            ) => expected.extend(more),
            (ErrorKind::MissingRequired { names }, ErrorKind::MissingRequired { names: more }) => {
                names.extend(more)
            }
            (
                ErrorKind::InvalidFormat { expected, .. },
                ErrorKind::InvalidFormat { expected: more, .. },
            ) => expected.extend(more),
            (ErrorKind::NumberTooBig { limit, .. }, ErrorKind::NumberTooBig { limit: other, .. }) => {
                if other.exceeds(*limit) {
                    *limit = other;
                }
            }
            (
                ErrorKind::NumberTooSmall { limit, .. },
                ErrorKind::NumberTooSmall { limit: other, .. },
            ) => {
                if limit.exceeds(other) {
                    *limit = other;
                }
            }
            (
                ErrorKind::InsufficientPermission { permissions },
                ErrorKind::InsufficientPermission { permissions: more },
            ) => permissions.extend(more),
            (ErrorKind::TooManyArguments { .. }, ErrorKind::TooManyArguments { .. }) => {}
            (ErrorKind::Rejected { messages }, ErrorKind::Rejected { messages: more }) => {
                messages.extend(more)
            }
            (_, other) => return Err(other),
        }
        Ok(())
    }

    fn context(&self) -> BTreeMap<String, String> {
        match self {
            ErrorKind::InputExpected { expected } => ctx!("expected" => join(expected, ", ")),
            ErrorKind::MissingRequired { names } => ctx!("missing" => join(names, ", ")),
            ErrorKind::InvalidFormat { input, expected } => {
                ctx!("input" => input.as_str(), "expected" => join(expected, ", "))
            }
            ErrorKind::NumberTooBig { input, limit } | ErrorKind::NumberTooSmall { input, limit } => {
                ctx!("input" => input.as_str(), "limit" => limit.to_string())
            }
            ErrorKind::InsufficientPermission { permissions } => {
                ctx!("permissions" => join(permissions, ", "))
            }
            ErrorKind::TooManyArguments { input } => ctx!("input" => input.as_str()),
            ErrorKind::Rejected { messages } => ctx!("messages" => join(messages, "; ")),
        }
    }
}

impl From<EndOfInput> for ErrorKind {
    fn from(_: EndOfInput) -> Self {
        ErrorKind::InputExpected {
            expected: BTreeSet::new(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InputExpected { expected } => match expected.len() {
                0 => f.write_str("expected more input"),
                1 => write!(f, "expected {}", join(expected, "")),
                _ => write!(f, "expected one of {}", join(expected, ", ")),
            },
            ErrorKind::MissingRequired { names } => {
                write!(f, "missing required {}", join(names, ", "))
            }
            ErrorKind::InvalidFormat { input, expected } => {
                write!(f, "invalid input '{input}', expected {}", join(expected, ", "))
            }
            ErrorKind::NumberTooBig { input, limit } => {
                write!(f, "number {input} is too big (max {limit})")
            }
            ErrorKind::NumberTooSmall { input, limit } => {
                write!(f, "number {input} is too small (min {limit})")
            }
            ErrorKind::InsufficientPermission { permissions } => {
                write!(f, "insufficient permission ({})", join(permissions, ", "))
            }
            ErrorKind::TooManyArguments { input } => write!(f, "too many arguments at '{input}'"),
            ErrorKind::Rejected { messages } => f.write_str(&join(messages, "; ")),
        }
    }
}

fn join(items: &BTreeSet<String>, sep: &str) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(sep)
}

/// A numeric limit in the type of the parser that declared it, so integer
/// bounds beyond `f64` precision print exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Limit of an `@int`.
    Int(i64),
    /// Limit of an `@double`.
    Double(f64),
}

impl Bound {
    /// Whether `self` is strictly greater than `other`.
    fn exceeds(self, other: Bound) -> bool {
        match (self, other) {
            (Bound::Int(a), Bound::Int(b)) => a > b,
            _ => self.as_f64() > other.as_f64(),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Bound::Int(n) => n as f64,
            Bound::Double(n) => n,
        }
    }
}

impl From<i64> for Bound {
    fn from(n: i64) -> Self {
        Bound::Int(n)
    }
}

impl From<f64> for Bound {
    fn from(n: f64) -> Self {
        Bound::Double(n)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Int(n) => write!(f, "{n}"),
            Bound::Double(n) => f.write_str(&fmt_number(*n)),
        }
    }
}

/// Render a bound without a trailing `.0` for whole numbers.
pub(crate) fn fmt_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// A recorded error with the weight and position it occurred at.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Weight of the parse path when the error was recorded.
    pub weight: u32,
    /// Word index the error occurred at.
    pub position: usize,
    /// Source span of that word (zero-width at end of input).
    pub span: Span,
}

impl ParseError {
    /// Convert to a structured [`Diagnostic`].
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::from_code(self.kind.code(), self.kind.to_string(), Some(self.span))
            .with_context(self.kind.context())
    }
}

// ─── Heaviest-wins collector ────────────────────────────────────────────────

/// Accumulates errors across all branches of one parse, keeping only the
/// heaviest.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    weight: Option<u32>,
    errors: Vec<ParseError>,
    anchor: String,
}

impl ErrorCollector {
    /// An empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `kind` at `weight`.
    ///
    /// `line` supplies the error position (its cursor) and `anchor` is the
    /// word index where the path's weight was last increased, used for
    /// display.
    pub fn record(&mut self, kind: ErrorKind, weight: u32, line: &ParsedLine, anchor: usize) {
        let error = ParseError {
            kind,
            weight,
            position: line.position(),
            span: line.span_at(line.position()),
        };
        match self.weight {
            Some(current) if weight < current => {
                tracing::trace!(weight, current, "discarding lighter error");
            }
            Some(current) if weight == current => self.merge(error),
            _ => {
                tracing::trace!(weight, kind = %error.kind, "new heaviest error");
                self.weight = Some(weight);
                self.errors.clear();
                self.errors.push(error);
                self.anchor = anchor_text(line, anchor);
            }
        }
    }

    fn merge(&mut self, error: ParseError) {
        let ParseError {
            kind,
            weight,
            position,
            span,
        } = error;
        let mut pending = Some(kind);
        for existing in &mut self.errors {
            let Some(kind) = pending.take() else { break };
            if let Err(unmerged) = existing.kind.merge(kind) {
                pending = Some(unmerged);
            }
        }
        if let Some(kind) = pending {
            self.errors.push(ParseError {
                kind,
                weight,
                position,
                span,
            });
        }
    }

    /// Weight of the stored errors, if any were recorded.
    pub fn weight(&self) -> Option<u32> {
        self.weight
    }

    /// The stored errors, in first-recorded order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Whether no error has been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Freeze into a report that renders messages joined by `joiner`.
    pub fn into_report(self, joiner: &str) -> ErrorReport {
        ErrorReport {
            weight: self.weight,
            errors: self.errors,
            anchor: self.anchor,
            joiner: joiner.to_string(),
        }
    }
}

fn anchor_text(line: &ParsedLine, anchor: usize) -> String {
    let words = &line.words()[..anchor.min(line.len())];
    let consumed = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}{}", line.prefix(), consumed)
}

/// The merged errors of a finished parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorReport {
    weight: Option<u32>,
    errors: Vec<ParseError>,
    anchor: String,
    joiner: String,
}

impl ErrorReport {
    /// Whether the parse recorded no errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Weight at which the surviving errors were recorded.
    pub fn weight(&self) -> Option<u32> {
        self.weight
    }

    /// Surviving errors.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Whether any surviving error has the given diagnostic code.
    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.kind.code() == code)
    }

    /// All error messages joined by the configured joiner (`" or "` by default).
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.kind.to_string())
            .collect::<Vec<_>>()
            .join(&self.joiner)
    }

    /// The input up to where the weight was last increased, followed by a
    /// marker: `/give bob<--[HERE]`.
    pub fn context_line(&self) -> String {
        format!("{}<--[HERE]", self.anchor)
    }

    /// Structured diagnostics, one per surviving error.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors.iter().map(ParseError::to_diagnostic).collect()
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

// ─── Construction errors ────────────────────────────────────────────────────

/// Fatal errors raised while compiling a grammar into a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GrammarError {
    /// `@name` does not name a registered parser.
    #[error("unknown parser '@{name}'")]
    UnknownParser {
        /// The unregistered name.
        name: String,
        /// Span of the term in the grammar text.
        span: Option<Span>,
    },

    /// The grammar text could not be parsed.
    #[error("grammar syntax error at byte {offset}: {message}")]
    Syntax {
        /// What was wrong.
        message: String,
        /// Byte offset in the grammar text.
        offset: usize,
    },

    /// A parameter value could not be interpreted.
    #[error("invalid parameter {key}={value:?} for @{parser}: {reason}")]
    InvalidParameter {
        /// Parser the parameter was given to.
        parser: String,
        /// Parameter name.
        key: String,
        /// Parameter value as written.
        value: String,
        /// Why it was rejected.
        reason: String,
        /// Span of the term in the grammar text.
        span: Option<Span>,
    },

    /// A `default` the argument's own parser rejects.
    #[error("default {value:?} rejected by @{parser}: {reason}")]
    InvalidDefault {
        /// Parser that rejected the default.
        parser: String,
        /// The default as written.
        value: String,
        /// The parser's error message.
        reason: String,
        /// Span of the term in the grammar text.
        span: Option<Span>,
    },

    /// Two switches of one command share a name.
    #[error("switch name '{name}' declared twice")]
    DuplicateSwitch {
        /// The duplicated name.
        name: String,
        /// Span of the second declaration.
        span: Option<Span>,
    },
}

impl GrammarError {
    /// Shorthand for an [`GrammarError::InvalidParameter`] without a span.
    pub fn invalid_parameter(
        parser: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GrammarError::InvalidParameter {
            parser: parser.into(),
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
            span: None,
        }
    }

    /// Attach the grammar span of the offending term, unless one is set.
    pub fn at(mut self, term_span: Span) -> Self {
        match &mut self {
            GrammarError::UnknownParser { span, .. }
            | GrammarError::InvalidParameter { span, .. }
            | GrammarError::InvalidDefault { span, .. }
            | GrammarError::DuplicateSwitch { span, .. } => {
                span.get_or_insert(term_span);
            }
            GrammarError::Syntax { .. } => {}
        }
        self
    }

    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            GrammarError::UnknownParser { .. } => codes::UNKNOWN_PARSER,
            GrammarError::Syntax { .. } => codes::GRAMMAR_SYNTAX,
            GrammarError::InvalidParameter { .. } => codes::INVALID_PARAMETER,
            GrammarError::InvalidDefault { .. } => codes::INVALID_DEFAULT,
            GrammarError::DuplicateSwitch { .. } => codes::DUPLICATE_SWITCH,
        }
    }

    /// Location in the grammar text, when known.
    pub fn span(&self) -> Option<Span> {
        match self {
            GrammarError::Syntax { offset, .. } => Some(Span::empty(*offset)),
            GrammarError::UnknownParser { span, .. }
            | GrammarError::InvalidParameter { span, .. }
            | GrammarError::InvalidDefault { span, .. }
            | GrammarError::DuplicateSwitch { span, .. } => *span,
        }
    }

    /// Convert to a structured [`Diagnostic`] against the grammar text.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::from_code(self.code(), self.to_string(), self.span())
    }
}

/// Returned by [`crate::ParseOutcome::invoke`] when nothing can be invoked.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum InvocationError {
    /// No execute, fallback, or error handler was reached.
    #[error("{message}")]
    Unmatched {
        /// The merged error message.
        message: String,
        /// The full report.
        report: ErrorReport,
    },
}
