use std::collections::BTreeMap;

use argtree_diagnostics::Span;

use super::ast::{Term, TermKind};
use super::lexer::{TokKind, Token, tokenize};
use crate::error::GrammarError;

// ─── Public API ─────────────────────────────────────────────────────────────

/// Parse one grammar line into its terms.
///
/// ```
/// use argtree_core::grammar::{ast::TermKind, parser::parse_grammar};
///
/// let terms = parse_grammar("give @string(name=player) @int(min=1, default=1)").unwrap();
/// assert_eq!(terms.len(), 3);
/// assert!(matches!(terms[0].kind, TermKind::Literal { .. }));
/// ```
pub fn parse_grammar(input: &str) -> Result<Vec<Term>, GrammarError> {
    Parser::new(input).parse()
}

// ─── Parser Implementation ──────────────────────────────────────────────────

struct Parser<'a> {
    input: &'a str,
    toks: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            toks: tokenize(input),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.toks.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|t| t.kind == TokKind::Whitespace) {
            self.pos += 1;
        }
    }

    /// Offset of the next token, or end of input.
    fn offset(&self) -> usize {
        self.peek().map_or(self.input.len(), |t| t.start)
    }

    fn error<T>(&self, offset: usize, message: impl Into<String>) -> Result<T, GrammarError> {
        Err(GrammarError::Syntax {
            message: message.into(),
            offset,
        })
    }

    fn parse(mut self) -> Result<Vec<Term>, GrammarError> {
        let mut terms = Vec::new();
        loop {
            self.skip_ws();
            let Some(tok) = self.peek() else { break };
            let term = match tok.kind {
                TokKind::At => self.parser_term()?,
                TokKind::Word => self.literal_term()?,
                _ => return self.error(tok.start, format!("unexpected '{}'", tok.text)),
            };
            terms.push(term);
            if let Some(next) = self.peek().filter(|t| t.kind != TokKind::Whitespace) {
                return self.error(next.start, "expected whitespace between terms");
            }
        }
        Ok(terms)
    }

    fn literal_term(&mut self) -> Result<Term, GrammarError> {
        let Some(tok) = self.bump() else {
            return self.error(self.input.len(), "expected a term");
        };
        let options: Vec<String> = tok.text.split('|').map(str::to_string).collect();
        if options.iter().any(String::is_empty) {
            return self.error(tok.start, "empty literal alternative");
        }
        Ok(Term {
            kind: TermKind::Literal { options },
            span: Span::new(tok.start, tok.end),
        })
    }

    fn parser_term(&mut self) -> Result<Term, GrammarError> {
        let start = self.offset();
        self.pos += 1; // '@'
        let name = match self.peek() {
            Some(t) if t.kind == TokKind::Word && is_ident(t.text) => {
                self.pos += 1;
                t.text.to_string()
            }
            _ => return self.error(self.offset(), "expected a parser name after '@'"),
        };
        let mut params = BTreeMap::new();
        let mut end = self.toks[self.pos - 1].end;
        if self.peek().is_some_and(|t| t.kind == TokKind::LParen) {
            end = self.params(&mut params)?;
        }
        Ok(Term {
            kind: TermKind::Parser { name, params },
            span: Span::new(start, end),
        })
    }

    /// Parse `(key=value, ...)`; returns the offset after `)`.
    fn params(&mut self, params: &mut BTreeMap<String, String>) -> Result<usize, GrammarError> {
        let open = self.offset();
        self.pos += 1; // '('
        self.skip_ws();
        if let Some(close) = self.peek().filter(|t| t.kind == TokKind::RParen) {
            self.pos += 1;
            return Ok(close.end);
        }
        loop {
            self.skip_ws();
            let key = match self.bump() {
                Some(t) if t.kind == TokKind::Word => t,
                Some(t) => return self.error(t.start, "expected a parameter name"),
                None => return self.error(open, "unclosed '('"),
            };
            self.skip_ws();
            let value = if self.peek().is_some_and(|t| t.kind == TokKind::Eq) {
                self.pos += 1;
                self.skip_ws();
                self.value()?
            } else {
                "true".to_string()
            };
            if params.insert(key.text.to_string(), value).is_some() {
                return self.error(key.start, format!("parameter '{}' given twice", key.text));
            }
            self.skip_ws();
            match self.bump() {
                Some(t) if t.kind == TokKind::Comma => continue,
                Some(t) if t.kind == TokKind::RParen => return Ok(t.end),
                Some(t) => return self.error(t.start, "expected ',' or ')'"),
                None => return self.error(open, "unclosed '('"),
            }
        }
    }

    fn value(&mut self) -> Result<String, GrammarError> {
        match self.bump() {
            Some(t) if t.kind == TokKind::Word => Ok(t.text.to_string()),
            Some(t) if t.kind == TokKind::Quoted => unquote(t),
            Some(t) => self.error(t.start, "expected a parameter value"),
            None => self.error(self.input.len(), "expected a parameter value"),
        }
    }
}

fn is_ident(text: &str) -> bool {
    text.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Strip the quotes of a [`TokKind::Quoted`] token and resolve escapes.
fn unquote(tok: Token<'_>) -> Result<String, GrammarError> {
    let mut chars = tok.text.chars();
    let quote = chars.next();
    let mut out = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c if Some(c) == quote => return Ok(out),
            c => out.push(c),
        }
    }
    Err(GrammarError::Syntax {
        message: "unterminated quoted value".to_string(),
        offset: tok.start,
    })
}
