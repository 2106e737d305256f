/// Classification of a grammar lexer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// `@` opening a parser term.
    At,
    /// `(` opening a parameter list.
    LParen,
    /// `)` closing a parameter list.
    RParen,
    /// `,` between parameters.
    Comma,
    /// `=` between a parameter key and its value.
    Eq,
    /// A run of characters with no special meaning at this position.
    Word,
    /// A `"…"` or `'…'` parameter value, quotes included.
    Quoted,
    /// One or more whitespace characters.
    Whitespace,
}

/// A token that borrows its text directly from the grammar source.
///
/// `text` is always exactly `&input[start..end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokKind,
    /// Borrowed slice of the source for this token.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Tokenize grammar text into borrowed tokens.
///
/// Outside a parameter list only whitespace, a leading `@`, and `(` are
/// special, so literals may contain `=`, `,` or `@` after their first byte.
/// Inside a parameter list `,`, `=`, `)`, and quotes are special too. An
/// unterminated quote yields a [`TokKind::Quoted`] token without its closing
/// quote; the parser reports it.
///
/// All special characters are ASCII, and UTF-8 continuation bytes never
/// match them, so scanning bytes is safe.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut toks = Vec::new();
    let b = input.as_bytes();
    let mut i = 0usize;
    let mut depth = 0usize;

    let token = |kind: TokKind, start: usize, end: usize| Token {
        kind,
        text: &input[start..end],
        start,
        end,
    };

    while i < b.len() {
        let start = i;
        let c = b[i];
        if c.is_ascii_whitespace() {
            while i < b.len() && b[i].is_ascii_whitespace() {
                i += 1;
            }
            toks.push(token(TokKind::Whitespace, start, i));
            continue;
        }
        let single = match c {
            b'@' => Some(TokKind::At),
            b'(' => Some(TokKind::LParen),
            b')' if depth > 0 => Some(TokKind::RParen),
            b',' if depth > 0 => Some(TokKind::Comma),
            b'=' if depth > 0 => Some(TokKind::Eq),
            _ => None,
        };
        if let Some(kind) = single {
            match kind {
                TokKind::LParen => depth += 1,
                TokKind::RParen => depth -= 1,
                _ => {}
            }
            i += 1;
            toks.push(token(kind, start, i));
            continue;
        }
        if depth > 0 && (c == b'"' || c == b'\'') {
            i += 1;
            while i < b.len() && b[i] != c {
                if b[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(b.len());
            toks.push(token(TokKind::Quoted, start, i));
            continue;
        }
        while i < b.len() && !ends_word(b[i], depth) {
            i += 1;
        }
        toks.push(token(TokKind::Word, start, i));
    }
    toks
}

fn ends_word(c: u8, depth: usize) -> bool {
    if c.is_ascii_whitespace() || c == b'(' {
        return true;
    }
    depth > 0 && matches!(c, b')' | b',' | b'=' | b'"' | b'\'')
}
