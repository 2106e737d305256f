//! JSONC preprocessing for hand-edited argtree files.
//!
//! Command-set files and the diagnostics catalog are written as JSON with
//! comments. [`strip_jsonc`] turns them into plain JSON that `serde_json`
//! accepts:
//! - `//` line comments and `/* ... */` block comments are removed
//! - a trailing comma before `}` or `]` is dropped
//! - string literals (including escapes) pass through untouched

/// Lexical state while scanning JSONC input.
#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Str,
    LineComment,
    BlockComment,
}

/// Strip comments and trailing commas from JSONC input.
///
/// Newlines inside line comments are kept so line numbers reported by
/// `serde_json` still point at the original source.
#[must_use]
pub fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut state = State::Code;
    // Byte index in `out` of a comma that may turn out to be trailing.
    let mut pending_comma: Option<usize> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Str => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == '"' {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    out.push(c);
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                '"' => {
                    pending_comma = None;
                    out.push(c);
                    state = State::Str;
                }
                ',' => {
                    pending_comma = Some(out.len());
                    out.push(c);
                }
                '}' | ']' => {
                    if let Some(at) = pending_comma.take() {
                        out.replace_range(at..=at, " ");
                    }
                    out.push(c);
                }
                c if c.is_whitespace() => out.push(c),
                _ => {
                    pending_comma = None;
                    out.push(c);
                }
            },
        }
    }
    out
}
