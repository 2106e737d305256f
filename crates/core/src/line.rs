//! Tokenized command line with a movable cursor.

use std::sync::Arc;

use argtree_diagnostics::Span;

/// Raised when a parser asks for a word past the end of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unexpected end of input")]
pub struct EndOfInput;

/// One whitespace-delimited word and the bytes of the raw line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Unquoted, unescaped word text.
    pub text: String,
    /// Source span (quotes included). Inserted words carry a zero-width span.
    pub span: Span,
}

/// A command line split into words, with a cursor over them.
///
/// Cloning is cheap: the backing words are shared and only copied when one
/// of the clones calls [`ParsedLine::insert`]. Each clone owns its cursor, so
/// a backtracking branch can consume words without affecting its siblings.
#[derive(Debug, Clone)]
pub struct ParsedLine {
    words: Arc<Vec<Word>>,
    cursor: usize,
    prefix: String,
    source_len: usize,
    /// The last word is the synthetic empty word produced by a trailing separator.
    partial_tail: bool,
}

impl ParsedLine {
    /// Tokenize `input` into a new line with the cursor on the first word.
    pub fn new(input: &str) -> Self {
        let (words, partial_tail) = tokenize(input);
        Self {
            words: Arc::new(words),
            cursor: 0,
            prefix: String::new(),
            source_len: input.len(),
            partial_tail,
        }
    }

    /// Set the display prefix shown before the line in error messages
    /// (e.g. `"/"` for chat commands).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Display prefix for error messages.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The word under the cursor, or `""` at end of input.
    pub fn current_word(&self) -> &str {
        self.words
            .get(self.cursor)
            .map(|w| w.text.as_str())
            .unwrap_or("")
    }

    /// Consume and return the word under the cursor.
    pub fn next(&mut self) -> Result<String, EndOfInput> {
        let word = self.words.get(self.cursor).ok_or(EndOfInput)?;
        self.cursor += 1;
        Ok(word.text.clone())
    }

    /// Consume every remaining word, joined by single spaces.
    pub fn take_rest(&mut self) -> Result<String, EndOfInput> {
        if self.is_eol() {
            return Err(EndOfInput);
        }
        let rest = self.remaining_line();
        self.cursor = self.words.len();
        Ok(rest)
    }

    /// Whether every word has been consumed.
    pub fn is_eol(&self) -> bool {
        self.cursor >= self.words.len()
    }

    /// Number of words not yet consumed.
    pub fn remaining(&self) -> usize {
        self.words.len().saturating_sub(self.cursor)
    }

    /// Total number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the line has no words at all.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Cursor index (number of consumed words).
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// All words in order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Splice the words of `text` in at the cursor.
    ///
    /// The inserted words are the next ones returned by [`ParsedLine::next`];
    /// the previously remaining words follow them. Other clones of this line
    /// are unaffected.
    pub fn insert(&mut self, text: &str) {
        let (mut inserted, _) = tokenize(text);
        if inserted.is_empty() {
            return;
        }
        let at = self.span_at(self.cursor).start;
        for word in &mut inserted {
            word.span = Span::empty(at);
        }
        let cursor = self.cursor;
        Arc::make_mut(&mut self.words).splice(cursor..cursor, inserted);
    }

    /// Drop the empty word produced by a trailing separator.
    ///
    /// Completion wants to see that word (the user is starting a new one);
    /// execution does not.
    pub fn drop_partial_word(&mut self) {
        if self.partial_tail {
            Arc::make_mut(&mut self.words).pop();
            self.partial_tail = false;
            self.cursor = self.cursor.min(self.words.len());
        }
    }

    /// All words joined by single spaces.
    pub fn line(&self) -> String {
        join(&self.words)
    }

    /// Consumed words joined by single spaces.
    pub fn consumed_line(&self) -> String {
        join(&self.words[..self.cursor.min(self.words.len())])
    }

    /// Unconsumed words joined by single spaces.
    pub fn remaining_line(&self) -> String {
        join(&self.words[self.cursor.min(self.words.len())..])
    }

    /// Source span of the word at `index`, or a zero-width span at the end
    /// of the input when `index` is past the last word.
    pub fn span_at(&self, index: usize) -> Span {
        self.words
            .get(index)
            .map(|w| w.span)
            .unwrap_or_else(|| Span::empty(self.source_len))
    }
}

fn join(words: &[Word]) -> String {
    words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A word being accumulated by the tokenizer.
struct Pending {
    text: String,
    start: usize,
}

/// Split `input` into words.
///
/// Whitespace separates words and runs of it collapse. `"…"` and `'…'` group
/// a span into one word (an empty quoted span is still a word); a backslash
/// escapes the next character inside or outside quotes. An unterminated
/// quote runs to the end of the input. A trailing separator after at least
/// one word produces a final empty word; the returned flag reports it.
fn tokenize(input: &str) -> (Vec<Word>, bool) {
    let mut words = Vec::new();
    let mut pending: Option<Pending> = None;
    let mut quote: Option<char> = None;
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            let word = pending.get_or_insert_with(|| Pending {
                text: String::new(),
                start: i,
            });
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => word.text.push(escaped),
                    None => word.text.push('\\'),
                },
                c if c == q => quote = None,
                c => word.text.push(c),
            }
            continue;
        }

        match c {
            c if c.is_whitespace() => {
                if let Some(word) = pending.take() {
                    words.push(Word {
                        text: word.text,
                        span: Span::new(word.start, i),
                    });
                }
            }
            '"' | '\'' => {
                pending.get_or_insert_with(|| Pending {
                    text: String::new(),
                    start: i,
                });
                quote = Some(c);
            }
            '\\' => {
                let word = pending.get_or_insert_with(|| Pending {
                    text: String::new(),
                    start: i,
                });
                match chars.next() {
                    Some((_, escaped)) => word.text.push(escaped),
                    None => word.text.push('\\'),
                }
            }
            c => pending
                .get_or_insert_with(|| Pending {
                    text: String::new(),
                    start: i,
                })
                .text
                .push(c),
        }
    }

    if let Some(word) = pending.take() {
        words.push(Word {
            text: word.text,
            span: Span::new(word.start, input.len()),
        });
        return (words, false);
    }

    let trailing_separator = input.chars().next_back().is_some_and(char::is_whitespace);
    if trailing_separator && !words.is_empty() {
        words.push(Word {
            text: String::new(),
            span: Span::empty(input.len()),
        });
        return (words, true);
    }
    (words, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &ParsedLine) -> Vec<&str> {
        line.words().iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn empty_input_has_no_words() {
        let line = ParsedLine::new("");
        assert!(line.is_empty());
        assert!(line.is_eol());
        assert_eq!(line.current_word(), "");
    }

    #[test]
    fn whitespace_only_input_has_no_words() {
        assert!(ParsedLine::new("   ").is_empty());
    }

    #[test]
    fn repeated_whitespace_collapses() {
        assert_eq!(texts(&ParsedLine::new("a  b")), ["a", "b"]);
    }

    #[test]
    fn trailing_separator_yields_empty_word() {
        assert_eq!(texts(&ParsedLine::new("word ")), ["word", ""]);
        let line = ParsedLine::new("  a   b ");
        assert_eq!(texts(&line), ["a", "b", ""]);
        assert_eq!(line.line(), "a b ");
    }

    #[test]
    fn quoted_spans_form_one_word() {
        let line = ParsedLine::new(r#"say "hello world" 'it''s'"#);
        assert_eq!(texts(&line), ["say", "hello world", "its"]);
    }

    #[test]
    fn empty_quotes_are_a_word() {
        assert_eq!(texts(&ParsedLine::new(r#"a "" b"#)), ["a", "", "b"]);
    }

    #[test]
    fn backslash_escapes() {
        let line = ParsedLine::new(r#"a\ b "q\"x" c\"#);
        assert_eq!(texts(&line), ["a b", "q\"x", "c\\"]);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        let line = ParsedLine::new(r#"say "hello wor"#);
        assert_eq!(texts(&line), ["say", "hello wor"]);
        let line = ParsedLine::new(r#"say "hello "#);
        assert_eq!(texts(&line), ["say", "hello "]);
    }

    #[test]
    fn spans_cover_source_bytes() {
        let line = ParsedLine::new(r#"go "to x""#);
        assert_eq!(line.span_at(0), Span::new(0, 2));
        assert_eq!(line.span_at(1), Span::new(3, 9));
        assert_eq!(line.span_at(2), Span::empty(9));
    }

    #[test]
    fn next_past_end_is_end_of_input() {
        let mut line = ParsedLine::new("a");
        assert_eq!(line.next(), Ok("a".to_string()));
        assert_eq!(line.next(), Err(EndOfInput));
        assert_eq!(line.position(), 1);
    }

    #[test]
    fn insert_splices_at_cursor() {
        let mut line = ParsedLine::new("a b c");
        assert_eq!(line.next().unwrap(), "a");
        line.insert("x y");
        let mut drained = Vec::new();
        while let Ok(word) = line.next() {
            drained.push(word);
        }
        assert_eq!(drained, ["x", "y", "b", "c"]);
        assert_eq!(line.next(), Err(EndOfInput));
    }

    #[test]
    fn insert_does_not_leak_into_clones() {
        let mut line = ParsedLine::new("a b");
        let snapshot = line.clone();
        line.insert("z");
        assert_eq!(line.line(), "z a b");
        assert_eq!(snapshot.line(), "a b");
    }

    #[test]
    fn clones_have_independent_cursors() {
        let mut line = ParsedLine::new("a b");
        let mut fork = line.clone();
        fork.next().unwrap();
        assert_eq!(line.current_word(), "a");
        assert_eq!(fork.current_word(), "b");
        line.next().unwrap();
        line.next().unwrap();
        assert_eq!(fork.remaining(), 1);
    }

    #[test]
    fn take_rest_joins_remaining_words() {
        let mut line = ParsedLine::new("msg bob hi  there");
        line.next().unwrap();
        line.next().unwrap();
        assert_eq!(line.take_rest().unwrap(), "hi there");
        assert!(line.is_eol());
        assert_eq!(line.take_rest(), Err(EndOfInput));
    }

    #[test]
    fn drop_partial_word_only_removes_synthetic_tail() {
        let mut line = ParsedLine::new("a ");
        line.drop_partial_word();
        assert_eq!(texts(&line), ["a"]);

        let mut quoted = ParsedLine::new(r#"a """#);
        quoted.drop_partial_word();
        assert_eq!(texts(&quoted), ["a", ""]);
    }

    #[test]
    fn consumed_and_remaining_lines() {
        let mut line = ParsedLine::new("give bob 5").with_prefix("/");
        line.next().unwrap();
        assert_eq!(line.consumed_line(), "give");
        assert_eq!(line.remaining_line(), "bob 5");
        assert_eq!(line.prefix(), "/");
    }
}
