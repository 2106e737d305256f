//! String-in driver: tokenizes input, expands aliases, and hands the line to
//! a [`ParserTree`].

use std::collections::BTreeMap;

use tracing::debug;

use crate::completion::{Candidate, CandidateGroup, Completions};
use crate::error::InvocationError;
use crate::line::ParsedLine;
use crate::tree::{ParseOutcome, ParserTree};

/// A tree plus an alias table.
///
/// An alias is a first word that stands for one or more other words
/// (`tp` → `teleport`). The alias is consumed and its expansion spliced in
/// at the cursor before the tree sees the line.
pub struct Engine<D, R> {
    tree: ParserTree<D, R>,
    aliases: BTreeMap<String, String>,
}

impl<D, R> Engine<D, R> {
    /// Wrap `tree` with an empty alias table.
    pub fn new(tree: ParserTree<D, R>) -> Self {
        Self {
            tree,
            aliases: BTreeMap::new(),
        }
    }

    /// Builder-style [`Engine::add_alias`].
    pub fn with_alias(mut self, alias: impl Into<String>, expansion: impl Into<String>) -> Self {
        self.add_alias(alias, expansion);
        self
    }

    /// Make `alias` stand for `expansion`. Aliases match case-insensitively.
    pub fn add_alias(&mut self, alias: impl Into<String>, expansion: impl Into<String>) {
        self.aliases
            .insert(alias.into().to_ascii_lowercase(), expansion.into());
    }

    /// The alias table (keys lowercased).
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// The wrapped tree.
    pub fn tree(&self) -> &ParserTree<D, R> {
        &self.tree
    }

    /// Tokenize `input` with the configured display prefix.
    pub fn line(&self, input: &str) -> ParsedLine {
        ParsedLine::new(input).with_prefix(self.tree.config().line_prefix.as_str())
    }

    /// Parse `input`. Nothing runs until [`ParseOutcome::invoke`].
    pub fn parse<'t, 'a>(&'t self, input: &str, data: &'a D) -> ParseOutcome<'t, 'a, D, R> {
        let mut line = self.line(input);
        self.expand_alias(&mut line);
        self.tree.parse(line, data)
    }

    /// Parse `input` and run the selected handler.
    pub fn execute(&self, input: &str, data: &D) -> Result<R, InvocationError> {
        self.parse(input, data).invoke()
    }

    /// Completion candidates for the last word of `input`.
    ///
    /// While the first word is still being typed, matching aliases are
    /// offered alongside the root commands.
    pub fn complete(&self, input: &str, data: &D) -> Completions {
        let mut line = self.line(input);
        if line.remaining() > 1 {
            self.expand_alias(&mut line);
            return self.tree.complete(line, data);
        }
        let partial = line.current_word().to_string();
        let mut completions = self.tree.complete(line, data);
        let aliases: Vec<Candidate> = self
            .aliases
            .iter()
            .map(|(alias, expansion)| {
                Candidate::new(alias.as_str()).with_description(expansion.as_str())
            })
            .filter(|c| c.starts_with(&partial))
            .collect();
        if !aliases.is_empty() && completions.weight.unwrap_or(0) == 0 {
            completions.weight = Some(0);
            completions.groups.push(CandidateGroup {
                title: "aliases".to_string(),
                description: None,
                partial,
                candidates: aliases,
            });
        }
        completions
    }

    fn expand_alias(&self, line: &mut ParsedLine) {
        let Some(expansion) = self.aliases.get(&line.current_word().to_ascii_lowercase()) else {
            return;
        };
        debug!(alias = line.current_word(), %expansion, "expanding alias");
        let _ = line.next();
        line.insert(expansion);
    }
}

impl<D, R> From<ParserTree<D, R>> for Engine<D, R> {
    fn from(tree: ParserTree<D, R>) -> Self {
        Self::new(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TreeBuilder;

    fn engine() -> Engine<(), String> {
        let mut b = TreeBuilder::<(), String>::new();
        b.command("teleport @string(name=target)")
            .unwrap()
            .executes(|inv| format!("tp {}", inv.get_str("target").unwrap_or("?")));
        b.command("time set @int(name=ticks)")
            .unwrap()
            .executes(|inv| format!("time {}", inv.get_i64("ticks").unwrap_or(0)));
        Engine::new(b.build())
            .with_alias("tp", "teleport")
            .with_alias("day", "time set 1000")
    }

    #[test]
    fn alias_expands_first_word() {
        let e = engine();
        assert_eq!(e.execute("TP bob", &()).unwrap(), "tp bob");
        assert_eq!(e.execute("day", &()).unwrap(), "time 1000");
    }

    #[test]
    fn alias_only_applies_to_first_word() {
        let e = engine();
        assert_eq!(e.execute("teleport tp", &()).unwrap(), "tp tp");
    }

    #[test]
    fn aliases_offered_while_typing_first_word() {
        let e = engine();
        let completions = e.complete("t", &());
        assert_eq!(completions.suggestions(), ["teleport", "time", "tp"]);
    }

    #[test]
    fn completion_continues_through_alias() {
        let e = engine();
        let completions = e.complete("tp ", &());
        assert_eq!(completions.weight, Some(1));
        assert_eq!(completions.groups[0].title, "<target>");
    }
}
