//! Per-branch parse state and the view handed to handlers.

use std::fmt;

use crate::line::ParsedLine;
use crate::node::ArgNode;
use crate::value::{ArgOrigin, ParsedArg, Value};

/// Index of a switch in its tree's switch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct SwitchId(pub(crate) usize);

#[derive(Debug, Clone)]
enum Slot {
    Arg(ParsedArg),
    /// Placeholder for a switch whose declaration was reached; resolved to
    /// its matched value or default when the branch finishes.
    Switch(SwitchId),
}

/// State of one parse branch: the caller's data, a line with its own cursor,
/// the results so far, and the branch weight.
///
/// Cloned at every branch point, so siblings never see each other's results.
pub struct ParseContext<'a, D> {
    data: &'a D,
    line: ParsedLine,
    slots: Vec<Slot>,
    matched: Vec<(SwitchId, Value)>,
    weight: u32,
    anchor: usize,
}

impl<'a, D> ParseContext<'a, D> {
    /// A fresh context at weight 0.
    pub fn new(line: ParsedLine, data: &'a D) -> Self {
        let anchor = line.position();
        Self {
            data,
            line,
            slots: Vec::new(),
            matched: Vec::new(),
            weight: 0,
            anchor,
        }
    }

    /// The caller's opaque data.
    pub fn data(&self) -> &'a D {
        self.data
    }

    /// The line, positioned after everything this branch consumed.
    pub fn line(&self) -> &ParsedLine {
        &self.line
    }

    pub(crate) fn line_mut(&mut self) -> &mut ParsedLine {
        &mut self.line
    }

    /// Number of grammar units consumed so far.
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Word index at which the weight was last increased.
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    fn bump(&mut self) {
        self.weight += 1;
        self.anchor = self.line.position();
    }

    /// Record a value consumed from input.
    pub(crate) fn push_input(&mut self, node: &ArgNode, value: Value) {
        self.slots.push(Slot::Arg(arg(node, value, ArgOrigin::Input)));
        self.bump();
    }

    /// Record an omitted optional argument. Does not add weight.
    pub(crate) fn push_default(&mut self, node: &ArgNode) {
        self.slots
            .push(Slot::Arg(arg(node, node.default_value(), ArgOrigin::Default)));
    }

    /// Reserve the result position of a switch whose declaration was reached.
    pub(crate) fn declare_switch(&mut self, id: SwitchId) {
        if !self
            .slots
            .iter()
            .any(|slot| matches!(slot, Slot::Switch(s) if *s == id))
        {
            self.slots.push(Slot::Switch(id));
        }
    }

    pub(crate) fn is_matched(&self, id: SwitchId) -> bool {
        self.matched.iter().any(|(m, _)| *m == id)
    }

    /// A switch matched earlier on this branch that was never declared on
    /// it and is not among `reachable`, i.e. one owned by another command.
    pub(crate) fn stray_switch(&self, reachable: &[SwitchId]) -> Option<SwitchId> {
        self.matched
            .iter()
            .map(|(id, _)| *id)
            .find(|id| !reachable.contains(id) && !self.declared().any(|d| d == *id))
    }

    pub(crate) fn match_switch(&mut self, id: SwitchId, value: Value) {
        self.matched.push((id, value));
        self.bump();
    }

    /// Usage fragments of declared required switches that were never matched.
    pub(crate) fn missing_switches(&self, table: &[ArgNode]) -> Vec<String> {
        self.declared()
            .filter(|id| !self.is_matched(*id))
            .map(|id| &table[id.0])
            .filter(|node| node.is_required_switch())
            .map(ArgNode::usage)
            .collect()
    }

    fn declared(&self) -> impl Iterator<Item = SwitchId> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Switch(id) => Some(*id),
            Slot::Arg(_) => None,
        })
    }

    /// Resolve every slot into the final argument list.
    pub(crate) fn resolve(&self, table: &[ArgNode]) -> Vec<ParsedArg> {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Arg(arg) => arg.clone(),
                Slot::Switch(id) => {
                    let node = &table[id.0];
                    match self.matched.iter().find(|(m, _)| m == id) {
                        Some((_, value)) => arg(node, value.clone(), ArgOrigin::Switch),
                        None => arg(node, node.default_value(), ArgOrigin::Default),
                    }
                }
            })
            .collect()
    }

    pub(crate) fn into_line(self) -> ParsedLine {
        self.line
    }
}

fn arg(node: &ArgNode, value: Value, origin: ArgOrigin) -> ParsedArg {
    ParsedArg {
        name: node.name().to_string(),
        value,
        suppressed: node.is_suppressed(),
        origin,
    }
}

impl<D> Clone for ParseContext<'_, D> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            line: self.line.clone(),
            slots: self.slots.clone(),
            matched: self.matched.clone(),
            weight: self.weight,
            anchor: self.anchor,
        }
    }
}

impl<D> fmt::Debug for ParseContext<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseContext")
            .field("line", &self.line)
            .field("slots", &self.slots)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

// ─── Invocation ─────────────────────────────────────────────────────────────

/// What a handler sees: the caller's data, the resolved arguments of the
/// winning path, and the line with any unconsumed remainder.
pub struct Invocation<'a, D> {
    data: &'a D,
    args: Vec<ParsedArg>,
    line: ParsedLine,
}

impl<'a, D> Invocation<'a, D> {
    pub(crate) fn new(data: &'a D, args: Vec<ParsedArg>, line: ParsedLine) -> Self {
        Self { data, args, line }
    }

    /// The caller's opaque data.
    pub fn data(&self) -> &'a D {
        self.data
    }

    /// Arguments not marked `suppress`, in path order.
    pub fn args(&self) -> impl Iterator<Item = &ParsedArg> {
        self.args.iter().filter(|a| !a.suppressed)
    }

    /// Every argument, suppressed literals included.
    pub fn all_args(&self) -> &[ParsedArg] {
        &self.args
    }

    /// Value of the first argument named `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    /// [`Invocation::get`] as text.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// [`Invocation::get`] as an integer.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// [`Invocation::get`] as a number.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// [`Invocation::get`] as a boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// The full line.
    pub fn line(&self) -> &ParsedLine {
        &self.line
    }

    /// Words the matched path did not consume (what a fallback handles).
    pub fn remaining_line(&self) -> String {
        self.line.remaining_line()
    }
}

impl<D> fmt::Debug for Invocation<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("args", &self.args)
            .field("line", &self.line)
            .finish_non_exhaustive()
    }
}
