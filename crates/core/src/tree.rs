//! The parser tree and its two traversals.
//!
//! Parsing walks every branch that could match, each on its own copy of the
//! [`ParseContext`], and keeps the terminal reached with the greatest weight
//! (one unit per consumed positional argument or switch). Earlier-declared
//! branches win ties. Completion walks the same tree but stops wherever the
//! input runs out and collects candidates there instead.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::completion::{Candidate, CandidateGroup, Completions, Frontier};
use crate::config::EngineConfig;
use crate::context::{Invocation, ParseContext, SwitchId};
use crate::error::{ErrorCollector, ErrorKind, ErrorReport, InvocationError};
use crate::line::ParsedLine;
use crate::node::ArgNode;
use crate::value::ParsedArg;

/// Runs a matched command.
pub type Handler<D, R> = Box<dyn Fn(&Invocation<'_, D>) -> R + Send + Sync>;

/// Runs when a subtree failed to match; receives the merged errors.
pub type ErrorHandler<D, R> = Box<dyn Fn(&Invocation<'_, D>, &ErrorReport) -> R + Send + Sync>;

/// Predicate over the caller's data that prunes a subtree when false.
pub(crate) struct Guard<D> {
    pub(crate) check: Box<dyn Fn(&D) -> bool + Send + Sync>,
    /// Reported as `insufficient-permission` when the check fails.
    pub(crate) permission: Option<String>,
}

pub(crate) struct TreeNode<D, R> {
    pub(crate) arg: Option<ArgNode>,
    pub(crate) own_switches: Vec<SwitchId>,
    /// Switches declared on this node or anywhere below it.
    pub(crate) reachable_switches: Vec<SwitchId>,
    pub(crate) children: Vec<TreeNode<D, R>>,
    pub(crate) execute: Option<Handler<D, R>>,
    pub(crate) on_error: Option<ErrorHandler<D, R>>,
    pub(crate) fallback: Option<Handler<D, R>>,
    pub(crate) guard: Option<Guard<D>>,
    pub(crate) description: Option<String>,
}

impl<D, R> TreeNode<D, R> {
    pub(crate) fn new(arg: Option<ArgNode>) -> Self {
        Self {
            arg,
            own_switches: Vec::new(),
            reachable_switches: Vec::new(),
            children: Vec::new(),
            execute: None,
            on_error: None,
            fallback: None,
            guard: None,
            description: None,
        }
    }
}

/// An immutable tree of compiled grammar nodes, built by
/// [`crate::TreeBuilder`].
///
/// `D` is the caller's data, passed through to guards and handlers
/// untouched. `R` is what handlers return.
pub struct ParserTree<D, R> {
    pub(crate) root: TreeNode<D, R>,
    pub(crate) switches: Vec<ArgNode>,
    pub(crate) config: EngineConfig,
}

// ─── Terminal selection ─────────────────────────────────────────────────────

enum Action<'t, D, R> {
    Execute(&'t Handler<D, R>),
    Fallback(&'t Handler<D, R>),
    Recover(&'t ErrorHandler<D, R>),
}

struct Terminal<'t, 'a, D, R> {
    action: Action<'t, D, R>,
    ctx: ParseContext<'a, D>,
}

impl<D, R> Terminal<'_, '_, D, R> {
    fn is_success(&self) -> bool {
        !matches!(self.action, Action::Recover(_))
    }

    fn label(&self) -> &'static str {
        match self.action {
            Action::Execute(_) => "execute",
            Action::Fallback(_) => "fallback",
            Action::Recover(_) => "error handler",
        }
    }
}

/// Keep `candidate` if it beats `best`: success beats error handling, then
/// strictly greater weight wins, so the first offered wins ties.
fn offer<'t, 'a, D, R>(
    best: &mut Option<Terminal<'t, 'a, D, R>>,
    candidate: Terminal<'t, 'a, D, R>,
) {
    let better = match best {
        None => true,
        Some(current) => match (candidate.is_success(), current.is_success()) {
            (true, false) => true,
            (false, true) => false,
            _ => candidate.ctx.weight() > current.ctx.weight(),
        },
    };
    if better {
        *best = Some(candidate);
    }
}

fn has_success<D, R>(best: &Option<Terminal<'_, '_, D, R>>) -> bool {
    best.as_ref().is_some_and(Terminal::is_success)
}

// ─── Parse ──────────────────────────────────────────────────────────────────

impl<D, R> ParserTree<D, R> {
    /// Engine settings the tree was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Match `line` against the tree. Nothing is invoked until
    /// [`ParseOutcome::invoke`].
    pub fn parse<'t, 'a>(&'t self, mut line: ParsedLine, data: &'a D) -> ParseOutcome<'t, 'a, D, R> {
        line.drop_partial_word();
        let mut errors = ErrorCollector::new();
        let selected = self.parse_node(&self.root, ParseContext::new(line, data), &mut errors);
        match &selected {
            Some(t) => debug!(weight = t.ctx.weight(), terminal = t.label(), "parse selected"),
            None => debug!(errors = errors.errors().len(), "parse found no terminal"),
        }
        let args = selected
            .as_ref()
            .map(|t| t.ctx.resolve(&self.switches))
            .unwrap_or_default();
        ParseOutcome {
            selected,
            args,
            report: errors.into_report(&self.config.error_joiner),
        }
    }

    fn parse_node<'t, 'a>(
        &'t self,
        node: &'t TreeNode<D, R>,
        mut ctx: ParseContext<'a, D>,
        errors: &mut ErrorCollector,
    ) -> Option<Terminal<'t, 'a, D, R>> {
        if !self.admits(node, &ctx, errors) {
            return None;
        }
        for &id in &node.own_switches {
            ctx.declare_switch(id);
        }
        if let Some(id) = ctx.stray_switch(&node.reachable_switches) {
            trace!(switch = self.switches[id.0].name(), "switch belongs to another command");
            return None;
        }
        if !self.drain_switches(node, &mut ctx, errors) {
            return None;
        }

        if let Some(arg) = &node.arg {
            if ctx.line().is_eol() {
                if !arg.is_optional() {
                    errors.record(
                        ErrorKind::input_expected(arg.usage()),
                        ctx.weight(),
                        ctx.line(),
                        ctx.anchor(),
                    );
                    return None;
                }
                ctx.push_default(arg);
            } else {
                let before = ctx.line().clone();
                match arg.parse(ctx.line_mut()) {
                    Ok(value) => {
                        trace!(arg = arg.name(), %value, "matched");
                        ctx.push_input(arg, value);
                    }
                    Err(kind) => {
                        let weight = arg.rejection_weight(ctx.weight());
                        errors.record(kind, weight, &before, ctx.anchor());
                        return None;
                    }
                }
                if !self.drain_switches(node, &mut ctx, errors) {
                    return None;
                }
            }
        }

        let mut best = None;
        for child in &node.children {
            if let Some(terminal) = self.parse_node(child, ctx.clone(), errors) {
                offer(&mut best, terminal);
            }
        }

        if !has_success(&best) {
            if ctx.line().is_eol() {
                match &node.execute {
                    Some(handler) => {
                        self.offer_success(Action::Execute(handler), &ctx, errors, &mut best)
                    }
                    None if node.children.is_empty() && node.fallback.is_none() => errors.record(
                        ErrorKind::InputExpected {
                            expected: BTreeSet::new(),
                        },
                        ctx.weight(),
                        ctx.line(),
                        ctx.anchor(),
                    ),
                    None => {}
                }
            } else if node.children.is_empty() && node.fallback.is_none() {
                errors.record(
                    ErrorKind::too_many_arguments(ctx.line().current_word()),
                    ctx.weight() + 1,
                    ctx.line(),
                    ctx.anchor(),
                );
            }
        }
        if !has_success(&best) {
            if let Some(handler) = &node.fallback {
                self.offer_success(Action::Fallback(handler), &ctx, errors, &mut best);
            }
        }
        if !has_success(&best) {
            if let Some(handler) = &node.on_error {
                offer(
                    &mut best,
                    Terminal {
                        action: Action::Recover(handler),
                        ctx,
                    },
                );
            }
        }
        best
    }

    /// Evaluate the node's guard. A denied guard with a permission name
    /// records `insufficient-permission` at the current weight.
    fn admits(&self, node: &TreeNode<D, R>, ctx: &ParseContext<'_, D>, errors: &mut ErrorCollector) -> bool {
        let Some(guard) = &node.guard else {
            return true;
        };
        if (guard.check)(ctx.data()) {
            return true;
        }
        trace!(permission = guard.permission.as_deref(), "guard denied subtree");
        if let Some(permission) = &guard.permission {
            errors.record(
                ErrorKind::insufficient_permission(permission.as_str()),
                ctx.weight(),
                ctx.line(),
                ctx.anchor(),
            );
        }
        false
    }

    /// Offer a success terminal unless a declared required switch is missing.
    fn offer_success<'t, 'a>(
        &'t self,
        action: Action<'t, D, R>,
        ctx: &ParseContext<'a, D>,
        errors: &mut ErrorCollector,
        best: &mut Option<Terminal<'t, 'a, D, R>>,
    ) {
        let missing = ctx.missing_switches(&self.switches);
        if !missing.is_empty() {
            errors.record(
                ErrorKind::MissingRequired {
                    names: missing.into_iter().collect(),
                },
                ctx.weight(),
                ctx.line(),
                ctx.anchor(),
            );
            return;
        }
        offer(
            best,
            Terminal {
                action,
                ctx: ctx.clone(),
            },
        );
    }

    /// The first unmatched switch reachable from `node` that the current word
    /// names.
    fn pending_switch(&self, node: &TreeNode<D, R>, ctx: &ParseContext<'_, D>) -> Option<SwitchId> {
        let name = self.config.switch_name(ctx.line().current_word())?;
        node.reachable_switches
            .iter()
            .copied()
            .find(|&id| !ctx.is_matched(id) && self.switches[id.0].matches_switch(name))
    }

    /// Consume leading `-name value` pairs. Returns false when a named
    /// switch's value was rejected, which ends the branch.
    fn drain_switches(
        &self,
        node: &TreeNode<D, R>,
        ctx: &mut ParseContext<'_, D>,
        errors: &mut ErrorCollector,
    ) -> bool {
        while let Some(id) = self.pending_switch(node, ctx) {
            // The switch word itself; pending_switch saw it, so it exists.
            let _ = ctx.line_mut().next();
            let switch = &self.switches[id.0];
            let before = ctx.line().clone();
            match switch.parse(ctx.line_mut()) {
                Ok(value) => {
                    trace!(switch = switch.name(), %value, "switch matched");
                    ctx.match_switch(id, value);
                }
                Err(kind) => {
                    errors.record(kind, ctx.weight() + 1, &before, ctx.anchor());
                    return false;
                }
            }
        }
        true
    }
}

// ─── Complete ───────────────────────────────────────────────────────────────

impl<D, R> ParserTree<D, R> {
    /// Candidates for the last (possibly empty) word of `line`.
    ///
    /// Only the branches that got furthest into the line contribute.
    pub fn complete(&self, line: ParsedLine, data: &D) -> Completions {
        let mut frontier = Frontier::default();
        self.complete_node(&self.root, ParseContext::new(line, data), &mut frontier);
        let completions = frontier.into_completions();
        debug!(
            weight = completions.weight,
            groups = completions.groups.len(),
            "completion collected"
        );
        completions
    }

    fn complete_node(
        &self,
        node: &TreeNode<D, R>,
        mut ctx: ParseContext<'_, D>,
        frontier: &mut Frontier,
    ) {
        if let Some(guard) = &node.guard {
            if !(guard.check)(ctx.data()) {
                return;
            }
        }
        for &id in &node.own_switches {
            ctx.declare_switch(id);
        }
        if ctx.stray_switch(&node.reachable_switches).is_some() {
            return;
        }
        if !self.complete_switches(node, &mut ctx, frontier) {
            return;
        }

        if let Some(arg) = &node.arg {
            if ctx.line().remaining() <= 1 {
                let mut groups = vec![arg.complete_group(ctx.line())];
                groups.extend(self.switch_group(node, &ctx));
                frontier.offer(ctx.weight(), groups);
                return;
            }
            match arg.parse(ctx.line_mut()) {
                Ok(value) => ctx.push_input(arg, value),
                Err(_) => return,
            }
            if !self.complete_switches(node, &mut ctx, frontier) {
                return;
            }
        }

        if node.children.is_empty() {
            if ctx.line().remaining() <= 1 {
                frontier.offer(ctx.weight(), self.switch_group(node, &ctx));
            }
            return;
        }
        for child in &node.children {
            self.complete_node(child, ctx.clone(), frontier);
        }
    }

    /// Like [`ParserTree::drain_switches`], but a switch whose value is the
    /// word being typed completes through the switch's own parser.
    fn complete_switches(
        &self,
        node: &TreeNode<D, R>,
        ctx: &mut ParseContext<'_, D>,
        frontier: &mut Frontier,
    ) -> bool {
        // The last word is the one being typed, even when it looks like a switch.
        while ctx.line().remaining() > 1 {
            let Some(id) = self.pending_switch(node, ctx) else {
                break;
            };
            let _ = ctx.line_mut().next();
            let switch = &self.switches[id.0];
            if switch.takes_value() && ctx.line().remaining() <= 1 {
                frontier.offer(ctx.weight() + 1, [switch.complete_group(ctx.line())]);
                return false;
            }
            match switch.parse(ctx.line_mut()) {
                Ok(value) => ctx.match_switch(id, value),
                Err(_) => return false,
            }
        }
        true
    }

    /// Synthetic group offering `-name` for every unmatched reachable switch.
    fn switch_group(&self, node: &TreeNode<D, R>, ctx: &ParseContext<'_, D>) -> Option<CandidateGroup> {
        let prefix = self.config.switch_prefix;
        let candidates: Vec<Candidate> = node
            .reachable_switches
            .iter()
            .filter(|id| !ctx.is_matched(**id))
            .flat_map(|id| {
                let switch = &self.switches[id.0];
                switch.switch_names().iter().map(move |name| {
                    let candidate = Candidate::new(format!("{prefix}{name}"));
                    match switch.description() {
                        Some(text) => candidate.with_description(text),
                        None => candidate,
                    }
                })
            })
            .collect();
        (!candidates.is_empty()).then(|| CandidateGroup {
            title: "switches".to_string(),
            description: None,
            partial: ctx.line().current_word().to_string(),
            candidates,
        })
    }
}

// ─── Usage ──────────────────────────────────────────────────────────────────

/// One executable path of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Usage {
    /// Usage line, e.g. `give <player> [amount]`.
    pub text: String,
    /// Description given when the command was declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl<D, R> ParserTree<D, R> {
    /// One usage line per executable path, in declaration order:
    /// `give <player> [amount] [-q|-quiet]`. Paths ending in a fallback get
    /// a trailing `...`.
    pub fn usages(&self) -> Vec<String> {
        self.usage_entries().into_iter().map(|u| u.text).collect()
    }

    /// [`ParserTree::usages`] with the description of each command.
    pub fn usage_entries(&self) -> Vec<Usage> {
        let mut out = Vec::new();
        self.collect_usages(&self.root, &mut Vec::new(), &mut out);
        out
    }

    fn collect_usages(&self, node: &TreeNode<D, R>, path: &mut Vec<String>, out: &mut Vec<Usage>) {
        let depth = path.len();
        if let Some(arg) = &node.arg {
            path.push(arg.usage());
        }
        for id in &node.own_switches {
            path.push(self.switches[id.0].usage());
        }
        if node.execute.is_some() {
            out.push(Usage {
                text: path.join(" "),
                description: node.description.clone(),
            });
        }
        if node.fallback.is_some() {
            let mut line = path.clone();
            line.push("...".to_string());
            out.push(Usage {
                text: line.join(" "),
                description: node.description.clone(),
            });
        }
        for child in &node.children {
            self.collect_usages(child, path, out);
        }
        path.truncate(depth);
    }
}

impl<D, R> fmt::Debug for ParserTree<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserTree")
            .field("usages", &self.usages())
            .field("switches", &self.switches.len())
            .field("config", &self.config)
            .finish()
    }
}

// ─── Outcome ────────────────────────────────────────────────────────────────

/// Result of [`ParserTree::parse`]: the selected terminal (if any), its
/// resolved arguments, and the merged errors of every failed branch.
pub struct ParseOutcome<'t, 'a, D, R> {
    selected: Option<Terminal<'t, 'a, D, R>>,
    args: Vec<ParsedArg>,
    report: ErrorReport,
}

impl<'t, 'a, D, R> ParseOutcome<'t, 'a, D, R> {
    /// Whether an execute or fallback handler was selected.
    pub fn is_success(&self) -> bool {
        has_success(&self.selected)
    }

    /// Whether any handler (including an error handler) was selected.
    pub fn is_matched(&self) -> bool {
        self.selected.is_some()
    }

    /// Visible arguments of the selected path.
    pub fn results(&self) -> impl Iterator<Item = &ParsedArg> {
        self.args.iter().filter(|a| !a.suppressed)
    }

    /// Every argument of the selected path, suppressed ones included.
    pub fn all_results(&self) -> &[ParsedArg] {
        &self.args
    }

    /// Weight of the selected path.
    pub fn weight(&self) -> Option<u32> {
        self.selected.as_ref().map(|t| t.ctx.weight())
    }

    /// Merged errors of the heaviest failed branches.
    pub fn errors(&self) -> &ErrorReport {
        &self.report
    }

    /// Run the selected handler. An error handler receives the error report.
    pub fn invoke(self) -> Result<R, InvocationError> {
        let Some(terminal) = self.selected else {
            return Err(InvocationError::Unmatched {
                message: self.report.message(),
                report: self.report,
            });
        };
        let data = terminal.ctx.data();
        let invocation = Invocation::new(data, self.args, terminal.ctx.into_line());
        Ok(match terminal.action {
            Action::Execute(handler) | Action::Fallback(handler) => handler(&invocation),
            Action::Recover(handler) => handler(&invocation, &self.report),
        })
    }
}

impl<D, R> fmt::Debug for ParseOutcome<'_, '_, D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOutcome")
            .field("terminal", &self.selected.as_ref().map(Terminal::label))
            .field("args", &self.args)
            .field("errors", &self.report)
            .finish()
    }
}
