//! Compiling grammar lines into a [`ParserTree`].

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::EngineConfig;
use crate::context::{Invocation, SwitchId};
use crate::error::{ErrorReport, GrammarError};
use crate::grammar::parser::parse_grammar;
use crate::node::ArgNode;
use crate::parsers::ParserRegistry;
use crate::tree::{Guard, ParserTree, TreeNode};

/// Accumulates commands into a tree.
///
/// ```
/// use argtree_core::{Invocation, TreeBuilder};
///
/// let mut builder = TreeBuilder::<(), String>::new();
/// builder
///     .command("give @string(name=player) @int(name=amount, default=1)")
///     .unwrap()
///     .executes(|inv: &Invocation<'_, ()>| {
///         format!("{} x{}", inv.get_str("player").unwrap(), inv.get_i64("amount").unwrap())
///     });
/// let tree = builder.build();
///
/// let outcome = tree.parse(argtree_core::ParsedLine::new("give alex"), &());
/// assert_eq!(outcome.invoke().unwrap(), "alex x1");
/// ```
pub struct TreeBuilder<D, R> {
    registry: ParserRegistry,
    config: EngineConfig,
    root: TreeNode<D, R>,
    switches: Vec<ArgNode>,
}

impl<D, R> TreeBuilder<D, R> {
    /// An empty tree using the builtin parsers and default settings.
    pub fn new() -> Self {
        Self {
            registry: ParserRegistry::builtin(),
            config: EngineConfig::default(),
            root: TreeNode::new(None),
            switches: Vec::new(),
        }
    }

    /// Resolve `@name` terms through `registry`. Call before adding commands.
    pub fn with_registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Use `config`. Call before adding commands; parsers read it when
    /// compiled.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The registry, for adding parsers between commands.
    pub fn registry_mut(&mut self) -> &mut ParserRegistry {
        &mut self.registry
    }

    /// Handlers attached to the root, for a catch-all fallback or error
    /// handler.
    pub fn root(&mut self) -> CommandBuilder<'_, D, R> {
        CommandBuilder {
            node: &mut self.root,
        }
    }

    /// Add one command.
    ///
    /// Positional terms chain parent to child. Switch terms attach to the
    /// next positional term (or the last one, when they trail). A node is
    /// shared with an earlier command when the whole prefix up to it has
    /// identical canonical text and the node carries the same switches, so
    /// a switch only ever applies to the commands that declare it. The
    /// returned builder configures the command's final node.
    pub fn command(&mut self, grammar: &str) -> Result<CommandBuilder<'_, D, R>, GrammarError> {
        let terms = parse_grammar(grammar)?;

        let mut steps: Vec<(ArgNode, Vec<ArgNode>)> = Vec::new();
        let mut pending: Vec<ArgNode> = Vec::new();
        let mut seen = BTreeSet::new();
        for term in &terms {
            let node = ArgNode::compile(term, &self.registry, &self.config)?;
            if node.is_switch() {
                for name in node.switch_names() {
                    if !seen.insert(name.to_ascii_lowercase()) {
                        return Err(GrammarError::DuplicateSwitch {
                            name: name.clone(),
                            span: Some(term.span),
                        });
                    }
                }
                pending.push(node);
            } else {
                steps.push((node, std::mem::take(&mut pending)));
            }
        }
        let Some((_, trailing)) = steps.last_mut() else {
            return Err(GrammarError::Syntax {
                message: "expected a term".to_string(),
                offset: terms.first().map_or(0, |t| t.span.start),
            });
        };
        trailing.append(&mut pending);

        let mut path = Vec::with_capacity(steps.len());
        for (arg, switches) in steps {
            let parent = node_at(&mut self.root, &path);
            let shared = {
                let key = switch_key(switches.iter());
                let table = &self.switches;
                parent.children.iter().position(|c| {
                    c.arg.as_ref().is_some_and(|a| a.signature() == arg.signature())
                        && switch_key(c.own_switches.iter().map(|id| &table[id.0])) == key
                })
            };
            let index = match shared {
                Some(index) => index,
                None => {
                    let mut node = TreeNode::new(Some(arg));
                    for switch in switches {
                        node.own_switches.push(SwitchId(self.switches.len()));
                        self.switches.push(switch);
                    }
                    parent.children.push(node);
                    parent.children.len() - 1
                }
            };
            path.push(index);
        }
        let last = node_at(&mut self.root, &path);
        debug!(grammar, depth = path.len(), "command added");
        Ok(CommandBuilder { node: last })
    }

    /// Freeze the tree.
    pub fn build(mut self) -> ParserTree<D, R> {
        index_switches(&mut self.root);
        ParserTree {
            root: self.root,
            switches: self.switches,
            config: self.config,
        }
    }
}

impl<D, R> Default for TreeBuilder<D, R> {
    fn default() -> Self {
        Self::new()
    }
}

fn node_at<'n, D, R>(mut node: &'n mut TreeNode<D, R>, path: &[usize]) -> &'n mut TreeNode<D, R> {
    for &index in path {
        node = &mut node.children[index];
    }
    node
}

/// Sorted switch signatures; nodes with different keys are never shared.
fn switch_key<'s>(switches: impl Iterator<Item = &'s ArgNode>) -> Vec<&'s str> {
    let mut key: Vec<&str> = switches.map(ArgNode::signature).collect();
    key.sort_unstable();
    key
}

/// Fill in `reachable_switches` bottom-up; returns the node's set.
fn index_switches<D, R>(node: &mut TreeNode<D, R>) -> Vec<SwitchId> {
    let mut reachable = node.own_switches.clone();
    for child in &mut node.children {
        for id in index_switches(child) {
            if !reachable.contains(&id) {
                reachable.push(id);
            }
        }
    }
    node.reachable_switches.clone_from(&reachable);
    reachable
}

/// Configures the final node of one command.
pub struct CommandBuilder<'b, D, R> {
    node: &'b mut TreeNode<D, R>,
}

impl<D, R> CommandBuilder<'_, D, R> {
    /// Run `handler` when input ends at this node.
    pub fn executes<F>(self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_, D>) -> R + Send + Sync + 'static,
    {
        self.node.execute = Some(Box::new(handler));
        self
    }

    /// Run `handler` when nothing at or below this node matched.
    pub fn on_error<F>(self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_, D>, &ErrorReport) -> R + Send + Sync + 'static,
    {
        self.node.on_error = Some(Box::new(handler));
        self
    }

    /// Run `handler` when no child matched the remaining input. The handler
    /// sees the unconsumed words through [`Invocation::remaining_line`].
    pub fn fallback<F>(self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_, D>) -> R + Send + Sync + 'static,
    {
        self.node.fallback = Some(Box::new(handler));
        self
    }

    /// Prune this node and everything below it unless `check` holds.
    pub fn requires<F>(self, check: F) -> Self
    where
        F: Fn(&D) -> bool + Send + Sync + 'static,
    {
        self.node.guard = Some(Guard {
            check: Box::new(check),
            permission: None,
        });
        self
    }

    /// Like [`CommandBuilder::requires`], but a denial is reported as
    /// `insufficient-permission` naming `permission`.
    pub fn requires_permission<F>(self, permission: impl Into<String>, check: F) -> Self
    where
        F: Fn(&D) -> bool + Send + Sync + 'static,
    {
        self.node.guard = Some(Guard {
            check: Box::new(check),
            permission: Some(permission.into()),
        });
        self
    }

    /// Attach a description, shown by [`ParserTree::usage_entries`].
    pub fn describe(self, description: impl Into<String>) -> Self {
        self.node.description = Some(description.into());
        self
    }
}
