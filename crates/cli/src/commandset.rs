//! Command-set files: a JSONC description of the commands an [`Engine`] is
//! built from.
//!
//! ```jsonc
//! {
//!   "engine": { "line_prefix": "/" },
//!   "aliases": { "tp": "teleport" },
//!   "commands": [
//!     { "grammar": "teleport @string(name=target)", "description": "Move" },
//!     { "grammar": "ban @string(name=player)", "permission": "admin" },
//!     { "grammar": "say", "fallback": true },
//!   ],
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use argtree_core::{Engine, EngineConfig, GrammarError, Invocation, TreeBuilder};
use argtree_jsonc_strip::strip_jsonc;
use serde::Deserialize;
use tracing::debug;

/// Why a command set could not be loaded or built.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CommandSetError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid command set {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("command {index} ({grammar:?}): {source}")]
    Grammar {
        index: usize,
        grammar: String,
        #[source]
        source: GrammarError,
    },
}

/// One declared command.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CommandSpec {
    pub(crate) grammar: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    /// Permission a caller must hold (see `--grant`).
    #[serde(default)]
    pub(crate) permission: Option<String>,
    /// Accept trailing words instead of reporting them.
    #[serde(default)]
    pub(crate) fallback: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CommandSet {
    #[serde(default)]
    pub(crate) engine: EngineConfig,
    #[serde(default)]
    pub(crate) aliases: BTreeMap<String, String>,
    pub(crate) commands: Vec<CommandSpec>,
}

/// Permissions held by the caller; the engine's opaque data.
#[derive(Debug, Default, Clone)]
pub(crate) struct Grants(BTreeSet<String>);

impl Grants {
    pub(crate) fn new(perms: impl IntoIterator<Item = String>) -> Self {
        Self(perms.into_iter().collect())
    }

    fn has(&self, perm: &str) -> bool {
        self.0.contains(perm)
    }
}

/// What a matched command hands back to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Matched {
    /// Index into [`CommandSet::commands`].
    pub(crate) index: usize,
    /// Words a fallback command did not consume.
    pub(crate) remaining: String,
}

impl CommandSet {
    /// Read and parse a JSONC command set.
    pub(crate) fn load(path: &Path) -> Result<Self, CommandSetError> {
        let text = fs::read_to_string(path).map_err(|source| CommandSetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&strip_jsonc(&text)).map_err(|source| CommandSetError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Compile every command into one engine.
    pub(crate) fn build(&self) -> Result<Engine<Grants, Matched>, CommandSetError> {
        let mut builder = TreeBuilder::<Grants, Matched>::new().with_config(self.engine.clone());
        for (index, spec) in self.commands.iter().enumerate() {
            let mut command =
                builder
                    .command(&spec.grammar)
                    .map_err(|source| CommandSetError::Grammar {
                        index,
                        grammar: spec.grammar.clone(),
                        source,
                    })?;
            command = if spec.fallback {
                command.fallback(matched(index))
            } else {
                command.executes(matched(index))
            };
            if let Some(description) = &spec.description {
                command = command.describe(description.as_str());
            }
            if let Some(permission) = &spec.permission {
                let required = permission.clone();
                command = command
                    .requires_permission(permission.as_str(), move |g: &Grants| g.has(&required));
            }
        }
        debug!(commands = self.commands.len(), aliases = self.aliases.len(), "command set built");

        let mut engine = Engine::new(builder.build());
        for (alias, expansion) in &self.aliases {
            engine.add_alias(alias.as_str(), expansion.as_str());
        }
        Ok(engine)
    }
}

fn matched(index: usize) -> impl Fn(&Invocation<'_, Grants>) -> Matched + Send + Sync + 'static {
    move |inv| Matched {
        index,
        remaining: inv.remaining_line(),
    }
}
