//! Shared test helpers for `argtree_core` integration tests.

#![allow(unreachable_pub)]

use std::collections::BTreeSet;
use std::sync::LazyLock;

use argtree_core::{Engine, Invocation, ParsedArg, TreeBuilder, Value};

/// The sample command set, built once per test binary.
#[allow(dead_code)]
pub static ENGINE: LazyLock<Engine<Grants, String>> = LazyLock::new(sample_engine);

/// Opaque caller data for tests: the permissions the caller holds.
#[derive(Debug, Default, Clone)]
pub struct Grants(pub BTreeSet<String>);

impl Grants {
    /// Grants holding each of `perms`.
    #[allow(dead_code)]
    pub fn of(perms: &[&str]) -> Self {
        Self(perms.iter().map(|p| p.to_string()).collect())
    }

    /// Whether `perm` is held.
    pub fn has(&self, perm: &str) -> bool {
        self.0.contains(perm)
    }
}

/// Render an invocation as `tag name=value ...` over its visible arguments.
pub fn render(tag: &str, inv: &Invocation<'_, Grants>) -> String {
    let mut out = tag.to_string();
    for arg in inv.args() {
        out.push_str(&format!(" {}={}", arg.name, arg.value));
    }
    out
}

/// A small command set exercising literals, numbers, switches, guards,
/// defaults, fallbacks, and error handlers.
#[allow(dead_code)]
pub fn sample_engine() -> Engine<Grants, String> {
    let mut b = TreeBuilder::<Grants, String>::new();
    b.command("give @string(name=player) @string(name=item) @int(name=amount, min=1, max=64, default=1) @flag(switch=q|quiet)")
        .unwrap()
        .executes(|inv| render("give", inv))
        .describe("Give items to a player");
    b.command("give")
        .unwrap()
        .on_error(|_, report| format!("give failed: {report}"));
    b.command("gamemode @literal(name=mode, options=survival|creative|adventure) @string(name=player, default=self)")
        .unwrap()
        .executes(|inv| render("gamemode", inv));
    b.command("kick @string(name=player) @text(name=reason, default=\"\") @int(switch=d|delay, default=0)")
        .unwrap()
        .executes(|inv| render("kick", inv));
    b.command("ban @string(name=player)")
        .unwrap()
        .requires_permission("admin", |g: &Grants| g.has("admin"))
        .executes(|inv| render("ban", inv));
    b.command("weather clear|rain|thunder @int(name=seconds, min=1, max=30, default=10)")
        .unwrap()
        .executes(|inv| render("weather", inv));
    b.command("echo")
        .unwrap()
        .fallback(|inv| format!("echo {}", inv.remaining_line()));
    b.command("stop").unwrap().executes(|_| "stop".to_string());
    Engine::new(b.build()).with_alias("gm", "gamemode")
}

/// `name=value` pairs of the visible arguments.
#[allow(dead_code)]
pub fn pairs(args: &[&ParsedArg]) -> Vec<(String, Value)> {
    args.iter()
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect()
}
