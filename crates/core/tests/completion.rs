//! Completion tests: frontier selection, switch groups, hints, guards, and
//! aliases.

mod common;

use argtree_core::{ParsedLine, TreeBuilder};
use common::{ENGINE, Grants};

fn none() -> Grants {
    Grants::default()
}

// ─── 1. Command names ───────────────────────────────────────────────────────

#[test]
fn first_word_offers_matching_commands_and_aliases() {
    let completions = ENGINE.complete("g", &none());
    assert_eq!(completions.weight, Some(0));
    assert_eq!(completions.suggestions(), ["give", "gamemode", "gm"]);
    let aliases = completions.groups.iter().find(|g| g.title == "aliases").unwrap();
    assert_eq!(aliases.candidates[0].description.as_deref(), Some("gamemode"));
}

#[test]
fn empty_line_offers_every_command() {
    let suggestions = ENGINE.complete("", &none()).suggestions();
    for name in ["give", "gamemode", "kick", "ban", "weather", "echo", "stop", "gm"] {
        assert!(suggestions.iter().any(|s| s == name), "missing {name}");
    }
}

#[test]
fn prefix_match_ignores_case() {
    assert_eq!(ENGINE.complete("ST", &none()).suggestions(), ["stop"]);
}

// ─── 2. Frontier ────────────────────────────────────────────────────────────

#[test]
fn deeper_frontier_replaces_root_candidates() {
    let completions = ENGINE.complete("give ", &none());
    assert_eq!(completions.weight, Some(1));
    let player = &completions.groups[0];
    assert_eq!(player.title, "<player>");
    assert_eq!(player.candidates[0].value, "<player>");
    assert!(player.candidates[0].hint);
    // Hints are never inserted, so only the pending switches remain.
    assert_eq!(completions.suggestions(), ["-q", "-quiet"]);
}

#[test]
fn literal_alternatives_filter_by_partial() {
    let completions = ENGINE.complete("weather r", &none());
    assert_eq!(completions.weight, Some(1));
    assert_eq!(completions.groups[0].partial, "r");
    assert_eq!(completions.suggestions(), ["rain"]);

    let completions = ENGINE.complete("gamemode c", &none());
    assert_eq!(completions.suggestions(), ["creative"]);
}

#[test]
fn bounded_integers_enumerate_up_to_the_limit() {
    let completions = ENGINE.complete("weather rain ", &none());
    assert_eq!(completions.weight, Some(2));
    assert_eq!(completions.groups[0].title, "[seconds]");
    let values = completions.suggestions();
    assert_eq!(values.len(), 20);
    assert_eq!(values.first().map(String::as_str), Some("1"));
    assert_eq!(values.last().map(String::as_str), Some("20"));

    let values = ENGINE.complete("weather rain 2", &none()).suggestions();
    assert_eq!(
        values,
        ["2", "20", "21", "22", "23", "24", "25", "26", "27", "28", "29"]
    );
}

#[test]
fn complete_command_offers_nothing_more() {
    let completions = ENGINE.complete("stop ", &none());
    assert_eq!(completions.weight, Some(1));
    assert!(completions.suggestions().is_empty());
}

#[test]
fn dead_end_offers_nothing() {
    let completions = ENGINE.complete("fly ", &none());
    assert_eq!(completions.weight, None);
    assert!(completions.is_empty());
}

#[test]
fn completion_is_idempotent() {
    let first = ENGINE.complete("kick bob ", &none());
    let second = ENGINE.complete("kick bob ", &none());
    assert_eq!(first, second);
}

// ─── 3. Switches ────────────────────────────────────────────────────────────

#[test]
fn pending_switches_form_their_own_group() {
    let completions = ENGINE.complete("kick bob ", &none());
    assert_eq!(completions.weight, Some(2));
    let titles: Vec<&str> = completions.groups.iter().map(|g| g.title.as_str()).collect();
    assert_eq!(titles, ["[reason]", "switches"]);
    assert_eq!(completions.suggestions(), ["-d", "-delay"]);

    let completions = ENGINE.complete("kick bob -de", &none());
    assert_eq!(completions.suggestions(), ["-delay"]);
}

#[test]
fn switch_value_completes_through_its_parser() {
    let completions = ENGINE.complete("kick bob -d ", &none());
    assert_eq!(completions.weight, Some(3));
    assert_eq!(completions.groups.len(), 1);
    let group = &completions.groups[0];
    assert_eq!(group.title, "[-d|-delay <int>]");
    assert_eq!(group.candidates[0].value, "<int>");
    assert!(group.candidates[0].hint);
}

#[test]
fn matched_switch_is_not_offered_again() {
    let completions = ENGINE.complete("kick bob -d 5 ", &none());
    assert_eq!(completions.weight, Some(3));
    assert_eq!(completions.groups.len(), 1);
    assert_eq!(completions.groups[0].title, "[reason]");
}

#[test]
fn switch_of_one_command_does_not_complete_its_sibling() {
    let mut b = TreeBuilder::<(), ()>::new();
    b.command("deploy @string(name=app) @flag(switch=force)").unwrap().executes(|_| ());
    b.command("deploy @string(name=app) rollback").unwrap().executes(|_| ());
    let tree = b.build();

    let completions = tree.complete(ParsedLine::new("deploy web "), &());
    assert_eq!(completions.weight, Some(2));
    assert_eq!(completions.suggestions(), ["-force", "rollback"]);

    let completions = tree.complete(ParsedLine::new("deploy -force web "), &());
    assert_eq!(completions.weight, Some(3));
    assert!(completions.suggestions().is_empty());
}

// ─── 4. Guards and aliases ──────────────────────────────────────────────────

#[test]
fn guarded_subtree_is_not_completed() {
    assert!(ENGINE.complete("ban ", &none()).is_empty());

    let completions = ENGINE.complete("ban ", &Grants::of(&["admin"]));
    assert_eq!(completions.weight, Some(1));
    assert_eq!(completions.groups[0].title, "<player>");
}

#[test]
fn completion_continues_through_alias() {
    let completions = ENGINE.complete("gm ", &none());
    assert_eq!(completions.weight, Some(1));
    assert_eq!(completions.groups[0].title, "<mode>");
    assert_eq!(completions.suggestions(), ["survival", "creative", "adventure"]);
}
