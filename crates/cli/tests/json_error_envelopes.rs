//! Ensure CLI command failures honor `--output json`.

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

fn argtree_cmd() -> Command {
    Command::new(cargo::cargo_bin!("argtree"))
}

fn write_command_set(content: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("commands.jsonc");
    fs::write(&path, content).expect("write command set");
    (dir, path.to_string_lossy().to_string())
}

fn envelope(output: &std::process::Output) -> serde_json::Value {
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json envelope");
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "command_failed");
    json
}

#[test]
fn parse_missing_command_set_emits_json_error_envelope() {
    let output = argtree_cmd()
        .args([
            "parse",
            "--commands",
            "nope-does-not-exist.jsonc",
            "--output",
            "json",
            "stop",
        ])
        .output()
        .expect("run parse command");

    let json = envelope(&output);
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("failed to read")),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn invalid_json_emits_json_error_envelope() {
    let (_dir, path) = write_command_set("{ \"commands\": [ oops ] }");
    let output = argtree_cmd()
        .args(["usage", "--commands", &path, "--output", "json"])
        .output()
        .expect("run usage command");

    let json = envelope(&output);
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("invalid command set")),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn bad_grammar_in_command_set_names_the_command() {
    let (_dir, path) = write_command_set(
        r#"{ "commands": [ { "grammar": "stop" }, { "grammar": "give @int(min=x)" } ] }"#,
    );
    let output = argtree_cmd()
        .args(["complete", "--commands", &path, "--output", "json", "st"])
        .output()
        .expect("run complete command");

    let json = envelope(&output);
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("command 1") && m.contains("give @int(min=x)")),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn bad_grammar_pretty_renders_against_grammar() {
    let (_dir, path) = write_command_set(r#"{ "commands": [ { "grammar": "give @player" } ] }"#);
    let output = argtree_cmd()
        .args(["usage", "--commands", &path, "--output", "pretty"])
        .output()
        .expect("run usage command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ARG2001"), "stderr={stderr}");
    assert!(stderr.contains("unknown parser '@player'"), "stderr={stderr}");
}
