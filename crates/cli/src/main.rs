mod commandset;
mod render;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use argtree_core::grammar::emit::grammar_text;
use argtree_core::grammar::parser::parse_grammar;
use argtree_core::{Engine, GrammarError, TreeBuilder, to_pretty_json};
use argtree_diagnostics::{self as diag, Diagnostic};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commandset::{CommandSet, CommandSetError, Grants, Matched};
use crate::render::{Format, print_summary, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "argtree",
    version,
    about = "argtree: parse and complete command lines against a grammar-defined command set"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Options shared by commands that run input against a command set.
#[derive(clap::Args, Debug)]
struct Source {
    /// JSONC command-set file.
    #[arg(long, short = 'c')]
    commands: PathBuf,
    /// Permission held by the caller. Repeatable.
    #[arg(long = "grant", short = 'g')]
    grants: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse a command line and report the matched command and arguments.
    Parse {
        #[command(flatten)]
        source: Source,
        /// The command line, quoted as one argument.
        line: String,
    },

    /// List completion candidates for the last word of a command line.
    Complete {
        #[command(flatten)]
        source: Source,
        /// The command line; end it with a space to complete a new word.
        line: String,
    },

    /// Print one usage line per command.
    Usage {
        /// JSONC command-set file.
        #[arg(long, short = 'c')]
        commands: PathBuf,
    },

    /// Check a single grammar line and print its terms.
    Grammar { grammar: String },

    /// Explain a diagnostic ID (e.g. ARG1003).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(err) = run(cli.cmd, format) {
        match format {
            Format::Json => {
                let out = serde_json::json!({
                    "success": false,
                    "error": "command_failed",
                    "message": format!("{err:#}"),
                });
                println!("{out:#}");
            }
            Format::Pretty => {
                if let Some(grammar_err) = err.downcast_ref::<CommandSetError>() {
                    render_command_set_error(grammar_err);
                }
                eprintln!("error: {err:#}");
            }
        }
        process::exit(2);
    }
}

/// Log to stderr, filtered by `ARGTREE_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ARGTREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cmd: Cmd, format: Format) -> Result<()> {
    match cmd {
        Cmd::Parse { source, line } => cmd_parse(&source, &line, format),
        Cmd::Complete { source, line } => cmd_complete(&source, &line, format),
        Cmd::Usage { commands } => cmd_usage(&commands, format),
        Cmd::Grammar { grammar } => cmd_grammar(&grammar, format),
        Cmd::Explain { id } => cmd_explain(&id, format),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_parse(source: &Source, line: &str, format: Format) -> Result<()> {
    let (set, engine) = load(&source.commands)?;
    let grants = Grants::new(source.grants.iter().cloned());

    let outcome = engine.parse(line, &grants);
    let args: Vec<_> = outcome.results().cloned().collect();
    let weight = outcome.weight();
    let report = outcome.errors().clone();

    match outcome.invoke() {
        Ok(Matched { index, remaining }) => {
            let spec = &set.commands[index];
            match format {
                Format::Json => {
                    let out = serde_json::json!({
                        "success": true,
                        "command": index,
                        "grammar": spec.grammar,
                        "weight": weight,
                        "args": args,
                        "remaining": remaining,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                Format::Pretty => {
                    println!("matched: {}", spec.grammar);
                    for arg in &args {
                        println!("  {} = {} ({:?})", arg.name, arg.value, arg.origin);
                    }
                    if !remaining.is_empty() {
                        println!("  remaining: {remaining}");
                    }
                }
            }
            Ok(())
        }
        Err(err) => {
            let diagnostics = report.diagnostics();
            match format {
                Format::Json => {
                    let out = serde_json::json!({
                        "success": false,
                        "message": err.to_string(),
                        "context": report.context_line(),
                        "weight": report.weight(),
                        "diagnostics": diagnostics,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                Format::Pretty => {
                    render_diagnostics(line, "<input>", &diagnostics);
                    print_summary(&diagnostics, &report.context_line());
                }
            }
            process::exit(1);
        }
    }
}

fn cmd_complete(source: &Source, line: &str, format: Format) -> Result<()> {
    let (_, engine) = load(&source.commands)?;
    let grants = Grants::new(source.grants.iter().cloned());
    let completions = engine.complete(line, &grants);

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "weight": completions.weight,
                "suggestions": completions.suggestions(),
                "groups": completions.groups,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            for group in &completions.groups {
                let candidates: Vec<_> = group.matching().collect();
                if candidates.is_empty() {
                    continue;
                }
                println!("{}", group.title);
                for candidate in candidates {
                    match &candidate.description {
                        Some(text) => println!("  {:<16} {text}", candidate.value),
                        None => println!("  {}", candidate.value),
                    }
                }
            }
        }
    }
    Ok(())
}

fn cmd_usage(commands: &Path, format: Format) -> Result<()> {
    let (_, engine) = load(commands)?;
    let entries = engine.tree().usage_entries();

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        Format::Pretty => {
            let width = entries.iter().map(|e| e.text.len()).max().unwrap_or(0);
            for entry in &entries {
                match &entry.description {
                    Some(text) => println!("{:<width$}  {text}", entry.text),
                    None => println!("{}", entry.text),
                }
            }
        }
    }
    Ok(())
}

fn cmd_grammar(grammar: &str, format: Format) -> Result<()> {
    // Compiling through a throwaway builder also checks parser names and
    // parameters, which the term parser alone does not.
    let checked = parse_grammar(grammar).and_then(|terms| {
        TreeBuilder::<(), ()>::new().command(grammar)?;
        Ok(terms)
    });
    let terms = match checked {
        Ok(terms) => terms,
        Err(err) => {
            let diagnostics = [err.to_diagnostic()];
            match format {
                Format::Json => {
                    let out = serde_json::json!({
                        "success": false,
                        "diagnostics": diagnostics,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                Format::Pretty => render_diagnostics(grammar, "<grammar>", &diagnostics),
            }
            process::exit(1);
        }
    };

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "success": true,
                "canonical": grammar_text(&terms),
                "terms": terms,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            println!("{}", grammar_text(&terms));
            println!("{}", to_pretty_json(&terms));
        }
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": diag::explain(id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn load(path: &Path) -> Result<(CommandSet, Engine<Grants, Matched>)> {
    let set = CommandSet::load(path)?;
    let engine = set
        .build()
        .with_context(|| format!("failed to build {}", path.display()))?;
    Ok((set, engine))
}

/// Show a grammar error from a command set against the offending grammar.
fn render_command_set_error(err: &CommandSetError) {
    if let CommandSetError::Grammar {
        index,
        grammar,
        source,
    } = err
    {
        let diagnostic: Diagnostic = GrammarError::to_diagnostic(source);
        render_diagnostics(grammar, &format!("command {index}"), &[diagnostic]);
    }
}
