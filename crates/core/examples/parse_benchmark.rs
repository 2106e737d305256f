//! Lightweight parse/complete benchmark harness for local baselines.
//!
//! Run from repository root:
//! `cargo run -p argtree_core --example parse_benchmark --release`

use std::time::Instant;

use argtree_core::{Engine, GrammarError, TreeBuilder};

const COMMANDS: &[&str] = &[
    "give @string(name=player) @string(name=item) @int(name=amount, min=1, max=64, default=1)",
    "give @string(name=player) @string(name=item) @int(name=amount) @flag(switch=q|quiet)",
    "gamemode survival|creative|adventure|spectator @string(name=player, default=self)",
    "teleport @string(name=target) @double(name=x) @double(name=y) @double(name=z)",
    "teleport @string(name=target) @string(name=destination)",
    "time set day|night|noon|midnight",
    "time set @int(name=ticks, min=0)",
    "time add @int(name=ticks, min=0)",
    "kick @string(name=player) @text(name=reason, default=\"\") @int(switch=d|delay, default=0)",
    "say @text(name=message)",
    "weather clear|rain|thunder @int(name=seconds, min=1, max=1000000, default=300)",
];

const INPUTS: &[&str] = &[
    "give alex diamond 12",
    "give alex diamond 70 -q",
    "gamemode creative",
    "teleport alex 1.5 64 -20",
    "teleport alex steve",
    "time set 6000",
    "kick -d 5 griefer repeated griefing",
    "weather rain",
    "say nobody reads these",
    "give alex",
];

const PARTIALS: &[&str] = &["", "g", "give alex ", "time set ", "kick bob -", "weather "];

fn build() -> Result<Engine<(), usize>, GrammarError> {
    let mut builder = TreeBuilder::new();
    for (index, grammar) in COMMANDS.iter().enumerate() {
        builder.command(grammar)?.executes(move |_| index);
    }
    Ok(Engine::new(builder.build())
        .with_alias("tp", "teleport")
        .with_alias("gm", "gamemode"))
}

fn per_iter_ms(elapsed: std::time::Duration, iterations: usize) -> f64 {
    elapsed.as_secs_f64() * 1000.0 / iterations as f64
}

fn main() -> Result<(), GrammarError> {
    let iterations = std::env::var("ARGTREE_BENCH_ITERS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(2_000);

    let build_start = Instant::now();
    let engine = build()?;
    let build_elapsed = build_start.elapsed();

    let parse_start = Instant::now();
    let mut matched = 0usize;
    for _ in 0..iterations {
        for input in INPUTS {
            if engine.parse(input, &()).is_success() {
                matched += 1;
            }
        }
    }
    let parse_elapsed = parse_start.elapsed();

    let complete_start = Instant::now();
    let mut suggestions = 0usize;
    for _ in 0..iterations {
        for input in PARTIALS {
            suggestions += engine.complete(input, &()).suggestions().len();
        }
    }
    let complete_elapsed = complete_start.elapsed();

    println!("Benchmark: {} commands", COMMANDS.len());
    println!("  build:    total={build_elapsed:?}");
    println!(
        "  parse:    total={:?}, per_iter={:.3} ms, matched={}",
        parse_elapsed,
        per_iter_ms(parse_elapsed, iterations),
        matched / iterations
    );
    println!(
        "  complete: total={:?}, per_iter={:.3} ms, suggestions={}",
        complete_elapsed,
        per_iter_ms(complete_elapsed, iterations),
        suggestions / iterations
    );
    Ok(())
}
