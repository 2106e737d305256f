//! Pretty diagnostic rendering using ariadne.
//!
//! Diagnostics from a parse point into the command line that was typed;
//! diagnostics from a grammar point into the grammar text. Either way the
//! source is a single line, rendered with the offending word underlined.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use argtree_diagnostics::{Diagnostic, Severity};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for command results and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use `explicit` if given, else pretty for terminals and JSON for pipes.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: &Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warn => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: &Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render diagnostics against `source` (labelled `name`) to stderr.
///
/// A diagnostic without a span is printed as a bare `error[ID]: message`
/// line.
pub(crate) fn render_diagnostics(source: &str, name: &str, diagnostics: &[Diagnostic]) {
    let config = Config::default().with_compact(false);
    let mut cache = (name, Source::from(source));

    for diag in diagnostics {
        let Some(span) = &diag.span else {
            eprintln!("{diag}");
            continue;
        };
        // Zero-width spans (end of input, spliced alias words) still need a
        // visible caret.
        let start = span.start.min(source.len());
        let end = span.end.min(source.len()).max(start);
        let end = if end == start && start < source.len() {
            start + 1
        } else {
            end
        };

        let mut builder = Report::build(report_kind(&diag.severity), (name, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config);
        builder = builder.with_label(
            Label::new((name, start..end))
                .with_message(label_message(diag))
                .with_color(severity_color(&diag.severity)),
        );
        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }
        builder.finish().eprint(&mut cache).ok();
    }
}

/// A compact label built from the diagnostic's context, else its message.
fn label_message(diag: &Diagnostic) -> String {
    if let Some(ctx) = &diag.context
        && !ctx.is_empty()
    {
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        diag.message.clone()
    }
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print `1 error` / `2 errors` in colour, plus the context line showing how
/// far the input matched.
pub(crate) fn print_summary(diagnostics: &[Diagnostic], context_line: &str) {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    if errors == 0 {
        return;
    }
    let s = if errors == 1 { "" } else { "s" };
    eprintln!("{}", format!("{errors} error{s}").fg(Color::Red));
    eprintln!("  {}", context_line.fg(Color::Cyan));
}
