//! Output formatting: text summary or JSON.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;

use crate::cli::OutputFormat;

/// Whether stdout should carry ANSI colors.
pub fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Render a serde-serializable result in the chosen format.
///
/// `text_fn` builds the human-readable summary; JSON formats serialize
/// the value itself.
pub fn render<T>(format: OutputFormat, data: &T, text_fn: impl FnOnce(&T) -> String) -> String
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Text => text_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data).unwrap_or_default(),
        OutputFormat::JsonCompact => serde_json::to_string(data).unwrap_or_default(),
    }
}

/// A one-line status message, marked green when colors are on.
pub fn done(message: &str) -> String {
    if should_color() {
        format!("{} {message}", "✓".green())
    } else {
        format!("✓ {message}")
    }
}

/// A one-line note for something that needed no change.
pub fn unchanged(message: &str) -> String {
    if should_color() {
        format!("{} {}", "•".dimmed(), message.dimmed())
    } else {
        format!("• {message}")
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
