//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output. Color follows terminal
//! support unless [`set_color`] forces it off.

use buildcfg_core::validation::{ValidationIssue, ValidationResult};
use owo_colors::{OwoColorize, Stream};

/// Force color on or off for every helper in this module
pub fn set_color(enabled: bool) {
    owo_colors::set_override(enabled);
}

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!(
            "{} {}",
            "✓".if_supports_color(Stream::Stdout, |t| t.green()),
            message
        );
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!(
            "{} {}",
            "✗".if_supports_color(Stream::Stderr, |t| t.red()),
            message
        );
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!(
            "{} {}",
            "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()),
            message
        );
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!(
            "{} {}",
            "ℹ".if_supports_color(Stream::Stdout, |t| t.blue()),
            message
        );
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.if_supports_color(Stream::Stdout, |t| t.bold()));
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print a subheader
    pub fn subheader(message: &str) {
        println!();
        println!(
            "{}",
            message.if_supports_color(Stream::Stdout, |t| t.dimmed())
        );
    }
}

/// Print `label: value` rows with the values aligned in one column
pub fn print_fields(rows: &[(&str, String)]) {
    for line in format_fields(rows) {
        println!("{line}");
    }
}

/// Render rows for [`print_fields`]
pub fn format_fields(rows: &[(&str, String)]) -> Vec<String> {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("  {:<width$}  {}", label, value, width = width))
        .collect()
}

/// Render one issue as `field: message (expected ..., got ...)`
pub fn format_issue(issue: &ValidationIssue) -> String {
    let mut line = format!("{}: {}", issue.field, issue.message);
    match (&issue.expected, &issue.actual) {
        (Some(expected), Some(actual)) => {
            line.push_str(&format!(" (expected {expected}, got {actual})"))
        }
        (Some(expected), None) => line.push_str(&format!(" (expected {expected})")),
        _ => {}
    }
    line
}

/// Print every error and warning of `result` to stderr
pub fn report_issues(result: &ValidationResult) {
    for issue in result.errors() {
        Status::error(&format_issue(issue));
    }
    for issue in result.warnings() {
        Status::warning(&format_issue(issue));
    }
}

/// Summarize issue counts, e.g. "1 error, 2 warnings"
pub fn issue_summary(result: &ValidationResult) -> String {
    format!(
        "{}, {}",
        format_count(result.errors().len(), "error", "errors"),
        format_count(result.warnings().len(), "warning", "warnings")
    )
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
