use asa_acl_core::format::{format_row, TEXT_HEADER};
use asa_acl_core::{format_summary, Action, ExpandedRow, FlattenStats, ParseFailure};
use colored::Colorize;

/// Render rows for terminal output, coloured by action.
pub fn render_rows(rows: &[ExpandedRow]) -> String {
    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(TEXT_HEADER.bold().to_string());

    for row in rows {
        let line = format_row(row);
        let colored = if row.inactive {
            line.dimmed().to_string()
        } else {
            match row.action {
                Action::Permit => line.green().to_string(),
                Action::Deny => line.red().to_string(),
            }
        };
        out.push(colored);
    }

    out.join("\n")
}

/// Render summary counts for terminal output.
pub fn render_summary(stats: &FlattenStats) -> String {
    format_summary(stats).cyan().to_string()
}

/// Render one skipped line for stderr.
pub fn render_failure(failure: &ParseFailure) -> String {
    format!(
        "skipped line {}: {}: {}",
        failure.line_number, failure.reason, failure.line
    )
    .yellow()
    .to_string()
}
