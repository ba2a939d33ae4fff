//! Plain-text and JSON renderings of flatten output.

use crate::expand::ExpandedRow;
use crate::flatten::{FlattenReport, FlattenStats};
use crate::registry::{NetworkDefinition, ObjectKind, Registry};
use crate::resolver::resolve;

/// Column headers matching [`format_text`] output.
pub const TEXT_HEADER: &str =
    "line\tacl\taction\tprotocol\tsource\tsource_origin\tdestination\tdestination_origin\tservice\tservice_origin";

/// Format rows as tab-separated lines, one row per line.
pub fn format_text(rows: &[ExpandedRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(TEXT_HEADER.to_string());
    for row in rows {
        lines.push(format_row(row));
    }
    lines.join("\n")
}

/// Format one row as a tab-separated line.
pub fn format_row(row: &ExpandedRow) -> String {
    let inactive = if row.inactive { " (inactive)" } else { "" };
    format!(
        "{}\t{}\t{}{inactive}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        row.line_number,
        row.acl,
        row.action,
        row.protocol,
        row.source,
        row.source_origin.as_deref().unwrap_or("-"),
        row.destination,
        row.destination_origin.as_deref().unwrap_or("-"),
        row.service,
        row.service_origin.as_deref().unwrap_or("-"),
    )
}

/// Format the run counters on one line.
pub fn format_summary(stats: &FlattenStats) -> String {
    format!(
        "parsed={} skipped={} remarks={} rows={} cycles={} dangling={} largest_product={}",
        stats.statements_parsed,
        stats.statements_skipped,
        stats.remarks,
        stats.rows_emitted,
        stats.cycles_short_circuited,
        stats.dangling_references,
        stats.largest_product
    )
}

/// Format a whole report as pretty JSON.
pub fn format_json(report: &FlattenReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// List every object and group with the values it resolves to.
pub fn format_inventory(registry: &Registry) -> String {
    let mut out = Vec::new();

    out.push("network_objects".to_string());
    for object in registry.iter_network_objects() {
        let value = object
            .definition
            .as_ref()
            .map(NetworkDefinition::value)
            .unwrap_or_else(|| "(undefined)".to_string());
        out.push(format!("- {} = {value}", object.name));
    }

    out.push("service_objects".to_string());
    for object in registry.iter_service_objects() {
        out.push(format!(
            "- {} = {}",
            object.name,
            object.definition.as_deref().unwrap_or("(undefined)")
        ));
    }

    for (label, kind) in [
        ("network_groups", ObjectKind::Network),
        ("service_groups", ObjectKind::Service),
    ] {
        out.push(label.to_string());
        for group in registry.iter_groups(kind) {
            let values = resolve(&group.name, kind, registry);
            out.push(format!(
                "- {} ({} members) = {}",
                group.name,
                group.members.len(),
                values.join(", ")
            ));
        }
    }

    out.join("\n")
}
