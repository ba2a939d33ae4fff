//! Two-pass driver: build the registry, then parse and expand every ACL line.

use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::acl::{is_remark, parse_line, ParseFailure};
use crate::expand::{expand_detailed, ExpandedRow};
use crate::line::{classify, LineKind};
use crate::registry::{Registry, RegistryCounts};

/// Knobs for one flatten run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Statements expanding to at least this many rows are logged. Never enforced.
    pub product_warn_threshold: usize,
    /// When non-empty, only statements of these ACLs produce rows.
    pub acl_filter: Vec<String>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            product_warn_threshold: 10_000,
            acl_filter: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlattenStats {
    pub statements_parsed: usize,
    pub statements_skipped: usize,
    pub remarks: usize,
    pub rows_emitted: usize,
    pub cycles_short_circuited: usize,
    pub dangling_references: usize,
    pub largest_product: usize,
}

/// Everything one run produces: rows, the lines that were skipped, and counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlattenReport {
    pub registry: RegistryCounts,
    pub rows: Vec<ExpandedRow>,
    pub failures: Vec<ParseFailure>,
    pub stats: FlattenStats,
}

/// Errors returned by [`flatten_file`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Flatten a whole configuration text.
pub fn flatten(text: &str, options: &FlattenOptions) -> FlattenReport {
    let registry = Registry::from_text(text);
    flatten_with_registry(text, &registry, options)
}

/// Run the second pass against an already built registry.
pub fn flatten_with_registry(
    text: &str,
    registry: &Registry,
    options: &FlattenOptions,
) -> FlattenReport {
    let mut report = FlattenReport {
        registry: registry.counts(),
        ..FlattenReport::default()
    };

    for (idx, line) in text.lines().enumerate() {
        let LineKind::AclLine(raw) = classify(line) else {
            continue;
        };
        if is_remark(&raw) {
            report.stats.remarks += 1;
            continue;
        }

        let statement = match parse_line(idx + 1, &raw, registry) {
            Ok(statement) => statement,
            Err(failure) => {
                debug!(line = failure.line_number, reason = %failure.reason, "skipping access-list line");
                report.stats.statements_skipped += 1;
                report.failures.push(failure);
                continue;
            }
        };
        report.stats.statements_parsed += 1;
        if !options.acl_filter.is_empty() && !options.acl_filter.contains(&statement.acl) {
            continue;
        }

        let expansion = expand_detailed(&statement, registry);
        let product = expansion.rows.len();
        if product >= options.product_warn_threshold {
            warn!(
                acl = %statement.acl,
                line = statement.line_number,
                rows = product,
                "statement expands to a large number of rows"
            );
        }
        report.stats.largest_product = report.stats.largest_product.max(product);
        report.stats.cycles_short_circuited += expansion.cycles.len();
        report.stats.dangling_references += expansion.dangling.len();
        report.stats.rows_emitted += product;
        report.rows.extend(expansion.rows);
    }

    info!(
        parsed = report.stats.statements_parsed,
        skipped = report.stats.statements_skipped,
        rows = report.stats.rows_emitted,
        "flatten pass complete"
    );
    report
}

/// Read a configuration file and flatten it.
pub fn flatten_file(path: &Path, options: &FlattenOptions) -> Result<FlattenReport, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(flatten(&text, options))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{flatten, FlattenOptions};

    #[test]
    fn counts_remarks_failures_and_rows() {
        let report = flatten(
            "access-list IN remark web access
access-list IN extended permit tcp any host 10.0.0.1 eq 80
access-list IN extended permit
access-list OUT extended deny ip any any
",
            &FlattenOptions::default(),
        );
        assert_eq!(report.stats.remarks, 1);
        assert_eq!(report.stats.statements_parsed, 2);
        assert_eq!(report.stats.statements_skipped, 1);
        assert_eq!(report.failures[0].line_number, 3);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[1].line_number, 4);
    }

    #[test]
    fn acl_filter_limits_rows_but_not_parsing() {
        let options = FlattenOptions {
            acl_filter: vec!["OUT".to_string()],
            ..FlattenOptions::default()
        };
        let report = flatten(
            "access-list IN extended permit ip any any
access-list OUT extended deny ip any any
",
            &options,
        );
        assert_eq!(report.stats.statements_parsed, 2);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].acl, "OUT");
    }

    #[test]
    fn tracks_largest_product() {
        let report = flatten(
            "object-group network N
 network-object host 10.0.0.1
 network-object host 10.0.0.2
access-list IN extended permit ip object-group N object-group N
access-list IN extended permit ip any any
",
            &FlattenOptions {
                product_warn_threshold: 2,
                ..FlattenOptions::default()
            },
        );
        assert_eq!(report.stats.largest_product, 4);
        assert_eq!(report.stats.rows_emitted, 5);
    }
}
