use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use asa_acl_core::{
    flatten_with_registry, format_inventory, format_json, format_text, FlattenOptions,
    FlattenReport, Registry,
};
use asa_acl_flatten::columns::{default_columns, load_columns, Column};
use asa_acl_flatten::output::default_output_path;
use asa_acl_flatten::report::{render_failure, render_rows, render_summary};
use asa_acl_flatten::spreadsheet;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod path_guard;

use cli::{Cli, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if !cli.config.is_file() {
        bail!("config file {} does not exist", cli.config.display());
    }
    let text = fs::read_to_string(&cli.config)
        .with_context(|| format!("failed to read {}", cli.config.display()))?;
    let registry = Registry::from_text(&text);

    if cli.objects {
        println!("{}", format_inventory(&registry));
        return Ok(());
    }

    let options = FlattenOptions {
        product_warn_threshold: cli.product_warn,
        acl_filter: cli.acl.clone(),
    };
    let report = flatten_with_registry(&text, &registry, &options);
    for failure in &report.failures {
        eprintln!("{}", render_failure(failure));
    }

    if cli.summary {
        println!("{}", render_summary(&report.stats));
    } else if let Some(path) = output_path(&cli) {
        path_guard::ensure_output_not_same(&path, &cli.config)?;
        write_output(&cli, &report, &path)?;
        println!("{}", render_summary(&report.stats));
        println!("wrote {}", path.display());
        info!(path = %path.display(), rows = report.stats.rows_emitted, "output written");
    } else {
        println!("{}", render_rows(&report.rows));
        println!();
        println!("{}", render_summary(&report.stats));
    }

    if cli.strict && report.stats.statements_skipped > 0 {
        bail!(
            "strict mode failed: {} access-list lines skipped",
            report.stats.statements_skipped
        );
    }
    Ok(())
}

/// Text goes to stdout unless an explicit path is given.
fn output_path(cli: &Cli) -> Option<PathBuf> {
    match (&cli.output, cli.format) {
        (Some(path), _) => Some(path.clone()),
        (None, OutputFormat::Text) => None,
        (None, format) => Some(default_output_path(&cli.config, format.extension())),
    }
}

fn write_output(cli: &Cli, report: &FlattenReport, path: &Path) -> Result<()> {
    match cli.format {
        OutputFormat::Text => fs::write(path, format_text(&report.rows))
            .with_context(|| format!("failed to write {}", path.display())),
        OutputFormat::Json => {
            let json = format_json(report).context("failed to serialise report")?;
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
        }
        OutputFormat::Spreadsheet => {
            let columns = resolve_columns(cli.columns.as_deref());
            spreadsheet::write_file(&report.rows, &columns, path)
                .with_context(|| format!("failed to write workbook {}", path.display()))
        }
    }
}

fn resolve_columns(path: Option<&Path>) -> Vec<Column> {
    let Some(path) = path else {
        return default_columns();
    };
    match load_columns(path) {
        Ok(columns) => columns,
        Err(err) => {
            warn!("{err}; using embedded column layout");
            default_columns()
        }
    }
}
