use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "asa-acl-flatten")]
#[command(about = "Flatten Cisco ASA access-lists into a table of concrete rules")]
pub struct Cli {
    /// ASA configuration file (e.g. output of `show running-config`).
    pub config: PathBuf,
    /// Output file path. Defaults to `<config stem>_acl.<ext>` beside the input.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Spreadsheet)]
    pub format: OutputFormat,
    /// Optional column layout TOML for spreadsheet output.
    #[arg(long)]
    pub columns: Option<PathBuf>,
    /// Only emit rows for these ACL names (repeatable).
    #[arg(long)]
    pub acl: Vec<String>,
    /// Log statements that expand to at least this many rows.
    #[arg(long, default_value_t = 10_000)]
    pub product_warn: usize,
    /// Print only summary counts; no output file is written.
    #[arg(long)]
    pub summary: bool,
    /// Fail if any access-list line was skipped.
    #[arg(long)]
    pub strict: bool,
    /// List objects and groups with their resolved values instead of rules.
    #[arg(long)]
    pub objects: bool,
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Spreadsheet,
    Json,
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Spreadsheet => "xml",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}
