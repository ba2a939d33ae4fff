use std::fs;
use std::path::Path;

use asa_acl_core::ExpandedRow;
use serde::Deserialize;
use thiserror::Error;

/// Row attribute a column displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowField {
    Line,
    Acl,
    Action,
    Protocol,
    Source,
    SourceOrigin,
    Destination,
    DestinationOrigin,
    Service,
    ServiceOrigin,
    SourceContents,
    DestinationContents,
    ServiceContents,
    Log,
    TimeRange,
    Inactive,
}

impl RowField {
    /// Cell text for this field. Missing origins and options render as an empty cell.
    pub fn value(self, row: &ExpandedRow) -> String {
        match self {
            RowField::Line => row.line_number.to_string(),
            RowField::Acl => row.acl.clone(),
            RowField::Action => row.action.to_string(),
            RowField::Protocol => row.protocol.clone(),
            RowField::Source => row.source.clone(),
            RowField::SourceOrigin => row.source_origin.clone().unwrap_or_default(),
            RowField::Destination => row.destination.clone(),
            RowField::DestinationOrigin => row.destination_origin.clone().unwrap_or_default(),
            RowField::Service => row.service.clone(),
            RowField::ServiceOrigin => row.service_origin.clone().unwrap_or_default(),
            RowField::SourceContents => row.source_contents.clone(),
            RowField::DestinationContents => row.destination_contents.clone(),
            RowField::ServiceContents => row.service_contents.clone(),
            RowField::Log => row.log.clone().unwrap_or_default(),
            RowField::TimeRange => row.time_range.clone().unwrap_or_default(),
            RowField::Inactive => {
                if row.inactive {
                    "yes".to_string()
                } else {
                    String::new()
                }
            }
        }
    }
}

/// One workbook column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Column {
    pub field: RowField,
    pub header: String,
    #[serde(default)]
    pub wrap: bool,
}

#[derive(Debug, Deserialize)]
struct ColumnFile {
    column: Vec<Column>,
}

/// Errors returned when loading column layout files.
#[derive(Debug, Error)]
pub enum ColumnLoadError {
    #[error("failed to read columns file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse columns file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("columns file {path} defines no columns")]
    Empty { path: String },
}

/// Load a column layout from a TOML file.
pub fn load_columns(path: &Path) -> Result<Vec<Column>, ColumnLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ColumnLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_columns(&raw, path.display().to_string())
}

/// Built-in column layout.
pub fn default_columns() -> Vec<Column> {
    let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/columns/default.toml"));
    parse_columns(embedded, "embedded columns".to_string()).unwrap_or_else(|_| fallback_columns())
}

fn parse_columns(raw: &str, path: String) -> Result<Vec<Column>, ColumnLoadError> {
    let parsed: ColumnFile = toml::from_str(raw).map_err(|source| ColumnLoadError::Parse {
        path: path.clone(),
        source,
    })?;
    if parsed.column.is_empty() {
        return Err(ColumnLoadError::Empty { path });
    }
    Ok(parsed.column)
}

fn fallback_columns() -> Vec<Column> {
    [
        (RowField::Acl, "access-list"),
        (RowField::Source, "source"),
        (RowField::Destination, "destination"),
        (RowField::Service, "service"),
        (RowField::SourceOrigin, "source-group-name"),
        (RowField::DestinationOrigin, "destination-group-name"),
        (RowField::ServiceOrigin, "service-group-name"),
        (RowField::SourceContents, "source-group-contents"),
        (RowField::DestinationContents, "destination-group-contents"),
        (RowField::ServiceContents, "service-group-contents"),
    ]
    .into_iter()
    .map(|(field, header)| Column {
        field,
        header: header.to_string(),
        wrap: matches!(
            field,
            RowField::SourceContents | RowField::DestinationContents | RowField::ServiceContents
        ),
    })
    .collect()
}
