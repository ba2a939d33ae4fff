//! Cartesian expansion of parsed statements into concrete rows.

use serde::Serialize;

use crate::acl::{AclField, AclStatement, Action};
use crate::registry::Registry;
use crate::resolver::{resolve_detailed, Resolution};

const PREALLOCATE_LIMIT: usize = 1 << 16;

/// One fully resolved rule combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedRow {
    pub acl: String,
    pub action: Action,
    pub protocol: String,
    pub source: String,
    pub source_origin: Option<String>,
    pub destination: String,
    pub destination_origin: Option<String>,
    pub service: String,
    pub service_origin: Option<String>,
    /// Every value the source reference resolves to, newline-joined. Empty for literals.
    pub source_contents: String,
    pub destination_contents: String,
    pub service_contents: String,
    pub line_number: usize,
    pub log: Option<String>,
    pub time_range: Option<String>,
    pub inactive: bool,
}

/// Rows of one statement plus the resolution diagnostics of its three fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Expansion {
    pub rows: Vec<ExpandedRow>,
    pub cycles: Vec<String>,
    pub dangling: Vec<String>,
}

/// Resolve one field. `Any` and literals resolve to themselves.
///
/// Symbolic references resolve in the namespace of their own kind, so source
/// and destination references always resolve against network entities and
/// service references against service entities.
pub fn resolve_field(field: &AclField, registry: &Registry) -> Resolution {
    match field {
        AclField::Any => Resolution {
            values: vec!["any".to_string()],
            ..Resolution::default()
        },
        AclField::Literal { value } => Resolution {
            values: vec![value.clone()],
            ..Resolution::default()
        },
        AclField::SymbolicRef { name, kind } => resolve_detailed(name, kind.namespace(), registry),
    }
}

/// Expand a statement into source-major, destination-next, service-minor rows.
pub fn expand(statement: &AclStatement, registry: &Registry) -> Vec<ExpandedRow> {
    expand_detailed(statement, registry).rows
}

/// Like [`expand`], also returning the cycles and dangling names met while resolving.
///
/// No deduplication happens across the product: identical triples reached
/// through different symbolic paths all appear.
pub fn expand_detailed(statement: &AclStatement, registry: &Registry) -> Expansion {
    let sources = resolve_field(&statement.source, registry);
    let destinations = resolve_field(&statement.destination, registry);
    let services = resolve_field(&statement.service, registry);

    let source_contents = contents(&statement.source, &sources);
    let destination_contents = contents(&statement.destination, &destinations);
    let service_contents = contents(&statement.service, &services);

    let size = product_size(&sources, &destinations, &services);
    let mut rows = Vec::with_capacity(size.min(PREALLOCATE_LIMIT));
    for source in &sources.values {
        for destination in &destinations.values {
            for service in &services.values {
                rows.push(ExpandedRow {
                    acl: statement.acl.clone(),
                    action: statement.action,
                    protocol: statement.protocol.clone(),
                    source: source.clone(),
                    source_origin: statement.source.origin().map(ToOwned::to_owned),
                    destination: destination.clone(),
                    destination_origin: statement.destination.origin().map(ToOwned::to_owned),
                    service: service.clone(),
                    service_origin: statement.service.origin().map(ToOwned::to_owned),
                    source_contents: source_contents.clone(),
                    destination_contents: destination_contents.clone(),
                    service_contents: service_contents.clone(),
                    line_number: statement.line_number,
                    log: statement.options.log.clone(),
                    time_range: statement.options.time_range.clone(),
                    inactive: statement.options.inactive,
                });
            }
        }
    }

    let mut cycles = sources.cycles;
    cycles.extend(destinations.cycles);
    cycles.extend(services.cycles);
    let mut dangling = sources.dangling;
    dangling.extend(destinations.dangling);
    dangling.extend(services.dangling);

    Expansion {
        rows,
        cycles,
        dangling,
    }
}

/// Newline-joined resolved values of a symbolic field; empty otherwise.
fn contents(field: &AclField, resolution: &Resolution) -> String {
    match field {
        AclField::SymbolicRef { .. } => resolution.values.join("\n"),
        _ => String::new(),
    }
}

/// Number of rows a statement expands to, saturating on overflow.
fn product_size(sources: &Resolution, destinations: &Resolution, services: &Resolution) -> usize {
    sources
        .values
        .len()
        .saturating_mul(destinations.values.len())
        .saturating_mul(services.values.len())
}
