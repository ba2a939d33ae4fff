//! Parsing of `access-list ... extended` statements.
//!
//! Fields are consumed left to right by small field parsers, each reporting how
//! many tokens it used. A [`Cursor`] composes them in the order the command
//! grammar requires: protocol, source, destination, optional service, then
//! trailing options.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use thiserror::Error;

use crate::netmask::{is_address, mask_to_prefix, split_prefix, subnet_value};
use crate::registry::{EntityKind, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Permit,
    Deny,
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Action::Permit => write!(f, "permit"),
            Action::Deny => write!(f, "deny"),
        }
    }
}

/// One positional field of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AclField {
    Any,
    Literal { value: String },
    SymbolicRef { name: String, kind: EntityKind },
}

impl AclField {
    fn literal(value: impl Into<String>) -> Self {
        AclField::Literal {
            value: value.into(),
        }
    }

    fn reference(name: &str, kind: EntityKind) -> Self {
        AclField::SymbolicRef {
            name: name.to_string(),
            kind,
        }
    }

    /// Name of the object or group this field came from, if symbolic.
    pub fn origin(&self) -> Option<&str> {
        match self {
            AclField::SymbolicRef { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Trailing options that follow the service field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AclOptions {
    /// Raw logging clause, e.g. `log informational interval 300`.
    pub log: Option<String>,
    pub time_range: Option<String>,
    pub inactive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclStatement {
    pub acl: String,
    pub action: Action,
    pub protocol: String,
    pub source: AclField,
    pub destination: AclField,
    /// `Any` when the statement carries no service field.
    pub service: AclField,
    pub options: AclOptions,
    /// 1-based line number, or 0 when parsed without position information.
    pub line_number: usize,
}

/// Why an ACL line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("not an access-list command")]
    NotAccessList,
    #[error("too few tokens")]
    TooFewTokens,
    #[error("unsupported access-list type '{kind}'")]
    UnsupportedType { kind: String },
    #[error("unknown action '{action}'")]
    BadAction { action: String },
    #[error("missing {field} field")]
    MissingField { field: &'static str },
    #[error("unexpected token '{token}' in {field} field")]
    UnexpectedToken { field: &'static str, token: String },
}

/// A malformed ACL line. The statement is dropped; processing continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("line {line_number}: {reason}: {line}")]
pub struct ParseFailure {
    pub line_number: usize,
    pub line: String,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldError {
    Missing,
    Unexpected(String),
}

type FieldResult = Result<(AclField, usize), FieldError>;

const SERVICE_OPERATORS: [&str; 4] = ["eq", "neq", "gt", "lt"];
const LOG_LEVELS: [&str; 10] = [
    "emergencies",
    "alerts",
    "critical",
    "errors",
    "warnings",
    "notifications",
    "informational",
    "debugging",
    "disable",
    "default",
];

/// Parse a source or destination field.
fn network_field(tokens: &[&str]) -> FieldResult {
    match tokens {
        [] | ["host" | "object" | "object-group" | "interface"] => Err(FieldError::Missing),
        ["any", ..] => Ok((AclField::Any, 1)),
        [keyword @ ("any4" | "any6"), ..] => Ok((AclField::literal(*keyword), 1)),
        ["host", address, ..] => Ok((AclField::literal(*address), 2)),
        ["object", name, ..] => Ok((AclField::reference(name, EntityKind::NetworkObject), 2)),
        ["object-group", name, ..] => {
            Ok((AclField::reference(name, EntityKind::NetworkGroup), 2))
        }
        ["interface", ifname, ..] => Ok((AclField::literal(format!("interface {ifname}")), 2)),
        [address, mask, ..] if is_address(address) && mask_to_prefix(mask).is_some() => {
            Ok((AclField::literal(subnet_value(address, mask)), 2))
        }
        [prefixed, ..] if split_prefix(prefixed).is_some() => {
            Ok((AclField::literal(*prefixed), 1))
        }
        [token, ..] => Err(FieldError::Unexpected(token.to_string())),
    }
}

/// Parse an optional service field. Consumes nothing when the field is absent.
fn service_field(tokens: &[&str]) -> FieldResult {
    match tokens {
        [] => Ok((AclField::Any, 0)),
        [keyword, ..] if is_option_keyword(keyword) => Ok((AclField::Any, 0)),
        ["eq", port, ..] => Ok((AclField::literal(*port), 2)),
        [op, port, ..] if SERVICE_OPERATORS.contains(op) => {
            Ok((AclField::literal(format!("{op} {port}")), 2))
        }
        ["range", start, end, ..] => Ok((AclField::literal(format!("{start}-{end}")), 3)),
        ["object", name, ..] => Ok((AclField::reference(name, EntityKind::ServiceObject), 2)),
        ["object-group", name, ..] => {
            Ok((AclField::reference(name, EntityKind::ServiceGroup), 2))
        }
        [op, ..] if SERVICE_OPERATORS.contains(op) => Err(FieldError::Missing),
        ["range" | "object" | "object-group", ..] => Err(FieldError::Missing),
        [token, ..] => Err(FieldError::Unexpected(token.to_string())),
    }
}

/// Parse the optional ICMP type (and numeric code) that icmp rules carry in
/// place of a port.
fn icmp_service_field(tokens: &[&str]) -> FieldResult {
    match tokens {
        [] => Ok((AclField::Any, 0)),
        [keyword, ..] if is_option_keyword(keyword) => Ok((AclField::Any, 0)),
        ["object-group"] => Err(FieldError::Missing),
        ["object-group", name, ..] => {
            Ok((AclField::reference(name, EntityKind::ServiceGroup), 2))
        }
        [icmp_type, code, ..] if code.parse::<u8>().is_ok() => {
            Ok((AclField::literal(format!("{icmp_type} {code}")), 2))
        }
        [icmp_type, ..] => Ok((AclField::literal(*icmp_type), 1)),
    }
}

fn is_icmp(protocol: &str) -> bool {
    matches!(protocol, "icmp" | "icmp6" | "1" | "58")
}

fn is_option_keyword(token: &str) -> bool {
    matches!(token, "log" | "time-range" | "inactive")
}

/// Token cursor over one ACL line.
struct Cursor<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            tokens: line.split_whitespace().collect(),
            pos: 0,
        }
    }

    fn rest(&self) -> &[&'a str] {
        &self.tokens[self.pos..]
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Run one field parser and advance by the number of tokens it consumed.
    fn field(
        &mut self,
        field: &'static str,
        parser: fn(&[&str]) -> FieldResult,
    ) -> Result<AclField, FailureReason> {
        let (value, used) = parser(self.rest()).map_err(|err| match err {
            FieldError::Missing => FailureReason::MissingField { field },
            FieldError::Unexpected(token) => FailureReason::UnexpectedToken { field, token },
        })?;
        self.pos += used;
        Ok(value)
    }
}

/// True for `access-list <name> [line N] remark ...` lines.
pub fn is_remark(line: &str) -> bool {
    let mut cursor = Cursor::new(line);
    if cursor.advance() != Some("access-list") || cursor.advance().is_none() {
        return false;
    }
    skip_line_number(&mut cursor).is_ok() && cursor.peek() == Some("remark")
}

/// Steps over an optional `line N` following the ACL name.
fn skip_line_number(cursor: &mut Cursor<'_>) -> Result<(), FailureReason> {
    if cursor.peek() == Some("line") {
        cursor.advance();
        cursor.advance().ok_or(FailureReason::TooFewTokens)?;
    }
    Ok(())
}

/// Parse one ACL line without position information.
pub fn parse(line: &str, registry: &Registry) -> Result<AclStatement, ParseFailure> {
    parse_line(0, line, registry)
}

/// Parse one ACL line, tagging the result with its 1-based line number.
///
/// The registry is consulted only to decide whether a symbolic protocol
/// (`object-group NAME` in protocol position) names a service group.
pub fn parse_line(
    line_number: usize,
    line: &str,
    registry: &Registry,
) -> Result<AclStatement, ParseFailure> {
    let line = line.trim();
    parse_tokens(line, registry).map_err(|reason| ParseFailure {
        line_number,
        line: line.to_string(),
        reason,
    })
    .map(|mut statement| {
        statement.line_number = line_number;
        statement
    })
}

fn parse_tokens(line: &str, registry: &Registry) -> Result<AclStatement, FailureReason> {
    let mut cursor = Cursor::new(line);
    if cursor.advance() != Some("access-list") {
        return Err(FailureReason::NotAccessList);
    }
    let acl = cursor.advance().ok_or(FailureReason::TooFewTokens)?.to_string();
    skip_line_number(&mut cursor)?;
    match cursor.advance().ok_or(FailureReason::TooFewTokens)? {
        "extended" => {}
        kind => {
            return Err(FailureReason::UnsupportedType {
                kind: kind.to_string(),
            })
        }
    }
    let action = match cursor.advance().ok_or(FailureReason::TooFewTokens)? {
        "permit" => Action::Permit,
        "deny" => Action::Deny,
        other => {
            return Err(FailureReason::BadAction {
                action: other.to_string(),
            })
        }
    };

    let (protocol, protocol_service) = parse_protocol(&mut cursor, registry)?;
    let source = cursor.field("source", network_field)?;
    let destination = cursor.field("destination", network_field)?;
    let service_parser: fn(&[&str]) -> FieldResult = if is_icmp(&protocol) {
        icmp_service_field
    } else {
        service_field
    };
    let mut service = cursor.field("service", service_parser)?;
    if service == AclField::Any {
        if let Some(reference) = protocol_service {
            service = reference;
        }
    }
    let options = parse_options(&mut cursor)?;

    Ok(AclStatement {
        acl,
        action,
        protocol,
        source,
        destination,
        service,
        options,
        line_number: 0,
    })
}

/// Protocol position: a keyword/number, or a symbolic protocol/service reference.
///
/// Returns the protocol text and, when the reference names a service
/// object or service group, the service field it implies.
fn parse_protocol(
    cursor: &mut Cursor<'_>,
    registry: &Registry,
) -> Result<(String, Option<AclField>), FailureReason> {
    let token = cursor.advance().ok_or(FailureReason::MissingField { field: "protocol" })?;
    let kind = match token {
        "object-group" => EntityKind::ServiceGroup,
        "object" => EntityKind::ServiceObject,
        other => return Ok((other.to_string(), None)),
    };
    let name = cursor
        .advance()
        .ok_or(FailureReason::MissingField { field: "protocol" })?;
    let service = registry
        .contains(name, kind)
        .then(|| AclField::reference(name, kind));
    Ok((name.to_string(), service))
}

fn parse_options(cursor: &mut Cursor<'_>) -> Result<AclOptions, FailureReason> {
    let mut options = AclOptions::default();
    while let Some(token) = cursor.advance() {
        match token {
            "log" => {
                let mut clause = vec![token];
                if let Some(level) = cursor.peek() {
                    if LOG_LEVELS.contains(&level) || level.parse::<u8>().is_ok_and(|l| l <= 7) {
                        clause.push(level);
                        cursor.advance();
                    }
                }
                if cursor.peek() == Some("interval") {
                    clause.push("interval");
                    cursor.advance();
                    let secs = cursor
                        .advance()
                        .ok_or(FailureReason::MissingField { field: "log interval" })?;
                    clause.push(secs);
                }
                options.log = Some(clause.join(" "));
            }
            "time-range" => {
                let name = cursor
                    .advance()
                    .ok_or(FailureReason::MissingField { field: "time-range" })?;
                options.time_range = Some(name.to_string());
            }
            "inactive" => options.inactive = true,
            other => {
                return Err(FailureReason::UnexpectedToken {
                    field: "options",
                    token: other.to_string(),
                })
            }
        }
    }
    Ok(options)
}
