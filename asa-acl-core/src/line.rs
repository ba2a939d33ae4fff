//! Syntactic classification of single configuration lines.
//!
//! Every line is examined in isolation by its leading keyword and token count.
//! Lines that belong to command families irrelevant to ACL auditing classify as
//! [`LineKind::Other`] and are skipped by every consumer.

use serde::Serialize;

/// The syntactic category of one configuration line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum LineKind {
    /// `object network <name>`
    NetworkObjectHeader(String),
    /// `object service <name>`
    ServiceObjectHeader(String),
    /// `object-group network <name>`
    NetworkGroupHeader(String),
    /// `object-group service <name> [tcp|udp|tcp-udp]`
    ServiceGroupHeader(String),
    /// `object-group <protocol|icmp-type|user|security|...> <name>`
    UnsupportedHeader(String),
    /// `host <addr>` or `network-object host <addr>`
    HostMember(String),
    /// `subnet <addr> <mask>` or `network-object <addr> <mask>`
    SubnetMember { address: String, mask: String },
    /// `range <start> <end>`
    RangeMember { start: String, end: String },
    /// `group-object <name>`, `network-object object <name>`, `service-object object <name>`
    GroupRefMember(String),
    /// `service-object ...`, `port-object ...`, `service ...`
    ServiceMember(String),
    /// Any `access-list` command, untouched apart from trimming.
    AclLine(String),
    Blank,
    /// `!`, `exit` or `end`
    SectionEnd,
    Other,
}

/// Classify one configuration line.
pub fn classify(line: &str) -> LineKind {
    let line = line.trim();
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&keyword) = tokens.first() else {
        return LineKind::Blank;
    };

    match keyword {
        "exit" | "end" if tokens.len() == 1 => LineKind::SectionEnd,
        k if k.starts_with('!') => LineKind::SectionEnd,
        "object" => classify_object_header(&tokens),
        "object-group" => classify_group_header(&tokens),
        "host" if tokens.len() == 2 => LineKind::HostMember(tokens[1].to_string()),
        "subnet" if tokens.len() == 3 => LineKind::SubnetMember {
            address: tokens[1].to_string(),
            mask: tokens[2].to_string(),
        },
        "range" if tokens.len() == 3 => LineKind::RangeMember {
            start: tokens[1].to_string(),
            end: tokens[2].to_string(),
        },
        "network-object" => classify_network_object(&tokens[1..]),
        "group-object" if tokens.len() == 2 => LineKind::GroupRefMember(tokens[1].to_string()),
        "service-object" => match &tokens[1..] {
            ["object", name] => LineKind::GroupRefMember(name.to_string()),
            [] => LineKind::Other,
            rest => LineKind::ServiceMember(rest.join(" ")),
        },
        "port-object" => classify_port_object(&tokens[1..]),
        "service" if tokens.len() > 1 => LineKind::ServiceMember(tokens[1..].join(" ")),
        "access-list" => LineKind::AclLine(line.to_string()),
        _ => LineKind::Other,
    }
}

fn classify_object_header(tokens: &[&str]) -> LineKind {
    match tokens {
        [_, "network", name, ..] => LineKind::NetworkObjectHeader(name.to_string()),
        [_, "service", name, ..] => LineKind::ServiceObjectHeader(name.to_string()),
        _ => LineKind::Other,
    }
}

fn classify_group_header(tokens: &[&str]) -> LineKind {
    match tokens {
        [_, "network", name, ..] => LineKind::NetworkGroupHeader(name.to_string()),
        [_, "service", name, ..] => LineKind::ServiceGroupHeader(name.to_string()),
        [_, _, name, ..] => LineKind::UnsupportedHeader(name.to_string()),
        _ => LineKind::Other,
    }
}

fn classify_network_object(rest: &[&str]) -> LineKind {
    match rest {
        ["host", address] => LineKind::HostMember(address.to_string()),
        ["object", name] => LineKind::GroupRefMember(name.to_string()),
        [address, mask] => LineKind::SubnetMember {
            address: address.to_string(),
            mask: mask.to_string(),
        },
        [prefixed] => match crate::netmask::split_prefix(prefixed) {
            Some((address, len)) => LineKind::SubnetMember {
                address: address.to_string(),
                mask: len.to_string(),
            },
            None => LineKind::Other,
        },
        _ => LineKind::Other,
    }
}

fn classify_port_object(rest: &[&str]) -> LineKind {
    match rest {
        [] => LineKind::Other,
        ["eq", port] => LineKind::ServiceMember(port.to_string()),
        ["range", start, end] => LineKind::ServiceMember(format!("{start}-{end}")),
        _ => LineKind::ServiceMember(rest.join(" ")),
    }
}
