//! In-memory store of named objects and object-groups.
//!
//! The [`Registry`] is built by a single linear pass over the configuration
//! and never mutated afterwards. Network and service names live in separate
//! namespaces, so a network group and a service group may share a name.
//!
//! Redefining an object or group with the same name and kind replaces the
//! earlier definition: last write wins, no error is reported.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::line::{classify, LineKind};
use crate::netmask::{range_value, subnet_value};

/// The namespace a name is resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Network,
    Service,
}

/// The four kinds of named entity a header line can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    NetworkObject,
    ServiceObject,
    NetworkGroup,
    ServiceGroup,
}

impl EntityKind {
    /// Namespace this entity kind belongs to.
    pub fn namespace(self) -> ObjectKind {
        match self {
            EntityKind::NetworkObject | EntityKind::NetworkGroup => ObjectKind::Network,
            EntityKind::ServiceObject | EntityKind::ServiceGroup => ObjectKind::Service,
        }
    }
}

/// Literal definition of a network object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum NetworkDefinition {
    Host(String),
    Subnet { address: String, mask: String },
    Range { start: String, end: String },
}

impl NetworkDefinition {
    /// Concrete value used in expanded rows.
    pub fn value(&self) -> String {
        match self {
            NetworkDefinition::Host(address) => address.clone(),
            NetworkDefinition::Subnet { address, mask } => subnet_value(address, mask),
            NetworkDefinition::Range { start, end } => range_value(start, end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkObject {
    pub name: String,
    /// `None` for objects whose body uses a form this tool does not model (e.g. `fqdn`).
    pub definition: Option<NetworkDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceObject {
    pub name: String,
    /// Free-form protocol/port description, e.g. `tcp destination eq 443`.
    pub definition: Option<String>,
}

/// One entry of an object-group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Member {
    Literal(String),
    Reference(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectGroup {
    pub name: String,
    pub kind: ObjectKind,
    /// Declared order; it drives output row order.
    pub members: Vec<Member>,
}

/// What a name denotes inside one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// A single object; `None` when the object has no usable definition.
    Object(Option<String>),
    Group(&'a [Member]),
}

/// Per-kind entity counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryCounts {
    pub network_objects: usize,
    pub service_objects: usize,
    pub network_groups: usize,
    pub service_groups: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Registry {
    network_objects: BTreeMap<String, NetworkObject>,
    service_objects: BTreeMap<String, ServiceObject>,
    network_groups: BTreeMap<String, ObjectGroup>,
    service_groups: BTreeMap<String, ObjectGroup>,
}

impl Registry {
    /// Build a registry from configuration lines in one pass.
    ///
    /// Never fails; lines that are not part of an object or object-group
    /// definition are skipped.
    pub fn build<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut registry = Registry::default();
        let mut context: Option<(EntityKind, String)> = None;

        for line in lines {
            match classify(line) {
                LineKind::NetworkObjectHeader(name) => {
                    context = Some(registry.open(EntityKind::NetworkObject, name));
                }
                LineKind::ServiceObjectHeader(name) => {
                    context = Some(registry.open(EntityKind::ServiceObject, name));
                }
                LineKind::NetworkGroupHeader(name) => {
                    context = Some(registry.open(EntityKind::NetworkGroup, name));
                }
                LineKind::ServiceGroupHeader(name) => {
                    context = Some(registry.open(EntityKind::ServiceGroup, name));
                }
                LineKind::UnsupportedHeader(_)
                | LineKind::AclLine(_)
                | LineKind::Blank
                | LineKind::SectionEnd => context = None,
                LineKind::Other => {}
                member => {
                    if let Some((kind, name)) = &context {
                        registry.apply_member(*kind, name, member);
                    }
                }
            }
        }

        registry
    }

    /// Build a registry from a whole configuration text.
    pub fn from_text(text: &str) -> Self {
        Self::build(text.lines())
    }

    fn open(&mut self, kind: EntityKind, name: String) -> (EntityKind, String) {
        debug!(?kind, name = %name, "opening definition");
        let replaced = match kind {
            EntityKind::NetworkObject => self
                .network_objects
                .insert(
                    name.clone(),
                    NetworkObject {
                        name: name.clone(),
                        definition: None,
                    },
                )
                .is_some(),
            EntityKind::ServiceObject => self
                .service_objects
                .insert(
                    name.clone(),
                    ServiceObject {
                        name: name.clone(),
                        definition: None,
                    },
                )
                .is_some(),
            EntityKind::NetworkGroup => self
                .network_groups
                .insert(name.clone(), empty_group(&name, ObjectKind::Network))
                .is_some(),
            EntityKind::ServiceGroup => self
                .service_groups
                .insert(name.clone(), empty_group(&name, ObjectKind::Service))
                .is_some(),
        };
        if replaced {
            debug!(?kind, name = %name, "redefinition replaces earlier definition");
        }
        (kind, name)
    }

    fn apply_member(&mut self, kind: EntityKind, name: &str, member: LineKind) {
        match kind {
            EntityKind::NetworkObject => {
                let definition = match member {
                    LineKind::HostMember(address) => NetworkDefinition::Host(address),
                    LineKind::SubnetMember { address, mask } => {
                        NetworkDefinition::Subnet { address, mask }
                    }
                    LineKind::RangeMember { start, end } => NetworkDefinition::Range { start, end },
                    _ => return,
                };
                if let Some(object) = self.network_objects.get_mut(name) {
                    object.definition = Some(definition);
                }
            }
            EntityKind::ServiceObject => {
                let LineKind::ServiceMember(text) = member else {
                    return;
                };
                if let Some(object) = self.service_objects.get_mut(name) {
                    object.definition = Some(text);
                }
            }
            EntityKind::NetworkGroup => {
                let entry = match member {
                    LineKind::HostMember(address) => Member::Literal(address),
                    LineKind::SubnetMember { address, mask } => {
                        Member::Literal(subnet_value(&address, &mask))
                    }
                    LineKind::RangeMember { start, end } => {
                        Member::Literal(range_value(&start, &end))
                    }
                    LineKind::GroupRefMember(target) => Member::Reference(target),
                    _ => return,
                };
                if let Some(group) = self.network_groups.get_mut(name) {
                    group.members.push(entry);
                }
            }
            EntityKind::ServiceGroup => {
                let entry = match member {
                    LineKind::ServiceMember(text) => Member::Literal(text),
                    LineKind::GroupRefMember(target) => Member::Reference(target),
                    _ => return,
                };
                if let Some(group) = self.service_groups.get_mut(name) {
                    group.members.push(entry);
                }
            }
        }
    }

    /// Look up `name` in one namespace. Objects take precedence over groups.
    pub fn lookup(&self, name: &str, kind: ObjectKind) -> Option<Lookup<'_>> {
        match kind {
            ObjectKind::Network => {
                if let Some(object) = self.network_objects.get(name) {
                    return Some(Lookup::Object(
                        object.definition.as_ref().map(NetworkDefinition::value),
                    ));
                }
                self.network_groups
                    .get(name)
                    .map(|g| Lookup::Group(&g.members))
            }
            ObjectKind::Service => {
                if let Some(object) = self.service_objects.get(name) {
                    return Some(Lookup::Object(object.definition.clone()));
                }
                self.service_groups
                    .get(name)
                    .map(|g| Lookup::Group(&g.members))
            }
        }
    }

    /// True when `name` is defined as an entity of exactly this kind.
    pub fn contains(&self, name: &str, kind: EntityKind) -> bool {
        match kind {
            EntityKind::NetworkObject => self.network_objects.contains_key(name),
            EntityKind::ServiceObject => self.service_objects.contains_key(name),
            EntityKind::NetworkGroup => self.network_groups.contains_key(name),
            EntityKind::ServiceGroup => self.service_groups.contains_key(name),
        }
    }

    pub fn network_object(&self, name: &str) -> Option<&NetworkObject> {
        self.network_objects.get(name)
    }

    pub fn group(&self, name: &str, kind: ObjectKind) -> Option<&ObjectGroup> {
        match kind {
            ObjectKind::Network => self.network_groups.get(name),
            ObjectKind::Service => self.service_groups.get(name),
        }
    }

    /// Network objects in name order.
    pub fn iter_network_objects(&self) -> impl Iterator<Item = &NetworkObject> {
        self.network_objects.values()
    }

    /// Service objects in name order.
    pub fn iter_service_objects(&self) -> impl Iterator<Item = &ServiceObject> {
        self.service_objects.values()
    }

    /// Groups of one kind in name order.
    pub fn iter_groups(&self, kind: ObjectKind) -> impl Iterator<Item = &ObjectGroup> {
        match kind {
            ObjectKind::Network => self.network_groups.values(),
            ObjectKind::Service => self.service_groups.values(),
        }
    }

    pub fn counts(&self) -> RegistryCounts {
        RegistryCounts {
            network_objects: self.network_objects.len(),
            service_objects: self.service_objects.len(),
            network_groups: self.network_groups.len(),
            service_groups: self.service_groups.len(),
        }
    }
}

fn empty_group(name: &str, kind: ObjectKind) -> ObjectGroup {
    ObjectGroup {
        name: name.to_string(),
        kind,
        members: Vec::new(),
    }
}
