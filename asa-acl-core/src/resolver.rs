//! Cycle-safe resolution of symbolic names into concrete leaf values.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::registry::{Lookup, Member, ObjectKind, Registry};

/// Keywords that stand for "every address" and never hit the registry.
const ANY_KEYWORDS: [&str; 3] = ["any", "any4", "any6"];

/// Outcome of resolving one name, with the diagnostics gathered on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Concrete values in first-visit order, without duplicates.
    pub values: Vec<String>,
    /// Names whose back-edge to an ancestor was short-circuited.
    pub cycles: Vec<String>,
    /// Names absent from the registry that fell back to themselves.
    pub dangling: Vec<String>,
}

enum Work<'a> {
    Visit(&'a str),
    Emit(&'a str),
    Leave(&'a str),
}

/// Resolve `name` within `kind` to its ordered, deduplicated leaf values.
pub fn resolve(name: &str, kind: ObjectKind, registry: &Registry) -> Vec<String> {
    resolve_detailed(name, kind, registry).values
}

/// Resolve `name` and report cycles and dangling references alongside the values.
///
/// Traversal is an iterative pre-order walk: group members are expanded in
/// declared order and each name is expanded at most once per call, so the walk
/// terminates after visiting every reachable name once.
pub fn resolve_detailed(name: &str, kind: ObjectKind, registry: &Registry) -> Resolution {
    if ANY_KEYWORDS.contains(&name) {
        return Resolution {
            values: vec![name.to_string()],
            ..Resolution::default()
        };
    }

    let mut out = Resolution::default();
    let mut emitted: HashSet<String> = HashSet::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_path: HashSet<&str> = HashSet::new();
    let mut stack = vec![Work::Visit(name)];

    let mut emit = |out: &mut Resolution, value: &str| {
        if emitted.insert(value.to_string()) {
            out.values.push(value.to_string());
        }
    };

    while let Some(work) = stack.pop() {
        match work {
            Work::Leave(current) => {
                on_path.remove(current);
            }
            Work::Emit(value) => emit(&mut out, value),
            Work::Visit(current) => {
                if !visited.insert(current) {
                    if on_path.contains(current) {
                        debug!(name = %current, root = %name, "reference cycle short-circuited");
                        out.cycles.push(current.to_string());
                    }
                    continue;
                }
                match registry.lookup(current, kind) {
                    None => {
                        debug!(name = %current, ?kind, "dangling reference kept as literal");
                        out.dangling.push(current.to_string());
                        emit(&mut out, current);
                    }
                    Some(Lookup::Object(Some(value))) => emit(&mut out, &value),
                    Some(Lookup::Object(None)) => emit(&mut out, current),
                    Some(Lookup::Group(members)) => {
                        on_path.insert(current);
                        stack.push(Work::Leave(current));
                        for member in members.iter().rev() {
                            stack.push(match member {
                                Member::Literal(value) => Work::Emit(value),
                                Member::Reference(target) => Work::Visit(target),
                            });
                        }
                    }
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{resolve, resolve_detailed};
    use crate::registry::{ObjectKind, Registry};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn any_short_circuits() {
        let registry = Registry::from_text("object-group network any\n network-object host 1.1.1.1\n");
        assert_eq!(resolve("any", ObjectKind::Network, &registry), strings(&["any"]));
    }

    #[test]
    fn nested_groups_flatten_in_pre_order() {
        let registry = Registry::from_text(
            "object-group network OUTER
 network-object host 10.0.0.1
 group-object INNER
 network-object host 10.0.0.4
object-group network INNER
 network-object host 10.0.0.2
 network-object host 10.0.0.3
",
        );
        assert_eq!(
            resolve("OUTER", ObjectKind::Network, &registry),
            strings(&["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"])
        );
    }

    #[test]
    fn two_node_cycle_terminates() {
        let registry = Registry::from_text(
            "object-group network A
 network-object host 10.0.0.1
 group-object B
object-group network B
 network-object host 10.0.0.2
 group-object A
",
        );
        let resolution = resolve_detailed("A", ObjectKind::Network, &registry);
        assert_eq!(resolution.values, strings(&["10.0.0.1", "10.0.0.2"]));
        assert_eq!(resolution.cycles, strings(&["A"]));
        assert!(resolution.dangling.is_empty());
    }

    #[test]
    fn self_reference_terminates() {
        let registry = Registry::from_text(
            "object-group service SELF
 port-object eq 22
 group-object SELF
",
        );
        let resolution = resolve_detailed("SELF", ObjectKind::Service, &registry);
        assert_eq!(resolution.values, strings(&["22"]));
        assert_eq!(resolution.cycles.len(), 1);
    }

    #[test]
    fn diamond_keeps_first_occurrence_and_is_not_a_cycle() {
        let registry = Registry::from_text(
            "object-group network TOP
 group-object LEFT
 group-object RIGHT
object-group network LEFT
 group-object SHARED
 network-object host 10.0.0.1
object-group network RIGHT
 network-object host 10.0.0.1
 group-object SHARED
object-group network SHARED
 network-object host 10.9.0.1
",
        );
        let resolution = resolve_detailed("TOP", ObjectKind::Network, &registry);
        assert_eq!(resolution.values, strings(&["10.9.0.1", "10.0.0.1"]));
        assert!(resolution.cycles.is_empty());
    }

    #[test]
    fn dangling_reference_falls_back_to_name() {
        let registry = Registry::default();
        let resolution = resolve_detailed("GHOST", ObjectKind::Network, &registry);
        assert_eq!(resolution.values, strings(&["GHOST"]));
        assert_eq!(resolution.dangling, strings(&["GHOST"]));
    }

    #[test]
    fn nested_dangling_reference_falls_back_to_name() {
        let registry = Registry::from_text(
            "object-group network G
 group-object MISSING
 network-object host 10.0.0.1
",
        );
        assert_eq!(
            resolve("G", ObjectKind::Network, &registry),
            strings(&["MISSING", "10.0.0.1"])
        );
    }

    #[test]
    fn references_stay_within_their_namespace() {
        let registry = Registry::from_text(
            "object-group service WEB
 port-object eq 80
object-group network SITES
 group-object WEB
",
        );
        assert_eq!(
            resolve("SITES", ObjectKind::Network, &registry),
            strings(&["WEB"])
        );
    }

    #[test]
    fn objects_resolve_to_their_value() {
        let registry = Registry::from_text(
            "object network DMZ
 range 10.0.0.10 10.0.0.20
object service SSH
 service tcp destination eq 22
object-group service ADMIN
 service-object object SSH
",
        );
        assert_eq!(
            resolve("DMZ", ObjectKind::Network, &registry),
            strings(&["10.0.0.10-10.0.0.20"])
        );
        assert_eq!(
            resolve("ADMIN", ObjectKind::Service, &registry),
            strings(&["tcp destination eq 22"])
        );
    }

    #[test]
    fn repeated_calls_do_not_share_state() {
        let registry = Registry::from_text("object-group network G\n network-object host 10.0.0.1\n");
        let first = resolve("G", ObjectKind::Network, &registry);
        let second = resolve("G", ObjectKind::Network, &registry);
        assert_eq!(first, second);
    }
}
