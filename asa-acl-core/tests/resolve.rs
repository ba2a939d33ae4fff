use asa_acl_core::{expand, parse, resolve, ObjectKind, Registry};
use pretty_assertions::assert_eq;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn any_resolves_to_itself_regardless_of_registry() {
    let empty = Registry::default();
    let shadowing = Registry::from_text(
        "object network any
 host 10.0.0.1
object-group network any
 network-object host 10.0.0.2
",
    );
    for registry in [&empty, &shadowing] {
        assert_eq!(resolve("any", ObjectKind::Network, registry), strings(&["any"]));
    }
}

#[test]
fn ghost_group_resolves_to_its_name() {
    let registry = Registry::default();
    assert_eq!(
        resolve("GHOST", ObjectKind::Network, &registry),
        strings(&["GHOST"])
    );
}

#[test]
fn cycle_gives_the_same_result_as_without_the_back_edge() {
    let cyclic = Registry::from_text(
        "object-group network A
 network-object host 10.0.0.1
 group-object B
object-group network B
 network-object host 10.0.0.2
 group-object C
 group-object A
object-group network C
 network-object host 10.0.0.3
",
    );
    let acyclic = Registry::from_text(
        "object-group network A
 network-object host 10.0.0.1
 group-object B
object-group network B
 network-object host 10.0.0.2
 group-object C
object-group network C
 network-object host 10.0.0.3
",
    );
    assert_eq!(
        resolve("A", ObjectKind::Network, &cyclic),
        resolve("A", ObjectKind::Network, &acyclic)
    );
    assert_eq!(
        resolve("A", ObjectKind::Network, &cyclic),
        strings(&["10.0.0.1", "10.0.0.2", "10.0.0.3"])
    );
}

#[test]
fn deep_chain_resolves_every_leaf_once() {
    let mut config = String::new();
    for i in 0..200 {
        config.push_str(&format!(
            "object-group network G{i}\n network-object host 10.0.{}.{}\n group-object G{}\n",
            i / 250,
            i % 250,
            i + 1
        ));
    }
    config.push_str("object-group network G200\n group-object G0\n");
    let registry = Registry::from_text(&config);

    let values = resolve("G0", ObjectKind::Network, &registry);
    assert_eq!(values.len(), 200);
    assert_eq!(values[0], "10.0.0.0");
    assert_eq!(values[199], "10.0.0.199");
}

#[test]
fn expansion_rows_are_members_of_resolved_sets() {
    let registry = Registry::from_text(
        "object-group network S
 network-object host 10.0.0.1
 network-object host 10.0.0.2
object-group network D
 network-object 172.16.0.0 255.255.0.0
 group-object S
object-group service P
 port-object eq 22
 port-object range 5000 5010
 port-object eq 443
",
    );
    let statement = parse(
        "access-list X extended permit tcp object-group S object-group D object-group P",
        &registry,
    )
    .expect("parse");

    let sources = resolve("S", ObjectKind::Network, &registry);
    let destinations = resolve("D", ObjectKind::Network, &registry);
    let services = resolve("P", ObjectKind::Service, &registry);
    let rows = expand(&statement, &registry);

    assert_eq!(rows.len(), sources.len() * destinations.len() * services.len());
    for row in &rows {
        assert!(sources.contains(&row.source));
        assert!(destinations.contains(&row.destination));
        assert!(services.contains(&row.service));
    }
}
