use std::path::PathBuf;

use asa_acl_core::{flatten, flatten_file, FailureReason, FlattenOptions};
use pretty_assertions::assert_eq;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn triples(report: &asa_acl_core::FlattenReport) -> Vec<(String, String, String)> {
    report
        .rows
        .iter()
        .map(|r| (r.source.clone(), r.destination.clone(), r.service.clone()))
        .collect()
}

#[test]
fn web_servers_scenario_expands_to_four_rows_in_order() {
    let report = flatten_file(&fixture("fixtures/web-servers.cfg"), &FlattenOptions::default())
        .expect("read fixture");

    let expected = [
        ("10.0.0.1", "any", "80"),
        ("10.0.0.1", "any", "443"),
        ("10.0.0.2", "any", "80"),
        ("10.0.0.2", "any", "443"),
    ]
    .iter()
    .map(|(s, d, v)| (s.to_string(), d.to_string(), v.to_string()))
    .collect::<Vec<_>>();

    assert_eq!(triples(&report), expected);
    assert!(report.rows.iter().all(|r| r.acl == "OUTSIDE_IN"));
    assert!(report.rows.iter().all(|r| r.protocol == "tcp"));
    assert_eq!(report.rows[0].source_origin.as_deref(), Some("WEB_SERVERS"));
    assert_eq!(report.rows[0].destination_origin, None);
    assert_eq!(report.rows[0].service_origin.as_deref(), Some("WEB_PORTS"));
    for row in &report.rows {
        assert_eq!(row.source_contents, "10.0.0.1\n10.0.0.2");
        assert_eq!(row.destination_contents, "");
        assert_eq!(row.service_contents, "80\n443");
    }
    assert!(report.failures.is_empty());
}

#[test]
fn edge_config_counts() {
    let report = flatten_file(&fixture("fixtures/asa-edge.cfg"), &FlattenOptions::default())
        .expect("read fixture");

    assert_eq!(report.stats.remarks, 1);
    assert_eq!(report.stats.statements_parsed, 7);
    assert_eq!(report.stats.statements_skipped, 2);
    assert_eq!(report.stats.cycles_short_circuited, 1);
    assert_eq!(report.stats.dangling_references, 1);
    assert_eq!(report.registry.network_objects, 5);
    assert_eq!(report.registry.service_objects, 1);
    assert_eq!(report.registry.network_groups, 5);
    assert_eq!(report.registry.service_groups, 2);
}

#[test]
fn edge_config_rows() {
    let report = flatten_file(&fixture("fixtures/asa-edge.cfg"), &FlattenOptions::default())
        .expect("read fixture");

    let web: Vec<_> = report.rows.iter().filter(|r| r.line_number == 59).collect();
    assert_eq!(web.len(), 4);
    assert_eq!(web[0].destination, "10.10.1.11");
    assert_eq!(web[0].service, "www");
    assert_eq!(web[1].service, "https");
    assert_eq!(web[3].destination, "10.10.1.12");

    // MGMT in protocol position supplies the service column.
    let mgmt: Vec<_> = report.rows.iter().filter(|r| r.line_number == 62).collect();
    assert_eq!(mgmt.len(), 3 * 2 * 2);
    assert_eq!(mgmt[0].protocol, "MGMT");
    assert_eq!(mgmt[0].source, "10.10.5.5");
    assert_eq!(mgmt[0].destination, "10.10.2.0/24");
    assert_eq!(mgmt[0].service, "tcp destination eq ssh");
    assert_eq!(mgmt[1].service, "tcp destination eq 8443");
    assert_eq!(mgmt[2].destination, "10.10.1.11");
    assert_eq!(mgmt[4].destination, "10.10.1.12");
    assert_eq!(mgmt[6].source, "10.10.6.0/25");

    let pool: Vec<_> = report.rows.iter().filter(|r| r.line_number == 63).collect();
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].source, "10.10.9.100-10.10.9.200");

    let looped: Vec<_> = report.rows.iter().filter(|r| r.line_number == 64).collect();
    assert_eq!(looped.len(), 2);
    assert_eq!(looped[0].source, "192.0.2.1");
    assert_eq!(looped[1].source, "192.0.2.2");
    assert_eq!(looped[0].destination, "PARTNER_SITE");
    assert_eq!(looped[0].service, "1000-1010");
    assert!(looped[0].inactive);

    let ghost: Vec<_> = report.rows.iter().filter(|r| r.line_number == 65).collect();
    assert_eq!(ghost[0].source, "GHOST");
    assert_eq!(ghost[0].service, "domain");
}

#[test]
fn edge_config_failures_carry_raw_lines() {
    let report = flatten_file(&fixture("fixtures/asa-edge.cfg"), &FlattenOptions::default())
        .expect("read fixture");

    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].line, "access-list INSIDE_OUT extended permit");
    assert_eq!(
        report.failures[0].reason,
        FailureReason::MissingField { field: "protocol" }
    );
    assert_eq!(
        report.failures[1].reason,
        FailureReason::UnsupportedType {
            kind: "standard".to_string()
        }
    );
}

#[test]
fn malformed_line_does_not_stop_later_lines() {
    let report = flatten(
        "access-list BAD extended permit
access-list GOOD extended permit ip any any
",
        &FlattenOptions::default(),
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].line_number, 1);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].acl, "GOOD");
}

#[test]
fn numbered_remarks_and_icmp_rules_are_not_failures() {
    let report = flatten(
        "object-group network PINGERS
 network-object host 10.0.0.1
 network-object host 10.0.0.2
access-list IN line 1 remark allow monitoring
access-list IN line 2 extended permit icmp object-group PINGERS any echo-reply
",
        &FlattenOptions::default(),
    );
    assert!(report.failures.is_empty());
    assert_eq!(report.stats.remarks, 1);
    assert_eq!(
        triples(&report),
        vec![
            ("10.0.0.1".to_string(), "any".to_string(), "echo-reply".to_string()),
            ("10.0.0.2".to_string(), "any".to_string(), "echo-reply".to_string()),
        ]
    );
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = flatten_file(&dir.path().join("nope.cfg"), &FlattenOptions::default())
        .expect_err("missing file");
    assert!(err.to_string().contains("failed to read config file"));
}
