use cdpscan::export::{CSV_COLUMNS, to_csv_string};
use cdpscan::neighbor::{NeighborRecord, parse_neighbors};

const IOS_FIXTURE: &str = include_str!("fixtures/ios_cdp_detail.txt");
const NXOS_FIXTURE: &str = include_str!("fixtures/nxos_cdp_detail.txt");
const TELNET_FIXTURE: &str = include_str!("fixtures/telnet_capture.txt");

#[test]
fn ios_fixture_yields_every_neighbor_in_order() {
    let records = parse_neighbors(IOS_FIXTURE);

    let ids: Vec<&str> = records.iter().map(|r| r.device_id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["dist-sw01.example.net", "SEP001122334455", "ap-floor2"]
    );
}

#[test]
fn ios_fixture_fills_all_fields() {
    let records = parse_neighbors(IOS_FIXTURE);

    assert_eq!(
        records[0],
        NeighborRecord {
            device_id: "dist-sw01.example.net".to_string(),
            ip_address: Some("10.10.0.2".to_string()),
            platform: Some("cisco WS-C3850-48P".to_string()),
            capabilities: Some("Switch IGMP".to_string()),
            interface: Some("GigabitEthernet1/0/49".to_string()),
            port_id: Some("TenGigabitEthernet1/1/1".to_string()),
            management_address: Some("10.10.0.2".to_string()),
        }
    );

    let phone = &records[1];
    assert_eq!(phone.platform.as_deref(), Some("Cisco IP Phone 8841"));
    assert_eq!(
        phone.capabilities.as_deref(),
        Some("Host Phone Two-port Mac Relay")
    );
    assert_eq!(phone.port_id.as_deref(), Some("Port 1"));
}

#[test]
fn empty_management_section_leaves_field_unset() {
    let records = parse_neighbors(IOS_FIXTURE);

    let ap = &records[2];
    assert_eq!(ap.ip_address.as_deref(), Some("10.30.1.14"));
    assert!(ap.management_address.is_none());
}

#[test]
fn ios_fixture_csv_has_five_columns() {
    let csv = to_csv_string(&parse_neighbors(IOS_FIXTURE));
    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();

    assert_eq!(lines[0], CSV_COLUMNS.join(","));
    assert_eq!(
        lines[1],
        "dist-sw01.example.net,10.10.0.2,cisco WS-C3850-48P,Switch IGMP,GigabitEthernet1/0/49"
    );
    assert_eq!(lines.len(), 4);
}

#[test]
fn nxos_fixture_uses_ipv4_spelling() {
    let records = parse_neighbors(NXOS_FIXTURE);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].device_id, "n9k-spine1(FDO12345678)");
    assert_eq!(records[0].ip_address.as_deref(), Some("192.168.10.1"));
    assert_eq!(records[0].interface.as_deref(), Some("Ethernet1/49"));
    assert_eq!(records[1].ip_address.as_deref(), Some("192.168.10.2"));
    // The last block has no trailing separator.
    assert_eq!(records[1].interface.as_deref(), Some("Ethernet1/50"));
}

#[test]
fn telnet_capture_ignores_login_noise() {
    let records = parse_neighbors(TELNET_FIXTURE);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].device_id, "core-sw01");
    assert_eq!(records[0].interface.as_deref(), Some("Gi1/0/1"));
    assert_eq!(records[1].device_id, "rtr-wan01");
    assert_eq!(records[1].platform.as_deref(), Some("Cisco ISR4331/K9"));
    assert_eq!(
        records[1].capabilities.as_deref(),
        Some("Router Switch IGMP")
    );
}

#[test]
fn n_separated_blocks_yield_n_records() {
    for n in 0..12 {
        let raw: String = (0..n)
            .map(|i| format!("Device ID: dev{i}\nIP address: 10.0.0.{i}\n---\n"))
            .collect();

        let records = parse_neighbors(&raw);

        assert_eq!(records.len(), n);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.device_id, format!("dev{i}"));
        }
    }
}

#[test]
fn back_to_back_records_keep_fields_apart() {
    let raw = "Device ID: first\nPlatform: cisco C9300, Capabilities: Switch\nDevice ID: second\nInterface: Gi0/1,  Port ID (outgoing port): Gi0/2\n";

    let records = parse_neighbors(raw);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].platform.as_deref(), Some("cisco C9300"));
    assert!(records[0].interface.is_none());
    assert!(records[1].platform.is_none());
    assert_eq!(records[1].interface.as_deref(), Some("Gi0/1"));
}

#[test]
fn management_address_is_parsed_but_not_serialized() {
    let raw = "Device ID: m1\nManagement address(es):\n\nIP address: 10.0.0.9\n---\n";

    let records = parse_neighbors(raw);
    assert_eq!(records[0].management_address.as_deref(), Some("10.0.0.9"));

    let csv = to_csv_string(&records);
    assert!(csv.ends_with("m1,,,,\r\n"));
    assert!(!csv.contains("10.0.0.9"));
}
