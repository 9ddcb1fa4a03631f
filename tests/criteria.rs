//! Integration tests for the criterion decode boundary.
//!
//! Exercises the registry surface the way an analysis plugin does: resolve
//! codes from a configuration blob, then decode collected data blobs.

#![allow(clippy::unwrap_used)]

use collector_protocol::{Criterion, CriterionRegistry, Direction, ProtocolError};

/// Wire-encode an IPv4 address item: version byte, 4 octets, 12 wasted.
fn v4_item(octets: [u8; 4]) -> Vec<u8> {
    let mut item = vec![0x04];
    item.extend_from_slice(&octets);
    item.resize(17, 0);
    item
}

/// Wire-encode an IPv6 address item: version byte, 16 octets.
fn v6_item(octets: [u8; 16]) -> Vec<u8> {
    let mut item = vec![0x06];
    item.extend_from_slice(&octets);
    item
}

#[test]
fn test_decode_port_blob() {
    let registry = CriterionRegistry::new();
    let blob = [0x00, 0x50, 0x01, 0xBB, 0xFF, 0xFF];
    assert_eq!(
        registry.decode('P', &blob).unwrap(),
        vec!["80", "443", "65535"]
    );
}

#[test]
fn test_decode_mixed_address_families() {
    let registry = CriterionRegistry::new();

    let mut blob = v4_item([192, 0, 2, 17]);
    let mut v6 = [0u8; 16];
    v6[0] = 0x20;
    v6[1] = 0x01;
    v6[2] = 0x0d;
    v6[3] = 0xb8;
    v6[15] = 0x01;
    blob.extend(v6_item(v6));

    assert_eq!(
        registry.decode('I', &blob).unwrap(),
        vec!["192.0.2.17", "2001:db8::1"]
    );
}

#[test]
fn test_decode_compound_blob() {
    let registry = CriterionRegistry::new();

    let mut blob = 22u16.to_be_bytes().to_vec();
    blob.extend(v4_item([10, 0, 0, 1]));
    let mut v6 = [0u8; 16];
    v6[15] = 1;
    blob.extend(443u16.to_be_bytes());
    blob.extend(v6_item(v6));

    assert_eq!(
        registry.decode('B', &blob).unwrap(),
        vec!["10.0.0.1:22", "[::1]:443"]
    );
    assert_eq!(
        registry.decode('L', &blob).unwrap(),
        vec!["10.0.0.1->22", "[::1]->443"]
    );
}

#[test]
fn test_outbound_codes_decode_like_inbound() {
    let registry = CriterionRegistry::new();
    let blob = [0x00, 0x50];
    assert_eq!(
        registry.decode('P', &blob).unwrap(),
        registry.decode('p', &blob).unwrap()
    );
}

#[test]
fn test_empty_blob_decodes_to_nothing() {
    let registry = CriterionRegistry::new();
    for criterion in Criterion::ALL {
        assert_eq!(
            registry.decode(criterion.code(), &[]).unwrap(),
            Vec::<String>::new()
        );
    }
}

#[test]
fn test_unknown_code_is_reported() {
    let registry = CriterionRegistry::new();
    assert!(matches!(
        registry.decode('Q', &[0x00, 0x50]),
        Err(ProtocolError::UnknownCriterion('Q'))
    ));
}

#[test]
fn test_unknown_address_version_is_reported() {
    let registry = CriterionRegistry::new();
    let mut item = v4_item([127, 0, 0, 1]);
    item[0] = 0x07;
    assert!(matches!(
        registry.decode('I', &item),
        Err(ProtocolError::UnknownAddressVersion(0x07))
    ));
}

#[test]
fn test_partial_trailing_item_is_reported() {
    let registry = CriterionRegistry::new();
    let mut blob = v4_item([127, 0, 0, 1]);
    blob.push(0x04);
    assert!(matches!(
        registry.decode('I', &blob),
        Err(ProtocolError::MalformedBlob {
            criterion: 'I',
            len: 18,
            item_len: 17,
        })
    ));
}

#[test]
fn test_decode_raw_returns_wire_chunks() {
    let registry = CriterionRegistry::new();
    let mut blob = v4_item([10, 0, 0, 1]);
    blob.extend(v4_item([10, 0, 0, 2]));

    let raw = registry.decode_raw('i', &blob).unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0], &blob[..17]);
    assert_eq!(raw[1], &blob[17..]);
}

#[test]
fn test_parse_codes_from_config_blob() {
    let registry = CriterionRegistry::new();
    let criteria = registry.parse_codes(b"PIBl").unwrap();
    assert_eq!(
        criteria,
        vec![
            Criterion::Port(Direction::Inbound),
            Criterion::Address(Direction::Inbound),
            Criterion::AddressAndPort(Direction::Inbound),
            Criterion::AddressAndLocalPort(Direction::Outbound),
        ]
    );

    assert!(matches!(
        registry.parse_codes(b"PX"),
        Err(ProtocolError::UnknownCriterion('X'))
    ));
}
