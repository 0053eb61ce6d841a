use custsync_types::{CompanyNumber, ExternalId, InternalId};
use std::collections::HashSet;
use std::str::FromStr;

// ── InternalId ───────────────────────────────────────────────────

#[test]
fn internal_id_unique() {
    let a = InternalId::new();
    let b = InternalId::new();
    assert_ne!(a, b);
}

#[test]
fn internal_id_display_parses_back() {
    let id = InternalId::new();
    let parsed: InternalId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);
    assert_eq!(InternalId::parse(&id.to_string()).unwrap(), id);
}

#[test]
fn internal_id_from_str_invalid() {
    assert!(InternalId::from_str("not-a-uuid").is_err());
}

#[test]
fn internal_id_serializes_as_bare_uuid() {
    let id = InternalId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
}

#[test]
fn internal_ids_are_creation_ordered() {
    let first = InternalId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = InternalId::new();
    assert!(first < second);
}

// ── ExternalId / CompanyNumber ───────────────────────────────────

#[test]
fn external_id_conversions_agree() {
    let a = ExternalId::from("E1");
    let b = ExternalId::new(String::from("E1"));
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "E1");
    assert_eq!(a.to_string(), "E1");
}

#[test]
fn external_id_hash_eq() {
    let mut set = HashSet::new();
    set.insert(ExternalId::from("E1"));
    set.insert(ExternalId::from("E1"));
    set.insert(ExternalId::from("E2"));
    assert_eq!(set.len(), 2);
}

#[test]
fn company_number_is_transparent_in_json() {
    let number = CompanyNumber::from("C-42");
    assert_eq!(serde_json::to_string(&number).unwrap(), "\"C-42\"");
    let parsed: CompanyNumber = serde_json::from_str("\"C-42\"").unwrap();
    assert_eq!(parsed, number);
}
