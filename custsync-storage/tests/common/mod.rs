//! Behavior every `CustomerStore` implementation must share.

use custsync_storage::{CustomerStore, StorageError};
use custsync_types::{
    Address, CompanyNumber, CustomerKind, ExternalId, InternalRecord, ShoppingList,
};
use pretty_assertions::assert_eq;

pub fn company(external_id: &str, number: &str, name: &str) -> InternalRecord {
    InternalRecord {
        kind: Some(CustomerKind::Company),
        company_number: Some(number.into()),
        name: name.to_string(),
        ..InternalRecord::in_cluster(&ExternalId::from(external_id))
    }
}

pub fn create_assigns_internal_id(store: &dyn CustomerStore) {
    let created = store.create(company("E1", "C1", "Acme")).unwrap();
    assert!(created.is_persisted());

    let found = store
        .find_by_external_id(&ExternalId::from("E1"))
        .unwrap()
        .unwrap();
    assert_eq!(found, created);
}

pub fn create_rejects_persisted_record(store: &dyn CustomerStore) {
    let created = store.create(company("E1", "C1", "Acme")).unwrap();
    let err = store.create(created).unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
}

pub fn update_requires_existing_record(store: &dyn CustomerStore) {
    let err = store.update(company("E1", "C1", "Acme")).unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));

    let mut ghost = company("E2", "C2", "Ghost");
    ghost.internal_id = Some(custsync_types::InternalId::new());
    let err = store.update(ghost).unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

pub fn update_overwrites_all_fields(store: &dyn CustomerStore) {
    let mut record = store.create(company("E1", "C1", "Acme")).unwrap();
    record.name = "Acme Ltd".into();
    record.address = Some(Address::new("1 Main St", "Springfield", "12345"));
    record.preferred_store = Some("north".into());
    record.shopping_lists = vec![ShoppingList::new(["bolts"])];
    store.update(record.clone()).unwrap();

    let found = store
        .find_by_company_number(&CompanyNumber::from("C1"))
        .unwrap()
        .unwrap();
    assert_eq!(found, record);
}

pub fn missing_lookups_return_none(store: &dyn CustomerStore) {
    assert!(store.find_by_external_id(&"nope".into()).unwrap().is_none());
    assert!(store.find_by_company_number(&"nope".into()).unwrap().is_none());
    assert!(store.find_by_master_external_id(&"nope".into()).unwrap().is_none());
}

pub fn external_id_lookup_prefers_canonical(store: &dyn CustomerStore) {
    let mut orphan = company("E1", "OLD", "Orphan");
    orphan.master_external_id = None;
    store.create(orphan).unwrap();
    let canonical = store.create(company("E1", "C1", "Acme")).unwrap();

    let found = store.find_by_external_id(&"E1".into()).unwrap().unwrap();
    assert_eq!(found.internal_id, canonical.internal_id);
}

pub fn master_lookup_returns_latest(store: &dyn CustomerStore) {
    let canonical = store.create(company("E1", "C1", "Acme")).unwrap();
    let found = store.find_by_master_external_id(&"E1".into()).unwrap().unwrap();
    assert_eq!(found.internal_id, canonical.internal_id);

    let mut duplicate = InternalRecord::in_cluster(&"E1".into());
    duplicate.name = "Acme".into();
    let duplicate = store.create(duplicate).unwrap();

    let found = store.find_by_master_external_id(&"E1".into()).unwrap().unwrap();
    assert_eq!(found.internal_id, duplicate.internal_id);
    assert_eq!(found.kind, None);

    // The canonical record still wins the external-id lookup.
    let by_external = store.find_by_external_id(&"E1".into()).unwrap().unwrap();
    assert_eq!(by_external.internal_id, canonical.internal_id);
}

pub fn company_number_lookup_returns_earliest(store: &dyn CustomerStore) {
    let first = store.create(company("E1", "C1", "First")).unwrap();
    store.create(company("E2", "C1", "Second")).unwrap();

    let found = store.find_by_company_number(&"C1".into()).unwrap().unwrap();
    assert_eq!(found.internal_id, first.internal_id);
}

pub fn attach_to_persisted_record_is_written(store: &dyn CustomerStore) {
    let mut record = store.create(company("E1", "C1", "Acme")).unwrap();
    let list = ShoppingList::new(["bolts", "nuts"]);

    store.attach_shopping_list(&mut record, &list).unwrap();
    store.attach_shopping_list(&mut record, &list).unwrap();
    assert_eq!(record.shopping_lists, vec![list.clone()]);

    let found = store.find_by_external_id(&"E1".into()).unwrap().unwrap();
    assert_eq!(found.shopping_lists, vec![list]);
}

pub fn attach_to_new_record_is_written_on_create(store: &dyn CustomerStore) {
    let mut record = company("E1", "C1", "Acme");
    let list = ShoppingList::new(["bolts"]);
    store.attach_shopping_list(&mut record, &list).unwrap();
    assert!(store.find_by_external_id(&"E1".into()).unwrap().is_none());

    store.create(record).unwrap();
    let found = store.find_by_external_id(&"E1".into()).unwrap().unwrap();
    assert_eq!(found.shopping_lists, vec![list]);
}

pub fn external_id_lookup_skips_name_only_duplicates(store: &dyn CustomerStore) {
    let mut demoted = store.create(company("E1", "OLD", "Acme")).unwrap();
    let mut duplicate = InternalRecord::in_cluster(&"E1".into());
    duplicate.name = "Acme".into();
    store.create(duplicate).unwrap();
    demoted.master_external_id = None;
    let demoted = store.update(demoted).unwrap();

    // Only the demoted record and a kindless duplicate remain.
    let found = store.find_by_external_id(&"E1".into()).unwrap().unwrap();
    assert_eq!(found.internal_id, demoted.internal_id);

    let canonical = store.create(company("E1", "NEW", "Acme Two")).unwrap();
    let found = store.find_by_external_id(&"E1".into()).unwrap().unwrap();
    assert_eq!(found.internal_id, canonical.internal_id);
    assert_eq!(found.kind, Some(CustomerKind::Company));
}
