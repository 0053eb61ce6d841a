//! Test doubles and fixtures shared by the sync tests.
#![allow(dead_code)]

use custsync_storage::{CustomerStore, MemoryCustomerStore, StorageError, StorageResult};
use custsync_types::{
    CompanyNumber, CustomerKind, ExternalId, InternalRecord, ShoppingList,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Installs a `RUST_LOG`-driven subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Memory store that counts writes and can be told to fail them.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub inner: MemoryCustomerStore,
    creates: AtomicUsize,
    updates: AtomicUsize,
    attachments: AtomicUsize,
    fail_writes: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn attachments(&self) -> usize {
        self.attachments.load(Ordering::SeqCst)
    }

    /// Creates and updates; attachments are counted separately.
    pub fn writes(&self) -> usize {
        self.creates() + self.updates()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn seed(&self, record: InternalRecord) -> InternalRecord {
        self.inner.seed(record).unwrap()
    }

    pub fn records(&self) -> Vec<InternalRecord> {
        self.inner.records().unwrap()
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("store unavailable")));
        }
        Ok(())
    }
}

impl CustomerStore for RecordingStore {
    fn find_by_external_id(&self, external_id: &ExternalId) -> StorageResult<Option<InternalRecord>> {
        self.inner.find_by_external_id(external_id)
    }

    fn find_by_company_number(
        &self,
        company_number: &CompanyNumber,
    ) -> StorageResult<Option<InternalRecord>> {
        self.inner.find_by_company_number(company_number)
    }

    fn find_by_master_external_id(
        &self,
        external_id: &ExternalId,
    ) -> StorageResult<Option<InternalRecord>> {
        self.inner.find_by_master_external_id(external_id)
    }

    fn create(&self, record: InternalRecord) -> StorageResult<InternalRecord> {
        self.check_writable()?;
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(record)
    }

    fn update(&self, record: InternalRecord) -> StorageResult<InternalRecord> {
        self.check_writable()?;
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(record)
    }

    fn attach_shopping_list(
        &self,
        record: &mut InternalRecord,
        list: &ShoppingList,
    ) -> StorageResult<()> {
        self.check_writable()?;
        self.attachments.fetch_add(1, Ordering::SeqCst);
        self.inner.attach_shopping_list(record, list)
    }
}

/// A stored company in its own cluster.
pub fn stored_company(external_id: &str, number: &str, name: &str) -> InternalRecord {
    InternalRecord {
        kind: Some(CustomerKind::Company),
        company_number: Some(number.into()),
        name: name.to_string(),
        ..InternalRecord::in_cluster(&ExternalId::from(external_id))
    }
}

/// A stored person in its own cluster.
pub fn stored_person(external_id: &str, name: &str, bonus: Option<i64>) -> InternalRecord {
    InternalRecord {
        kind: Some(CustomerKind::Person),
        name: name.to_string(),
        bonus_points_balance: bonus,
        ..InternalRecord::in_cluster(&ExternalId::from(external_id))
    }
}
