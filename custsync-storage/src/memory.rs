//! In-memory customer store.

use crate::error::{StorageError, StorageResult};
use crate::CustomerStore;
use custsync_types::{CompanyNumber, ExternalId, InternalId, InternalRecord, ShoppingList};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Customer store backed by a `Vec` in creation order.
#[derive(Debug, Default)]
pub struct MemoryCustomerStore {
    records: Mutex<Vec<InternalRecord>>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record as-is, assigning an internal id if it has none.
    /// Used to seed stores with pre-existing state.
    pub fn seed(&self, mut record: InternalRecord) -> StorageResult<InternalRecord> {
        record.internal_id.get_or_insert_with(InternalId::new);
        self.lock()?.push(record.clone());
        Ok(record)
    }

    /// Returns a snapshot of every record in creation order.
    pub fn records(&self) -> StorageResult<Vec<InternalRecord>> {
        Ok(self.lock()?.clone())
    }

    pub fn get(&self, id: InternalId) -> StorageResult<Option<InternalRecord>> {
        Ok(self.lock()?.iter().find(|r| r.internal_id == Some(id)).cloned())
    }

    pub fn len(&self) -> StorageResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Vec<InternalRecord>>> {
        self.records.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl CustomerStore for MemoryCustomerStore {
    fn find_by_external_id(&self, external_id: &ExternalId) -> StorageResult<Option<InternalRecord>> {
        let records = self.lock()?;
        // Name-only duplicates carry no kind and only ever win as a last resort.
        let found = holders(&records, external_id)
            .rev()
            .find(|r| r.kind.is_some() && r.master_external_id.as_ref() == Some(external_id))
            .or_else(|| holders(&records, external_id).find(|r| r.kind.is_some()))
            .or_else(|| holders(&records, external_id).next());
        Ok(found.cloned())
    }

    fn find_by_company_number(
        &self,
        company_number: &CompanyNumber,
    ) -> StorageResult<Option<InternalRecord>> {
        Ok(self
            .lock()?
            .iter()
            .find(|r| r.company_number.as_ref() == Some(company_number))
            .cloned())
    }

    fn find_by_master_external_id(
        &self,
        external_id: &ExternalId,
    ) -> StorageResult<Option<InternalRecord>> {
        Ok(self
            .lock()?
            .iter()
            .rev()
            .find(|r| r.master_external_id.as_ref() == Some(external_id))
            .cloned())
    }

    fn create(&self, mut record: InternalRecord) -> StorageResult<InternalRecord> {
        if let Some(id) = record.internal_id {
            return Err(StorageError::InvalidData(format!(
                "record {id} already has an internal id"
            )));
        }
        let id = InternalId::new();
        record.internal_id = Some(id);
        self.lock()?.push(record.clone());
        debug!("Created customer {id}");
        Ok(record)
    }

    fn update(&self, record: InternalRecord) -> StorageResult<InternalRecord> {
        let id = record
            .internal_id
            .ok_or_else(|| StorageError::InvalidData("cannot update a record without an internal id".into()))?;
        let mut records = self.lock()?;
        let slot = records
            .iter_mut()
            .find(|r| r.internal_id == Some(id))
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        *slot = record.clone();
        debug!("Updated customer {id}");
        Ok(record)
    }

    fn attach_shopping_list(
        &self,
        record: &mut InternalRecord,
        list: &ShoppingList,
    ) -> StorageResult<()> {
        if !record.add_shopping_list(list) {
            return Ok(());
        }
        let Some(id) = record.internal_id else {
            return Ok(());
        };
        let mut records = self.lock()?;
        let stored = records
            .iter_mut()
            .find(|r| r.internal_id == Some(id))
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        stored.add_shopping_list(list);
        debug!("Attached shopping list ({} products) to customer {id}", list.products.len());
        Ok(())
    }
}

fn holders<'a>(
    records: &'a [InternalRecord],
    external_id: &'a ExternalId,
) -> impl DoubleEndedIterator<Item = &'a InternalRecord> {
    records
        .iter()
        .filter(move |r| r.external_id.as_ref() == Some(external_id))
}
