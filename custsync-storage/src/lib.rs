//! Customer store for customer sync.
//!
//! The sync engine only ever talks to storage through [`CustomerStore`]:
//! three lookups, two writes and shopping-list attachment. Two stores ship
//! with the crate:
//!
//! - [`MemoryCustomerStore`]: a lock-guarded `Vec`, for tests and embedding
//! - [`SqliteCustomerStore`]: a SQLite file (or in-memory database)
//!
//! # Lookup semantics
//!
//! External ids are not unique: a canonical record and its duplicates all
//! carry the cluster's external id. Both stores resolve lookups the same way:
//!
//! - `find_by_external_id` prefers the most recently created canonical holder
//!   (a record with a kind whose master external id equals the id), then the
//!   earliest-created record with a kind, and only then a name-only duplicate
//! - `find_by_company_number` returns the earliest-created match
//! - `find_by_master_external_id` returns the most recently created record
//!   of the cluster, so a duplicate wins over the canonical record it copies

mod config;
mod error;
mod memory;
mod sqlite;

pub use config::StoreConfig;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryCustomerStore;
pub use sqlite::SqliteCustomerStore;

use custsync_types::{CompanyNumber, ExternalId, InternalRecord, ShoppingList};

/// Persistence collaborator consumed by the sync engine.
///
/// Lookups are read-only and safe to repeat. Writes take the record by value
/// and hand back what was stored.
pub trait CustomerStore: Send + Sync {
    fn find_by_external_id(&self, external_id: &ExternalId) -> StorageResult<Option<InternalRecord>>;

    fn find_by_company_number(
        &self,
        company_number: &CompanyNumber,
    ) -> StorageResult<Option<InternalRecord>>;

    /// Finds a record whose master external id is `external_id`.
    fn find_by_master_external_id(
        &self,
        external_id: &ExternalId,
    ) -> StorageResult<Option<InternalRecord>>;

    /// Persists a new record and assigns its internal id.
    ///
    /// Fails with [`StorageError::InvalidData`] if the record already has one.
    fn create(&self, record: InternalRecord) -> StorageResult<InternalRecord>;

    /// Overwrites an existing record, shopping lists included.
    fn update(&self, record: InternalRecord) -> StorageResult<InternalRecord>;

    /// Attaches `list` to `record`.
    ///
    /// The list is appended in memory unless an equal list is already there.
    /// If the record is already persisted the attachment is written at once;
    /// otherwise it is written by the following [`create`](Self::create).
    fn attach_shopping_list(
        &self,
        record: &mut InternalRecord,
        list: &ShoppingList,
    ) -> StorageResult<()>;
}
