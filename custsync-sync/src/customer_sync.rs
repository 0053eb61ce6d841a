//! Entry point for callers that only need to push customers through.

use crate::error::SyncResult;
use crate::reconciler::{Reconciler, SyncReport};
use custsync_storage::{CustomerStore, SqliteCustomerStore, StoreConfig};
use custsync_types::IncomingRecord;
use std::sync::Arc;
use tracing::info;

/// Owns a customer store and synchronizes incoming customers into it.
pub struct CustomerSync {
    reconciler: Reconciler,
}

impl CustomerSync {
    /// Synchronizes into the given store.
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self {
            reconciler: Reconciler::new(store),
        }
    }

    /// Opens a SQLite store as described by `config` and synchronizes into it.
    pub fn open(config: &StoreConfig) -> SyncResult<Self> {
        let store = SqliteCustomerStore::open(config)?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Returns true if a new primary record was created.
    pub fn synchronize(&self, incoming: &IncomingRecord) -> SyncResult<bool> {
        self.reconciler.synchronize(incoming)
    }

    pub fn synchronize_with_report(&self, incoming: &IncomingRecord) -> SyncResult<SyncReport> {
        self.reconciler.synchronize_with_report(incoming)
    }

    /// Parses a record as sent by the source system and synchronizes it.
    pub fn synchronize_json(&self, json: &str) -> SyncResult<bool> {
        let incoming = IncomingRecord::from_json(json)?;
        info!("Received customer {} from source system", incoming.external_id);
        self.synchronize(&incoming)
    }
}
