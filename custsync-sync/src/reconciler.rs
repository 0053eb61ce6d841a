//! Reconciler - turns a match into create and update calls.

use crate::error::SyncResult;
use crate::matcher::{DuplicateSlot, MatchResult, Matcher};
use crate::merge::MergePolicy;
use custsync_storage::CustomerStore;
use custsync_types::{IncomingRecord, InternalRecord};
use std::sync::Arc;
use tracing::{debug, info};

/// What a single synchronization wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// `true` if the primary record was created rather than updated.
    pub created: bool,
    /// The primary record as stored.
    pub primary: InternalRecord,
    /// Every duplicate written by the sweep, in slot order.
    pub duplicates: Vec<InternalRecord>,
}

/// Synchronizes incoming customers with the customer store.
///
/// Each call is a sequential chain of lookups and writes with no locking of
/// its own. Callers running syncs concurrently must serialize calls that share
/// an external id or company number.
pub struct Reconciler {
    store: Arc<dyn CustomerStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }

    /// A matcher reading from this reconciler's store.
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(self.store.as_ref())
    }

    /// Synchronizes one incoming record.
    /// Returns true if a new primary record was created.
    pub fn synchronize(&self, incoming: &IncomingRecord) -> SyncResult<bool> {
        Ok(self.synchronize_with_report(incoming)?.created)
    }

    /// Synchronizes one incoming record and reports every record written.
    pub fn synchronize_with_report(&self, incoming: &IncomingRecord) -> SyncResult<SyncReport> {
        incoming.validate()?;
        let MatchResult {
            primary,
            duplicates,
        } = self.matcher().match_record(incoming)?;

        match primary.into_record() {
            Some(mut record) => {
                MergePolicy::Full.apply(incoming, &mut record, self.store.as_ref())?;
                let primary = self.store.update(record)?;
                info!("Updated customer {} from {}", display_id(&primary), incoming.external_id);
                let duplicates = self.sweep_duplicates(incoming, duplicates)?;
                Ok(SyncReport {
                    created: false,
                    primary,
                    duplicates,
                })
            }
            None => {
                let mut record = InternalRecord::in_cluster(&incoming.external_id);
                MergePolicy::Full.apply(incoming, &mut record, self.store.as_ref())?;
                let primary = self.store.create(record)?;
                info!("Created customer {} from {}", display_id(&primary), incoming.external_id);
                let duplicates = if duplicates.is_empty() {
                    Vec::new()
                } else {
                    self.sweep_duplicates(incoming, duplicates)?
                };
                Ok(SyncReport {
                    created: true,
                    primary,
                    duplicates,
                })
            }
        }
    }

    fn sweep_duplicates(
        &self,
        incoming: &IncomingRecord,
        slots: Vec<DuplicateSlot>,
    ) -> SyncResult<Vec<InternalRecord>> {
        let mut written = Vec::with_capacity(slots.len());
        for slot in slots {
            let mut duplicate = match slot {
                DuplicateSlot::Existing(record) => record,
                DuplicateSlot::ToCreate => InternalRecord::in_cluster(&incoming.external_id),
            };
            MergePolicy::NameOnly.apply(incoming, &mut duplicate, self.store.as_ref())?;

            let stored = if duplicate.is_persisted() {
                self.store.update(duplicate)?
            } else {
                self.store.create(duplicate)?
            };
            debug!("Synchronized duplicate {} of {}", display_id(&stored), incoming.external_id);
            written.push(stored);
        }
        Ok(written)
    }
}

fn display_id(record: &InternalRecord) -> String {
    record
        .internal_id
        .map_or_else(|| "<unsaved>".to_string(), |id| id.to_string())
}
