//! Error types for the sync engine.

use custsync_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while synchronizing a customer.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The incoming record's identity disagrees with what is stored.
    /// Never retried or resolved automatically.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The incoming record broke its own identity invariants (a company
    /// without a company number, a person with one, an empty external id).
    ///
    /// Raised by input validation before any lookup, so it never reflects
    /// stored state. It is not a domain conflict: `is_conflict` is false.
    #[error("invalid incoming record: {0}")]
    InvalidRecord(#[from] custsync_types::Error),

    /// Failure reported by the customer store, passed through unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SyncError {
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
