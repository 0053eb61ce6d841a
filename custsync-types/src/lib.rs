//! Core type definitions for customer sync.
//!
//! This crate defines the plain data shared by the store and the sync engine:
//! - Internal (UUID v7), external and company-number identifiers
//! - The incoming record sent by the external source system
//! - The internal record kept by the customer store
//!
//! Matching and merge rules live in `custsync-sync`, not here.

mod customer;
mod ids;

pub use customer::{Address, CustomerKind, IncomingRecord, InternalRecord, ShoppingList};
pub use ids::{CompanyNumber, ExternalId, InternalId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
