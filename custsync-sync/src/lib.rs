//! Matching and merge engine for customer sync.
//!
//! Reconciles customers sent by an external source system with the
//! internal customer store.
//!
//! # Components
//!
//! - **Matcher**: finds the stored record an incoming record belongs to and
//!   the duplicates that must follow it, raising identity conflicts early
//! - **Merge policies**: full merge for the primary record, name-only for
//!   duplicates
//! - **Reconciler**: creates or updates the primary record, then sweeps the
//!   duplicates
//! - **CustomerSync**: owns the store and takes records straight from the
//!   source system
//!
//! ## Sync Process
//!
//! 1. **Match**: companies by external id, then company number; persons by
//!    external id only
//! 2. **Merge**: copy fields onto the matched record, or onto a new one
//! 3. **Persist**: update or create the primary record
//! 4. **Sweep**: create or update every duplicate slot
//!
//! # Example
//!
//! ```
//! use custsync_storage::MemoryCustomerStore;
//! use custsync_sync::CustomerSync;
//! use custsync_types::IncomingRecord;
//! use std::sync::Arc;
//!
//! let sync = CustomerSync::new(Arc::new(MemoryCustomerStore::new()));
//! let incoming = IncomingRecord::company("E1", "C1", "Acme");
//!
//! assert!(sync.synchronize(&incoming)?);
//! assert!(!sync.synchronize(&incoming)?);
//! # Ok::<(), custsync_sync::SyncError>(())
//! ```

mod customer_sync;
mod error;
pub mod matcher;
pub mod merge;
pub mod reconciler;

pub use customer_sync::CustomerSync;
pub use error::{SyncError, SyncResult};
pub use matcher::{DuplicateSlot, MatchKey, MatchResult, Matcher, PrimaryMatch};
pub use merge::{MergePolicy, MergedField};
pub use reconciler::{Reconciler, SyncReport};
