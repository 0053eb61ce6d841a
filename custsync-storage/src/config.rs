//! Store configuration.

use crate::error::StorageResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for [`SqliteCustomerStore`](crate::SqliteCustomerStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    /// How long a writer waits on a locked database (ms).
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
        }
    }
}

impl StoreConfig {
    /// Configuration for a database file at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> StorageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: &Path) -> StorageResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
