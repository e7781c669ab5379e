//! Persistent record store for verified sensor readings.
//!
//! The [`ReadingStore`] trait abstracts the backing store so handlers can be
//! tested against a mock. The production implementation is [`SqliteStore`].

mod sqlite;

pub use sqlite::SqliteStore;

use thiserror::Error;

/// Number of records returned by a history query when the caller does not
/// specify a limit.
pub const DEFAULT_HISTORY_LIMIT: u32 = 100;

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
}

/// A verified reading ready to be appended to the store.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub device_id: String,
    pub value: f64,
    pub fingerprint: String,
    pub received_at: i64,
}

/// A reading as persisted, with its store-assigned sequence id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub sequence_id: i64,
    pub device_id: String,
    pub value: f64,
    pub fingerprint: String,
    pub received_at: i64,
}

/// Append-only store of verified readings.
#[cfg_attr(test, mockall::automock)]
pub trait ReadingStore: Send + Sync {
    /// Append a verified reading, returning its assigned sequence id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the write fails.
    fn append(&self, record: &NewRecord) -> Result<i64, StorageError>;

    /// Most recent readings for one device, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the query fails.
    fn recent_for_device(
        &self,
        device_id: &str,
        limit: u32,
    ) -> Result<Vec<StoredRecord>, StorageError>;

    /// Total number of stored readings across all devices.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the query fails.
    fn count(&self) -> Result<u64, StorageError>;
}
