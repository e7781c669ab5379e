//! SQLite-backed record store.
//!
//! Schema:
//!   sensor_data(
//!     id           INTEGER PRIMARY KEY AUTOINCREMENT,
//!     device_id    TEXT    NOT NULL,
//!     sensor_value REAL    NOT NULL,
//!     fingerprint  TEXT    NOT NULL,   -- SHA-256 hex digest of the packet
//!     received_at  INTEGER NOT NULL    -- Unix seconds at ingestion
//!   )

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::debug;

use super::{NewRecord, ReadingStore, StorageError, StoredRecord};

// ---------------------------------------------------------------------------
// Local error helpers
// ---------------------------------------------------------------------------

/// Convert a `rusqlite::Error` into a `StorageError::Database`.
fn db_err(e: rusqlite::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS sensor_data (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    device_id    TEXT    NOT NULL,
    sensor_value REAL    NOT NULL,
    fingerprint  TEXT    NOT NULL,
    received_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sensor_data_device
    ON sensor_data (device_id, id);";

/// Record store backed by a SQLite database.
///
/// The connection is guarded by a mutex so the store can be shared across
/// request handlers behind an `Arc`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the record store at `path`.
    ///
    /// The `sensor_data` table is created automatically if it does not
    /// already exist.  WAL mode is enabled for better concurrent-read
    /// performance.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the file cannot be opened or
    /// the schema cannot be applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(db_err)?;

        // Enable WAL for concurrent readers.
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;

        conn.execute_batch(SCHEMA).map_err(db_err)?;

        debug!("record store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory record store (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;

        conn.execute_batch(SCHEMA).map_err(db_err)?;

        debug!("in-memory record store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl ReadingStore for SqliteStore {
    fn append(&self, record: &NewRecord) -> Result<i64, StorageError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO sensor_data (device_id, sensor_value, fingerprint, received_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.device_id,
                record.value,
                record.fingerprint,
                record.received_at
            ],
        )
        .map_err(db_err)?;

        Ok(conn.last_insert_rowid())
    }

    fn recent_for_device(
        &self,
        device_id: &str,
        limit: u32,
    ) -> Result<Vec<StoredRecord>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, device_id, sensor_value, fingerprint, received_at
                 FROM sensor_data
                 WHERE device_id = ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![device_id, limit], |row| {
                Ok(StoredRecord {
                    sequence_id: row.get(0)?,
                    device_id: row.get(1)?,
                    value: row.get(2)?,
                    fingerprint: row.get(3)?,
                    received_at: row.get(4)?,
                })
            })
            .map_err(db_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(db_err)?);
        }
        Ok(records)
    }

    fn count(&self) -> Result<u64, StorageError> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM sensor_data", [], |row| row.get(0))
            .map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("open in-memory record store")
    }

    fn record(device_id: &str, value: f64) -> NewRecord {
        NewRecord {
            device_id: device_id.into(),
            value,
            fingerprint: "c88c2334".repeat(8),
            received_at: 1_700_000_000,
        }
    }

    #[test]
    fn append_assigns_increasing_sequence_ids() {
        let store = make_store();
        assert_eq!(store.append(&record("ESP-01", 24.3)).unwrap(), 1);
        assert_eq!(store.append(&record("ESP-01", 24.4)).unwrap(), 2);
        assert_eq!(store.append(&record("ESP-02", 19.9)).unwrap(), 3);
    }

    #[test]
    fn recent_returns_newest_first() {
        let store = make_store();
        store.append(&record("ESP-01", 20.0)).unwrap();
        store.append(&record("ESP-01", 21.0)).unwrap();
        store.append(&record("ESP-01", 22.0)).unwrap();

        let records = store.recent_for_device("ESP-01", 10).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].value, 22.0);
        assert_eq!(records[1].value, 21.0);
        assert_eq!(records[2].value, 20.0);
        assert!(records[0].sequence_id > records[2].sequence_id);
    }

    #[test]
    fn recent_honours_limit() {
        let store = make_store();
        for i in 0..5 {
            store.append(&record("ESP-01", f64::from(i))).unwrap();
        }

        let records = store.recent_for_device("ESP-01", 2).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, 4.0);
        assert_eq!(records[1].value, 3.0);
    }

    #[test]
    fn recent_filters_by_device() {
        let store = make_store();
        store.append(&record("ESP-01", 24.3)).unwrap();
        store.append(&record("ESP-02", 19.9)).unwrap();

        let records = store.recent_for_device("ESP-01", 10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].device_id, "ESP-01");

        assert!(store.recent_for_device("ESP-99", 10).unwrap().is_empty());
    }

    #[test]
    fn count_spans_all_devices() {
        let store = make_store();
        assert_eq!(store.count().unwrap(), 0);
        store.append(&record("ESP-01", 24.3)).unwrap();
        store.append(&record("ESP-02", 19.9)).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn stored_record_round_trips_fields() {
        let store = make_store();
        let new = record("ESP-01", -12_345.6);
        let id = store.append(&new).unwrap();

        let records = store.recent_for_device("ESP-01", 1).unwrap();
        assert_eq!(
            records[0],
            StoredRecord {
                sequence_id: id,
                device_id: new.device_id,
                value: new.value,
                fingerprint: new.fingerprint,
                received_at: new.received_at,
            }
        );
    }

    #[test]
    fn reopening_a_file_store_preserves_records() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("records.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.append(&record("ESP-01", 24.3)).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        let records = store.recent_for_device("ESP-01", 10).unwrap();
        assert_eq!(records[0].value, 24.3);
    }
}
