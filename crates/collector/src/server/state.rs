//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use envelope::{AcceptedRange, Key};

use crate::storage::ReadingStore;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or `Copy`) so that Axum
/// can clone the state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Append-only store of verified readings.
    pub store: Arc<dyn ReadingStore>,
    /// Shared AES-128 key used to unseal envelopes.
    pub key: Arc<Key>,
    /// Range of plausible readings; decoded values outside it are rejected.
    pub accepted: AcceptedRange,
}

impl AppState {
    /// Create a new [`AppState`] with the provided store, key, and range.
    pub fn new(store: Arc<dyn ReadingStore>, key: Key, accepted: AcceptedRange) -> Self {
        Self {
            store,
            key: Arc::new(key),
            accepted,
        }
    }
}

#[cfg(test)]
impl Default for AppState {
    /// Creates a default [`AppState`] with an in-memory store, the demo key,
    /// and a 15.0..=35.0 accepted range, suitable for tests.
    fn default() -> Self {
        use envelope::ScalarReading;

        let store = crate::storage::SqliteStore::open_in_memory()
            .expect("open in-memory record store");
        let key = Key::from_hex("2b7e151628aed2a6abf7158809cf4f3c").expect("parse demo key");
        let accepted =
            AcceptedRange::new(ScalarReading::from_tenths(150), ScalarReading::from_tenths(350))
                .expect("build demo range");
        Self::new(Arc::new(store), key, accepted)
    }
}
