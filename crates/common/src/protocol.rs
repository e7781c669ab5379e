//! Request and response types exchanged between sensor agents and the
//! collection service.
//!
//! All bodies are JSON. Binary fields such as the IV and the sealed
//! envelope travel as lowercase hex strings.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Submission endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /api/sensor-data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    /// Claimed sender identity; checked against the identity recovered
    /// from the envelope.
    pub device_id: String,
    /// Per-message initialisation vector, 32 hex characters.
    pub iv: String,
    /// Sealed envelope ciphertext, hex, a whole number of cipher blocks.
    pub envelope: String,
    /// Sender's send time, unix seconds.
    pub timestamp: i64,
}

/// One stored attestation record.
///
/// Returned directly as the success body of `POST /api/sensor-data` and
/// as the entries of [`HistoryResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Storage-assigned sequence id, strictly increasing per insert.
    pub sequence_id: i64,
    /// Device the reading came from.
    pub device_id: String,
    /// Decoded reading.
    pub value: f64,
    /// SHA-256 fingerprint of the canonical packet, 64 hex characters.
    pub fingerprint: String,
    /// Collector receipt time, unix seconds.
    pub received_at: i64,
}

// ---------------------------------------------------------------------------
// History endpoint
// ---------------------------------------------------------------------------

/// Response body for `GET /api/sensor-data/{device_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Device the history belongs to.
    pub device_id: String,
    /// Number of records returned (not the device's lifetime total).
    pub count: usize,
    /// Records, most recent first.
    pub records: Vec<SensorRecord>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"rejected_envelope"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the record store is answering queries.
    pub store_ready: bool,
    /// Total records persisted so far.
    pub records_stored: u64,
}
