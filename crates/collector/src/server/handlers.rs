//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use common::protocol::{
    ErrorResponse, HealthResponse, HistoryResponse, SensorRecord, SubmissionRequest,
};
use common::ServiceError;
use envelope::{unseal, DeviceId, Envelope, Iv, UnsealError};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::state::AppState;
use crate::storage::{NewRecord, DEFAULT_HISTORY_LIMIT};

/// Query string accepted by the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Maximum number of records to return; defaults to
    /// [`DEFAULT_HISTORY_LIMIT`].
    pub limit: Option<u32>,
}

/// `POST /api/sensor-data` — verify a sealed reading and persist it.
///
/// The envelope is unsealed with the shared key and the caller-supplied IV.
/// A reading is stored only if padding validates, the packet decodes, the
/// decoded identity matches the transport's claim, and the value falls inside
/// the accepted range.
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmissionRequest>,
) -> Response {
    // Validate the claimed device identity.
    let claimed = match DeviceId::new(req.device_id.as_str()) {
        Ok(d) => d,
        Err(e) => {
            return error_response(ServiceError::BadRequest(e.to_string()));
        }
    };

    // Decode the transport fields from hex.
    let iv = match Iv::from_hex(&req.iv) {
        Ok(iv) => iv,
        Err(e) => {
            return error_response(ServiceError::BadRequest(format!("iv: {e}")));
        }
    };
    let envelope = match hex::decode(&req.envelope) {
        Ok(bytes) => Envelope::from_bytes(bytes),
        Err(_) => {
            return error_response(ServiceError::BadRequest(
                "envelope is not valid hex".into(),
            ));
        }
    };

    // Unseal and verify. A misaligned ciphertext means the sender framed the
    // message wrong, which is worth a louder log line than a forged envelope.
    let unsealed = match unseal(&envelope, &state.key, &iv, state.accepted) {
        Ok(u) => u,
        Err(e) => {
            if matches!(e, UnsealError::Alignment(_)) {
                error!(device_id = %claimed, error = %e, "envelope length is not block-aligned");
            } else {
                warn!(device_id = %claimed, error = %e, "envelope rejected");
            }
            return error_response(ServiceError::RejectedEnvelope(e.to_string()));
        }
    };

    // The identity inside the packet must match the transport's claim.
    if unsealed.device_id != claimed {
        warn!(
            claimed = %claimed,
            decoded = %unsealed.device_id,
            "device identity mismatch between transport and packet"
        );
        return error_response(ServiceError::RejectedEnvelope(
            "device identity in packet does not match request".into(),
        ));
    }

    // Persist the verified reading.
    let record = NewRecord {
        device_id: unsealed.device_id.as_str().to_owned(),
        value: unsealed.value.as_f64(),
        fingerprint: unsealed.fingerprint.to_hex(),
        received_at: Utc::now().timestamp(),
    };
    let sequence_id = match state.store.append(&record) {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "failed to persist verified reading");
            return error_response(ServiceError::StorageFailure(
                "failed to persist reading".into(),
            ));
        }
    };

    info!(
        device_id = %unsealed.device_id,
        value = %unsealed.value,
        fingerprint = %unsealed.fingerprint.short_hex(),
        sent_at = req.timestamp,
        sequence_id,
        "verified reading stored"
    );

    let body = SensorRecord {
        sequence_id,
        device_id: record.device_id,
        value: record.value,
        fingerprint: record.fingerprint,
        received_at: record.received_at,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `GET /api/sensor-data/:device_id` — most recent verified readings for one
/// device, newest first.
pub async fn history(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Response {
    let device = match DeviceId::new(device_id) {
        Ok(d) => d,
        Err(e) => {
            return error_response(ServiceError::BadRequest(e.to_string()));
        }
    };

    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let stored = match state.store.recent_for_device(device.as_str(), limit) {
        Ok(records) => records,
        Err(e) => {
            error!(device_id = %device, error = %e, "failed to query reading history");
            return error_response(ServiceError::StorageFailure(
                "failed to query history".into(),
            ));
        }
    };

    let records: Vec<SensorRecord> = stored
        .into_iter()
        .map(|r| SensorRecord {
            sequence_id: r.sequence_id,
            device_id: r.device_id,
            value: r.value,
            fingerprint: r.fingerprint,
            received_at: r.received_at,
        })
        .collect();

    let body = HistoryResponse {
        device_id: device.as_str().to_owned(),
        count: records.len(),
        records,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `GET /api/health` — liveness and readiness check.
///
/// Returns `200 OK` when the record store answers queries.
/// Returns `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let (status_code, status_str, store_ready, records_stored) = match state.store.count() {
        Ok(n) => (StatusCode::OK, "ok", true, n),
        Err(e) => {
            warn!(error = %e, "record store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", false, 0)
        }
    };

    let body = HealthResponse {
        status: status_str.into(),
        store_ready,
        records_stored,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Map a [`ServiceError`] onto its HTTP status and JSON body.
fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::new(err.code(), err.message());
    (status, Json(body)).into_response()
}
