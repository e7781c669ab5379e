//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::RejectedEnvelope`] → 422
/// - [`ServiceError::StorageFailure`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed — invalid JSON, bad hex, or a wrong-length
    /// field. The sender framed the request incorrectly.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request was well-formed but the envelope failed to unseal, or
    /// unsealed to something implausible. Likely tampering, a wrong key,
    /// or a misbehaving sender.
    #[error("rejected envelope: {0}")]
    RejectedEnvelope(String),

    /// The record store failed; nothing was persisted.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl ServiceError {
    /// The HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::RejectedEnvelope(_) => 422,
            ServiceError::StorageFailure(_) => 500,
        }
    }

    /// Short machine-readable code for the error response body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::RejectedEnvelope(_) => "rejected_envelope",
            ServiceError::StorageFailure(_) => "storage_failure",
        }
    }

    /// Human-readable detail for the error response body, without the
    /// variant prefix added by `Display`.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::BadRequest(m)
            | ServiceError::RejectedEnvelope(m)
            | ServiceError::StorageFailure(m) => m,
        }
    }
}
