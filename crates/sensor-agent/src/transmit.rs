//! HTTP delivery of sealed readings to the collection service.

use std::time::Duration;

use common::protocol::{ErrorResponse, SensorRecord, SubmissionRequest};
use thiserror::Error;

/// Per-request timeout for submissions.
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from delivering a submission.
#[derive(Debug, Error)]
pub enum TransmitError {
    /// The request never completed: connection refused, DNS failure, timeout,
    /// or a malformed success body.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service rejected submission ({status} {code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },
}

/// HTTP client bound to one collection service endpoint.
pub struct Transmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl Transmitter {
    /// Build a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`TransmitError::Transport`] if the underlying client cannot
    /// be constructed.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransmitError> {
        let client = reqwest::Client::builder()
            .timeout(SUBMIT_TIMEOUT)
            .user_agent(concat!("sensor-agent/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Deliver one submission, returning the stored record the service echoes
    /// back.
    ///
    /// # Errors
    ///
    /// Returns [`TransmitError::Transport`] if the request fails outright, or
    /// [`TransmitError::Rejected`] with the service's error body otherwise.
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<SensorRecord, TransmitError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<SensorRecord>().await?);
        }

        // Decode the structured error body when the service sent one.
        let (code, message) = match response.json::<ErrorResponse>().await {
            Ok(err) => (err.code, err.message),
            Err(_) => ("unknown".into(), "response body was not a structured error".into()),
        };
        Err(TransmitError::Rejected {
            status: status.as_u16(),
            code,
            message,
        })
    }
}
