use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Every way a call to the inference backend can fail.
///
/// Callers are expected to treat all variants alike; the split exists so the
/// message and the logs say what actually went wrong.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Request to {url} timed out after {}s", .timeout.as_secs())]
    Timeout { url: String, timeout: Duration },

    #[error("Server error: {0}")]
    ServerError(StatusCode),

    #[error("Request failed: {0}")]
    RequestFailed(StatusCode),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl BackendError {
    /// Classify a non-success status the way the transport would.
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_server_error() {
            BackendError::ServerError(status)
        } else {
            BackendError::RequestFailed(status)
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;
