use std::time::Duration;

use axum::{
    http::{header, header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use dog_blob::BlobError;
use thiserror::Error;
use tracing::{debug, warn};

use crate::responder;

/// A path segment that doesn't decode to a file identity
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("identifier is not url-safe base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("identifier payload is not valid: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("identifier has an empty {0}")]
    Empty(&'static str),
}

/// Endpoint misconfiguration, raised when the endpoint is built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid disposition {0:?} (expected \"inline\" or \"attachment\")")]
    InvalidDisposition(String),

    #[error("invalid redirect {0:?} (expected \"true\" or \"false\")")]
    InvalidRedirect(String),

    #[error("invalid host {0:?}")]
    InvalidHost(String),

    #[error("invalid prefix {0:?}")]
    InvalidPrefix(String),

    #[error("invalid cache-control value {0:?}")]
    InvalidCacheControl(String),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// Why a download request did not produce content.
///
/// `InvalidRedirect` and `Header` are server faults and render a plain 500.
/// Every other variant renders as the same `404 File Not Found`; the detail
/// only goes to the logs.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error("storage did not answer within {0:?}")]
    Timeout(Duration),

    #[error("redirect location is not a valid header value: {0:?}")]
    InvalidRedirect(String),

    #[error("response header is not valid: {0}")]
    Header(#[from] InvalidHeaderValue),

    #[error("object changed while opening: expected {expected} bytes, store has {actual}")]
    Changed { expected: u64, actual: u64 },
}

impl DownloadError {
    pub fn status(&self) -> StatusCode {
        match self {
            DownloadError::InvalidRedirect(_) | DownloadError::Header(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        match &self {
            DownloadError::InvalidRedirect(_) | DownloadError::Header(_) => {
                warn!(error = %self, "download response could not be built");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "text/plain")],
                    "Internal Server Error",
                )
                    .into_response()
            }
            DownloadError::Timeout(_) | DownloadError::Changed { .. } => {
                warn!(error = %self, "download storage unavailable");
                responder::not_found()
            }
            _ => {
                debug!(error = %self, "download not found");
                responder::not_found()
            }
        }
    }
}
