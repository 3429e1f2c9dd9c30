//! Resolver error types
//!
//! One error enum per pipeline stage, wrapped by [`ResolveError`].

use serde::Serialize;
use thiserror::Error;

use crate::types::MediaKind;

/// Maximum response body size for metadata calls (16 MB).
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

/// No identifier could be extracted from the caller's input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("No video identifier found in {0:?}")]
    NoIdentifier(String),
}

/// Transport-level failure talking to the metadata service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Response too large ({size} bytes, max {MAX_RESPONSE_SIZE})")]
    ResponseTooLarge { size: u64 },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether a caller-side retry has a chance of succeeding.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Http { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            Self::Parse(_)
            | Self::ResponseTooLarge { .. }
            | Self::InvalidEndpoint(_)
            | Self::Cancelled => false,
        }
    }
}

/// Problems found while inspecting a metadata payload.
///
/// Only [`ValidationError::MalformedPayload`] stops a resolution; the other
/// variants are advisories returned next to a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Upstream reported failure (status code {})", display_status(.status_code))]
    UpstreamReportedFailure { status_code: Option<i64> },

    #[error("Video cannot be played in an embedded player")]
    NotEmbeddable,

    #[error("Malformed payload: missing {missing}")]
    MalformedPayload { missing: String },
}

impl ValidationError {
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::MalformedPayload { .. })
    }

    pub(crate) fn missing(path: &str) -> Self {
        Self::MalformedPayload {
            missing: path.to_string(),
        }
    }
}

fn display_status(status_code: &Option<i64>) -> String {
    status_code.map_or_else(|| "unknown".to_string(), |code| code.to_string())
}

/// No candidate rendition of a required media kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No playable {0} rendition")]
    NoPlayableRendition(MediaKind),
}

/// Terminal failure of a resolution, tagged by the stage that failed.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),
}

impl ResolveError {
    /// Name of the pipeline stage that produced this error.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Fetch(_) => "fetch",
            Self::Validation(_) => "validate",
            Self::Selection(_) => "select",
        }
    }
}

/// Read a response body with size limit and deserialize as JSON.
///
/// Checks `Content-Length` hint first (if available), then enforces the
/// limit on the actual body bytes before deserializing.
pub async fn json_with_limit<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, FetchError> {
    if let Some(cl) = response.content_length() {
        if cl > MAX_RESPONSE_SIZE as u64 {
            return Err(FetchError::ResponseTooLarge { size: cl });
        }
    }
    let bytes = response.bytes().await?;
    if bytes.len() > MAX_RESPONSE_SIZE {
        return Err(FetchError::ResponseTooLarge {
            size: bytes.len() as u64,
        });
    }
    serde_json::from_slice(&bytes).map_err(Into::into)
}

/// Check HTTP response status before processing body.
pub fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Http {
            status,
            url: resp.url().to_string(),
        });
    }
    Ok(resp)
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidEndpoint(err.to_string())
        } else if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
