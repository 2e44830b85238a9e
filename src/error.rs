//! Error types for the studio
//!
//! Producer failures are absorbed into fallbacks, configuration failures abort
//! startup, and API errors become JSON responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

// == Error Kind ==
/// Classification shared by logs, counters and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkTimeout,
    UpstreamError,
    RenderError,
    ConfigError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NetworkTimeout => "network_timeout",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::RenderError => "render_error",
            ErrorKind::ConfigError => "config_error",
        }
    }
}

// == Producer Error ==
/// Failure of an expensive operation behind a memoized producer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProducerError {
    /// The call did not finish within its time bound
    #[error("Timed out: {0}")]
    NetworkTimeout(String),

    /// Non-2xx status, transport failure or a payload that does not parse
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The pixel pipeline could not produce the artwork
    #[error("Render error: {0}")]
    Render(String),
}

impl ProducerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProducerError::NetworkTimeout(_) => ErrorKind::NetworkTimeout,
            ProducerError::Upstream(_) => ErrorKind::UpstreamError,
            ProducerError::Render(_) => ErrorKind::RenderError,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ProducerError::NetworkTimeout(msg)
            | ProducerError::Upstream(msg)
            | ProducerError::Render(msg) => msg,
        }
    }
}

impl From<reqwest::Error> for ProducerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProducerError::NetworkTimeout(err.to_string())
        } else {
            ProducerError::Upstream(err.to_string())
        }
    }
}

// == Config Error ==
/// Fatal configuration problem, reported at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0} is not set")]
    Missing(&'static str),

    #[error("Invalid configuration: {name}={value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ConfigError
    }
}

// == API Error ==
/// Error returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
