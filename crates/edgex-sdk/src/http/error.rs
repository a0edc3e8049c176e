/*
[INPUT]:  Error sources (HTTP, API envelope, serialization, signing, WebSocket)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the edgeX SDK
#[derive(Error, Debug)]
pub enum EdgexError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server replied with a non-200 status
    #[error("request failed with status code: {status}")]
    HttpStatus { status: u16, body: String },

    /// API envelope carried a code other than SUCCESS
    #[error("request failed with {message}")]
    Api { code: String, message: String },

    /// Authenticated call attempted without usable credentials
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Signing adapter could not produce a signature
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// WebSocket operation attempted before connecting
    #[error("WebSocket not connected: {0}")]
    NotConnected(String),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Caller supplied a parameter the venue would reject
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    /// Connection timeout
    #[error("Connection timeout after {duration}s")]
    Timeout { duration: u64 },
}

impl EdgexError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            EdgexError::Http(_)
            | EdgexError::RateLimit { .. }
            | EdgexError::Timeout { .. }
            | EdgexError::WebSocket(_)
            | EdgexError::InvalidResponse(_) => true,
            EdgexError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Get retry delay in seconds (if retryable)
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            EdgexError::RateLimit { retry_after } => Some(*retry_after),
            EdgexError::Timeout { .. } => Some(1),
            _ => None,
        }
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            EdgexError::Authentication { .. } | EdgexError::Signing(_)
        ) || matches!(self, EdgexError::HttpStatus { status, .. } if *status == 401 || *status == 403)
    }

    /// Create an error from a non-200 HTTP reply
    pub fn status_error(status: StatusCode, body: impl Into<String>) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return EdgexError::RateLimit { retry_after: 1 };
        }
        EdgexError::HttpStatus {
            status: status.as_u16(),
            body: body.into(),
        }
    }

    /// Create an API error from an envelope code and its optional error params
    pub fn api_error(code: impl Into<String>, error_param: Option<&serde_json::Value>) -> Self {
        let code = code.into();
        let message = match error_param {
            Some(param) if !param.is_null() => format!("error params: {param}"),
            _ => format!("code: {code}"),
        };
        EdgexError::Api { code, message }
    }
}

/// Result type alias for edgeX operations
pub type Result<T> = std::result::Result<T, EdgexError>;
