//! Studio client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Studio service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service answered `success: false`; the message is shown as is.
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid attachment: {0}")]
    InvalidAttachment(String),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Transport level failures that may succeed when tried again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::ServiceUnavailable(_) => true,
            ClientError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// The service understood the request and said no.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected(_))
    }
}
