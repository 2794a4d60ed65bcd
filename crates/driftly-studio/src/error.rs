//! Studio error types.

use driftly_client::ClientError;
use driftly_models::JobId;
use thiserror::Error;

pub type StudioResult<T> = Result<T, StudioError>;

#[derive(Debug, Error)]
pub enum StudioError {
    /// User input was rejected before anything was sent
    #[error("{0}")]
    Validation(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Job {0} is still in progress")]
    JobInProgress(JobId),

    #[error("No request is waiting for confirmation")]
    NoPendingRequest,

    #[error("Gave up waiting for the job after {attempts} status checks")]
    PollTimeout { attempts: u32 },

    #[error("Credential store error: {0}")]
    Credentials(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl StudioError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_credentials(msg: impl Into<String>) -> Self {
        Self::MissingCredentials(msg.into())
    }

    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            StudioError::Client(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for StudioError {
    fn from(e: std::io::Error) -> Self {
        Self::Credentials(e.to_string())
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(e: serde_json::Error) -> Self {
        Self::Credentials(e.to_string())
    }
}
