//! Generation job definitions as reported by the studio service.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a server-side generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted but not yet started
    #[default]
    Pending,
    /// Being worked on (the service reports this as `processing`)
    #[serde(alias = "processing")]
    Running,
    /// Video produced
    Completed,
    /// Generation failed
    Error,
    /// Any status string this client does not know about
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Unknown => "unknown",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of a generation job.
///
/// The id is not always echoed back by the status endpoint, so it defaults
/// to empty and the poller fills it in from the id it asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    #[serde(default = "empty_job_id")]
    pub id: JobId,

    #[serde(default)]
    pub status: JobStatus,

    /// Free-text phase description, e.g. "Creating video with Veo 3..."
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    #[schemars(with = "String")]
    pub progress: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn empty_job_id() -> JobId {
    JobId(String::new())
}

impl Job {
    /// Create a pending job snapshot.
    pub fn new(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Pending,
            progress: String::new(),
            video_url: None,
            video_title: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Title to show once the job finished.
    pub fn display_title(&self) -> &str {
        self.video_title.as_deref().unwrap_or("Video Created!")
    }

    /// Where the finished video ended up, in words.
    pub fn destination_message(&self) -> &'static str {
        if self.video_url.is_some() {
            "Your video has been uploaded to YouTube."
        } else {
            "Your video has been saved locally."
        }
    }

    /// Error text for a failed job.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("Unknown error occurred")
    }
}
