//! Request and response shapes of the studio HTTP API.
//!
//! Most endpoints answer with `{"success": bool, "error": string?, ...}`.
//! [`Envelope`] captures the common part and flattens the endpoint specific
//! payload, whose fields are all optional so failure replies still parse.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::job::{Job, JobId};
use crate::schedule::ScheduleEntry;
use crate::script::ScriptData;

/// Fallback when the service reports failure without a message.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Common `{success, error}` wrapper around an endpoint payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Envelope<T> {
    /// Payload on success, the service's error message otherwise.
    pub fn into_result(self) -> Result<T, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()))
        }
    }
}

/// Payload of endpoints that only acknowledge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledged {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptPayload {
    #[serde(default)]
    pub script_data: Option<ScriptData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSubmitted {
    #[serde(default)]
    pub job_id: Option<JobId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPayload {
    #[serde(default)]
    pub job: Option<Job>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentVideosPayload {
    #[serde(default)]
    pub videos: Vec<RecentVideo>,
}

/// Scheduled rows are kept raw so one malformed row cannot sink the list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduledVideosPayload {
    #[serde(default)]
    pub videos: Vec<serde_json::Value>,
}

impl ScheduledVideosPayload {
    /// Rows that decode and name a topic, plus the errors for those that don't.
    pub fn into_entries(self) -> (Vec<ScheduleEntry>, Vec<String>) {
        let mut entries = Vec::with_capacity(self.videos.len());
        let mut skipped = Vec::new();
        for row in self.videos {
            match serde_json::from_value::<ScheduleEntry>(row) {
                Ok(entry) if entry.is_usable() => entries.push(entry),
                Ok(entry) => skipped.push(format!("row {:?} has no topic", entry.id)),
                Err(e) => skipped.push(e.to_string()),
            }
        }
        (entries, skipped)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleCreated {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearedPayload {
    #[serde(default)]
    pub cleared: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdeaPayload {
    #[serde(default)]
    pub idea: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPayload {
    /// Present on first-time setup: the line to add to `.env`
    #[serde(default, rename = "envVar")]
    pub env_var: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Usage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Stats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub today: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitors: Option<u64>,
}

/// A recently produced video.
///
/// Entries come either from memory (`title`, `video_url`, ...) or straight
/// from the sheet (`Title`, `Video URL`, ...); both spellings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecentVideo {
    #[serde(default, alias = "Title")]
    pub title: Option<String>,
    #[serde(default, alias = "Topic")]
    pub topic: Option<String>,
    #[serde(default, alias = "Video URL")]
    pub video_url: Option<String>,
    #[serde(default, alias = "Published Date")]
    pub created_at: Option<String>,
}

impl RecentVideo {
    /// Creation time, accepting RFC 3339 or a naive local timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// URL of the uploaded video, if any (empty strings count as none).
    pub fn url(&self) -> Option<&str> {
        self.video_url.as_deref().filter(|u| !u.is_empty())
    }
}

/// `GET /api/csrf-token` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

/// `GET /api/auth/status` reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    #[serde(default)]
    pub password_set: bool,
    #[serde(default)]
    pub authenticated: bool,
}

impl AuthStatus {
    /// A password is configured and this session has not logged in.
    pub fn login_required(&self) -> bool {
        self.password_set && !self.authenticated
    }
}

/// `GET /health` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RandomIdeaRequest<'a> {
    #[serde(rename = "grokApiKey")]
    pub grok_api_key: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;

    #[test]
    fn test_envelope_failure_carries_error() {
        let env: Envelope<JobSubmitted> =
            serde_json::from_str(r#"{"success": false, "error": "Topic and API key required"}"#)
                .unwrap();
        assert_eq!(env.into_result().unwrap_err(), "Topic and API key required");

        let env: Envelope<JobSubmitted> = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(env.into_result().unwrap_err(), UNKNOWN_ERROR);
    }

    #[test]
    fn test_envelope_success_payload() {
        let env: Envelope<JobPayload> = serde_json::from_str(
            r#"{"success": true, "job": {"status": "completed", "progress": "Video created successfully!", "video_url": null, "video_title": "Whales", "error": null}}"#,
        )
        .unwrap();
        let job = env.into_result().unwrap().job.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.video_title.as_deref(), Some("Whales"));
    }

    #[test]
    fn test_recent_video_accepts_sheet_columns() {
        let video: RecentVideo = serde_json::from_str(
            r#"{"Title": "Bees", "Topic": "Pollination", "Video URL": "", "Published Date": "2024-05-01T10:00:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(video.title.as_deref(), Some("Bees"));
        assert_eq!(video.url(), None);
        assert!(video.created_at().is_some());

        let video: RecentVideo =
            serde_json::from_str(r#"{"title": "Owls", "created_at": "2024-05-01T10:00:00.123456"}"#)
                .unwrap();
        assert!(video.created_at().is_some());
    }

    #[test]
    fn test_login_required() {
        let status: AuthStatus =
            serde_json::from_str(r#"{"passwordSet": true, "authenticated": false}"#).unwrap();
        assert!(status.login_required());
        assert!(!AuthStatus::default().login_required());
    }

    #[test]
    fn test_stats_defaults() {
        let env: Envelope<Stats> = serde_json::from_str(r#"{"success": true, "total": 3}"#).unwrap();
        let stats = env.into_result().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.views, 0);
        assert_eq!(stats.visitors, None);
    }
}
