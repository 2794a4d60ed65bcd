//! Scheduled (deferred) video generations.
//!
//! Entries live in a spreadsheet owned by the service. The client only
//! lists them, creates new ones and requests cancellation; status changes
//! are driven by the server.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::script::ScriptData;
use crate::utils::{lenient_u32, null_as_default, string_or_number};

/// Scheduled entry status as stored in the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum ScheduleStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Cancelled,
    Failed,
    /// Any other label written by the scheduler
    Other(String),
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ScheduleStatus::Pending => "Pending",
            ScheduleStatus::Processing => "Processing",
            ScheduleStatus::Completed => "Completed",
            ScheduleStatus::Cancelled => "Cancelled",
            ScheduleStatus::Failed => "Failed",
            ScheduleStatus::Other(s) => s,
        }
    }

    /// Only entries that have not started can be cancelled.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, ScheduleStatus::Pending)
    }
}

impl From<String> for ScheduleStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "" | "Pending" => ScheduleStatus::Pending,
            "Processing" => ScheduleStatus::Processing,
            "Completed" => ScheduleStatus::Completed,
            "Cancelled" => ScheduleStatus::Cancelled,
            "Failed" => ScheduleStatus::Failed,
            _ => ScheduleStatus::Other(s),
        }
    }
}

impl From<ScheduleStatus> for String {
    fn from(status: ScheduleStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scheduled generation as listed by the service.
///
/// Rows come from a hand-editable spreadsheet, so every field tolerates
/// blank cells: ids may be numbers, durations may be numeric strings and
/// the time is kept as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topic: String,
    /// Timestamp as stored in the sheet, usually RFC 3339
    #[serde(default, deserialize_with = "string_or_number")]
    pub scheduled_time: String,
    #[serde(default = "default_duration", deserialize_with = "duration_or_default")]
    pub duration: u32,
    #[serde(default = "default_style", deserialize_with = "style_or_default")]
    pub style: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ScheduleStatus,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "String::is_empty"
    )]
    pub video_id: String,
}

const DEFAULT_DURATION: u32 = 8;

fn default_duration() -> u32 {
    DEFAULT_DURATION
}

fn default_style() -> String {
    "cinematic".to_string()
}

fn duration_or_default<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_u32(deserializer)?.unwrap_or(DEFAULT_DURATION))
}

fn style_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let style: String = null_as_default(deserializer)?;
    let style = style.trim();
    Ok(if style.is_empty() {
        default_style()
    } else {
        style.to_string()
    })
}

impl ScheduleEntry {
    /// The scheduled instant, if the stored time can be read.
    ///
    /// Accepts RFC 3339 and offset-less ISO timestamps; the latter are taken
    /// as local time.
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.scheduled_time.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(at.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
            .map(|at| at.with_timezone(&Utc))
    }

    /// Whether the row names something to generate.
    pub fn is_usable(&self) -> bool {
        !self.topic.trim().is_empty()
    }
}

/// An entry with presentation flags computed at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleView {
    pub entry: ScheduleEntry,
    /// Parsed scheduled time, `None` when the sheet holds something unreadable
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Scheduled time already passed
    pub is_past: bool,
    /// Scheduled for the current local calendar day
    pub is_today: bool,
}

impl ScheduleView {
    /// Derive display flags against the given wall clock.
    /// An unreadable time is neither past nor today.
    pub fn at(entry: ScheduleEntry, now: DateTime<Utc>) -> Self {
        let scheduled_at = entry.scheduled_at();
        let is_past = scheduled_at.is_some_and(|at| at < now);
        let is_today = scheduled_at.is_some_and(|at| {
            at.with_timezone(&Local).date_naive() == now.with_timezone(&Local).date_naive()
        });

        Self {
            entry,
            scheduled_at,
            is_past,
            is_today,
        }
    }

    pub fn can_cancel(&self) -> bool {
        self.entry.status.is_cancellable()
    }
}

/// Body of a schedule creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub topic: String,
    pub scheduled_time: DateTime<Utc>,
    pub duration: u32,
    pub style: String,
    pub script_data: ScriptData,
    pub spreadsheet_id: String,
}

/// Message shown after clearing cancelled entries.
pub fn cleared_message(cleared: u64) -> String {
    if cleared == 1 {
        "Cleared 1 cancelled video".to_string()
    } else {
        format!("Cleared {} cancelled videos", cleared)
    }
}
