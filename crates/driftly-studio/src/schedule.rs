//! Deferred generations kept in the service's spreadsheet.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use tracing::info;

use driftly_client::{ImageAttachment, ScriptRequest, StudioClient};
use driftly_models::schedule::cleared_message;
use driftly_models::{ScheduleRequest, ScheduleView, VideoDuration, VideoStyle};

use crate::credentials::Credentials;
use crate::error::{StudioError, StudioResult};
use crate::logging::JobLogger;
use crate::preview::PromptPreview;
use crate::progress::{
    ProgressSimulator, ProgressSink, SCHEDULE_SCRIPT_DONE_MESSAGE, SCHEDULE_SCRIPT_STEPS,
    SCRIPT_START_MESSAGE,
};
use crate::workflow::SCRIPT_DISPLAY_DELAY;

/// Schedule form input. Date is `YYYY-MM-DD`, time is `HH:MM`, both local.
#[derive(Debug, Clone, Default)]
pub struct ScheduleDraft {
    pub topic: String,
    pub date: String,
    pub time: String,
    pub duration: VideoDuration,
    pub style: VideoStyle,
    pub images: Vec<ImageAttachment>,
}

/// A scheduled generation waiting for the user to approve its script.
#[derive(Debug, Clone)]
pub struct PendingSchedule {
    pub topic: String,
    pub scheduled_time: DateTime<Utc>,
    pub duration: VideoDuration,
    pub style: VideoStyle,
    pub spreadsheet_id: String,
    pub preview: PromptPreview,
}

/// Result of a confirmed schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfirmation {
    /// Id assigned by the service, e.g. `SCH0001`
    pub id: Option<String>,
    pub topic: String,
    pub scheduled_time: DateTime<Utc>,
}

impl ScheduleConfirmation {
    /// "Monday, March 4, 2030 at 09:30 AM" in local time.
    pub fn display_time(&self) -> String {
        self.scheduled_time
            .with_timezone(&Local)
            .format("%A, %B %-d, %Y at %I:%M %p")
            .to_string()
    }
}

/// Parse the form's local date and time.
pub fn parse_local_datetime(date: &str, time: &str) -> StudioResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| StudioError::validation(format!("Invalid date: {}", date)))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .map_err(|_| StudioError::validation(format!("Invalid time: {}", time)))?;

    Local
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| StudioError::validation("That local time does not exist"))
}

/// Creates, lists and cancels scheduled generations.
pub struct ScheduleManager {
    client: Arc<StudioClient>,
    progress: ProgressSimulator,
    pending: Option<PendingSchedule>,
    script_delay: Duration,
}

impl ScheduleManager {
    pub fn new(client: Arc<StudioClient>, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            client,
            progress: ProgressSimulator::new(sink),
            pending: None,
            script_delay: SCRIPT_DISPLAY_DELAY,
        }
    }

    pub fn with_script_delay(mut self, delay: Duration) -> Self {
        self.script_delay = delay;
        self
    }

    pub fn pending(&self) -> Option<&PendingSchedule> {
        self.pending.as_ref()
    }

    /// Validate the form and fetch a script to review.
    ///
    /// Every check runs before the first request: all fields filled, a
    /// spreadsheet configured, a Grok key present, and a time after `now`.
    pub async fn preview(
        &mut self,
        draft: ScheduleDraft,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> StudioResult<&mut PromptPreview> {
        let topic = draft.topic.trim().to_string();
        if topic.is_empty() || draft.date.trim().is_empty() || draft.time.trim().is_empty() {
            return Err(StudioError::validation("Please fill in all scheduling fields"));
        }

        let spreadsheet_id = credentials.spreadsheet_id.clone().ok_or_else(|| {
            StudioError::missing_credentials(
                "Please configure Google Sheets in the setup to use scheduling",
            )
        })?;
        if credentials.grok_api_key.is_empty() {
            return Err(StudioError::missing_credentials(
                "A Grok API key is required. Run setup first.",
            ));
        }

        let scheduled_time = parse_local_datetime(&draft.date, &draft.time)?;
        if scheduled_time <= now {
            return Err(StudioError::validation("Please select a future date and time"));
        }

        let request = ScriptRequest {
            topic: topic.clone(),
            duration: draft.duration,
            style: draft.style,
            grok_api_key: credentials.grok_api_key.clone(),
            images: draft.images,
        };

        self.pending = None;
        self.progress
            .play(0, SCRIPT_START_MESSAGE, SCHEDULE_SCRIPT_STEPS);
        let script = match self.client.generate_script(&request).await {
            Ok(script) => script,
            Err(e) => {
                self.progress.cancel();
                self.progress.sink().finish();
                return Err(e.into());
            }
        };

        self.progress.complete(SCHEDULE_SCRIPT_DONE_MESSAGE);
        tokio::time::sleep(self.script_delay).await;
        self.progress.sink().finish();

        let pending = self.pending.insert(PendingSchedule {
            topic,
            scheduled_time,
            duration: draft.duration,
            style: draft.style,
            spreadsheet_id,
            preview: PromptPreview::new(script),
        });
        Ok(&mut pending.preview)
    }

    /// Store the reviewed schedule. `prompt` replaces the previewed prompt.
    ///
    /// The pending schedule is kept if the service refuses it.
    pub async fn confirm(&mut self, prompt: Option<String>) -> StudioResult<ScheduleConfirmation> {
        let pending = self.pending.as_mut().ok_or(StudioError::NoPendingRequest)?;
        if let Some(prompt) = prompt {
            pending.preview.set_prompt(prompt);
        }

        let request = ScheduleRequest {
            topic: pending.topic.clone(),
            scheduled_time: pending.scheduled_time,
            duration: pending.duration.seconds(),
            style: pending.style.to_string(),
            script_data: pending.preview.commit(),
            spreadsheet_id: pending.spreadsheet_id.clone(),
        };

        let id = self.client.schedule_video(&request).await?;

        let confirmation = ScheduleConfirmation {
            id,
            topic: request.topic,
            scheduled_time: request.scheduled_time,
        };
        JobLogger::from_string(confirmation.id.as_deref().unwrap_or("-"), "schedule")
            .log_completion(&format!(
                "{} at {}",
                confirmation.topic,
                confirmation.scheduled_time.to_rfc3339()
            ));

        self.pending = None;
        Ok(confirmation)
    }

    /// Drop the schedule under review.
    pub fn discard(&mut self) {
        self.progress.cancel();
        self.pending = None;
    }

    /// Scheduled generations with display flags computed against `now`.
    ///
    /// Without a configured spreadsheet there is nothing to list and no
    /// request is made.
    pub async fn list(
        &self,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> StudioResult<Vec<ScheduleView>> {
        if credentials.spreadsheet_id.is_none() {
            return Ok(Vec::new());
        }

        let entries = self.client.scheduled_videos().await?;
        Ok(entries
            .into_iter()
            .map(|entry| ScheduleView::at(entry, now))
            .collect())
    }

    /// Cancel a pending entry. Not retried.
    pub async fn cancel(&self, id: &str) -> StudioResult<()> {
        let id = id.trim();
        if id.is_empty() {
            return Err(StudioError::validation("No scheduled video selected"));
        }

        self.client.cancel_scheduled(id).await?;
        info!(schedule_id = %id, "Cancelled scheduled video");
        Ok(())
    }

    /// Remove cancelled entries; returns the count and the message to show.
    pub async fn clear_cancelled(&self) -> StudioResult<(u64, String)> {
        let cleared = self.client.clear_cancelled().await?;
        info!(cleared, "Cleared cancelled videos");
        Ok((cleared, cleared_message(cleared)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_local_datetime() {
        let parsed = parse_local_datetime("2030-06-15", "09:30").unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!(local.year(), 2030);
        assert_eq!(local.month(), 6);
        assert_eq!(local.day(), 15);
        assert_eq!(local.hour(), 9);
        assert_eq!(local.minute(), 30);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_local_datetime("15/06/2030", "09:30"),
            Err(StudioError::Validation(_))
        ));
        assert!(parse_local_datetime("2030-06-15", "9.30pm").is_err());
    }

    #[test]
    fn test_display_time() {
        let confirmation = ScheduleConfirmation {
            id: Some("SCH0001".into()),
            topic: "Eclipse".into(),
            scheduled_time: parse_local_datetime("2030-03-04", "09:30").unwrap(),
        };
        assert_eq!(confirmation.display_time(), "Monday, March 4, 2030 at 09:30 AM");
    }
}
