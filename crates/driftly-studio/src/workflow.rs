//! Script review, job submission and status polling.
//!
//! The flow for one video:
//!
//! 1. [`GenerationWorkflow::request_script`] asks the service for a script
//!    and keeps it as a [`PromptPreview`] for review.
//! 2. [`GenerationWorkflow::submit`] sends the reviewed script and makes the
//!    returned job the session's active job.
//! 3. [`GenerationWorkflow::poll`] checks the job until it finishes, maps the
//!    service's phase text to a percentage and reports the outcome.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, Instrument};

use driftly_client::{ImageAttachment, ScriptRequest, StudioClient, VideoRequest};
use driftly_models::{
    phase_progress, Job, JobId, JobStatus, VideoDuration, VideoStyle, COMPLETE_PERCENT,
};

use crate::config::PollConfig;
use crate::credentials::Credentials;
use crate::error::{StudioError, StudioResult};
use crate::logging::JobLogger;
use crate::preview::PromptPreview;
use crate::progress::{ProgressSimulator, ProgressSink};
use crate::retry::FailureTracker;
use crate::session::{PendingVideo, SessionState};

/// Status text shown once a job completed.
pub const COMPLETE_MESSAGE: &str = "Complete!";

/// Pause after "Script generated successfully!" before the preview is shown.
pub const SCRIPT_DISPLAY_DELAY: Duration = Duration::from_millis(800);

/// Consecutive status failures logged before going quiet.
const MAX_LOGGED_POLL_FAILURES: u32 = 3;

/// What the user asked for.
#[derive(Debug, Clone)]
pub struct VideoDraft {
    pub topic: String,
    pub duration: VideoDuration,
    pub style: VideoStyle,
    pub images: Vec<ImageAttachment>,
}

impl VideoDraft {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            duration: VideoDuration::default(),
            style: VideoStyle::default(),
            images: Vec::new(),
        }
    }
}

/// How a polled job ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(Job),
    Failed(Job),
}

impl JobOutcome {
    pub fn job(&self) -> &Job {
        match self {
            JobOutcome::Completed(job) | JobOutcome::Failed(job) => job,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed(_))
    }

    /// The service's error text for a failed job.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            JobOutcome::Failed(job) => Some(job.error_message()),
            JobOutcome::Completed(_) => None,
        }
    }
}

/// Drives one session's video generation.
///
/// All methods take `&mut self`, so a session never runs two steps at once.
pub struct GenerationWorkflow {
    client: Arc<StudioClient>,
    session: SessionState,
    progress: ProgressSimulator,
    poll: PollConfig,
    script_delay: Duration,
}

impl GenerationWorkflow {
    pub fn new(client: Arc<StudioClient>, sink: Arc<dyn ProgressSink>, poll: PollConfig) -> Self {
        Self {
            client,
            session: SessionState::new(),
            progress: ProgressSimulator::new(sink),
            poll,
            script_delay: SCRIPT_DISPLAY_DELAY,
        }
    }

    /// Override the pause after a script arrives.
    pub fn with_script_delay(mut self, delay: Duration) -> Self {
        self.script_delay = delay;
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    fn sink(&self) -> &Arc<dyn ProgressSink> {
        self.progress.sink()
    }

    fn ensure_idle(&self) -> StudioResult<()> {
        match self.session.active_job() {
            Some(job_id) => Err(StudioError::JobInProgress(job_id.clone())),
            None => Ok(()),
        }
    }

    /// Ask the service for a script and hold it for review.
    ///
    /// Input and credentials are checked before any request is made.
    pub async fn request_script(
        &mut self,
        draft: VideoDraft,
        credentials: &Credentials,
    ) -> StudioResult<&mut PromptPreview> {
        self.ensure_idle()?;

        let topic = draft.topic.trim().to_string();
        if topic.is_empty() {
            return Err(StudioError::validation("Please enter a topic"));
        }
        if credentials.grok_api_key.is_empty() || credentials.fal_api_key.is_empty() {
            return Err(StudioError::missing_credentials(
                "Grok and FAL API keys are required. Run setup first.",
            ));
        }

        let request = ScriptRequest {
            topic: topic.clone(),
            duration: draft.duration,
            style: draft.style,
            grok_api_key: credentials.grok_api_key.clone(),
            images: draft.images.clone(),
        };

        self.progress.start_script_generation();
        let script = match self.client.generate_script(&request).await {
            Ok(script) => script,
            Err(e) => {
                self.progress.cancel();
                self.sink().finish();
                return Err(e.into());
            }
        };

        self.progress.complete_script();
        tokio::time::sleep(self.script_delay).await;
        self.sink().finish();

        debug!(topic = %topic, title = %script.title(), "Script ready for review");

        self.session.set_pending_video(PendingVideo {
            topic,
            duration: draft.duration,
            style: draft.style,
            images: draft.images,
            credentials: credentials.clone(),
            preview: PromptPreview::new(script),
        });

        self.session
            .pending_video_mut()
            .map(|pending| &mut pending.preview)
            .ok_or(StudioError::NoPendingRequest)
    }

    /// Preview waiting for approval, if any.
    pub fn pending_preview_mut(&mut self) -> Option<&mut PromptPreview> {
        self.session
            .pending_video_mut()
            .map(|pending| &mut pending.preview)
    }

    /// Submit the reviewed script for rendering.
    ///
    /// `prompt` replaces the previewed prompt when given. On success the job
    /// becomes the active job; on failure nothing is tracked and the preview
    /// stays available for another attempt.
    pub async fn submit(&mut self, prompt: Option<String>) -> StudioResult<JobId> {
        self.ensure_idle()?;

        let mut pending = self
            .session
            .take_pending_video()
            .ok_or(StudioError::NoPendingRequest)?;
        if let Some(prompt) = prompt {
            pending.preview.set_prompt(prompt);
        }

        let request = VideoRequest {
            topic: pending.topic.clone(),
            grok_api_key: pending.credentials.grok_api_key.clone(),
            fal_api_key: pending.credentials.fal_api_key.clone(),
            use_youtube: pending.credentials.use_youtube,
            youtube_client_secrets: pending.credentials.youtube_client_secrets.clone(),
            duration: pending.duration,
            script_data: pending.preview.commit(),
            images: pending.images.clone(),
        };

        self.progress.start_submission();
        match self.client.generate_video(&request).await {
            Ok(job_id) => {
                JobLogger::new(&job_id, "generate").log_start(&pending.topic);
                self.session.set_active_job(job_id.clone());
                Ok(job_id)
            }
            Err(e) => {
                self.progress.cancel();
                self.sink().finish();
                self.session.set_pending_video(pending);
                Err(e.into())
            }
        }
    }

    /// Follow the active job until it completes or fails.
    ///
    /// The active job is released when polling ends, including when the
    /// returned future is dropped early.
    pub async fn poll(&mut self) -> StudioResult<JobOutcome> {
        let job_id = self
            .session
            .active_job()
            .cloned()
            .ok_or(StudioError::NoPendingRequest)?;

        let Self {
            client,
            session,
            progress,
            poll,
            ..
        } = self;
        let _active = ActiveJobGuard {
            session,
            sink: progress.sink().clone(),
        };
        let logger = JobLogger::new(&job_id, "poll");
        poll_job(client, poll, progress, &logger, &job_id)
            .instrument(logger.create_span())
            .await
    }

    /// Follow a job submitted elsewhere, e.g. in an earlier session.
    pub async fn track(&mut self, job_id: JobId) -> StudioResult<JobOutcome> {
        self.ensure_idle()?;
        self.session.set_active_job(job_id);
        self.poll().await
    }

    /// Drop the tracked job and any pending preview.
    pub fn reset(&mut self) {
        self.progress.cancel();
        self.session.reset();
    }
}

/// Releases the session's active job when polling stops for any reason.
struct ActiveJobGuard<'a> {
    session: &'a mut SessionState,
    sink: Arc<dyn ProgressSink>,
}

impl Drop for ActiveJobGuard<'_> {
    fn drop(&mut self) {
        if let Some(job_id) = self.session.clear_active_job() {
            debug!(job_id = %job_id, "Released active job");
        }
        self.sink.finish();
    }
}

/// One status check per round. The wait before each check is the poll
/// interval, doubled for every consecutive failed check up to the backoff cap.
async fn poll_job(
    client: &StudioClient,
    config: &PollConfig,
    progress: &mut ProgressSimulator,
    logger: &JobLogger,
    job_id: &JobId,
) -> StudioResult<JobOutcome> {
    let mut failures = FailureTracker::new(MAX_LOGGED_POLL_FAILURES);
    let mut last_progress: Option<String> = None;

    for attempt in 1..=config.max_attempts {
        tokio::time::sleep(config.delay_after(failures.failure_count())).await;

        let job = match client.job_status(job_id).await {
            Ok(job) => {
                failures.record_success();
                job
            }
            Err(e) => {
                if failures.record_failure() {
                    logger.log_warning(&format!("Status check {} failed: {}", attempt, e));
                }
                continue;
            }
        };

        progress.cancel();
        apply_phase(progress.sink(), &job);

        if last_progress.as_deref() != Some(job.progress.as_str()) {
            logger.log_progress(&job.progress);
            last_progress = Some(job.progress.clone());
        }

        match job.status {
            JobStatus::Completed => {
                let sink = progress.sink();
                sink.set_percent(COMPLETE_PERCENT);
                sink.set_message(COMPLETE_MESSAGE);
                logger.log_completion(job.display_title());
                tokio::time::sleep(config.completion_delay).await;
                return Ok(JobOutcome::Completed(job));
            }
            JobStatus::Error => {
                logger.log_error(job.error_message());
                return Ok(JobOutcome::Failed(job));
            }
            JobStatus::Pending | JobStatus::Running | JobStatus::Unknown => {}
        }
    }

    info!(
        job_id = %job_id,
        attempts = config.max_attempts,
        "Stopped polling without a final status"
    );
    Err(StudioError::PollTimeout {
        attempts: config.max_attempts,
    })
}

/// Show the phase text and, when it names a known phase, its percentage.
fn apply_phase(sink: &Arc<dyn ProgressSink>, job: &Job) {
    sink.set_message(&job.progress);
    if let Some(percent) = phase_progress(&job.progress) {
        sink.set_percent(percent);
    }
}
