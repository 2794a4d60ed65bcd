//! Per-session workflow state.

use driftly_client::ImageAttachment;
use driftly_models::{JobId, VideoDuration, VideoStyle};

use crate::credentials::Credentials;
use crate::preview::PromptPreview;

/// A generation waiting for the user to approve its script.
#[derive(Debug, Clone)]
pub struct PendingVideo {
    pub topic: String,
    pub duration: VideoDuration,
    pub style: VideoStyle,
    pub images: Vec<ImageAttachment>,
    /// Settings captured when the script was requested
    pub credentials: Credentials,
    pub preview: PromptPreview,
}

/// What one user session is doing.
///
/// Holds at most one tracked job; a new submission is refused while it is
/// set.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    active_job: Option<JobId>,
    pending_video: Option<PendingVideo>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_job(&self) -> Option<&JobId> {
        self.active_job.as_ref()
    }

    pub fn set_active_job(&mut self, job_id: JobId) {
        self.active_job = Some(job_id);
    }

    pub fn clear_active_job(&mut self) -> Option<JobId> {
        self.active_job.take()
    }

    pub fn pending_video(&self) -> Option<&PendingVideo> {
        self.pending_video.as_ref()
    }

    pub fn pending_video_mut(&mut self) -> Option<&mut PendingVideo> {
        self.pending_video.as_mut()
    }

    pub fn set_pending_video(&mut self, pending: PendingVideo) {
        self.pending_video = Some(pending);
    }

    pub fn take_pending_video(&mut self) -> Option<PendingVideo> {
        self.pending_video.take()
    }

    /// Forget everything, as after resetting the form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
