//! Studio service request types.

use std::fmt;

use driftly_models::{mask_secret, ScriptData, VideoDuration, VideoStyle};
use reqwest::multipart::Form;

use crate::attachment::ImageAttachment;
use crate::error::ClientResult;

/// Request for a script preview.
#[derive(Clone)]
pub struct ScriptRequest {
    pub topic: String,
    pub duration: VideoDuration,
    pub style: VideoStyle,
    pub grok_api_key: String,
    /// Reference images for the model to look at
    pub images: Vec<ImageAttachment>,
}

impl ScriptRequest {
    pub(crate) fn to_form(&self) -> ClientResult<Form> {
        let mut form = Form::new()
            .text("topic", self.topic.clone())
            .text("duration", self.duration.to_string())
            .text("videoStyle", self.style.to_string())
            .text("grokApiKey", self.grok_api_key.clone());

        for image in &self.images {
            form = form.part("images", image.to_part()?);
        }

        Ok(form)
    }
}

impl fmt::Debug for ScriptRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptRequest")
            .field("topic", &self.topic)
            .field("duration", &self.duration)
            .field("style", &self.style)
            .field("grok_api_key", &mask_secret(&self.grok_api_key))
            .field("images", &self.images.len())
            .finish()
    }
}

/// Request to render a video from a reviewed script.
#[derive(Clone)]
pub struct VideoRequest {
    pub topic: String,
    pub grok_api_key: String,
    pub fal_api_key: String,
    pub use_youtube: bool,
    pub youtube_client_secrets: String,
    pub duration: VideoDuration,
    pub script_data: ScriptData,
    pub images: Vec<ImageAttachment>,
}

impl VideoRequest {
    pub(crate) fn to_form(&self) -> ClientResult<Form> {
        let mut form = Form::new()
            .text("topic", self.topic.clone())
            .text("grokApiKey", self.grok_api_key.clone())
            .text("falApiKey", self.fal_api_key.clone())
            .text("useYoutube", self.use_youtube.to_string())
            .text("youtubeClientSecrets", self.youtube_client_secrets.clone())
            .text("duration", self.duration.to_string())
            .text("scriptData", serde_json::to_string(&self.script_data)?);

        for image in &self.images {
            form = form.part("images", image.to_part()?);
        }

        Ok(form)
    }
}

impl fmt::Debug for VideoRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoRequest")
            .field("topic", &self.topic)
            .field("grok_api_key", &mask_secret(&self.grok_api_key))
            .field("fal_api_key", &mask_secret(&self.fal_api_key))
            .field("use_youtube", &self.use_youtube)
            .field("duration", &self.duration)
            .field("title", &self.script_data.title())
            .field("images", &self.images.len())
            .finish()
    }
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Session is now authenticated
    LoggedIn,
    /// No password was configured yet; the service returned the hash line
    /// to add to `.env`
    PasswordCreated { env_var: String },
}
