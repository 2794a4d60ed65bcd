//! Recent videos, usage stats and topic ideas.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use driftly_client::StudioClient;
use driftly_models::{escape_html, time_ago, RecentVideo, Stats};

use crate::credentials::Credentials;
use crate::error::{StudioError, StudioResult};

/// A recent video ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentVideoView {
    pub title: String,
    pub topic: String,
    /// `None` when the video was never uploaded
    pub url: Option<String>,
    /// "just now", "5 min ago", ...
    pub age: String,
}

impl RecentVideoView {
    pub fn at(video: &RecentVideo, now: DateTime<Utc>) -> Self {
        Self {
            title: video
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            topic: video.topic.clone().unwrap_or_default(),
            url: video.url().map(str::to_string),
            age: video
                .created_at()
                .map(|created| time_ago(created, now))
                .unwrap_or_default(),
        }
    }

    /// List item markup; every server-provided string is escaped.
    pub fn to_html(&self) -> String {
        let link = match &self.url {
            Some(url) => format!(
                r#"<a href="{}" target="_blank" class="video-link">Watch</a>"#,
                escape_html(url)
            ),
            None => r#"<span class="badge">Local Only</span>"#.to_string(),
        };

        format!(
            r#"<div class="video-item"><div class="video-title">{}</div><div class="video-meta">{} &middot; {}</div>{}</div>"#,
            escape_html(&self.title),
            escape_html(&self.topic),
            escape_html(&self.age),
            link
        )
    }
}

/// Read-only views of the service.
pub struct Dashboard {
    client: Arc<StudioClient>,
}

impl Dashboard {
    pub fn new(client: Arc<StudioClient>) -> Self {
        Self { client }
    }

    pub async fn recent_videos(&self, now: DateTime<Utc>) -> StudioResult<Vec<RecentVideoView>> {
        let videos = self.client.recent_videos().await?;
        Ok(videos
            .iter()
            .map(|video| RecentVideoView::at(video, now))
            .collect())
    }

    /// Usage counters. A failure only costs the stats panel.
    pub async fn stats(&self) -> Option<Stats> {
        match self.client.stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(error = %e, "Failed to load stats");
                None
            }
        }
    }

    /// Suggest a topic using the stored Grok key.
    pub async fn random_idea(&self, credentials: &Credentials) -> StudioResult<String> {
        if credentials.grok_api_key.is_empty() {
            return Err(StudioError::missing_credentials(
                "A Grok API key is required. Run setup first.",
            ));
        }
        Ok(self.client.random_idea(&credentials.grok_api_key).await?)
    }

    pub async fn health(&self) -> bool {
        self.client.health_check().await.unwrap_or(false)
    }
}
