//! Studio service HTTP client.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use driftly_models::api::{
    Acknowledged, ClearedPayload, Envelope, HealthResponse, IdeaPayload, JobPayload,
    JobSubmitted, LoginPayload, LoginRequest, RandomIdeaRequest, RecentVideosPayload,
    ScheduleCreated, ScheduledVideosPayload, ScriptPayload,
};
use driftly_models::{
    AuthStatus, Job, JobId, RecentVideo, ScheduleEntry, ScheduleRequest, ScriptData, Stats,
};

use crate::csrf::{requires_token, CsrfGuard, CSRF_HEADER};
use crate::error::{ClientError, ClientResult};
use crate::types::{LoginOutcome, ScriptRequest, VideoRequest};

/// Reply when the service accepted a script request but sent nothing back.
pub const NO_SCRIPT_DATA: &str = "No script data received from server";

/// Configuration for the studio client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the studio service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries for idempotent reads
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 2,
        }
    }
}

/// Client for the studio service.
///
/// Session cookies are kept for the lifetime of the client, so the CSRF
/// token and the login state belong to one session.
pub struct StudioClient {
    http: Client,
    base: Url,
    config: ClientConfig,
    csrf: CsrfGuard,
}

impl StudioClient {
    /// Create a new studio client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let mut root = config.base_url.trim_end_matches('/').to_string();
        root.push('/');
        let base = Url::parse(&root)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            http,
            base,
            config,
            csrf: CsrfGuard::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Drop the cached CSRF token.
    pub async fn refresh_csrf(&self) {
        self.csrf.refresh().await;
    }

    /// Check if the studio service is healthy.
    pub async fn health_check(&self) -> ClientResult<bool> {
        let url = self.base.join("health")?;

        match self.http.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.status == "healthy" || health.status == "ok")
            }
            Ok(response) => {
                warn!("Studio service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Studio service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Ask the service to write a script for a topic.
    pub async fn generate_script(&self, request: &ScriptRequest) -> ClientResult<ScriptData> {
        let path = "api/generate-script";
        debug!(
            topic = %request.topic,
            images = request.images.len(),
            "Requesting script"
        );

        let response = self
            .request(Method::POST, path)
            .await?
            .multipart(request.to_form()?)
            .send()
            .await?;

        let payload: ScriptPayload = self.read_envelope(path, response).await?;
        payload
            .script_data
            .ok_or_else(|| ClientError::rejected(NO_SCRIPT_DATA))
    }

    /// Submit a video generation job.
    pub async fn generate_video(&self, request: &VideoRequest) -> ClientResult<JobId> {
        let path = "api/generate-video";

        let response = self
            .request(Method::POST, path)
            .await?
            .multipart(request.to_form()?)
            .send()
            .await?;

        let payload: JobSubmitted = self.read_envelope(path, response).await?;
        let job_id = payload
            .job_id
            .ok_or_else(|| ClientError::invalid_response("generate-video reply has no job_id"))?;

        info!(job_id = %job_id, "Video generation job submitted");
        Ok(job_id)
    }

    /// Fetch the current state of a job.
    ///
    /// Not retried here; the polling loop owns its retry schedule.
    pub async fn job_status(&self, job_id: &JobId) -> ClientResult<Job> {
        let path = format!("api/status/{}", urlencoding::encode(job_id.as_str()));

        let response = self.request(Method::GET, &path).await?.send().await?;
        let payload: JobPayload = self.read_envelope(&path, response).await?;

        let mut job = payload
            .job
            .ok_or_else(|| ClientError::invalid_response("status reply has no job"))?;
        if job.id.as_str().is_empty() {
            job.id = job_id.clone();
        }
        Ok(job)
    }

    pub async fn recent_videos(&self) -> ClientResult<Vec<RecentVideo>> {
        let payload: RecentVideosPayload = self.get_envelope("api/recent-videos").await?;
        Ok(payload.videos)
    }

    pub async fn stats(&self) -> ClientResult<Stats> {
        self.get_envelope("api/stats").await
    }

    /// Store a deferred generation. Returns the id the service assigned.
    pub async fn schedule_video(&self, request: &ScheduleRequest) -> ClientResult<Option<String>> {
        let path = "api/schedule-video";

        let response = self
            .request(Method::POST, path)
            .await?
            .json(request)
            .send()
            .await?;

        let payload: ScheduleCreated = self.read_envelope(path, response).await?;
        Ok(payload.id)
    }

    pub async fn scheduled_videos(&self) -> ClientResult<Vec<ScheduleEntry>> {
        let payload: ScheduledVideosPayload = self.get_envelope("api/scheduled-videos").await?;
        let (entries, skipped) = payload.into_entries();
        for reason in &skipped {
            warn!(reason = %reason, "Skipping unusable scheduled row");
        }
        Ok(entries)
    }

    /// Cancel a pending scheduled generation.
    pub async fn cancel_scheduled(&self, id: &str) -> ClientResult<()> {
        let path = format!("api/cancel-scheduled/{}", urlencoding::encode(id));

        let response = self.request(Method::DELETE, &path).await?.send().await?;
        let _: Acknowledged = self.read_envelope(&path, response).await?;
        Ok(())
    }

    /// Remove cancelled entries from the schedule. Returns how many went.
    pub async fn clear_cancelled(&self) -> ClientResult<u64> {
        let path = "api/clear-cancelled-videos";

        let response = self.request(Method::DELETE, path).await?.send().await?;
        let payload: ClearedPayload = self.read_envelope(path, response).await?;
        Ok(payload.cleared)
    }

    /// Ask the model for a topic suggestion.
    pub async fn random_idea(&self, grok_api_key: &str) -> ClientResult<String> {
        let path = "api/random-idea";

        let response = self
            .request(Method::POST, path)
            .await?
            .json(&RandomIdeaRequest { grok_api_key })
            .send()
            .await?;

        let payload: IdeaPayload = self.read_envelope(path, response).await?;
        payload
            .idea
            .filter(|idea| !idea.trim().is_empty())
            .ok_or_else(|| ClientError::invalid_response("random-idea reply has no idea"))
    }

    pub async fn login(&self, password: &str) -> ClientResult<LoginOutcome> {
        let path = "api/auth/login";

        let response = self
            .request(Method::POST, path)
            .await?
            .json(&LoginRequest { password })
            .send()
            .await?;

        let payload: LoginPayload = self.read_envelope(path, response).await?;
        Ok(match payload.env_var {
            Some(env_var) => LoginOutcome::PasswordCreated { env_var },
            None => LoginOutcome::LoggedIn,
        })
    }

    pub async fn logout(&self) -> ClientResult<()> {
        let path = "api/auth/logout";

        let response = self.request(Method::POST, path).await?.send().await?;
        let _: Acknowledged = self.read_envelope(path, response).await?;
        Ok(())
    }

    /// Session authentication state. This endpoint has no envelope.
    pub async fn auth_status(&self) -> ClientResult<AuthStatus> {
        let path = "api/auth/status";

        self.with_retry(|| async {
            let response = self.request(Method::GET, path).await?.send().await?;
            let status = response.status();
            if status.is_server_error() {
                return Err(ClientError::ServiceUnavailable(format!(
                    "{} returned {}",
                    path, status
                )));
            }
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                ClientError::invalid_response(format!("{} returned {}: {}", path, status, e))
            })
        })
        .await
    }

    /// Build a request, attaching the CSRF header where the service wants it.
    async fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.base.join(path)?;
        let mut builder = self.http.request(method, url);

        if requires_token(path) {
            let token = self.csrf.token(&self.http, &self.base).await;
            builder = builder.header(CSRF_HEADER, token);
        }

        Ok(builder)
    }

    /// GET an enveloped payload, retrying transport failures.
    async fn get_envelope<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.with_retry(|| async {
            let response = self.request(Method::GET, path).await?.send().await?;
            self.read_envelope(path, response).await
        })
        .await
    }

    /// Decode a `{success, error, ...}` reply.
    ///
    /// `success: false` becomes [`ClientError::Rejected`] with the service's
    /// message. A body that is not an envelope is a transport problem on 5xx
    /// and an invalid response otherwise.
    async fn read_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        response: Response,
    ) -> ClientResult<T> {
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => match envelope.into_result() {
                Ok(data) => Ok(data),
                Err(message) => {
                    if mentions_csrf(&message) {
                        self.csrf.refresh().await;
                    }
                    debug!(path, %status, error = %message, "Request rejected");
                    Err(ClientError::Rejected(message))
                }
            },
            Err(_) if status.is_server_error() => Err(ClientError::ServiceUnavailable(format!(
                "{} returned {}",
                path, status
            ))),
            Err(_) if mentions_csrf(&body) => {
                self.csrf.refresh().await;
                Err(ClientError::rejected(
                    "The session security token expired. Please try again.",
                ))
            }
            Err(e) => Err(ClientError::invalid_response(format!(
                "{} returned {}: {}",
                path, status, e
            ))),
        }
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> ClientResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = ClientResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Studio request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| ClientError::ServiceUnavailable("retries exhausted".to_string())))
    }
}

fn mentions_csrf(text: &str) -> bool {
    text.contains("CSRF")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let client = StudioClient::new(ClientConfig {
            base_url: "http://studio.local/app".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.base_url().join("api/stats").unwrap().as_str(),
            "http://studio.local/app/api/stats"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = StudioClient::new(ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        });
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
