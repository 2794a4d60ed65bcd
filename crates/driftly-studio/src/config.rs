//! Studio configuration.

use std::path::PathBuf;
use std::time::Duration;

use driftly_client::ClientConfig;

use crate::retry::Backoff;

/// Studio configuration.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Base URL of the studio service
    pub service_url: String,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Retries for idempotent reads
    pub max_retries: u32,
    /// Delay between job status checks
    pub poll_interval: Duration,
    /// Status checks before giving up on a job
    pub poll_max_attempts: u32,
    /// Upper bound for the backoff after failed status checks
    pub poll_max_backoff: Duration,
    /// Pause between the "Complete!" update and the result
    pub completion_delay: Duration,
    /// Where API keys and settings are kept
    pub credentials_path: PathBuf,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:5000".to_string(),
            request_timeout: Duration::from_secs(60),
            max_retries: 2,
            poll_interval: Duration::from_millis(2000),
            poll_max_attempts: 900, // 30 minutes at the default interval
            poll_max_backoff: Duration::from_secs(30),
            completion_delay: Duration::from_millis(500),
            credentials_path: default_credentials_path(),
        }
    }
}

impl StudioConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            service_url: std::env::var("DRIFTLY_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("DRIFTLY_REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            max_retries: std::env::var("DRIFTLY_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            poll_interval: Duration::from_millis(
                std::env::var("DRIFTLY_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            ),
            poll_max_attempts: std::env::var("DRIFTLY_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(900),
            poll_max_backoff: Duration::from_secs(
                std::env::var("DRIFTLY_POLL_MAX_BACKOFF_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            completion_delay: Duration::from_millis(
                std::env::var("DRIFTLY_COMPLETION_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
            credentials_path: std::env::var("DRIFTLY_CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_credentials_path()),
        }
    }

    /// HTTP client settings.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.service_url.clone(),
            timeout: self.request_timeout,
            max_retries: self.max_retries,
        }
    }

    /// Job polling settings.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: self.poll_interval,
            max_attempts: self.poll_max_attempts,
            max_backoff: self.poll_max_backoff,
            completion_delay: self.completion_delay,
        }
    }
}

/// Job status polling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
    pub max_backoff: Duration,
    pub completion_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        StudioConfig::default().poll_config()
    }
}

impl PollConfig {
    /// Wait before the next check after `consecutive_failures` failed ones.
    pub fn delay_after(&self, consecutive_failures: u32) -> Duration {
        Backoff::new(self.interval, self.max_backoff).delay_for_attempt(consecutive_failures)
    }
}

/// `<config dir>/driftly/credentials.json`, or the working directory when
/// the platform has no config dir.
fn default_credentials_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("driftly").join("credentials.json"))
        .unwrap_or_else(|| PathBuf::from("driftly-credentials.json"))
}
