//! CSRF token cache.
//!
//! The service protects every `/api/` mutation with a per-session token
//! issued by `GET /api/csrf-token`. The token is fetched lazily on first use
//! and reused until [`CsrfGuard::refresh`] drops it.

use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use driftly_models::api::CsrfTokenResponse;

use crate::error::{ClientError, ClientResult};

/// Header the service reads the token from.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Path of the token endpoint, relative to the service root.
pub const CSRF_TOKEN_PATH: &str = "api/csrf-token";

/// Whether requests to `path` carry the CSRF header.
pub fn requires_token(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    path.starts_with("api/") && !path.contains("csrf-token")
}

#[derive(Debug, Default)]
pub struct CsrfGuard {
    token: RwLock<Option<String>>,
}

impl CsrfGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached token, fetching it first if needed.
    ///
    /// A failed fetch is logged and yields an empty token; the service then
    /// rejects the request with its own message. Empty tokens are not cached.
    pub async fn token(&self, http: &Client, base: &Url) -> String {
        if let Some(token) = self.token.read().await.as_ref() {
            return token.clone();
        }

        let mut slot = self.token.write().await;
        if let Some(token) = slot.as_ref() {
            return token.clone();
        }

        match fetch_token(http, base).await {
            Ok(token) => {
                debug!("Obtained CSRF token");
                *slot = Some(token.clone());
                token
            }
            Err(e) => {
                warn!(error = %e, "Failed to get CSRF token");
                String::new()
            }
        }
    }

    /// Forget the cached token; the next request fetches a new one.
    pub async fn refresh(&self) {
        *self.token.write().await = None;
    }

    pub async fn is_cached(&self) -> bool {
        self.token.read().await.is_some()
    }
}

async fn fetch_token(http: &Client, base: &Url) -> ClientResult<String> {
    let url = base.join(CSRF_TOKEN_PATH)?;

    let response = http.get(url).send().await?;
    let status = response.status();
    if status.is_server_error() {
        return Err(ClientError::ServiceUnavailable(format!(
            "token endpoint returned {}",
            status
        )));
    }
    if !status.is_success() {
        return Err(ClientError::invalid_response(format!(
            "token endpoint returned {}",
            status
        )));
    }

    let body: CsrfTokenResponse = response.json().await?;
    Ok(body.csrf_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_token() {
        assert!(requires_token("api/generate-video"));
        assert!(requires_token("/api/schedule-video"));
        assert!(!requires_token("api/csrf-token"));
        assert!(!requires_token("health"));
        assert!(!requires_token("/static/app.js"));
    }

    #[tokio::test]
    async fn test_fetch_token_errors_are_typed() {
        let http = Client::new();

        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::path("/api/csrf-token"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        let err = fetch_token(&http, &base).await.unwrap_err();
        assert!(matches!(err, ClientError::ServiceUnavailable(_)));
        assert!(err.is_retryable());

        let base = Url::parse("http://127.0.0.1:9/").unwrap();
        let err = fetch_token(&http, &base).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_gives_empty_token() {
        let guard = CsrfGuard::new();
        let http = Client::new();
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let base = Url::parse("http://127.0.0.1:9/").unwrap();

        assert_eq!(guard.token(&http, &base).await, "");
        assert!(!guard.is_cached().await);
    }
}
