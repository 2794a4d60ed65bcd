//! Password login against the service.

use std::sync::Arc;

use tracing::info;

use driftly_client::{LoginOutcome, StudioClient};
use driftly_models::AuthStatus;

use crate::error::{StudioError, StudioResult};

pub struct AuthManager {
    client: Arc<StudioClient>,
}

impl AuthManager {
    pub fn new(client: Arc<StudioClient>) -> Self {
        Self { client }
    }

    pub async fn status(&self) -> StudioResult<AuthStatus> {
        Ok(self.client.auth_status().await?)
    }

    /// Log in, or set the password when none is configured yet.
    ///
    /// A wrong password surfaces as the service's "Invalid password".
    pub async fn login(&self, password: &str) -> StudioResult<LoginOutcome> {
        if password.is_empty() {
            return Err(StudioError::validation("Please enter a password"));
        }

        let outcome = self.client.login(password).await?;
        match &outcome {
            LoginOutcome::LoggedIn => info!("Logged in"),
            LoginOutcome::PasswordCreated { .. } => info!("Password created"),
        }
        Ok(outcome)
    }

    pub async fn logout(&self) -> StudioResult<()> {
        self.client.logout().await?;
        info!("Logged out");
        Ok(())
    }
}
