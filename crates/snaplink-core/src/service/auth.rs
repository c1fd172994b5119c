// Account sign-up, sign-in and sign-out.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, warn};

use snaplink_api::{ApiClient, AuthResponse, User};

use crate::error::{AUTH_FALLBACK_MESSAGE, ServiceError};
use crate::session::SessionManager;

/// Authentication operations bound to one session.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: Arc<SessionManager>,
}

impl AuthService {
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        Self { api, session }
    }

    /// Create an account and sign in with it.
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, ServiceError> {
        let response = self
            .api
            .register(email, password)
            .await
            .map_err(normalize)?;
        self.store(email, &response)?;
        Ok(response)
    }

    /// Exchange credentials for a session.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, ServiceError> {
        let response = self.api.login(email, password).await.map_err(normalize)?;
        self.store(email, &response)?;
        Ok(response)
    }

    /// Drop the stored session. Never contacts the server.
    pub fn logout(&self) -> Result<(), ServiceError> {
        self.session.clear()?;
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    /// Presence check on the stored token; the token is not validated.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    fn store(&self, email: &str, response: &AuthResponse) -> Result<(), ServiceError> {
        let Some(token) = response.access_token.as_deref().filter(|t| !t.is_empty()) else {
            warn!(email, "auth response carried no access token, session not stored");
            return Ok(());
        };
        let user = response
            .user
            .clone()
            .unwrap_or_else(|| User::new(email));
        self.session.persist(token, &user)?;
        debug!(email = %user.email, "signed in");
        Ok(())
    }
}

fn normalize(err: snaplink_api::Error) -> ServiceError {
    ServiceError::normalize(err, AUTH_FALLBACK_MESSAGE)
}
