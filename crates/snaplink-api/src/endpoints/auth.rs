// Authentication endpoints
//
// Login and registration exchange email/password for a bearer token.
// Both are auth-entry requests: a 401 here means bad credentials and
// never invalidates a stored session.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::auth::RequestScope;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{AuthRequest, AuthResponse};

impl ApiClient {
    /// Exchange credentials for an access token.
    ///
    /// `POST /auth/login {email, password} -> {access_token, user}`
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<AuthResponse, Error> {
        debug!(email, "logging in");
        self.authenticate(&["auth", "login"], email, password).await
    }

    /// Create an account; the server signs the new user in directly.
    ///
    /// `POST /auth/register {email, password} -> {access_token, user}`
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, Error> {
        debug!(email, "registering account");
        self.authenticate(&["auth", "register"], email, password)
            .await
    }

    async fn authenticate(
        &self,
        segments: &[&str],
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, Error> {
        let body = AuthRequest {
            email,
            password: password.expose_secret(),
        };
        self.dispatch(Method::POST, segments, Some(&body), RequestScope::AuthEntry)
            .await
    }
}
