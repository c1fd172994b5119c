use secrecy::SecretString;

/// Source of the bearer token attached to outgoing requests.
///
/// The client asks for the token on every request, so a session persisted
/// or cleared between calls takes effect immediately. Implemented by
/// `snaplink_core::SessionManager` over durable storage.
pub trait TokenProvider: Send + Sync {
    /// The current bearer token, or `None` when signed out.
    fn bearer_token(&self) -> Option<SecretString>;

    /// Called when the server answers an authenticated request with 401.
    ///
    /// Implementations tear the session down and notify observers. Several
    /// in-flight requests may report the same rejection; only the first
    /// should have an effect.
    fn session_rejected(&self);
}

/// Whether a 401 on this request means "the stored session is dead".
///
/// Login and registration run before any session exists, so a 401 there is
/// just bad credentials and must not invalidate anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    /// Ordinary request made on behalf of a signed-in user.
    Authenticated,
    /// Login / registration request.
    AuthEntry,
}

/// Provider that never sends a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl TokenProvider for Anonymous {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }

    fn session_rejected(&self) {}
}

/// Provider with a fixed token (scripts, CI, tests).
///
/// Rejections are ignored: there is nothing persisted to clear.
#[derive(Debug, Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<SecretString> {
        Some(self.0.clone())
    }

    fn session_rejected(&self) {}
}
