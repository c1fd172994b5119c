use serde::Deserialize;
use thiserror::Error;

/// Top-level error type for the `snaplink-api` crate.
///
/// Every failed call is classified exactly once, in
/// [`ApiClient`](crate::ApiClient)'s response handling, so call sites never
/// branch on raw status codes. `snaplink-core` normalizes these into a single
/// user-facing message per failure.
#[derive(Debug, Error)]
pub enum Error {
    // ── HTTP status classes ─────────────────────────────────────────
    /// The server rejected the credentials or session (HTTP 401).
    #[error("Authentication failed: {}", .message.as_deref().unwrap_or("session expired or invalid credentials"))]
    Authentication { message: Option<String> },

    /// The session is valid but lacks access to the resource (HTTP 403).
    #[error("Access forbidden: {}", .message.as_deref().unwrap_or("insufficient permissions"))]
    Permission { message: Option<String> },

    /// The resource does not exist (HTTP 404), e.g. a link deleted elsewhere.
    #[error("Not found: {path}")]
    NotFound {
        path: String,
        message: Option<String>,
    },

    /// The server failed to process the request (HTTP 5xx).
    #[error("Server error (HTTP {status}): {}", .message.as_deref().unwrap_or("please try again later"))]
    Server { status: u16, message: Option<String> },

    /// Any other rejected request (400, 409, ...). Server-side validation
    /// failures land here.
    #[error("Request rejected (HTTP {status}): {}", .message.as_deref().unwrap_or("no details provided"))]
    Api { status: u16, message: Option<String> },

    // ── Transport ───────────────────────────────────────────────────
    /// No response within the configured timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The server could not be reached (connection refused, DNS failure, ...).
    #[error("Network error - please check your connection: {0}")]
    Network(#[source] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments.
    #[error("Base URL cannot be used for API requests: {0}")]
    InvalidBaseUrl(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Fixed taxonomy of failures, independent of transport details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Client-side input rejected before dispatch.
    Validation,
    /// HTTP 401.
    Auth,
    /// HTTP 403.
    Permission,
    /// HTTP 404.
    NotFound,
    /// HTTP 5xx.
    Server,
    /// Timeout or unreachable server.
    Network,
    /// Any other server rejection.
    Api,
    /// Local failures: malformed responses, bad configuration.
    Internal,
}

impl Error {
    /// Classify this error into the fixed taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Auth,
            Self::Permission { .. } => ErrorKind::Permission,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Server { .. } => ErrorKind::Server,
            Self::Api { .. } => ErrorKind::Api,
            Self::Timeout { .. } | Self::Network(_) => ErrorKind::Network,
            Self::InvalidUrl(_)
            | Self::InvalidBaseUrl(_)
            | Self::Client(_)
            | Self::Deserialization { .. } => ErrorKind::Internal,
        }
    }

    /// The structured `message` the server attached to the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Authentication { message }
            | Self::Permission { message }
            | Self::NotFound { message, .. }
            | Self::Server { message, .. }
            | Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status code, for errors that came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::Permission { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Server { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the session must be re-established.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if the failure happened before any response arrived.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network(_))
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Server error payloads ────────────────────────────────────────────

/// Error body shape: `{"message": "..."}` or `{"message": ["...", ...]}`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<MessageField>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MessageField {
    One(String),
    Many(Vec<String>),
}

impl MessageField {
    fn into_first(self) -> Option<String> {
        match self {
            Self::One(message) => Some(message),
            Self::Many(messages) => messages.into_iter().next(),
        }
    }
}

/// Pull the structured message out of an error response body.
///
/// Lists yield their first element. Blank messages count as absent, so a
/// `Some` is always displayable.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message?
        .into_first()
        .filter(|message| !message.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_message() {
        let body = r#"{"statusCode":409,"message":"Short code already taken"}"#;
        assert_eq!(
            extract_message(body).as_deref(),
            Some("Short code already taken")
        );
    }

    #[test]
    fn extracts_first_of_list() {
        let body = r#"{"message":["originalUrl must be a URL","extra"],"error":"Bad Request"}"#;
        assert_eq!(
            extract_message(body).as_deref(),
            Some("originalUrl must be a URL")
        );
    }

    #[test]
    fn empty_list_and_blank_are_absent() {
        assert_eq!(extract_message(r#"{"message":[]}"#), None);
        assert_eq!(extract_message(r#"{"message":"  "}"#), None);
    }

    #[test]
    fn unstructured_bodies_are_absent() {
        assert_eq!(extract_message("<html>Bad Gateway</html>"), None);
        assert_eq!(extract_message(""), None);
        assert_eq!(extract_message(r#"{"error":"nope"}"#), None);
        assert_eq!(extract_message(r#"{"message":42}"#), None);
    }

    #[test]
    fn kinds_follow_status_classes() {
        assert_eq!(Error::Authentication { message: None }.kind(), ErrorKind::Auth);
        assert_eq!(Error::Permission { message: None }.kind(), ErrorKind::Permission);
        assert_eq!(
            Error::Server {
                status: 503,
                message: None
            }
            .kind(),
            ErrorKind::Server
        );
        assert_eq!(Error::Timeout { timeout_secs: 10 }.kind(), ErrorKind::Network);
        assert_eq!(
            Error::Api {
                status: 409,
                message: Some("taken".into())
            }
            .server_message(),
            Some("taken")
        );
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
