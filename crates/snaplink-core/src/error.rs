// ── Core error types ──
//
// `ServiceError` is what domain services hand back to front ends: one
// display-ready message plus the failure class. `CoreError` covers local
// plumbing (session storage, configuration) that never touches the API.

use std::path::PathBuf;

use snaplink_api::ErrorKind;
use thiserror::Error;

/// The transport-level error wrapped by [`ServiceError`].
pub use snaplink_api::Error as ApiError;

/// Fallback when an auth failure carries no server message.
pub const AUTH_FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Fallback when a link operation failure carries no server message.
pub const LINK_FALLBACK_MESSAGE: &str = "An error occurred while processing your request";

/// Errors from local infrastructure: storage, serialization, setup.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Session storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize session data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Api(#[from] snaplink_api::Error),
}

/// A failed service call, normalized to exactly one message.
///
/// The message is the server's structured `message` when it sent one
/// (first entry if it sent a list), otherwise the calling service's
/// fallback text. The [`ErrorKind`] is kept so callers can still react to
/// the failure class (e.g. exit codes, sign-in hints).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<snaplink_api::Error>,
}

impl ServiceError {
    /// Normalize an API failure using `fallback` when the server sent no
    /// usable message.
    pub fn normalize(err: snaplink_api::Error, fallback: &str) -> Self {
        let message = err
            .server_message()
            .map_or_else(|| fallback.to_owned(), str::to_owned);
        Self {
            kind: err.kind(),
            message,
            source: Some(err),
        }
    }

    /// Client-side input rejection, raised before anything is sent.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            source: None,
        }
    }

    /// A failure that did not come from the API.
    pub fn local(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying API error, for diagnostics.
    pub fn api_error(&self) -> Option<&snaplink_api::Error> {
        self.source.as_ref()
    }

    /// Returns `true` if the user has to sign in again.
    pub fn is_auth(&self) -> bool {
        self.kind == ErrorKind::Auth
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(api) => Self::normalize(api, AUTH_FALLBACK_MESSAGE),
            other => Self::local(ErrorKind::Internal, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_server_message_when_present() {
        let err = ServiceError::normalize(
            snaplink_api::Error::Api {
                status: 409,
                message: Some("Short code already in use".into()),
            },
            LINK_FALLBACK_MESSAGE,
        );
        assert_eq!(err.message(), "Short code already in use");
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(err.api_error().is_some());
    }

    #[test]
    fn falls_back_without_server_message() {
        let err = ServiceError::normalize(
            snaplink_api::Error::Server {
                status: 500,
                message: None,
            },
            LINK_FALLBACK_MESSAGE,
        );
        assert_eq!(err.to_string(), LINK_FALLBACK_MESSAGE);
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[test]
    fn every_failure_shape_yields_one_non_empty_message() {
        let shapes = [
            snaplink_api::Error::Authentication {
                message: Some("Invalid credentials".into()),
            },
            snaplink_api::Error::Permission { message: None },
            snaplink_api::Error::NotFound {
                path: "/links/1".into(),
                message: None,
            },
            snaplink_api::Error::Timeout { timeout_secs: 10 },
            snaplink_api::Error::Deserialization {
                message: "eof".into(),
                body: String::new(),
            },
            snaplink_api::Error::InvalidBaseUrl("x".into()),
        ];
        for shape in shapes {
            let err = ServiceError::normalize(shape, AUTH_FALLBACK_MESSAGE);
            assert!(!err.message().trim().is_empty());
        }
    }

    #[test]
    fn storage_errors_become_internal() {
        let err: ServiceError = CoreError::Storage {
            path: PathBuf::from("/tmp/session/auth_token"),
            source: std::io::Error::other("denied"),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(
            err.message(),
            "Session storage error at /tmp/session/auth_token: denied"
        );
    }

    #[test]
    fn validation_errors_have_no_source() {
        let err = ServiceError::validation("Please enter a valid URL");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.api_error().is_none());
    }
}
