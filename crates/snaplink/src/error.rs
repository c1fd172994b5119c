//! CLI error types with miette diagnostics.
//!
//! Maps `ServiceError` classes into user-facing errors with actionable help
//! text and a stable exit code per class.

use miette::Diagnostic;
use thiserror::Error;

use snaplink_config::ConfigError;
use snaplink_core::{CoreError, ErrorKind, ServiceError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────

    #[error("Session expired, please sign in again")]
    #[diagnostic(code(snaplink::session_expired), help("Run: snaplink login"))]
    SessionExpired,

    #[error("Not signed in")]
    #[diagnostic(
        code(snaplink::not_signed_in),
        help("Run: snaplink login (or snaplink register to create an account)")
    )]
    NotSignedIn,

    #[error("{message}")]
    #[diagnostic(
        code(snaplink::auth_failed),
        help("Check your email and password and try again.")
    )]
    AuthFailed { message: String },

    #[error("{message}")]
    #[diagnostic(code(snaplink::permission_denied))]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(snaplink::not_found),
        help("Run: snaplink links list to see your links")
    )]
    NotFound { message: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(snaplink::api_error))]
    Api { status: Option<u16>, message: String },

    #[error("{message}")]
    #[diagnostic(code(snaplink::server_error), help("The service is having trouble; try again later."))]
    Server { message: String },

    // ── Connectivity ─────────────────────────────────────────────────

    #[error("Could not reach the snaplink API: {message}")]
    #[diagnostic(
        code(snaplink::connection_failed),
        help("Check that the API is running and that --api-url / SNAPLINK_API_URL point at it.")
    )]
    ConnectionFailed { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(snaplink::timeout),
        help("Increase timeout with --timeout or check API responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(snaplink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(snaplink::config), help("Inspect it with: snaplink config show"))]
    Config(Box<ConfigError>),

    #[error(transparent)]
    #[diagnostic(code(snaplink::internal))]
    Core(#[from] CoreError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(snaplink::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SessionExpired | Self::NotSignedIn | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Api {
                status: Some(409), ..
            } => exit_code::CONFLICT,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Mapping for `login` / `register`: a 401 there means bad
    /// credentials, not an expired session.
    pub fn from_auth_entry(err: ServiceError) -> Self {
        if err.kind() == ErrorKind::Auth {
            Self::AuthFailed {
                message: err.message().to_owned(),
            }
        } else {
            err.into()
        }
    }
}

// ── ServiceError → CliError mapping ──────────────────────────────────

impl From<ServiceError> for CliError {
    fn from(err: ServiceError) -> Self {
        let message = err.message().to_owned();
        match err.kind() {
            ErrorKind::Auth => Self::SessionExpired,
            ErrorKind::Permission => Self::PermissionDenied { message },
            ErrorKind::NotFound => Self::NotFound { message },
            ErrorKind::Server => Self::Server { message },
            ErrorKind::Validation => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            ErrorKind::Network => match err.api_error() {
                Some(snaplink_core::error::ApiError::Timeout { timeout_secs }) => Self::Timeout {
                    seconds: *timeout_secs,
                },
                Some(source) => Self::ConnectionFailed {
                    message: source.to_string(),
                },
                None => Self::ConnectionFailed { message },
            },
            ErrorKind::Api => Self::Api {
                status: err.api_error().and_then(snaplink_core::error::ApiError::status),
                message,
            },
            ErrorKind::Internal => Self::Api {
                status: None,
                message,
            },
        }
    }
}
