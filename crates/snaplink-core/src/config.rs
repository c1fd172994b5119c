// ── Runtime client configuration ──
//
// Describes where the API lives and where the session is kept. Front ends
// build a `ClientConfig` and hand it in; core never reads config files.

use std::path::PathBuf;
use std::time::Duration;

use snaplink_api::{DEFAULT_TIMEOUT, TransportConfig};

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL; short URLs are built on it too.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Directory of the persisted session. `None` keeps the session in
    /// memory for the lifetime of the process.
    pub session_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            session_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = Some(dir.into());
        self
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig::default().with_timeout(self.timeout)
    }
}
