//! Shared configuration for snaplink tools.
//!
//! One TOML file layered over built-in defaults and under `SNAPLINK_*`
//! environment variables, plus translation to
//! `snaplink_core::ClientConfig`. Command-line overrides are applied on top
//! by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use snaplink_core::{ClientConfig, DEFAULT_API_URL};

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "SNAPLINK_CONFIG";

const ENV_PREFIX: &str = "SNAPLINK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Where the session is kept. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_dir: Option<PathBuf>,

    /// Default output format: table, json, json-compact, yaml, plain.
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode: auto, always, never.
    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout: default_timeout(),
            session_dir: None,
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_timeout() -> u64 {
    10
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

impl Config {
    /// Translate into the runtime client configuration.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        let url = validate_api_url(&self.api_url)?;
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        let session_dir = self.session_dir.clone().unwrap_or_else(default_session_dir);
        Ok(ClientConfig::new(url.as_str())
            .with_timeout(Duration::from_secs(self.timeout))
            .with_session_dir(session_dir))
    }
}

/// Parse `raw` as an absolute `http`/`https` URL.
pub fn validate_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.trim().parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("expected an http or https URL, got '{raw}'"),
        });
    }
    Ok(url)
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "snaplink", "snaplink")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path: `$SNAPLINK_CONFIG`, else the platform
/// config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || home_fallback(&[".config", "snaplink", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default session directory inside the platform data dir.
pub fn default_session_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "snaplink", "session"]),
        |dirs| dirs.data_dir().join("session"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load from the canonical path and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` if it exists, then `SNAPLINK_*` variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]));

    Ok(figment.extract()?)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Saving ──────────────────────────────────────────────────────────

/// Write `cfg` to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_without_file_or_env() {
        Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("missing.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.api_url, "http://localhost:3000");
            assert_eq!(cfg.timeout, 10);
            Ok(())
        });
    }

    #[test]
    fn file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    api_url = "https://sho.rt"
                    timeout = 30
                    output = "json"
                "#,
            )?;
            jail.set_env("SNAPLINK_TIMEOUT", "5");
            jail.set_env("SNAPLINK_CONFIG", "ignored.toml");

            let cfg = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(cfg.api_url, "https://sho.rt");
            assert_eq!(cfg.timeout, 5);
            assert_eq!(cfg.output, "json");
            assert_eq!(cfg.color, "auto");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_api_url() {
        Jail::expect_with(|jail| {
            jail.set_env("SNAPLINK_API_URL", "http://127.0.0.1:8080");
            let cfg = load_config_from(&jail.directory().join("none.toml")).unwrap();
            assert_eq!(cfg.api_url, "http://127.0.0.1:8080");
            Ok(())
        });
    }

    #[test]
    fn client_config_translation() {
        let cfg = Config {
            api_url: "https://sho.rt".into(),
            timeout: 3,
            session_dir: Some(PathBuf::from("/tmp/snaplink-session")),
            ..Config::default()
        };
        let client = cfg.to_client_config().unwrap();
        assert_eq!(client.api_url, "https://sho.rt/");
        assert_eq!(client.timeout, Duration::from_secs(3));
        assert_eq!(
            client.session_dir.as_deref(),
            Some(Path::new("/tmp/snaplink-session"))
        );
    }

    #[test]
    fn rejects_bad_urls_and_zero_timeout() {
        for bad in ["localhost:3000", "ftp://files.example", "not a url"] {
            assert!(validate_api_url(bad).is_err(), "{bad}");
        }
        let cfg = Config {
            timeout: 0,
            ..Config::default()
        };
        assert!(matches!(
            cfg.to_client_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "timeout"
        ));
    }

    #[test]
    fn save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            api_url: "https://sho.rt".into(),
            output: "yaml".into(),
            ..Config::default()
        };

        save_config_to(&cfg, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("api_url = \"https://sho.rt\""));
        assert!(!text.contains("session_dir"));

        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, cfg);
    }
}
