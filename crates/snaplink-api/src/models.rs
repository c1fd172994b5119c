// Wire types for the snaplink REST API.
//
// Field names follow the server's camelCase JSON; auth responses use
// snake_case `access_token` as sent by the server.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── LinkId ──────────────────────────────────────────────────────────

/// Server-assigned link identifier.
///
/// Servers hand out numeric ids, UUIDs or opaque strings, and some send
/// numbers as JSON strings. Every source goes through the same
/// canonicalization, so equal text always yields an equal id and
/// `to_string()` gives back exactly the text the server used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum LinkId {
    Numeric(u64),
    Uuid(Uuid),
    Text(String),
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Text only becomes `Numeric` or `Uuid` when it renders back unchanged
/// (no leading zeros, lowercase hyphenated UUIDs); anything else stays
/// `Text` so request paths keep the server's spelling.
impl From<&str> for LinkId {
    fn from(s: &str) -> Self {
        if let Some(n) = s.parse::<u64>().ok().filter(|n| n.to_string() == s) {
            return Self::Numeric(n);
        }
        match Uuid::parse_str(s) {
            Ok(u) if u.hyphenated().to_string() == s => Self::Uuid(u),
            _ => Self::Text(s.to_owned()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireLinkId {
    Number(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for LinkId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match WireLinkId::deserialize(deserializer)? {
            WireLinkId::Number(n) => Self::Numeric(n),
            WireLinkId::Text(s) => Self::from(s.as_str()),
        })
    }
}

impl From<String> for LinkId {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<u64> for LinkId {
    fn from(n: u64) -> Self {
        Self::Numeric(n)
    }
}

impl FromStr for LinkId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

// ── Auth ────────────────────────────────────────────────────────────

/// The signed-in account, as returned alongside the access token.
///
/// Only `email` is relied upon; everything else the server sends is kept
/// verbatim so it survives a persist/restore cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Response of `POST /auth/login` and `POST /auth/register`.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Serialize)]
pub(crate) struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

// ── Links ───────────────────────────────────────────────────────────

/// A shortened link owned by the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: LinkId,
    pub original_url: String,
    pub short_code: String,
    #[serde(default)]
    pub click_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /links`.
///
/// `customShortCode` is left out of the JSON entirely when absent, so the
/// server falls back to generating a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_short_code: Option<String>,
}

/// Body of `PUT /links/{id}`. Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_short_code: Option<String>,
}

impl UpdateLinkRequest {
    /// `true` when the request would change nothing.
    pub fn is_empty(&self) -> bool {
        self.original_url.is_none() && self.custom_short_code.is_none()
    }
}

/// Response of `GET /links/{id}/stats`.
///
/// The server owns the shape; the commonly present fields are typed and the
/// rest is carried in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LinkId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
