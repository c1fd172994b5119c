// ── Link form input ──
//
// Client-side checks run before any request is dispatched. A failed check
// is a `Validation` error and never reaches the server.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use snaplink_api::{CreateLinkRequest, Link, UpdateLinkRequest};

use crate::error::ServiceError;

pub const SHORT_CODE_MIN_LEN: usize = 3;
pub const SHORT_CODE_MAX_LEN: usize = 20;

static SHORT_CODE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("short code pattern compiles"));

/// Accept only absolute `http`/`https` URLs.
pub fn validate_url(raw: &str) -> Result<(), ServiceError> {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ServiceError::validation("Please enter a valid URL")),
    }
}

/// Check an optional custom short code. Empty means "let the server pick".
pub fn validate_short_code(code: &str) -> Result<(), ServiceError> {
    if code.is_empty() {
        return Ok(());
    }
    let len = code.chars().count();
    if len < SHORT_CODE_MIN_LEN {
        return Err(ServiceError::validation(
            "Short code must be at least 3 characters",
        ));
    }
    if len > SHORT_CODE_MAX_LEN {
        return Err(ServiceError::validation(
            "Short code must be less than 20 characters",
        ));
    }
    if !SHORT_CODE_CHARS.is_match(code) {
        return Err(ServiceError::validation(
            "Short code can only contain letters, numbers, hyphens, and underscores",
        ));
    }
    Ok(())
}

// ── CreateLinkForm ───────────────────────────────────────────────────

/// Input of the "shorten a URL" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateLinkForm {
    pub original_url: String,
    pub custom_short_code: String,
}

impl CreateLinkForm {
    pub fn new(original_url: impl Into<String>, custom_short_code: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            custom_short_code: custom_short_code.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        validate_url(&self.original_url)?;
        validate_short_code(self.custom_short_code.trim())
    }

    /// Request body; a blank custom code is omitted.
    pub fn to_request(&self) -> CreateLinkRequest {
        let code = self.custom_short_code.trim();
        CreateLinkRequest {
            original_url: self.original_url.trim().to_owned(),
            custom_short_code: (!code.is_empty()).then(|| code.to_owned()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.original_url.is_empty() && self.custom_short_code.is_empty()
    }

    pub fn clear(&mut self) {
        self.original_url.clear();
        self.custom_short_code.clear();
    }
}

// ── EditLinkForm ─────────────────────────────────────────────────────

/// Input of the "edit link" form, prefilled from the link being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditLinkForm {
    pub original_url: String,
    pub short_code: String,
}

impl EditLinkForm {
    pub fn from_link(link: &Link) -> Self {
        Self {
            original_url: link.original_url.clone(),
            short_code: link.short_code.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        validate_url(&self.original_url)?;
        validate_short_code(self.short_code.trim())
    }

    /// Fields that differ from `link`. Empty when nothing changed.
    pub fn changes(&self, link: &Link) -> UpdateLinkRequest {
        let url = self.original_url.trim();
        let code = self.short_code.trim();
        UpdateLinkRequest {
            original_url: (url != link.original_url).then(|| url.to_owned()),
            custom_short_code: (!code.is_empty() && code != link.short_code)
                .then(|| code.to_owned()),
        }
    }
}
