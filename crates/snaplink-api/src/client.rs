// snaplink API HTTP client
//
// Wraps `reqwest::Client` with base-URL path construction, bearer-token
// injection and centralized response classification. Endpoint modules
// (auth, links) are implemented as inherent methods in separate files to
// keep this module focused on transport mechanics.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

use crate::auth::{RequestScope, TokenProvider};
use crate::error::{self, Error};
use crate::transport::TransportConfig;

/// Async client for the snaplink REST API.
///
/// Every request carries the JSON content type and, when the
/// [`TokenProvider`] has one, an `Authorization: Bearer` header. Failures
/// come back already classified as [`Error`] variants; nothing is retried.
/// Clones share the connection pool and token provider.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    /// Build a client for `base_url` from a transport config.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
            tokens,
        })
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let url = Url::parse(raw.trim())?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(raw.to_owned()));
        }
        Ok(url)
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    ///
    /// Any path prefix on the base URL is preserved:
    /// `http://host/api` + `["links"]` becomes `http://host/api/links`.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Public URL of a short code: `{base}/{shortCode}`.
    ///
    /// The redirect itself is served by the API host; the client only
    /// builds the address for display.
    pub fn short_url(&self, short_code: &str) -> Result<Url, Error> {
        self.endpoint(&[short_code])
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send `method path` with an optional JSON body and decode the response.
    ///
    /// `path` is split on `/`; use the typed endpoint methods for ids that
    /// may contain reserved characters.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.dispatch(method, &segments, body, RequestScope::Authenticated)
            .await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        self.dispatch::<T, ()>(Method::GET, segments, None, RequestScope::Authenticated)
            .await
    }

    pub(crate) async fn post<T, B>(&self, segments: &[&str], body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.dispatch(Method::POST, segments, Some(body), RequestScope::Authenticated)
            .await
    }

    pub(crate) async fn put<T, B>(&self, segments: &[&str], body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.dispatch(Method::PUT, segments, Some(body), RequestScope::Authenticated)
            .await
    }

    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<(), Error> {
        self.dispatch::<(), ()>(Method::DELETE, segments, None, RequestScope::Authenticated)
            .await
    }

    /// Build, authorize, send and classify a single request.
    pub(crate) async fn dispatch<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        scope: RequestScope,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(segments)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method.clone(), url.clone());
        if let Some(token) = self.tokens.bearer_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::Authentication {
                    message: Some(format!("stored token is not a valid header value: {e}")),
                })?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        self.handle_response(&method, &url, resp, scope).await
    }

    /// Map a send failure into the network class of errors.
    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs().max(1),
            }
        } else {
            warn!(error = %err, "network error - please check your connection");
            Error::Network(err)
        }
    }

    /// Decode a success body or classify the failure by status.
    ///
    /// A 401 on an authenticated request tells the token provider the
    /// session is gone before the error is returned.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &Url,
        resp: reqwest::Response,
        scope: RequestScope,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status.is_success() {
            debug!("{} {method} {url}", status.as_u16());
            let body = resp.text().await.map_err(|e| self.transport_error(e))?;
            return decode(&body);
        }

        let body = resp.text().await.unwrap_or_default();
        debug!("{} {method} {url}: {body}", status.as_u16());
        let message = error::extract_message(&body);

        match status {
            StatusCode::UNAUTHORIZED => {
                if scope == RequestScope::Authenticated {
                    warn!("session rejected by server, clearing stored credentials");
                    self.tokens.session_rejected();
                }
                Err(Error::Authentication { message })
            }
            StatusCode::FORBIDDEN => {
                warn!("access forbidden - insufficient permissions");
                Err(Error::Permission { message })
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                path: url.path().to_owned(),
                message,
            }),
            s if s.is_server_error() => {
                error!(status = s.as_u16(), "server error - please try again later");
                Err(Error::Server {
                    status: s.as_u16(),
                    message,
                })
            }
            s => Err(Error::Api {
                status: s.as_u16(),
                message,
            }),
        }
    }
}

/// Decode a JSON body. Empty bodies (204) decode as JSON `null`, which
/// serves `()` and `Option<_>` responses.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    let text = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(text).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::Anonymous;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, &TransportConfig::default(), Arc::new(Anonymous)).unwrap()
    }

    #[test]
    fn endpoint_joins_segments() {
        let c = client("http://localhost:3000");
        assert_eq!(
            c.endpoint(&["links", "7", "stats"]).unwrap().as_str(),
            "http://localhost:3000/links/7/stats"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let c = client("https://sho.rt/api/");
        assert_eq!(
            c.endpoint(&["auth", "login"]).unwrap().as_str(),
            "https://sho.rt/api/auth/login"
        );
    }

    #[test]
    fn endpoint_encodes_reserved_characters() {
        let c = client("http://localhost:3000");
        assert_eq!(
            c.endpoint(&["links", "a/b"]).unwrap().as_str(),
            "http://localhost:3000/links/a%2Fb"
        );
    }

    #[test]
    fn short_url_appends_code() {
        let c = client("http://localhost:3000");
        assert_eq!(
            c.short_url("my-code").unwrap().as_str(),
            "http://localhost:3000/my-code"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        let result = ApiClient::new(
            "mailto:someone@example.com",
            &TransportConfig::default(),
            Arc::new(Anonymous),
        );
        assert!(matches!(result, Err(Error::InvalidBaseUrl(_))));
    }

    #[test]
    fn empty_body_decodes_as_unit() {
        decode::<()>("").unwrap();
        assert_eq!(decode::<Option<u32>>("  ").unwrap(), None);
    }

    #[test]
    fn bad_body_reports_preview() {
        let err = decode::<Vec<u32>>("not json").unwrap_err();
        assert!(matches!(err, Error::Deserialization { ref body, .. } if body == "not json"));
    }
}
