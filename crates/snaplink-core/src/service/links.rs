// Link CRUD and statistics.

use snaplink_api::{ApiClient, CreateLinkRequest, Link, LinkId, LinkStats, UpdateLinkRequest};
use url::Url;

use crate::error::{LINK_FALLBACK_MESSAGE, ServiceError};

/// Link operations for the signed-in user.
#[derive(Clone)]
pub struct LinkService {
    api: ApiClient,
}

impl LinkService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_links(&self) -> Result<Vec<Link>, ServiceError> {
        self.api.list_links().await.map_err(normalize)
    }

    /// Shorten `original_url`. An empty or missing custom code is left out
    /// of the request so the server generates one.
    pub async fn create_link(
        &self,
        original_url: &str,
        custom_short_code: Option<&str>,
    ) -> Result<Link, ServiceError> {
        let request = CreateLinkRequest {
            original_url: original_url.to_owned(),
            custom_short_code: custom_short_code
                .filter(|c| !c.is_empty())
                .map(str::to_owned),
        };
        self.api.create_link(&request).await.map_err(normalize)
    }

    /// Send exactly the fields present in `changes`.
    pub async fn update_link(
        &self,
        id: &LinkId,
        changes: &UpdateLinkRequest,
    ) -> Result<Link, ServiceError> {
        self.api.update_link(id, changes).await.map_err(normalize)
    }

    /// Resolves to `true` once the server confirmed the deletion.
    pub async fn delete_link(&self, id: &LinkId) -> Result<bool, ServiceError> {
        self.api.delete_link(id).await.map_err(normalize)?;
        Ok(true)
    }

    pub async fn get_link_stats(&self, id: &LinkId) -> Result<LinkStats, ServiceError> {
        self.api.link_stats(id).await.map_err(normalize)
    }

    /// Public address of `short_code`, for display.
    pub fn short_url(&self, short_code: &str) -> Result<Url, ServiceError> {
        self.api.short_url(short_code).map_err(normalize)
    }
}

fn normalize(err: snaplink_api::Error) -> ServiceError {
    ServiceError::normalize(err, LINK_FALLBACK_MESSAGE)
}
