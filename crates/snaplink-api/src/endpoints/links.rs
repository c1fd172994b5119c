// Link endpoints
//
// CRUD over the signed-in user's links plus per-link statistics.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{CreateLinkRequest, Link, LinkId, LinkStats, UpdateLinkRequest};

impl ApiClient {
    /// List all links of the signed-in user.
    ///
    /// `GET /links`
    pub async fn list_links(&self) -> Result<Vec<Link>, Error> {
        let links: Vec<Link> = self.get(&["links"]).await?;
        debug!(count = links.len(), "fetched links");
        Ok(links)
    }

    /// Shorten a URL, optionally with a caller-chosen code.
    ///
    /// `POST /links {originalUrl, customShortCode?}`
    pub async fn create_link(&self, request: &CreateLinkRequest) -> Result<Link, Error> {
        self.post(&["links"], request).await
    }

    /// Change the target URL and/or short code of a link.
    ///
    /// `PUT /links/{id}` with only the fields being changed.
    pub async fn update_link(&self, id: &LinkId, request: &UpdateLinkRequest) -> Result<Link, Error> {
        let id = id.to_string();
        self.put(&["links", &id], request).await
    }

    /// Delete a link. The server answers with an empty body.
    ///
    /// `DELETE /links/{id}`
    pub async fn delete_link(&self, id: &LinkId) -> Result<(), Error> {
        let id = id.to_string();
        self.delete(&["links", &id]).await
    }

    /// Click statistics for a link.
    ///
    /// `GET /links/{id}/stats`
    pub async fn link_stats(&self, id: &LinkId) -> Result<LinkStats, Error> {
        let id = id.to_string();
        self.get(&["links", &id, "stats"]).await
    }
}
