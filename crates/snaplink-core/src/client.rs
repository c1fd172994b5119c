// ── Client facade ──
//
// Wires the session, the API client and the services together. Cloning a
// `Client` is cheap; all clones share one session.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use snaplink_api::ApiClient;

use crate::config::ClientConfig;
use crate::dashboard::Dashboard;
use crate::error::CoreError;
use crate::service::{AuthService, LinkService};
use crate::session::{FileStorage, MemoryStorage, SessionManager, SessionState, SessionStorage};

#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    session: Arc<SessionManager>,
    auth: AuthService,
    links: LinkService,
}

impl Client {
    /// Build a client from `config`, using file storage when a session
    /// directory is configured and memory storage otherwise.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let storage: Arc<dyn SessionStorage> = match &config.session_dir {
            Some(dir) => {
                debug!(dir = %dir.display(), "using file session storage");
                Arc::new(FileStorage::new(dir))
            }
            None => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, storage)
    }

    /// Build a client over caller-supplied session storage.
    pub fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, CoreError> {
        let session = Arc::new(SessionManager::new(storage));
        let api = ApiClient::new(&config.api_url, &config.transport(), session.clone())?;
        let auth = AuthService::new(api.clone(), Arc::clone(&session));
        let links = LinkService::new(api);
        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                session,
                auth,
                links,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    pub fn links(&self) -> &LinkService {
        &self.inner.links
    }

    /// Session state changes, including expiry after a rejected token.
    pub fn session_state(&self) -> watch::Receiver<SessionState> {
        self.inner.session.subscribe()
    }

    /// A fresh, empty link list bound to this client's session.
    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.inner.links.clone())
    }
}
