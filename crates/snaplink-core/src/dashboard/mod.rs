// ── Link list state ──
//
// Owns the server-confirmed link collection and everything derived from
// it. Local mutations are applied only after the corresponding service
// call succeeded, so the collection never diverges from what the server
// confirmed. State is published on a `watch` channel.

mod debounce;
mod query;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use snaplink_api::{ErrorKind, Link, LinkId};

use crate::error::ServiceError;
use crate::forms::{CreateLinkForm, EditLinkForm};
use crate::service::LinkService;

pub use debounce::Debouncer;
pub use query::{ListQuery, SortKey, SortOrder, project};

/// Quiet period before a search term is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// How long a success banner stays up.
pub const SUCCESS_BANNER_TTL: Duration = Duration::from_secs(3);

pub const CREATED_MESSAGE: &str = "Link created successfully!";
pub const UPDATED_MESSAGE: &str = "Link updated successfully!";
pub const DELETED_MESSAGE: &str = "Link deleted successfully!";

/// Everything a front end needs to render the list.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Server-confirmed links, most recently created first.
    pub links: Arc<Vec<Link>>,
    /// `links` filtered and sorted by `query`.
    pub visible: Arc<Vec<Link>>,
    pub query: ListQuery,
    /// Bumped on every recomputation of `visible`.
    pub revision: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl DashboardState {
    fn recompute(&mut self) {
        self.visible = Arc::new(project(&self.links, &self.query));
        self.revision += 1;
    }

    fn with_links(&mut self, f: impl FnOnce(&mut Vec<Link>)) {
        let mut links = self.links.as_ref().clone();
        f(&mut links);
        self.links = Arc::new(links);
        self.recompute();
    }
}

/// Handle to the link list. Clones share the same state.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    service: LinkService,
    state: watch::Sender<DashboardState>,
    search: Debouncer<String>,
    load_seq: AtomicU64,
    banner_seq: AtomicU64,
    cancel: CancellationToken,
}

impl Dashboard {
    /// Create an empty dashboard. Must be called inside a tokio runtime.
    pub fn new(service: LinkService) -> Self {
        let cancel = CancellationToken::new();
        let inner = Arc::new_cyclic(|weak: &Weak<DashboardInner>| {
            let weak = weak.clone();
            let search = Debouncer::spawn(SEARCH_DEBOUNCE, cancel.child_token(), move |term: String| {
                if let Some(inner) = weak.upgrade() {
                    inner.apply_search(term);
                }
            });
            let (state, _) = watch::channel(DashboardState::default());
            DashboardInner {
                service,
                state,
                search,
                load_seq: AtomicU64::new(0),
                banner_seq: AtomicU64::new(0),
                cancel,
            }
        });
        Self { inner }
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn state(&self) -> DashboardState {
        self.inner.state.borrow().clone()
    }

    /// The current projection.
    pub fn visible(&self) -> Arc<Vec<Link>> {
        Arc::clone(&self.inner.state.borrow().visible)
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    /// State changes as a `Stream`, starting with the current value.
    pub fn stream(&self) -> WatchStream<DashboardState> {
        WatchStream::new(self.subscribe())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Replace the collection with the server's list.
    ///
    /// Only the most recently issued load is applied; responses of
    /// superseded loads are dropped.
    pub async fn load(&self) -> Result<(), ServiceError> {
        if self.is_closed() {
            return Ok(());
        }
        let seq = self.inner.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_modify(|s| s.loading = true);

        let result = self.inner.service.get_links().await;

        if self.is_closed() || self.inner.load_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "dropping superseded link list response");
            return result.map(drop);
        }

        match result {
            Ok(links) => {
                debug!(count = links.len(), "link list loaded");
                self.inner.state.send_modify(|s| {
                    s.loading = false;
                    s.links = Arc::new(links);
                    s.recompute();
                });
                Ok(())
            }
            Err(err) => {
                let message = err.message().to_owned();
                self.inner.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Validate `form`, create the link and put it at the head of the
    /// collection. The form is cleared on success and left intact on
    /// failure so the user can correct it.
    pub async fn create(&self, form: &mut CreateLinkForm) -> Result<Link, ServiceError> {
        form.validate()?;
        let request = form.to_request();
        let link = self
            .inner
            .service
            .create_link(&request.original_url, request.custom_short_code.as_deref())
            .await?;

        form.clear();
        if self.is_closed() {
            return Ok(link);
        }
        info!(id = %link.id, code = %link.short_code, "link created");
        let created = link.clone();
        self.inner.state.send_modify(|s| {
            s.with_links(|links| {
                links.retain(|l| l.id != created.id);
                links.insert(0, created);
            });
        });
        self.inner.show_success(CREATED_MESSAGE);
        Ok(link)
    }

    /// Send the fields of `form` that differ from the stored link.
    ///
    /// Returns `Ok(None)` without contacting the server when nothing
    /// changed.
    pub async fn update(&self, id: &LinkId, form: &EditLinkForm) -> Result<Option<Link>, ServiceError> {
        let current = self
            .inner
            .state
            .borrow()
            .links
            .iter()
            .find(|l| &l.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::local(ErrorKind::NotFound, format!("Link {id} is not loaded")))?;

        form.validate()?;
        let changes = form.changes(&current);
        if changes.is_empty() {
            debug!(%id, "no changes, update skipped");
            return Ok(None);
        }

        let link = self.inner.service.update_link(id, &changes).await?;
        if self.is_closed() {
            return Ok(Some(link));
        }
        info!(%id, "link updated");
        let updated = link.clone();
        self.inner.state.send_modify(|s| {
            s.with_links(|links| {
                for slot in links.iter_mut().filter(|l| &l.id == id) {
                    *slot = updated.clone();
                }
            });
        });
        self.inner.show_success(UPDATED_MESSAGE);
        Ok(Some(link))
    }

    /// Delete a link after the user confirmed it.
    ///
    /// Returns `Ok(false)` without contacting the server when `confirmed`
    /// is `false`. Failures are also shown in the error banner.
    pub async fn delete(&self, id: &LinkId, confirmed: bool) -> Result<bool, ServiceError> {
        if !confirmed {
            return Ok(false);
        }
        match self.inner.service.delete_link(id).await {
            Ok(_) if self.is_closed() => Ok(true),
            Ok(_) => {
                info!(%id, "link deleted");
                self.inner.state.send_modify(|s| {
                    s.with_links(|links| links.retain(|l| &l.id != id));
                });
                self.inner.show_success(DELETED_MESSAGE);
                Ok(true)
            }
            Err(err) => {
                if !self.is_closed() {
                    let message = err.message().to_owned();
                    self.inner.state.send_modify(|s| s.error = Some(message));
                }
                Err(err)
            }
        }
    }

    /// Queue a new search term. Bursts collapse; only the last term is
    /// applied once typing pauses for [`SEARCH_DEBOUNCE`].
    pub fn set_search_term(&self, term: impl Into<String>) {
        self.inner.search.push(term.into());
    }

    /// Change the ordering. Applied immediately.
    pub fn set_sort(&self, key: SortKey, order: SortOrder) {
        if self.is_closed() {
            return;
        }
        self.inner.state.send_modify(|s| {
            s.query.sort_key = key;
            s.query.sort_order = order;
            s.recompute();
        });
    }

    /// Replace the whole query at once, bypassing the search debounce.
    /// Meant for one-shot front ends that know the final term up front.
    pub fn set_query(&self, query: ListQuery) {
        if self.is_closed() {
            return;
        }
        self.inner.state.send_modify(|s| {
            s.query = query;
            s.recompute();
        });
    }

    pub fn dismiss_error(&self) {
        self.inner.state.send_if_modified(|s| s.error.take().is_some());
    }

    pub fn dismiss_success(&self) {
        self.inner.state.send_if_modified(|s| s.success.take().is_some());
    }

    /// Tear down: cancels the pending search and banner timers. Responses
    /// of requests still in flight are ignored.
    pub fn close(&self) {
        self.inner.search.cancel();
        self.inner.cancel.cancel();
    }
}

impl DashboardInner {
    fn apply_search(&self, term: String) {
        if self.cancel.is_cancelled() {
            return;
        }
        debug!(term, "applying search term");
        self.state.send_modify(|s| {
            s.query.search_term = term;
            s.recompute();
        });
    }

    /// Show `message` and clear it after [`SUCCESS_BANNER_TTL`] unless a
    /// newer banner replaced it.
    fn show_success(self: &Arc<Self>, message: &str) {
        let seq = self.banner_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let message = message.to_owned();
        self.state.send_modify(|s| s.success = Some(message));

        let weak = Arc::downgrade(self);
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(SUCCESS_BANNER_TTL) => {
                    if let Some(inner) = weak.upgrade() {
                        if inner.banner_seq.load(Ordering::SeqCst) == seq {
                            inner.state.send_modify(|s| s.success = None);
                        }
                    }
                }
            }
        });
    }
}

impl Drop for DashboardInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
