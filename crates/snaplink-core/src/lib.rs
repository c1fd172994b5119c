//! Session handling, domain services and link list state for snaplink
//! front ends.
//!
//! - **[`Client`]**: Facade wiring a [`SessionManager`] into
//!   `snaplink_api::ApiClient` and handing out the services.
//!
//! - **[`SessionManager`]**: Single access point for the persisted session
//!   (`auth_token` + `user_data`). Publishes [`SessionState`] on a `watch`
//!   channel; a token rejected by the server moves it to
//!   [`SessionState::Expired`] exactly once.
//!
//! - **[`AuthService`] / [`LinkService`]**: Typed operations that normalize
//!   every failure into a [`ServiceError`] carrying one display message.
//!
//! - **[`Dashboard`]**: The server-confirmed link collection with a
//!   debounced search, sort order, banners and a derived projection.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod forms;
pub mod service;
pub mod session;

pub use client::Client;
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use dashboard::{Dashboard, DashboardState, Debouncer, ListQuery, SortKey, SortOrder};
pub use error::{AUTH_FALLBACK_MESSAGE, CoreError, LINK_FALLBACK_MESSAGE, ServiceError};
pub use forms::{CreateLinkForm, EditLinkForm, validate_short_code, validate_url};
pub use service::{AuthService, LinkService};
pub use session::{FileStorage, MemoryStorage, SessionManager, SessionState, SessionStorage};

pub use snaplink_api::{ErrorKind, Link, LinkId, LinkStats, User};
