//! Async Rust client for the snaplink URL-shortening REST API.
//!
//! [`ApiClient`] wraps `reqwest` with the API's base URL, a fixed request
//! timeout, JSON headers, bearer-token injection through a
//! [`TokenProvider`], and centralized classification of failures into
//! [`Error`] / [`ErrorKind`]. A 401 on an authenticated request notifies the
//! token provider so the stored session can be torn down.

pub mod auth;
pub mod client;
mod endpoints;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{Anonymous, RequestScope, StaticToken, TokenProvider};
pub use client::ApiClient;
pub use error::{Error, ErrorKind};
pub use models::{
    AuthResponse, CreateLinkRequest, Link, LinkId, LinkStats, UpdateLinkRequest, User,
};
pub use transport::{DEFAULT_TIMEOUT, TransportConfig};
