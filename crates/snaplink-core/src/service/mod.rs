// ── Domain services ──
//
// Thin typed shims over `ApiClient`. Each service normalizes every API
// failure into a `ServiceError` with its own fallback message.

mod auth;
mod links;

pub use auth::AuthService;
pub use links::LinkService;
