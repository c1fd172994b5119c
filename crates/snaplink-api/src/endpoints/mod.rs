// Endpoint groups, implemented as inherent methods on `ApiClient`.

mod auth;
mod links;
