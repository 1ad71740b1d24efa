use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer. Every handler here relies on the `CurrentUser`
/// extractor middleware being present on the router layer above this module,
/// which redirects anonymous callers to the login view.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /logout
        // Clears the server-side session record and returns to the listing.
        .route("/logout", get(handlers::logout))
}
