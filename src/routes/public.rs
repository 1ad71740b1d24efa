use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in): the listing, the post detail view, the static
/// pages, and the registration/login forms.
///
/// The comment submission shares the post-detail path (POST /post/{id}) and is
/// registered here, but its handler requires a `CurrentUser`; an anonymous
/// submission is redirected to the login view by the extractor. The detail
/// view only renders the comment form for logged-in visitors, so that
/// redirect is the race case, not the common path.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // The front page: every post, in insertion order.
        .route("/", get(handlers::list_posts))
        // GET/POST /register
        // New member creation. The POST validates, hashes the password, and
        // rejects duplicate emails.
        .route(
            "/register",
            get(handlers::register_page).post(handlers::register),
        )
        // GET/POST /login
        // Credential resolution and session establishment.
        .route("/login", get(handlers::login_page).post(handlers::login))
        // GET/POST /post/{id}
        // Post detail with comments; the POST adds a comment (authenticated only).
        .route(
            "/post/{id}",
            get(handlers::show_post).post(handlers::add_comment),
        )
        // GET /about, GET /contact
        // Static content pages.
        .route("/about", get(handlers::about))
        .route("/contact", get(handlers::contact))
}
