use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Defines the post-management routes, exclusively usable by the seeded
/// 'admin' account.
///
/// Access Control:
/// This router is merged at the root (the external paths are fixed at
/// /new-post, /edit-post/{id} and /delete/{id}) and wrapped in the same
/// authentication middleware as the authenticated routes. The 'admin' role
/// check is performed *inside* the handlers after the request passes the
/// authentication layer; a non-admin member is flashed a warning and
/// redirected to the listing.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /new-post
        // Author a new post, stamped with today's date.
        .route(
            "/new-post",
            get(handlers::new_post_page).post(handlers::create_post),
        )
        // GET/POST /edit-post/{id}
        // Full overwrite of a post's fields; the publish date is kept.
        .route(
            "/edit-post/{id}",
            get(handlers::edit_post_page).post(handlers::update_post),
        )
        // GET /delete/{id}
        // Cascade-deletes the post and its comments in one transaction.
        .route("/delete/{id}", get(handlers::delete_post))
}
