use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get},
};

/// Admin Router Module
///
/// Routes restricted to users whose stored record carries `role = "admin"`.
/// The check happens in the `AdminUser` extractor on each handler: the token
/// subject is resolved to a user row and the role compared, so a plain valid
/// token alone is not enough here.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Collection counts (listings, ratings, users, favorites).
        .route("/stats", get(handlers::get_admin_stats))
        // DELETE /admin/homes/{id}
        // Force-delete any listing, no ownership involved.
        .route("/homes/{id}", delete(handlers::admin_delete_listing))
}
