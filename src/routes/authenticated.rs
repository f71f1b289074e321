use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, post, put},
};

/// Authenticated Router Module
///
/// The write surface gated by the bearer-token middleware layered above this
/// router. The gate verifies the credential only; handlers keep reading
/// identity fields (owner email, reviewer email, user id) from the request
/// payloads, as the original service did.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /homes
        // Submits a new listing; the server assigns id and creation time.
        .route("/homes", post(handlers::create_listing))
        // PUT/DELETE /homes/{id}
        // Merge-updates or removes a listing. No ownership check beyond the
        // token gate: any valid credential may mutate any listing.
        .route(
            "/homes/{id}",
            put(handlers::update_listing).delete(handlers::delete_listing),
        )
        // POST /add-rating
        // Records an immutable rating against a listing id.
        .route("/add-rating", post(handlers::create_rating))
        // POST /save-property
        // Create-if-absent favorite; duplicates report "Already saved".
        .route("/save-property", post(handlers::save_favorite))
}
