use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Public Router Module
///
/// Endpoints accessible to any client, anonymous or logged-in. This covers
/// the whole read surface plus two mutations the original service never
/// gated: the per-listing view bump and the view-count backfill. Both stay
/// tokenless here deliberately; see DESIGN.md.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Health/status probe used by monitors and load balancers.
        .route("/", get(handlers::status))
        // GET /homes
        // Lists every listing in the collection.
        .route("/homes", get(handlers::get_listings))
        // GET /homes/{id}
        // Single-listing detail, 404 when the id is unknown.
        .route("/homes/{id}", get(handlers::get_listing_details))
        // GET /latest-homes
        // The six newest listings, creation time descending.
        .route("/latest-homes", get(handlers::get_latest_listings))
        // GET /search?search=...
        // Case-insensitive substring match over name and location.
        .route("/search", get(handlers::search_listings))
        // GET /sorted-properties?sort=...&order=...
        // Whole collection ordered by one whitelisted field.
        .route("/sorted-properties", get(handlers::get_sorted_listings))
        // GET /properties?search=&category=&location=&sort=&page=&limit=
        // The filtered/paginated listing query.
        .route("/properties", get(handlers::get_properties))
        // GET /my-properties?email=...
        // Listings by owner email; 400 without the email parameter.
        .route("/my-properties", get(handlers::get_my_listings))
        // GET /my-ratings?email=...
        // Ratings by reviewer email; 400 without the email parameter.
        .route("/my-ratings", get(handlers::get_my_ratings))
        // GET /property-ratings/{id}
        // Ratings attached to one listing.
        .route("/property-ratings/{id}", get(handlers::get_listing_ratings))
        // PUT /homes/{id}/view
        // Publicly callable view-counter increment.
        .route("/homes/{id}/view", put(handlers::increment_view_count))
        // PUT /add-view-count
        // Backfills a random starter view count on listings lacking one.
        .route("/add-view-count", put(handlers::backfill_view_counts))
}
