use crate::{
    AppState,
    auth::AdminUser,
    error::{ApiError, ErrorBody},
    models::{
        AdminStats, CreateListingRequest, CreateRatingRequest, Favorite, Listing, ListingPage,
        MutationResult, OpResponse, Rating, SaveFavoriteRequest, SaveOutcome,
        UpdateListingRequest,
    },
    query::{ListingQuery, PropertiesParams, SortField, SortOrder},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// SearchParams
///
/// Query parameters for the substring search endpoint (GET /search).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SearchParams {
    /// Substring matched case-insensitively against property name or location.
    pub search: Option<String>,
}

/// SortParams
///
/// Query parameters for the single-field sort endpoint (GET /sorted-properties).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SortParams {
    /// Field to sort by; unknown names fall back to creation time.
    pub sort: Option<String>,
    /// "asc" for ascending, anything else descending.
    pub order: Option<String>,
}

/// EmailParams
///
/// Query parameter shared by the by-owner and by-reviewer listing endpoints.
/// The email is required; its absence is the one validation error in the API.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct EmailParams {
    pub email: Option<String>,
}

// --- Status ---

/// [Public Route] Health/status probe.
#[utoipa::path(get, path = "/", responses((status = 200, description = "Service status string")))]
pub async fn status() -> &'static str {
    "Real Estate Server is running perfectly!"
}

// --- Listing Handlers ---

/// get_listings
///
/// [Public Route] Lists every listing, unfiltered and unordered.
#[utoipa::path(
    get,
    path = "/homes",
    responses((status = 200, description = "All listings", body = [Listing]))
)]
pub async fn get_listings(State(state): State<AppState>) -> Result<Json<Vec<Listing>>, ApiError> {
    let listings = state.repo.list_listings().await?;
    Ok(Json(listings))
}

/// get_listing_details
///
/// [Public Route] Retrieves a single listing by id, or 404 when absent.
#[utoipa::path(
    get,
    path = "/homes/{id}",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Found", body = OpResponse<Listing>),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_listing_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OpResponse<Listing>>, ApiError> {
    match state.repo.get_listing(id).await? {
        Some(listing) => Ok(Json(OpResponse::of(listing))),
        None => Err(ApiError::NotFound("Property not found".into())),
    }
}

/// create_listing
///
/// [Token Route] Submits a new listing. The server stamps the creation time;
/// the owner email is taken from the payload as supplied.
#[utoipa::path(
    post,
    path = "/homes",
    request_body = CreateListingRequest,
    responses((status = 200, description = "Created", body = OpResponse<Listing>))
)]
pub async fn create_listing(
    State(state): State<AppState>,
    Json(payload): Json<CreateListingRequest>,
) -> Result<Json<OpResponse<Listing>>, ApiError> {
    let listing = state.repo.create_listing(payload).await?;
    Ok(Json(OpResponse::of(listing)))
}

/// update_listing
///
/// [Token Route] Merges the supplied fields into an existing listing.
#[utoipa::path(
    put,
    path = "/homes/{id}",
    params(("id" = Uuid, Path, description = "Listing ID")),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Updated", body = OpResponse<Listing>),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateListingRequest>,
) -> Result<Json<OpResponse<Listing>>, ApiError> {
    match state.repo.update_listing(id, payload).await? {
        Some(listing) => Ok(Json(OpResponse::of(listing))),
        None => Err(ApiError::NotFound("Property not found".into())),
    }
}

/// delete_listing
///
/// [Token Route] Deletes a listing by id. Related ratings and favorites are
/// left in place (orphaning is permitted).
#[utoipa::path(
    delete,
    path = "/homes/{id}",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Deleted", body = OpResponse<MutationResult>),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OpResponse<MutationResult>>, ApiError> {
    let deleted = state.repo.delete_listing(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Property not found".into()));
    }
    Ok(Json(OpResponse::of(MutationResult::new(deleted))))
}

/// get_latest_listings
///
/// [Public Route] The six most recently created listings.
#[utoipa::path(
    get,
    path = "/latest-homes",
    responses((status = 200, description = "Latest listings", body = [Listing]))
)]
pub async fn get_latest_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let listings = state.repo.latest_listings(6).await?;
    Ok(Json(listings))
}

/// search_listings
///
/// [Public Route] Case-insensitive substring search over property name and
/// location. An absent/empty search term matches everything.
#[utoipa::path(
    get,
    path = "/search",
    params(SearchParams),
    responses((status = 200, description = "Matching listings", body = [Listing]))
)]
pub async fn search_listings(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let listings = state
        .repo
        .search_listings(params.search.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(listings))
}

/// get_sorted_listings
///
/// [Public Route] The whole collection ordered by one whitelisted field.
#[utoipa::path(
    get,
    path = "/sorted-properties",
    params(SortParams),
    responses((status = 200, description = "Sorted listings", body = [Listing]))
)]
pub async fn get_sorted_listings(
    State(state): State<AppState>,
    Query(params): Query<SortParams>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let field = params
        .sort
        .as_deref()
        .and_then(SortField::parse)
        .unwrap_or(SortField::CreatedAt);
    let order = SortOrder::parse(params.order.as_deref().unwrap_or(""));
    let listings = state.repo.sorted_listings(field, order).await?;
    Ok(Json(listings))
}

/// get_properties
///
/// [Public Route] Filtered, sorted, paginated listing query. Items and the
/// total count are computed over the same filter; the page metadata is
/// derived from the count.
#[utoipa::path(
    get,
    path = "/properties",
    params(PropertiesParams),
    responses((status = 200, description = "One page of listings", body = ListingPage))
)]
pub async fn get_properties(
    State(state): State<AppState>,
    Query(params): Query<PropertiesParams>,
) -> Result<Json<ListingPage>, ApiError> {
    let query = ListingQuery::from_params(params);
    let (items, total_items) = state.repo.query_listings(&query).await?;
    Ok(Json(ListingPage {
        success: true,
        items,
        total_items,
        total_pages: query.total_pages(total_items),
        current_page: query.page,
    }))
}

/// get_my_listings
///
/// [Public Route] Listings owned by the given email. 400 when the email
/// parameter is missing.
#[utoipa::path(
    get,
    path = "/my-properties",
    params(EmailParams),
    responses(
        (status = 200, description = "Listings by owner", body = [Listing]),
        (status = 400, description = "Missing email", body = ErrorBody)
    )
)]
pub async fn get_my_listings(
    State(state): State<AppState>,
    Query(params): Query<EmailParams>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let email = params
        .email
        .ok_or_else(|| ApiError::Validation("Email is required".into()))?;
    let listings = state.repo.listings_by_owner(&email).await?;
    Ok(Json(listings))
}

/// increment_view_count
///
/// [Public Route] Adds one to a listing's view counter. Deliberately
/// unauthenticated: any reader bumps the counter.
#[utoipa::path(
    put,
    path = "/homes/{id}/view",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses((status = 200, description = "Counter bumped", body = OpResponse<MutationResult>))
)]
pub async fn increment_view_count(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OpResponse<MutationResult>>, ApiError> {
    let updated = state.repo.increment_view_count(id).await?;
    // A miss reports success with zero rows touched, as the original did.
    Ok(Json(OpResponse::of(MutationResult::new(updated))))
}

/// backfill_view_counts
///
/// [Public Route] One-shot maintenance endpoint: every listing without a
/// view counter receives a random starter value. Unauthenticated, as-is.
#[utoipa::path(
    put,
    path = "/add-view-count",
    responses((status = 200, description = "Rows backfilled", body = OpResponse<MutationResult>))
)]
pub async fn backfill_view_counts(
    State(state): State<AppState>,
) -> Result<Json<OpResponse<MutationResult>>, ApiError> {
    let updated = state.repo.backfill_view_counts().await?;
    Ok(Json(OpResponse::of(MutationResult::new(updated))))
}

// --- Rating Handlers ---

/// get_my_ratings
///
/// [Public Route] Ratings submitted by the given reviewer email. 400 when
/// the email parameter is missing.
#[utoipa::path(
    get,
    path = "/my-ratings",
    params(EmailParams),
    responses(
        (status = 200, description = "Ratings by reviewer", body = [Rating]),
        (status = 400, description = "Missing email", body = ErrorBody)
    )
)]
pub async fn get_my_ratings(
    State(state): State<AppState>,
    Query(params): Query<EmailParams>,
) -> Result<Json<Vec<Rating>>, ApiError> {
    let email = params
        .email
        .ok_or_else(|| ApiError::Validation("Email is required".into()))?;
    let ratings = state.repo.ratings_by_reviewer(&email).await?;
    Ok(Json(ratings))
}

/// get_listing_ratings
///
/// [Public Route] All ratings attached to one listing id. An unknown id
/// simply yields an empty list (no referential check).
#[utoipa::path(
    get,
    path = "/property-ratings/{id}",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses((status = 200, description = "Ratings for listing", body = [Rating]))
)]
pub async fn get_listing_ratings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Rating>>, ApiError> {
    let ratings = state.repo.ratings_by_listing(id).await?;
    Ok(Json(ratings))
}

/// create_rating
///
/// [Token Route] Records a new rating; the server stamps the creation time.
/// Ratings are immutable afterwards: there is no update or delete surface.
#[utoipa::path(
    post,
    path = "/add-rating",
    request_body = CreateRatingRequest,
    responses((status = 200, description = "Created", body = OpResponse<Rating>))
)]
pub async fn create_rating(
    State(state): State<AppState>,
    Json(payload): Json<CreateRatingRequest>,
) -> Result<Json<OpResponse<Rating>>, ApiError> {
    let rating = state.repo.create_rating(payload).await?;
    Ok(Json(OpResponse::of(rating)))
}

// --- Favorite Handler ---

/// save_favorite
///
/// [Token Route] Create-if-absent bookmark for a (userId, propertyId) pair.
/// A duplicate reports "Already saved" with HTTP 200 and success:false — the
/// original treated it as a soft outcome, not an error.
#[utoipa::path(
    post,
    path = "/save-property",
    request_body = SaveFavoriteRequest,
    responses(
        (status = 200, description = "Saved (or already saved)", body = OpResponse<Favorite>)
    )
)]
pub async fn save_favorite(
    State(state): State<AppState>,
    Json(payload): Json<SaveFavoriteRequest>,
) -> Result<Response, ApiError> {
    match state.repo.save_favorite(payload).await? {
        SaveOutcome::Saved(favorite) => Ok(Json(OpResponse::of(favorite)).into_response()),
        SaveOutcome::AlreadySaved => Ok((
            StatusCode::OK,
            Json(ErrorBody {
                success: false,
                message: "Already saved".to_string(),
            }),
        )
            .into_response()),
    }
}

// --- Admin Handlers ---

/// get_admin_stats
///
/// [Admin Route] Collection counts for the moderation dashboard.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses(
        (status = 200, description = "Stats", body = AdminStats),
        (status = 403, description = "Not an admin", body = ErrorBody)
    )
)]
pub async fn get_admin_stats(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<AdminStats>, ApiError> {
    let stats = state.repo.admin_stats().await?;
    Ok(Json(stats))
}

/// admin_delete_listing
///
/// [Admin Route] Force-deletes any listing, regardless of owner.
#[utoipa::path(
    delete,
    path = "/admin/homes/{id}",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Deleted", body = OpResponse<MutationResult>),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn admin_delete_listing(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OpResponse<MutationResult>>, ApiError> {
    let deleted = state.repo.delete_listing(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Property not found".into()));
    }
    Ok(Json(OpResponse::of(MutationResult::new(deleted))))
}
