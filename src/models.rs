use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Listing
///
/// Represents a property listing record from the `listings` table. The typed
/// columns cover everything the service itself filters or sorts on; every
/// other field the creator supplied lives in the JSONB `attributes` column
/// and is flattened back into the JSON body on the way out, so the wire shape
/// stays as open as the original document store's.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Listing {
    pub id: Uuid,
    pub property_name: String,
    pub location: String,
    pub category: String,
    // Owner identity, as supplied by the creator at insert time.
    pub user_email: String,
    // Absent until the first view increment or backfill touches the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    // Arbitrary additional attributes (price, bedrooms, images, ...).
    #[serde(flatten)]
    #[sqlx(json)]
    #[ts(skip)]
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
}

/// Rating
///
/// A review record attached to a listing by a reviewer. Immutable after
/// creation; the `property_id` reference is advisory (no cascade, orphaning
/// is permitted when the listing goes away).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Rating {
    pub id: Uuid,
    pub reviewer_email: String,
    pub property_id: Uuid,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Favorite
///
/// A saved/bookmarked listing for a user. The (user_id, property_id) pair is
/// unique; `user_id` is the opaque identity string the client supplies.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: String,
    pub property_id: Uuid,
    #[ts(type = "string")]
    pub saved_at: DateTime<Utc>,
}

/// User
///
/// The user's canonical identity record from the `users` table. Read-only
/// from this service's perspective; consulted only by the admin gate.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    // The RBAC field: "admin" or anything else.
    pub role: String,
}

/// --- Request Payloads (Input Schemas) ---

/// CreateListingRequest
///
/// Input payload for submitting a new listing (POST /homes). The server
/// assigns the id and creation timestamp; everything beyond the typed fields
/// is kept verbatim in `attributes`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateListingRequest {
    pub property_name: String,
    pub location: String,
    pub category: String,
    pub user_email: String,
    #[serde(flatten)]
    #[ts(skip)]
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
}

/// UpdateListingRequest
///
/// Partial update payload for PUT /homes/{id}. Absent typed fields leave the
/// column untouched; extra attributes are merged over the stored ones rather
/// than replacing the whole set.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateListingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,

    #[serde(flatten)]
    #[ts(skip)]
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
}

/// CreateRatingRequest
///
/// Input payload for POST /add-rating. The reviewer identity is taken from
/// the body as supplied (the token gate verifies the caller holds a valid
/// credential but does not bind it to this field).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateRatingRequest {
    pub reviewer_email: String,
    pub property_id: Uuid,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// SaveFavoriteRequest
///
/// Input payload for POST /save-property.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaveFavoriteRequest {
    pub user_id: String,
    pub property_id: Uuid,
}

/// --- Response Envelopes (Output Schemas) ---

/// OpResponse
///
/// The `{success, result}` envelope every write endpoint (and the single-
/// listing fetch) responds with. `result` carries the store-operation
/// outcome: the affected document, or a row count for bulk operations.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct OpResponse<T> {
    pub success: bool,
    pub result: T,
}

impl<T> OpResponse<T> {
    pub fn of(result: T) -> Self {
        Self {
            success: true,
            result,
        }
    }
}

/// MutationResult
///
/// The store-operation result for bulk or by-id mutations that do not return
/// a document: how many rows the statement touched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MutationResult {
    pub rows_affected: u64,
}

impl MutationResult {
    pub fn new(rows_affected: u64) -> Self {
        Self { rows_affected }
    }
}

/// ListingPage
///
/// Output of the filtered/paginated GET /properties endpoint: one page of
/// items plus the pagination metadata computed from the matching total.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ListingPage {
    pub success: bool,
    pub items: Vec<Listing>,
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

/// SaveOutcome
///
/// Result of the create-if-absent favorite write. `AlreadySaved` is reported
/// to the client as HTTP 200 with `success:false`, matching the original
/// behavior, not as an error status.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Saved(Favorite),
    AlreadySaved,
}

/// AdminStats
///
/// Output schema for the administrative statistics endpoint (GET /admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminStats {
    pub total_listings: i64,
    pub total_ratings: i64,
    pub total_users: i64,
    pub total_favorites: i64,
}
