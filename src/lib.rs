use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod query;
pub mod repository;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::VerifiedToken;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the service.
/// It aggregates all API paths and data schemas decorated with the
/// `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::status, handlers::get_listings, handlers::get_listing_details,
        handlers::create_listing, handlers::update_listing, handlers::delete_listing,
        handlers::get_latest_listings, handlers::search_listings,
        handlers::get_sorted_listings, handlers::get_properties, handlers::get_my_listings,
        handlers::increment_view_count, handlers::backfill_view_counts,
        handlers::get_my_ratings, handlers::get_listing_ratings, handlers::create_rating,
        handlers::save_favorite, handlers::get_admin_stats, handlers::admin_delete_listing
    ),
    components(
        schemas(
            models::Listing, models::Rating, models::Favorite, models::User,
            models::CreateListingRequest, models::UpdateListingRequest,
            models::CreateRatingRequest, models::SaveFavoriteRequest,
            models::ListingPage, models::AdminStats, models::MutationResult,
            models::OpResponse<models::Listing>, models::OpResponse<models::Rating>,
            models::OpResponse<models::Favorite>, models::OpResponse<models::MutationResult>,
            error::ErrorBody,
        )
    ),
    tags(
        (name = "estate-portal", description = "Real-estate listing marketplace API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding the application's
/// shared services: the repository handle and the loaded configuration.
/// Shared across all in-flight requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: abstracts store access via the PgPool connection.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These allow extractors to selectively pull components from the shared
// AppState (the auth gates need only the repository and the config).

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces the bearer-token gate for the authenticated route set.
///
/// *Mechanism*: it attempts to extract `VerifiedToken` from the request.
/// Since `VerifiedToken` implements `FromRequestParts`, a missing or invalid
/// credential rejects the request with the 401 JSON body before the handler
/// runs. The resolved identity is deliberately not forwarded: handlers keep
/// trusting the identity fields supplied in the request itself.
async fn auth_middleware(_token: VerifiedToken, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration (wide open, as the original service ran).
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Write routes: protected by the bearer-token gate.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Admin routes: nested under '/admin'. The role check is performed by
        // the AdminUser extractor inside each handler.
        .nest("/admin", admin::admin_routes())
        // Apply the unified state to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: wraps the request/response lifecycle in a
                // span carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer (applied last).
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation: extracts the
/// `x-request-id` header (if present) and includes it in the structured
/// logging metadata alongside the HTTP method and URI, so every log line for
/// a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
