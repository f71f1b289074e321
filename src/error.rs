use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// ErrorBody
///
/// The JSON shape every failed request carries: `{"success": false, "message": "..."}`.
/// Clients key off `success` rather than inspecting the HTTP status alone.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

/// ApiError
///
/// The full error taxonomy of the service. Every handler returns
/// `Result<_, ApiError>`; the `IntoResponse` impl below renders the variant
/// as the matching status code plus an `ErrorBody`.
///
/// Store failures are logged with their detail and collapsed into `Internal`
/// so nothing about the database ever leaks to a client.
#[derive(Debug)]
pub enum ApiError {
    /// 400: a required request parameter is missing or malformed.
    Validation(String),
    /// 401: Authorization header absent, malformed, or token rejected.
    Unauthorized(String),
    /// 403: authenticated but lacking the required role.
    Forbidden(String),
    /// 404: the addressed resource does not exist.
    NotFound(String),
    /// 500: store or other unexpected failure; detail already logged.
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Validation(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Internal => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    /// Store failures are never surfaced verbatim; log and degrade to the
    /// generic 500 response.
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("store error: {:?}", e);
        ApiError::Internal
    }
}
