use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError, repository::RepositoryState};

/// Claims
///
/// The payload structure expected inside a bearer token issued by the
/// identity provider. Tokens are HS256-signed with the shared secret from
/// `AppConfig` and validated on every gated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the caller's email, as registered with the identity
    /// provider. The admin gate resolves the user record through it.
    pub sub: String,
    /// Expiration time (exp): timestamp after which the token is rejected.
    pub exp: usize,
    /// Issued at (iat): timestamp when the token was issued.
    pub iat: usize,
}

/// VerifiedToken
///
/// Extractor implementing the plain token gate: the request must carry
/// `Authorization: Bearer <token>` with a token the identity provider's
/// secret verifies. Nothing beyond validity is checked, and handlers do not
/// consume the resolved email — they keep trusting the identity fields the
/// request body or query supplies, exactly as the original service did.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub email: String,
}

/// AdminUser
///
/// Extractor implementing the admin gate: a valid token whose subject maps
/// to a stored user record with `role == "admin"`.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
}

/// Pulls the bearer token out of the Authorization header and decodes it.
/// All failure modes collapse to 401 with the same client-facing messages
/// the original service used.
fn decode_bearer(parts: &Parts, config: &AppConfig) -> Result<Claims, ApiError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized access. Token not found!".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized access. Token not found!".into()))?;

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            // An expired token is the common failure for a once-valid credential;
            // it gets the same response as any other rejection.
            ErrorKind::ExpiredSignature => {
                Err(ApiError::Unauthorized("Unauthorized access. Invalid token.".into()))
            }
            _ => Err(ApiError::Unauthorized("Unauthorized access. Invalid token.".into())),
        },
    }
}

impl<S> FromRequestParts<S> for VerifiedToken
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let claims = decode_bearer(parts, &config)?;
        Ok(VerifiedToken { email: claims.sub })
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let claims = decode_bearer(parts, &config)?;

        // A lookup failure is indistinguishable from a missing user to the
        // caller: both are 401, only a role mismatch is 403.
        let user = repo
            .get_user_by_email(&claims.sub)
            .await
            .map_err(|e| {
                tracing::error!("admin gate user lookup failed: {:?}", e);
                ApiError::Unauthorized("Unauthorized".into())
            })?
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".into()))?;

        if user.role != "admin" {
            return Err(ApiError::Forbidden("Forbidden: Admin only".into()));
        }

        Ok(AdminUser {
            id: user.id,
            email: user.email,
        })
    }
}
