//! `AuthUser` extractor: pulls the bearer token from the Authorization header and verifies it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use huddle_auth::{Claims, VerifiedIdentity};
use huddle_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Verified caller identity available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Who the caller is.
    pub identity: VerifiedIdentity,
    /// The verified claims of the presented token.
    pub claims: Claims,
}

impl std::ops::Deref for AuthUser {
    type Target = VerifiedIdentity;
    fn deref(&self) -> &Self::Target {
        &self.identity
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::authentication("Missing or malformed Authorization header"))?;

        let claims = state.jwt_decoder.decode_claims(bearer.token()).await?;
        Ok(AuthUser {
            identity: claims.identity(),
            claims,
        })
    }
}
