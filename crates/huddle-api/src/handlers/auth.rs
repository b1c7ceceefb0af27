//! Credential handlers.

use axum::Json;
use axum::extract::State;

use huddle_core::error::AppError;

use crate::dto::response::{ApiResponse, RevokedTokenResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/revoke: revoke the bearer token used for this request.
///
/// Later HTTP calls and WebSocket connects with that token get 401.
/// Connections already open keep the identity they were opened with.
pub async fn revoke_token(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<RevokedTokenResponse>>> {
    let jti = auth
        .claims
        .jti
        .ok_or_else(|| AppError::validation("Token carries no id and cannot be revoked"))?;

    state.jwt_decoder.blocklist().revoke(jti).await;
    tracing::info!(username = %auth.username, jti = %jti, "Caller revoked own token");

    Ok(Json(ApiResponse::ok(RevokedTokenResponse {
        token_id: jti.to_string(),
        expires_at: auth.claims.expires_at(),
    })))
}
