//! Message history handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use validator::Validate;

use huddle_core::error::AppError;

use crate::dto::request::HistoryQuery;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/messages/direct/{peer}: direct messages between the caller and `peer`, oldest first
pub async fn direct_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(peer): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<ApiResponse<Vec<MessageResponse>>>> {
    query
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let limit = query.effective_limit(state.config.realtime.history_limit);

    let messages = state
        .messages
        .recent_direct_history(&auth.username, &peer, limit)
        .await?;

    Ok(Json(ApiResponse::ok(
        messages.into_iter().map(MessageResponse::from).collect(),
    )))
}

/// GET /api/messages/room/{room}: recent messages posted to a room, oldest first
pub async fn room_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(room): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<ApiResponse<Vec<MessageResponse>>>> {
    query
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let limit = query.effective_limit(state.config.realtime.history_limit);

    let messages = state.messages.recent_room_history(&room, limit).await?;

    Ok(Json(ApiResponse::ok(
        messages.into_iter().map(MessageResponse::from).collect(),
    )))
}
