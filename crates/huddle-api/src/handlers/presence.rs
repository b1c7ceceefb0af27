//! Presence handler.

use axum::Json;
use axum::extract::State;

use huddle_realtime::presence::PresenceEntry;

use crate::dto::response::ApiResponse;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/presence: the deduplicated online-user view
pub async fn list_online(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<ApiResponse<Vec<PresenceEntry>>> {
    Json(ApiResponse::ok(state.realtime.presence.snapshot()))
}
