//! Route definitions for the Huddle HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket upgrade lives at `/ws`.

use axum::routing::{get, post};
use axum::{Router, middleware as axum_middleware};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with all routes and request logging.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(presence_routes())
        .merge(message_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Liveness and detailed health
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Credential management
fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/revoke", post(handlers::auth::revoke_token))
}

/// Online-user view
fn presence_routes() -> Router<AppState> {
    Router::new().route("/presence", get(handlers::presence::list_online))
}

/// Stored message history
fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/messages/direct/{peer}",
            get(handlers::messages::direct_history),
        )
        .route("/messages/room/{room}", get(handlers::messages::room_history))
}
