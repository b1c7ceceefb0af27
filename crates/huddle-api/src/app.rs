//! Application builder: wires router + middleware + state into an Axum app,
//! and runs it.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use huddle_auth::JwtDecoder;
use huddle_core::config::{AppConfig, CorsConfig};
use huddle_core::error::AppError;
use huddle_realtime::RealtimeEngine;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState, cors_config: &CorsConfig) -> Router {
    build_router(state)
        .layer(build_cors_layer(cors_config))
        .layer(
            // Path only: the WebSocket credential travels in the query string.
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

/// Runs the Huddle server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting Huddle server...");

    // ── Step 1: Persistence ──────────────────────────────────────
    let stores = huddle_database::open_stores(&config.database).await?;

    // ── Step 2: Identity verifier ────────────────────────────────
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    // ── Step 3: Realtime engine ──────────────────────────────────
    let realtime = Arc::new(RealtimeEngine::new(
        &config.realtime,
        Arc::clone(&jwt_decoder),
        Arc::clone(&stores.messages),
        Arc::clone(&stores.users),
    ));

    // ── Step 4: Bind and serve ───────────────────────────────────
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    info!("Huddle server listening on {}", addr);

    let grace = config.server.shutdown_grace();
    let state = AppState::new(config, jwt_decoder, realtime, stores.messages);
    serve(listener, state, shutdown_signal(), grace).await
}

/// Serves the app on `listener` until `shutdown` resolves.
///
/// On shutdown the realtime engine closes every connection, then in-flight
/// HTTP requests get up to `grace` to finish.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
    grace: Duration,
) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let engine = Arc::clone(&state.realtime);
    let app = build_app(state.clone(), &state.config.server.cors);
    let (draining_tx, draining_rx) = oneshot::channel::<()>();

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            engine.shutdown();
            let _ = draining_tx.send(());
        })
        .into_future();

    let deadline = async move {
        match draining_rx.await {
            Ok(()) => tokio::time::sleep(grace).await,
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = server => result.map_err(|e| AppError::internal(format!("Server error: {}", e)))?,
        _ = deadline => warn!(grace_seconds = grace.as_secs(), "Shutdown grace period elapsed, exiting"),
    }

    info!("Huddle server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
