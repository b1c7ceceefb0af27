//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use huddle_auth::JwtDecoder;
use huddle_core::config::AppConfig;
use huddle_core::traits::MessageStore;
use huddle_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Credential verifier for HTTP routes
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Real-time engine
    pub realtime: Arc<RealtimeEngine>,
    /// Message history reads
    pub messages: Arc<dyn MessageStore>,
    /// When the process started serving
    pub started_at: Instant,
}

impl AppState {
    /// Assemble state from its parts.
    pub fn new(
        config: AppConfig,
        jwt_decoder: Arc<JwtDecoder>,
        realtime: Arc<RealtimeEngine>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            jwt_decoder,
            realtime,
            messages,
            started_at: Instant::now(),
        }
    }
}
