//! # huddle-api
//!
//! HTTP layer for Huddle built on Axum.
//!
//! Provides the WebSocket upgrade for the real-time engine, message history
//! and presence endpoints, health checks, CORS and request logging, the
//! bearer-token extractor, and `AppError` to HTTP mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server, serve};
pub use state::AppState;
