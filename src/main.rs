//! Huddle Server: presence and call signaling relay
//!
//! Main entry point: loads configuration, initializes logging, and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use huddle_core::config::{AppConfig, LogFormat};
use huddle_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!("Starting Huddle v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = huddle_api::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `HUDDLE_CONFIG_DIR` (default `config`) with the
/// `HUDDLE_ENV` overlay (default `development`).
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("HUDDLE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("HUDDLE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Install the global tracing subscriber.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
