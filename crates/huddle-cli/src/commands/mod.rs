//! CLI command definitions and dispatch.

pub mod migrate;
pub mod serve;
pub mod token;

use clap::{Parser, Subcommand};

use huddle_core::config::AppConfig;
use huddle_core::error::AppError;

use crate::output::OutputFormat;

/// Huddle: presence and call signaling relay
#[derive(Debug, Parser)]
#[command(name = "huddle", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and per-environment overlays
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Environment overlay to apply on top of default.toml
    #[arg(short, long, env = "HUDDLE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the Huddle server
    Serve(serve::ServeArgs),
    /// Apply pending database migrations
    Migrate,
    /// Sign a development token
    IssueToken(token::IssueTokenArgs),
    /// Check a token and show who it identifies
    VerifyToken(token::VerifyTokenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config, &self.env)?;
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate => migrate::execute(&config).await,
            Commands::IssueToken(args) => token::issue(args, &config, self.format).await,
            Commands::VerifyToken(args) => token::verify(args, &config, self.format).await,
        }
    }
}

/// Helper: connect to the configured database, refusing to run without one
pub async fn connect_db(config: &AppConfig) -> Result<huddle_database::DatabasePool, AppError> {
    if !config.database.is_configured() {
        return Err(AppError::configuration(
            "database.url is not set (HUDDLE__DATABASE__URL)",
        ));
    }
    huddle_database::DatabasePool::connect(&config.database).await
}
