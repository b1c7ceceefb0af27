//! Database migration command.

use huddle_core::config::AppConfig;
use huddle_core::error::AppError;

use crate::output;

/// Run all pending migrations
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let db = super::connect_db(config).await?;

    println!("Running database migrations...");
    huddle_database::migration::run_migrations(db.pool()).await?;
    output::print_success("All migrations applied successfully.");
    Ok(())
}
