//! Embedded schema migrations.
//!
//! The workspace-root `migrations/` directory is compiled in:
//! 1. `create_users`: the `users` table the avatar lookup and the CLI read.
//! 2. `create_messages`: the `message_kind` enum and the `messages` table with
//!    its direct-history and room-history indexes.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use huddle_core::error::{AppError, ErrorKind};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply the users and messages migrations that have not run yet.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!(
        embedded = MIGRATOR.iter().count(),
        "Applying users/messages schema migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to apply schema migrations: {e}"),
            e,
        )
    })?;

    info!("Schema is up to date");
    Ok(())
}
