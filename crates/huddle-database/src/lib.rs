//! # huddle-database
//!
//! PostgreSQL connection management, embedded migrations, and the concrete
//! implementations of the [`MessageStore`] and [`UserDirectory`] boundary
//! traits. In-memory implementations are provided for tests and for running
//! without a database.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

use std::sync::Arc;

use tracing::{info, warn};

use huddle_core::config::DatabaseConfig;
use huddle_core::result::AppResult;
use huddle_core::traits::{MessageStore, UserDirectory};

pub use connection::DatabasePool;
pub use memory::{InMemoryMessageStore, InMemoryUserDirectory};
pub use repositories::{MessageRepository, UserRepository};

/// The persistence handles the real-time core depends on.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Chat message store.
    pub messages: Arc<dyn MessageStore>,
    /// User attribute lookup.
    pub users: Arc<dyn UserDirectory>,
}

impl Stores {
    /// In-memory stores with no users registered.
    pub fn in_memory() -> Self {
        Self {
            messages: Arc::new(InMemoryMessageStore::new()),
            users: Arc::new(InMemoryUserDirectory::new()),
        }
    }
}

/// Open the configured stores.
///
/// Connects to PostgreSQL (and applies migrations when enabled) if a URL is
/// configured, otherwise falls back to in-memory stores.
pub async fn open_stores(config: &DatabaseConfig) -> AppResult<Stores> {
    if !config.is_configured() {
        warn!("No database URL configured, messages will not survive a restart");
        return Ok(Stores::in_memory());
    }

    let db = DatabasePool::connect(config).await?;
    if config.run_migrations {
        migration::run_migrations(db.pool()).await?;
    }

    info!("Persistence backed by PostgreSQL");
    let pool = db.into_pool();
    Ok(Stores {
        messages: Arc::new(MessageRepository::new(pool.clone())),
        users: Arc::new(UserRepository::new(pool)),
    })
}
