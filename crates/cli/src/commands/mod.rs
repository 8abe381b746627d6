//! CLI command implementations.

pub mod invoice;
pub mod migrate;

use secrecy::SecretString;
use thiserror::Error;

use ledger_dashboard::config::{self, ConfigError};
use ledger_dashboard::services::ActionError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// An invoice action failed. Details were logged when it failed.
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Load `.env` and read the database URL.
fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();
    Ok(config::get_database_url("LEDGER_DATABASE_URL")?)
}
