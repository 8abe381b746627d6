//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ledger-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `LEDGER_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Migrations live in `crates/dashboard/migrations/` and are embedded in the
//! dashboard library.

use ledger_dashboard::db;

use super::{CommandError, database_url};

/// Run the dashboard database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let url = database_url()?;

    tracing::info!("Connecting to ledger database...");
    let pool = db::create_pool(&url, 1).await?;

    tracing::info!("Running ledger migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Ledger migrations complete");
    Ok(())
}
