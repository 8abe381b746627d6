//! Record store for invoices.
//!
//! # Database
//!
//! ## Tables
//!
//! - `invoices` - One row per invoice (`id`, `customer_id`, `amount` in cents,
//!   `status`, `date`)
//!
//! # Connections
//!
//! Handlers never touch the pool directly. They ask an [`InvoiceStore`] for a
//! connection, run one statement on it, and drop it. Dropping the boxed
//! [`InvoiceConnection`] is what releases it, so release happens exactly once
//! on every exit path, including early returns through `?`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/dashboard/migrations/` and run via:
//! ```bash
//! cargo run -p ledger-cli -- migrate
//! ```

pub mod invoices;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use ledger_core::InvoiceId;

use crate::models::{Invoice, InvoiceChanges, NewInvoice};

pub use invoices::PgInvoiceStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No connection could be handed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A source of invoice store connections.
///
/// Object-safe so that application state can hold `Arc<dyn InvoiceStore>`
/// and tests can substitute an in-memory implementation.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Acquire a connection. It is released when the returned box is dropped.
    async fn connect(&self) -> Result<BoxedConnection, StoreError>;
}

/// A connection handed out by an [`InvoiceStore`].
pub type BoxedConnection = Box<dyn InvoiceConnection + Send>;

/// A scoped connection to the invoice store.
///
/// Every method runs exactly one parameterized statement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceConnection {
    /// Insert a new invoice and return its store-generated ID.
    async fn insert(&mut self, invoice: &NewInvoice) -> Result<InvoiceId, StoreError>;

    /// Update customer, amount and status of an invoice.
    ///
    /// Returns the number of rows affected (0 if `id` matched nothing).
    async fn update(&mut self, id: &InvoiceId, changes: &InvoiceChanges)
    -> Result<u64, StoreError>;

    /// Delete an invoice. Returns the number of rows affected.
    async fn delete(&mut self, id: &InvoiceId) -> Result<u64, StoreError>;

    /// All invoices, newest first.
    async fn list(&mut self) -> Result<Vec<Invoice>, StoreError>;

    /// A single invoice by ID.
    async fn get(&mut self, id: &InvoiceId) -> Result<Option<Invoice>, StoreError>;
}

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Pool ceiling
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the embedded migrations in `crates/dashboard/migrations/`.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
