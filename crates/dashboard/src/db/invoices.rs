//! `PostgreSQL` invoice store.
//!
//! Queries are built at runtime with bound parameters. User input never
//! reaches the SQL text.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};

use ledger_core::{Cents, CustomerId, InvoiceId, InvoiceStatus};

use super::{BoxedConnection, InvoiceConnection, InvoiceStore, StoreError};
use crate::models::{Invoice, InvoiceChanges, NewInvoice};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: InvoiceId,
    customer_id: CustomerId,
    amount: Cents,
    status: InvoiceStatus,
    date: NaiveDate,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            amount: row.amount,
            status: row.status,
            date: row.date,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Invoice store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn connect(&self) -> Result<BoxedConnection, StoreError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgInvoiceConnection { conn }))
    }
}

/// A pooled connection. Returned to the pool on drop.
pub struct PgInvoiceConnection {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl InvoiceConnection for PgInvoiceConnection {
    async fn insert(&mut self, invoice: &NewInvoice) -> Result<InvoiceId, StoreError> {
        let id = sqlx::query_scalar::<_, InvoiceId>(
            r"
            INSERT INTO invoices (customer_id, amount, status, date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&invoice.customer_id)
        .bind(invoice.amount)
        .bind(invoice.status)
        .bind(invoice.date)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    async fn update(
        &mut self,
        id: &InvoiceId,
        changes: &InvoiceChanges,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE invoices
            SET customer_id = $1, amount = $2, status = $3
            WHERE id = $4
            ",
        )
        .bind(&changes.customer_id)
        .bind(changes.amount)
        .bind(changes.status)
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&mut self, id: &InvoiceId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list(&mut self) -> Result<Vec<Invoice>, StoreError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r"
            SELECT id, customer_id, amount, status, date
            FROM invoices
            ORDER BY date DESC, id
            ",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(Invoice::from).collect())
    }

    async fn get(&mut self, id: &InvoiceId) -> Result<Option<Invoice>, StoreError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r"
            SELECT id, customer_id, amount, status, date
            FROM invoices
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(Invoice::from))
    }
}
