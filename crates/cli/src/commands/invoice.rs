//! Invoice management commands.
//!
//! These run the same actions as the dashboard's forms, so validation,
//! amount conversion and logging are identical.
//!
//! # Usage
//!
//! ```bash
//! ledger-cli invoice create --customer-id c1 --amount 12.50 --status pending
//! ledger-cli invoice update <ID> --customer-id c1 --amount 20 --status paid
//! ledger-cli invoice delete <ID>
//! ```
//!
//! A running dashboard keeps its own page cache, so its invoice list may lag
//! CLI changes until the cached page expires.

use std::sync::Arc;
use std::time::Duration;

use ledger_core::InvoiceId;
use ledger_dashboard::cache::ViewCache;
use ledger_dashboard::db::{self, PgInvoiceStore};
use ledger_dashboard::forms::InvoiceForm;
use ledger_dashboard::services::InvoiceService;

use super::{CommandError, database_url};

/// Field values shared by `create` and `update`.
#[derive(Debug, Clone)]
pub struct InvoiceFields {
    pub customer_id: String,
    pub amount: String,
    pub status: String,
}

impl From<InvoiceFields> for InvoiceForm {
    fn from(fields: InvoiceFields) -> Self {
        Self {
            customer_id: Some(fields.customer_id),
            amount: Some(fields.amount),
            status: Some(fields.status),
        }
    }
}

async fn service() -> Result<InvoiceService, CommandError> {
    let url = database_url()?;
    let pool = db::create_pool(&url, 1).await?;
    let cache = ViewCache::new(1, Duration::from_secs(1));
    Ok(InvoiceService::new(
        Arc::new(PgInvoiceStore::new(pool)),
        cache,
    ))
}

/// Create an invoice.
///
/// # Errors
///
/// Returns `CommandError` if the fields are invalid or the insert fails.
pub async fn create(fields: InvoiceFields) -> Result<InvoiceId, CommandError> {
    let outcome = service()
        .await?
        .create_invoice(&InvoiceForm::from(fields))
        .await?;
    Ok(outcome.invoice_id)
}

/// Update an invoice. An unknown ID is not an error.
///
/// # Errors
///
/// Returns `CommandError` if the fields are invalid or the update fails.
pub async fn update(id: &str, fields: InvoiceFields) -> Result<(), CommandError> {
    service()
        .await?
        .update_invoice(&InvoiceId::new(id), &InvoiceForm::from(fields))
        .await?;
    Ok(())
}

/// Delete an invoice. An unknown ID is not an error.
///
/// # Errors
///
/// Returns `CommandError` if the delete fails.
pub async fn delete(id: &str) -> Result<(), CommandError> {
    service().await?.delete_invoice(&InvoiceId::new(id)).await?;
    Ok(())
}
