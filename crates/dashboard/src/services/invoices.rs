//! Invoice mutation handler.
//!
//! Each action follows the same shape:
//! 1. Acquire one store connection
//! 2. Validate the form (create/update)
//! 3. Run a single mutating statement
//! 4. Release the connection
//! 5. Revalidate the cached invoice list
//! 6. Tell the caller where to go next
//!
//! The connection is a scoped value, so it is released on every exit path,
//! including validation and store failures.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use ledger_core::InvoiceId;

use crate::cache::ViewCache;
use crate::db::{BoxedConnection, InvoiceStore, StoreError};
use crate::forms::{InvoiceForm, ValidInvoiceForm, ValidationError};
use crate::models::{InvoiceChanges, NewInvoice};

/// Path of the invoice list view. Every mutation revalidates it.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

// =============================================================================
// Outcomes
// =============================================================================

/// Where the caller should go after a successful action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Remain on the current page.
    Stay,
    /// Navigate to the given path.
    Redirect(&'static str),
}

/// Result of a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// The invoice the action applied to.
    pub invoice_id: InvoiceId,
    pub navigation: Navigation,
}

/// The three invoice mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceAction {
    Create,
    Update,
    Delete,
}

impl InvoiceAction {
    /// Message surfaced to the user when the action fails.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Create | Self::Update => "Invalid form data.",
            Self::Delete => "Failed to delete invoice.",
        }
    }
}

impl fmt::Display for InvoiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Failure of an invoice action.
///
/// The display message is the opaque text shown to users. The underlying
/// cause is available through `source()` and has already been logged.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The submitted form did not validate.
    #[error("Invalid form data.")]
    InvalidInput(#[source] ValidationError),

    /// The store could not complete the action.
    #[error("{}", .action.failure_message())]
    StoreFailure {
        action: InvoiceAction,
        #[source]
        source: StoreError,
    },
}

// =============================================================================
// Service
// =============================================================================

/// Runs invoice form actions against a store and keeps the list view fresh.
#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn InvoiceStore>,
    cache: ViewCache,
    today: fn() -> NaiveDate,
}

impl InvoiceService {
    /// Create a service over `store` that revalidates views in `cache`.
    #[must_use]
    pub fn new(store: Arc<dyn InvoiceStore>, cache: ViewCache) -> Self {
        Self {
            store,
            cache,
            today: || Utc::now().date_naive(),
        }
    }

    /// Replace the source of the creation date.
    #[must_use]
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Create an invoice from form input.
    ///
    /// The amount is stored in cents and the date is today's UTC date.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::InvalidInput` if the form does not validate and
    /// `ActionError::StoreFailure` if the insert fails.
    #[instrument(skip(self, form))]
    pub async fn create_invoice(&self, form: &InvoiceForm) -> Result<ActionOutcome, ActionError> {
        let action = InvoiceAction::Create;
        let mut conn = self.connect(action).await?;
        let valid = validate(action, form)?;

        let invoice = NewInvoice {
            customer_id: valid.customer_id,
            amount: valid.amount,
            status: valid.status,
            date: (self.today)(),
        };

        let id = conn
            .insert(&invoice)
            .await
            .map_err(|source| store_failure(action, source))?;
        drop(conn);

        info!(invoice_id = %id, amount = %invoice.amount, "Invoice created");
        self.cache.revalidate(INVOICES_PATH).await;

        Ok(ActionOutcome {
            invoice_id: id,
            navigation: Navigation::Redirect(INVOICES_PATH),
        })
    }

    /// Update customer, amount and status of an existing invoice.
    ///
    /// An `id` that matches nothing is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::InvalidInput` if the form does not validate and
    /// `ActionError::StoreFailure` if the update fails.
    #[instrument(skip(self, id, form), fields(invoice_id = %id))]
    pub async fn update_invoice(
        &self,
        id: &InvoiceId,
        form: &InvoiceForm,
    ) -> Result<ActionOutcome, ActionError> {
        let action = InvoiceAction::Update;
        let mut conn = self.connect(action).await?;
        let valid = validate(action, form)?;

        let changes = InvoiceChanges {
            customer_id: valid.customer_id,
            amount: valid.amount,
            status: valid.status,
        };

        let affected = conn
            .update(id, &changes)
            .await
            .map_err(|source| store_failure(action, source))?;
        drop(conn);

        if affected == 0 {
            debug!("No invoice matched; nothing updated");
        } else {
            info!("Invoice updated");
        }
        self.cache.revalidate(INVOICES_PATH).await;

        Ok(ActionOutcome {
            invoice_id: id.clone(),
            navigation: Navigation::Redirect(INVOICES_PATH),
        })
    }

    /// Delete an invoice. The caller stays where it is.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::StoreFailure` if the delete fails.
    #[instrument(skip(self, id), fields(invoice_id = %id))]
    pub async fn delete_invoice(&self, id: &InvoiceId) -> Result<ActionOutcome, ActionError> {
        let action = InvoiceAction::Delete;
        let mut conn = self.connect(action).await?;

        let affected = conn
            .delete(id)
            .await
            .map_err(|source| store_failure(action, source))?;
        drop(conn);

        if affected == 0 {
            debug!("No invoice matched; nothing deleted");
        } else {
            info!("Invoice deleted");
        }
        self.cache.revalidate(INVOICES_PATH).await;

        Ok(ActionOutcome {
            invoice_id: id.clone(),
            navigation: Navigation::Stay,
        })
    }

    async fn connect(&self, action: InvoiceAction) -> Result<BoxedConnection, ActionError> {
        self.store
            .connect()
            .await
            .map_err(|source| store_failure(action, source))
    }
}

impl fmt::Debug for InvoiceService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvoiceService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn validate(
    action: InvoiceAction,
    form: &InvoiceForm,
) -> Result<ValidInvoiceForm, ActionError> {
    form.validate().map_err(|e| {
        warn!(%action, error = %e, "Invoice form rejected");
        ActionError::InvalidInput(e)
    })
}

fn store_failure(action: InvoiceAction, source: StoreError) -> ActionError {
    error!(%action, error = %source, "Invoice store operation failed");
    ActionError::StoreFailure { action, source }
}
