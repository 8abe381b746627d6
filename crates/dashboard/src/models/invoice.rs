//! Invoice records as the dashboard sees them.

use chrono::NaiveDate;
use ledger_core::{Cents, CustomerId, InvoiceId, InvoiceStatus};

/// A stored invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    /// Amount in cents.
    pub amount: Cents,
    pub status: InvoiceStatus,
    /// Creation date (UTC). Never changes after insert.
    pub date: NaiveDate,
}

/// Values for a new invoice row. The store assigns the ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub customer_id: CustomerId,
    pub amount: Cents,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// The mutable subset of an invoice.
///
/// Updates never touch `date` or `id`, so neither appears here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceChanges {
    pub customer_id: CustomerId,
    pub amount: Cents,
    pub status: InvoiceStatus,
}
