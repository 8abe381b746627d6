//! Domain models for the invoice dashboard.

pub mod invoice;

pub use invoice::{Invoice, InvoiceChanges, NewInvoice};
