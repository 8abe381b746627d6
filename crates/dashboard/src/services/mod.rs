//! Business logic services for the dashboard.
//!
//! # Services
//!
//! - `invoices` - Invoice create/update/delete form actions

pub mod invoices;

pub use invoices::{
    ActionError, ActionOutcome, INVOICES_PATH, InvoiceAction, InvoiceService, Navigation,
};
