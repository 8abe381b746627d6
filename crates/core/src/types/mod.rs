//! Core types for Ledger.
//!
//! This module provides type-safe wrappers for the invoice domain.

pub mod amount;
pub mod id;
pub mod status;

pub use amount::{AmountError, Cents};
pub use id::*;
pub use status::{InvoiceStatus, InvoiceStatusError};
