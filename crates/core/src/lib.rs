//! Ledger Core - Shared types library.
//!
//! This crate provides the invoice types used across all Ledger components:
//! - `dashboard` - Invoice dashboard (HTTP service and mutation handlers)
//! - `cli` - Command-line tools for migrations and invoice management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for invoice IDs, amounts, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
