//! Ledger Dashboard library.
//!
//! Invoice form actions (create, update, delete), the cached invoice list
//! they revalidate, and the HTTP routes that serve both. Exposed as a
//! library so the CLI and the integration tests can drive the same code.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
