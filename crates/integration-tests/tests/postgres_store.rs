//! Integration tests for the `PostgreSQL` invoice store.
//!
//! These tests require a running `PostgreSQL` database. Set
//! `LEDGER_TEST_DATABASE_URL` and run with `--ignored`. Migrations are applied
//! on connect.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use ledger_core::{Cents, InvoiceId, InvoiceStatus};
use ledger_dashboard::cache::ViewCache;
use ledger_dashboard::db::{self, InvoiceStore, PgInvoiceStore};
use ledger_dashboard::forms::InvoiceForm;
use ledger_dashboard::services::{INVOICES_PATH, InvoiceService, Navigation};

async fn store() -> PgInvoiceStore {
    let url = std::env::var("LEDGER_TEST_DATABASE_URL")
        .expect("LEDGER_TEST_DATABASE_URL must be set for database tests");
    let pool = db::create_pool(&SecretString::from(url), 2)
        .await
        .expect("Failed to connect to test database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    PgInvoiceStore::new(pool)
}

fn form(customer_id: &str, amount: &str, status: &str) -> InvoiceForm {
    InvoiceForm {
        customer_id: Some(customer_id.to_string()),
        amount: Some(amount.to_string()),
        status: Some(status.to_string()),
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (LEDGER_TEST_DATABASE_URL)"]
async fn test_invoice_lifecycle() {
    let store = store().await;
    let cache = ViewCache::new(10, Duration::from_secs(60));
    let service = InvoiceService::new(Arc::new(store.clone()), cache.clone());
    let customer = format!("it-{}", uuid::Uuid::new_v4());

    // Create
    cache.insert(INVOICES_PATH, "stale").await;
    let created = service
        .create_invoice(&form(&customer, "12.345", "pending"))
        .await
        .unwrap();
    assert_eq!(created.navigation, Navigation::Redirect(INVOICES_PATH));
    assert!(!cache.contains(INVOICES_PATH));

    let mut conn = store.connect().await.unwrap();
    let row = conn.get(&created.invoice_id).await.unwrap().unwrap();
    assert_eq!(row.customer_id.as_str(), customer);
    assert_eq!(row.amount, Cents::new(1235));
    assert_eq!(row.status, InvoiceStatus::Pending);
    assert_eq!(row.date, chrono::Utc::now().date_naive());
    drop(conn);

    // Update
    service
        .update_invoice(&created.invoice_id, &form(&customer, "20", "paid"))
        .await
        .unwrap();

    let mut conn = store.connect().await.unwrap();
    let updated = conn.get(&created.invoice_id).await.unwrap().unwrap();
    assert_eq!(updated.amount, Cents::new(2000));
    assert_eq!(updated.status, InvoiceStatus::Paid);
    assert_eq!(updated.date, row.date);
    drop(conn);

    // Delete
    let deleted = service.delete_invoice(&created.invoice_id).await.unwrap();
    assert_eq!(deleted.navigation, Navigation::Stay);

    let mut conn = store.connect().await.unwrap();
    assert!(conn.get(&created.invoice_id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (LEDGER_TEST_DATABASE_URL)"]
async fn test_missing_ids_affect_no_rows() {
    let store = store().await;
    let mut conn = store.connect().await.unwrap();
    let missing = InvoiceId::new("nonexistent-id");

    assert_eq!(conn.delete(&missing).await.unwrap(), 0);
    assert!(conn.get(&missing).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (LEDGER_TEST_DATABASE_URL)"]
async fn test_status_check_constraint() {
    let store = store().await;

    let result = sqlx::query(
        "INSERT INTO invoices (customer_id, amount, status, date) VALUES ('c', 1, 'overdue', CURRENT_DATE)",
    )
    .execute(store.pool())
    .await;

    assert!(result.is_err());
}
