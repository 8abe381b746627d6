//! Router-level tests for the invoice dashboard.
//!
//! Requests go through the full axum router (routing, form extraction,
//! error mapping) against an in-memory store. No database or server needed.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use chrono::NaiveDate;
use tower::ServiceExt;

use ledger_core::{Cents, CustomerId, InvoiceId, InvoiceStatus};
use ledger_dashboard::cache::ViewCache;
use ledger_dashboard::db::InvoiceStore;
use ledger_dashboard::models::Invoice;
use ledger_dashboard::routes;
use ledger_dashboard::services::{INVOICES_PATH, InvoiceService};
use ledger_dashboard::state::AppState;
use ledger_integration_tests::MemoryInvoiceStore;

// ============================================================================
// Helpers
// ============================================================================

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
}

struct TestApp {
    router: Router,
    store: MemoryInvoiceStore,
    cache: ViewCache,
}

impl TestApp {
    fn new() -> Self {
        let store = MemoryInvoiceStore::new();
        let cache = ViewCache::new(100, Duration::from_secs(300));
        let shared: Arc<dyn InvoiceStore> = Arc::new(store.clone());
        let service =
            InvoiceService::new(Arc::clone(&shared), cache.clone()).with_clock(fixed_today);
        let router = routes::app(AppState::with_service(shared, cache.clone(), service));

        Self {
            router,
            store,
            cache,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&self, uri: &str, body: &'static str) -> Response {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    async fn delete(&self, uri: &str) -> Response {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    fn assert_connections_balanced(&self) {
        assert_eq!(self.store.acquired(), self.store.released());
    }
}

fn seeded_invoice() -> Invoice {
    Invoice {
        id: InvoiceId::new("inv-1"),
        customer_id: CustomerId::new("c1"),
        amount: Cents::new(5000),
        status: InvoiceStatus::Pending,
        date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
    }
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_stores_cents_and_redirects() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/dashboard/invoices",
            "customerId=c1&amount=12.50&status=pending",
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), INVOICES_PATH);

    assert_eq!(app.store.len(), 1);
    let listed = app.get("/dashboard/invoices").await;
    let html = body_text(listed).await;
    assert!(html.contains("$12.50"));
    assert!(html.contains("2024-03-09"));
    app.assert_connections_balanced();
}

#[tokio::test]
async fn test_create_rejects_non_numeric_amount() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/dashboard/invoices",
            "customerId=c1&amount=abc&status=pending",
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Invalid form data.");
    assert!(app.store.is_empty());
    assert_eq!(app.store.acquired(), 1);
    app.assert_connections_balanced();
}

#[tokio::test]
async fn test_create_rejects_missing_fields() {
    let app = TestApp::new();

    let response = app.post_form("/dashboard/invoices", "amount=10").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_create_without_form_content_type_is_invalid_input() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::post("/dashboard/invoices")
                .body(Body::from("customerId=c1&amount=1&status=paid"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Invalid form data.");
    assert!(app.store.is_empty());
    assert_eq!(app.store.acquired(), 0);
}

#[tokio::test]
async fn test_update_with_duplicate_fields_is_invalid_input() {
    let app = TestApp::new();
    app.store.seed(seeded_invoice());

    let response = app
        .post_form(
            "/dashboard/invoices/inv-1",
            "customerId=c2&customerId=c3&amount=1&status=paid",
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Invalid form data.");
    assert_eq!(app.store.row("inv-1").unwrap(), seeded_invoice());
}

#[tokio::test]
async fn test_create_with_store_offline_is_opaque() {
    let app = TestApp::new();
    app.store.set_offline(true);

    let response = app
        .post_form("/dashboard/invoices", "customerId=c1&amount=1&status=paid")
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Invalid form data.");
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_changes_fields_but_not_date() {
    let app = TestApp::new();
    app.store.seed(seeded_invoice());

    let response = app
        .post_form(
            "/dashboard/invoices/inv-1",
            "customerId=c2&amount=0.99&status=paid&date=2030-01-01",
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), INVOICES_PATH);

    let row = app.store.row("inv-1").unwrap();
    assert_eq!(row.id, InvoiceId::new("inv-1"));
    assert_eq!(row.customer_id, CustomerId::new("c2"));
    assert_eq!(row.amount, Cents::new(99));
    assert_eq!(row.status, InvoiceStatus::Paid);
    assert_eq!(row.date, seeded_invoice().date);
    app.assert_connections_balanced();
}

#[tokio::test]
async fn test_update_rejects_status_case_mismatch() {
    let app = TestApp::new();
    app.store.seed(seeded_invoice());

    let response = app
        .post_form(
            "/dashboard/invoices/inv-1",
            "customerId=c2&amount=1&status=Paid",
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.row("inv-1").unwrap(), seeded_invoice());
    app.assert_connections_balanced();
}

#[tokio::test]
async fn test_update_unknown_id_still_redirects() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/dashboard/invoices/missing",
            "customerId=c1&amount=1&status=paid",
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.store.is_empty());
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_removes_row_without_redirect() {
    let app = TestApp::new();
    app.store.seed(seeded_invoice());

    let response = app.delete("/dashboard/invoices/inv-1").await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert!(app.store.is_empty());
    app.assert_connections_balanced();
}

#[tokio::test]
async fn test_delete_via_html_form_renders_list_without_row() {
    let app = TestApp::new();
    app.store.seed(seeded_invoice());
    let before = body_text(app.get("/dashboard/invoices").await).await;
    assert!(before.contains("$50.00"));

    let response = app.post_form("/dashboard/invoices/inv-1/delete", "").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("No invoices yet."));
    assert!(!html.contains("$50.00"));
    assert!(app.store.is_empty());
    app.assert_connections_balanced();
}

#[tokio::test]
async fn test_delete_nonexistent_id_revalidates_list() {
    let app = TestApp::new();
    app.cache.insert(INVOICES_PATH, "stale").await;

    let response = app.delete("/dashboard/invoices/nonexistent-id").await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!app.cache.contains(INVOICES_PATH));
}

#[tokio::test]
async fn test_delete_with_store_offline() {
    let app = TestApp::new();
    app.store.set_offline(true);

    let response = app.delete("/dashboard/invoices/inv-1").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Failed to delete invoice.");
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
async fn test_list_is_cached_until_a_mutation() {
    let app = TestApp::new();

    let first = body_text(app.get("/dashboard/invoices").await).await;
    assert!(first.contains("No invoices yet."));
    assert!(app.cache.contains(INVOICES_PATH));

    // A direct write is invisible until something revalidates.
    app.store.seed(seeded_invoice());
    let cached = body_text(app.get("/dashboard/invoices").await).await;
    assert_eq!(cached, first);

    let created = app
        .post_form("/dashboard/invoices", "customerId=c9&amount=7&status=paid")
        .await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert!(!app.cache.contains(INVOICES_PATH));

    let fresh = body_text(app.get("/dashboard/invoices").await).await;
    assert!(fresh.contains("$50.00"));
    assert!(fresh.contains("$7.00"));
}

#[tokio::test]
async fn test_create_during_list_render_is_visible_on_next_read() {
    let app = TestApp::new();
    let mut pause = app.store.pause_next_list();

    let router = app.router.clone();
    let reading = tokio::spawn(async move {
        router
            .oneshot(Request::get("/dashboard/invoices").body(Body::empty()).unwrap())
            .await
            .unwrap()
    });
    pause.wait_until_listed().await;

    let created = app
        .post_form("/dashboard/invoices", "customerId=c9&amount=7&status=paid")
        .await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);

    pause.resume();
    let old = body_text(reading.await.unwrap()).await;
    assert!(old.contains("No invoices yet."));
    assert!(!app.cache.contains(INVOICES_PATH));

    let fresh = body_text(app.get("/dashboard/invoices").await).await;
    assert!(fresh.contains("$7.00"));
    app.assert_connections_balanced();
}

#[tokio::test]
async fn test_edit_page() {
    let app = TestApp::new();
    app.store.seed(seeded_invoice());

    let response = app.get("/dashboard/invoices/inv-1/edit").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"action="/dashboard/invoices/inv-1""#));
    assert!(html.contains(r#"value="50.00""#));

    let missing = app.get("/dashboard/invoices/nope/edit").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_page() {
    let app = TestApp::new();

    let response = app.get("/dashboard/invoices/create").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"name="customerId""#));
    assert!(html.contains(r#"<option value="pending" selected>"#));
}

#[tokio::test]
async fn test_root_redirects_to_invoices() {
    let app = TestApp::new();

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), INVOICES_PATH);
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new();

    let health = app.get("/health").await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_text(health).await, "ok");

    assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);

    app.store.set_offline(true);
    assert_eq!(
        app.get("/health/ready").await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    app.assert_connections_balanced();
}
