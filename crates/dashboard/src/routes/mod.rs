//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//! GET    /health/ready                    - Readiness check (acquires a store connection)
//! GET    /                                - Redirect to the invoice list
//!
//! # Invoices
//! GET    /dashboard/invoices              - Invoice list (cached)
//! POST   /dashboard/invoices              - Create invoice, 303 to the list
//! GET    /dashboard/invoices/create       - Create form
//! GET    /dashboard/invoices/{id}/edit    - Edit form
//! POST   /dashboard/invoices/{id}         - Update invoice, 303 to the list
//! DELETE /dashboard/invoices/{id}         - Delete invoice, 204
//! POST   /dashboard/invoices/{id}/delete  - Delete invoice from an HTML form, renders the list
//! ```

pub mod invoices;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::services::INVOICES_PATH;
use crate::state::AppState;

/// Build the complete application router with request tracing.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .nest(INVOICES_PATH, invoice_routes())
}

/// Create the invoice routes router.
pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(invoices::index).post(invoices::create))
        .route("/create", get(invoices::create_page))
        .route("/{id}", post(invoices::update).delete(invoices::delete))
        .route("/{id}/edit", get(invoices::edit_page))
        .route("/{id}/delete", post(invoices::delete_from_list))
}

async fn root() -> Redirect {
    Redirect::to(INVOICES_PATH)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if no store connection can be acquired.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().connect().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
