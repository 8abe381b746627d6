//! Invoice route handlers.
//!
//! Pages are server-rendered. The list page is cached under
//! [`INVOICES_PATH`] and evicted by every mutation.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::instrument;

use ledger_core::{InvoiceId, InvoiceStatus};

use crate::error::AppError;
use crate::forms::{FieldError, InvoiceForm, ValidationError};
use crate::models::Invoice;
use crate::services::{ActionError, INVOICES_PATH, Navigation};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Invoice display data for templates.
#[derive(Debug, Clone)]
pub struct InvoiceView {
    pub id: String,
    pub customer_id: String,
    /// Formatted for display, e.g. `$12.50`.
    pub amount: String,
    /// Major units for form inputs, e.g. `12.50`.
    pub amount_input: String,
    pub status: &'static str,
    /// `YYYY-MM-DD`.
    pub date: String,
}

impl From<&Invoice> for InvoiceView {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id.to_string(),
            customer_id: invoice.customer_id.to_string(),
            amount: invoice.amount.to_string(),
            amount_input: invoice.amount.to_major_units().to_string(),
            status: invoice.status.as_str(),
            date: invoice.date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// An entry in the status `<select>`.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub selected: bool,
}

fn status_options(current: InvoiceStatus) -> Vec<StatusOption> {
    InvoiceStatus::ALL
        .iter()
        .map(|status| StatusOption {
            value: status.as_str(),
            selected: *status == current,
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template)]
#[template(path = "invoices/index.html")]
pub struct InvoicesIndexTemplate {
    pub invoices: Vec<InvoiceView>,
}

#[derive(Template)]
#[template(path = "invoices/create.html")]
pub struct CreateInvoiceTemplate {
    pub statuses: Vec<StatusOption>,
}

#[derive(Template)]
#[template(path = "invoices/edit.html")]
pub struct EditInvoiceTemplate {
    pub invoice: InvoiceView,
    pub statuses: Vec<StatusOption>,
}

// =============================================================================
// Navigation
// =============================================================================

impl IntoResponse for Navigation {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(path) => Redirect::to(path).into_response(),
            Self::Stay => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

// =============================================================================
// Pages
// =============================================================================

/// Invoice list page, served from the view cache when possible.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    if let Some(html) = state.cache().get(INVOICES_PATH).await {
        tracing::debug!("Serving cached invoice list");
        return Ok(Html(html.to_string()));
    }

    let generation = state.cache().generation();

    let mut conn = state.store().connect().await?;
    let invoices = conn.list().await?;
    drop(conn);

    let html = InvoicesIndexTemplate {
        invoices: invoices.iter().map(InvoiceView::from).collect(),
    }
    .render()?;

    state
        .cache()
        .insert_if_current(INVOICES_PATH, generation, html.as_str())
        .await;
    Ok(Html(html))
}

/// Create invoice form.
#[instrument(skip_all)]
pub async fn create_page() -> Result<Html<String>, AppError> {
    let template = CreateInvoiceTemplate {
        statuses: status_options(InvoiceStatus::default()),
    };
    Ok(Html(template.render()?))
}

/// Edit invoice form.
#[instrument(skip_all)]
pub async fn edit_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = InvoiceId::new(id);

    let mut conn = state.store().connect().await?;
    let invoice = conn.get(&id).await?;
    drop(conn);

    let invoice = invoice.ok_or_else(|| AppError::NotFound(format!("invoice {id}")))?;
    let template = EditInvoiceTemplate {
        statuses: status_options(invoice.status),
        invoice: InvoiceView::from(&invoice),
    };
    Ok(Html(template.render()?))
}

// =============================================================================
// Actions
// =============================================================================

/// A body that could not be read as a form is invalid input, like any other
/// bad field.
fn read_form(form: Result<Form<InvoiceForm>, FormRejection>) -> Result<InvoiceForm, AppError> {
    form.map(|Form(form)| form).map_err(|rejection| {
        tracing::warn!(error = %rejection, "Unreadable invoice form");
        ActionError::InvalidInput(ValidationError {
            errors: vec![FieldError {
                field: "form",
                message: rejection.body_text(),
            }],
        })
        .into()
    })
}

/// Create an invoice, then redirect to the list.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    form: Result<Form<InvoiceForm>, FormRejection>,
) -> Result<Navigation, AppError> {
    let form = read_form(form)?;
    let outcome = state.invoices().create_invoice(&form).await?;
    Ok(outcome.navigation)
}

/// Update an invoice, then redirect to the list.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<InvoiceForm>, FormRejection>,
) -> Result<Navigation, AppError> {
    let form = read_form(form)?;
    let outcome = state
        .invoices()
        .update_invoice(&InvoiceId::new(id), &form)
        .await?;
    Ok(outcome.navigation)
}

/// Delete an invoice. Responds `204 No Content`.
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Navigation, AppError> {
    let outcome = state.invoices().delete_invoice(&InvoiceId::new(id)).await?;
    Ok(outcome.navigation)
}

/// Delete an invoice from the list page's form. Responds with the list,
/// rendered after the deletion, instead of `204`.
#[instrument(skip_all)]
pub async fn delete_from_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    state.invoices().delete_invoice(&InvoiceId::new(id)).await?;
    index(State(state)).await
}
