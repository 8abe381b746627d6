//! Unified error handling for the dashboard.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::StoreError;
use crate::services::ActionError;

/// Application-level error type for the dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// An invoice form action failed. Already logged by the service.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Store operation failed outside an action (e.g. rendering a page).
    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(
            self,
            Self::Database(_) | Self::Template(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Dashboard request error"
            );
        }

        let status = match &self {
            Self::Action(ActionError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Action(ActionError::StoreFailure { .. })
            | Self::Database(_)
            | Self::Template(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Template(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::ValidationError;
    use crate::services::InvoiceAction;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("invoice inv-1".to_string());
        assert_eq!(err.to_string(), "Not found: invoice inv-1");

        let err = AppError::from(ActionError::StoreFailure {
            action: InvoiceAction::Delete,
            source: StoreError::Unavailable("pool closed".to_string()),
        });
        assert_eq!(err.to_string(), "Failed to delete invoice.");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Action(ActionError::InvalidInput(ValidationError {
                errors: Vec::new(),
            }))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Action(ActionError::StoreFailure {
                action: InvoiceAction::Create,
                source: StoreError::Unavailable("down".to_string()),
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
