//! Invoice form input and validation.
//!
//! Forms arrive as `application/x-www-form-urlencoded` with every field
//! optional at the wire level. [`InvoiceForm::validate`] turns the raw
//! strings into typed values or reports every field that is wrong.

use std::fmt;

use serde::Deserialize;

use ledger_core::{AmountError, Cents, CustomerId, InvoiceStatus};

// =============================================================================
// Form Inputs
// =============================================================================

/// Raw form data for creating or updating an invoice.
///
/// Unknown fields (such as `id` or `date`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceForm {
    #[serde(rename = "customerId")]
    pub customer_id: Option<String>,
    pub amount: Option<String>,
    pub status: Option<String>,
}

/// A form whose fields have all been checked and coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInvoiceForm {
    pub customer_id: CustomerId,
    /// Amount in cents, already rounded.
    pub amount: Cents,
    pub status: InvoiceStatus,
}

// =============================================================================
// Errors
// =============================================================================

/// A single offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the field (`customerId`, `amount`, `status`), or `form`
    /// when the body could not be read at all.
    pub field: &'static str,
    pub message: String,
}

/// Validation failure listing every offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Whether `field` is among the offending fields.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid fields: ")?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} ({})", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// =============================================================================
// Validation
// =============================================================================

impl InvoiceForm {
    /// Check and coerce every field.
    ///
    /// - `customerId` must be present and not blank. It is stored as given.
    /// - `amount` must read as a number; it is converted to cents.
    /// - `status` must be exactly `pending` or `paid`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` naming every field that failed.
    pub fn validate(&self) -> Result<ValidInvoiceForm, ValidationError> {
        let mut errors = Vec::new();

        let customer_id = match self.customer_id.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(CustomerId::new(raw)),
            _ => {
                errors.push(FieldError {
                    field: "customerId",
                    message: "customer is required".to_string(),
                });
                None
            }
        };

        let amount = match Cents::parse(self.amount.as_deref().unwrap_or_default()) {
            Ok(cents) => Some(cents),
            Err(e) => {
                errors.push(FieldError {
                    field: "amount",
                    message: amount_message(&e),
                });
                None
            }
        };

        let status = match self.status.as_deref().map(str::parse::<InvoiceStatus>) {
            Some(Ok(status)) => Some(status),
            Some(Err(e)) => {
                errors.push(FieldError {
                    field: "status",
                    message: e.to_string(),
                });
                None
            }
            None => {
                errors.push(FieldError {
                    field: "status",
                    message: "status is required".to_string(),
                });
                None
            }
        };

        match (customer_id, amount, status) {
            (Some(customer_id), Some(amount), Some(status)) if errors.is_empty() => {
                Ok(ValidInvoiceForm {
                    customer_id,
                    amount,
                    status,
                })
            }
            _ => Err(ValidationError { errors }),
        }
    }
}

fn amount_message(error: &AmountError) -> String {
    match error {
        AmountError::Empty => "amount is required".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(customer_id: &str, amount: &str, status: &str) -> InvoiceForm {
        InvoiceForm {
            customer_id: Some(customer_id.to_string()),
            amount: Some(amount.to_string()),
            status: Some(status.to_string()),
        }
    }

    #[test]
    fn test_valid_form() {
        let valid = form("c1", "12.50", "pending").validate().unwrap();
        assert_eq!(valid.customer_id, CustomerId::new("c1"));
        assert_eq!(valid.amount, Cents::new(1250));
        assert_eq!(valid.status, InvoiceStatus::Pending);
    }

    #[test]
    fn test_non_numeric_amount() {
        for amount in ["abc", "1_000", "NaN"] {
            let err = form("c1", amount, "pending").validate().unwrap_err();
            assert_eq!(err.errors.len(), 1);
            assert!(err.has_field("amount"), "{amount:?} should be rejected");
        }
    }

    #[test]
    fn test_status_must_match_exactly() {
        for status in ["Paid", "overdue", ""] {
            let err = form("c1", "1", status).validate().unwrap_err();
            assert!(err.has_field("status"), "{status:?} should be rejected");
        }
    }

    #[test]
    fn test_blank_customer_rejected() {
        let err = form("   ", "1", "paid").validate().unwrap_err();
        assert!(err.has_field("customerId"));
    }

    #[test]
    fn test_reports_every_offending_field() {
        let err = InvoiceForm::default().validate().unwrap_err();
        let fields: Vec<_> = err.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["customerId", "amount", "status"]);
        assert_eq!(
            err.to_string(),
            "invalid fields: customerId (customer is required), \
             amount (amount is required), status (status is required)"
        );
    }

    #[test]
    fn test_customer_id_kept_verbatim() {
        let valid = form(" c1 ", "0", "paid").validate().unwrap();
        assert_eq!(valid.customer_id.as_str(), " c1 ");
    }
}
