//! # Error Types
//!
//! Domain-specific error types for suite-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  suite-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  suite-docs   └── DocError    - Rendering / export failures            │
//! │  suite-store  └── StoreError  - Persistence / upload failures          │
//! │  apps/cli     └── CliError    - What the terminal sees                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError/DocError → CliError    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A document is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Converting a quotation that has not been accepted
    /// - Marking an already paid invoice as paid
    #[error("{entity} {id} is {status}, cannot {operation}")]
    InvalidStatus {
        entity: &'static str,
        id: String,
        status: String,
        operation: &'static str,
    },

    /// Not enough stock on hand for a checkout.
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Custom template rejected by validation.
    ///
    /// Carries every problem found, in the order they were detected, so the
    /// upload form can list them all at once.
    #[error("Invalid template: {}", .errors.join("; "))]
    InvalidTemplate { errors: Vec<String> },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the boundary before records reach the store.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be a finite number.
    #[error("{field} must be a number")]
    NotANumber { field: String },

    /// Invalid format (e.g. bad hex colour, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. duplicate document id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidStatus {
            entity: "Quotation",
            id: "q-1".to_string(),
            status: "Draft".to_string(),
            operation: "convert to invoice",
        };
        assert_eq!(err.to_string(), "Quotation q-1 is Draft, cannot convert to invoice");

        let err = CoreError::InvalidTemplate {
            errors: vec!["Template name is required".into(), "Template file is required".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid template: Template name is required; Template file is required"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "description".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: description is required");
    }
}
