//! # Validation Module
//!
//! Input validation for documents and uploaded templates.
//!
//! ## Two Styles
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Field validators          validate_customer, validate_line_item, ...  │
//! │  └── fail fast with a typed ValidationError                            │
//! │                                                                         │
//! │  Template validation       validate_custom_template                    │
//! │  └── collects EVERY problem as a human-readable string so the upload   │
//! │      form can show them together; saving is refused while any remain  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use suite_core::validation::validate_document_id;
//!
//! assert!(validate_document_id("inv-2024-001").is_ok());
//! assert!(validate_document_id("   ").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{BillingDocument, Customer, CustomTemplate, Dimensions, LineItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Placeholder ids every custom template must contain.
pub const REQUIRED_PLACEHOLDERS: [&str; 4] =
    ["companyName", "documentNumber", "customerName", "total"];

/// Smallest legible font size, in points.
pub const MIN_FONT_SIZE: f64 = 6.0;

/// Smallest page width or height of a custom template, in points.
pub const MIN_TEMPLATE_SIDE: f64 = 144.0;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a document id.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, digits, `-` and `_` only (it ends up in a file name)
pub fn validate_document_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: 64,
        });
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: "id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates the bill-to party.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    if customer.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }
    Ok(())
}

/// Validates a line item before it is stored.
///
/// ## Rules
/// - Description must not be empty
/// - Quantity, prices and markup must be finite and not negative
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    if item.description.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    let mut numbers = vec![
        ("quantity", item.quantity),
        ("unit price", item.unit_price.amount()),
    ];
    if let Some(cost) = item.cost_price {
        numbers.push(("cost price", cost.amount()));
    }
    if let Some(markup) = item.markup_percent {
        numbers.push(("markup", markup));
    }

    for (field, value) in numbers {
        validate_amount(field, value)?;
    }

    Ok(())
}

/// A finite number that is not negative.
pub fn validate_amount(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotANumber {
            field: field.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a quotation or invoice read from outside the application.
///
/// Stops at the first problem. Totals are not checked; they are recalculated.
pub fn validate_document(document: &dyn BillingDocument) -> ValidationResult<()> {
    validate_document_id(document.id())?;
    validate_customer(document.customer())?;
    for item in document.items() {
        validate_line_item(item)?;
    }
    validate_amount("VAT rate", document.vat_rate().percent())
}

// =============================================================================
// Custom Templates
// =============================================================================

/// Checks an uploaded template and returns every problem found.
///
/// An empty list means the template is valid.
///
/// ## Rules
/// - Non-empty name and template file
/// - Page width and height finite and at least [`MIN_TEMPLATE_SIDE`]
/// - At least one placeholder
/// - All of [`REQUIRED_PLACEHOLDERS`] present
/// - Every placeholder at a non-negative position
/// - Any set font size at least [`MIN_FONT_SIZE`] (an unset or zero size falls
///   back to the default and is not checked)
pub fn validate_custom_template(template: &CustomTemplate) -> Vec<String> {
    let mut errors = Vec::new();

    if template.name.trim().is_empty() {
        errors.push("Template name is required".to_string());
    }

    if template.template_file.is_empty() {
        errors.push("Template file is required".to_string());
    }

    let Dimensions { width, height } = template.dimensions;
    if ![width, height].iter().all(|side| side.is_finite() && *side >= MIN_TEMPLATE_SIDE) {
        errors.push(format!(
            "Invalid template dimensions {}x{}: each side must be at least {}pt",
            width, height, MIN_TEMPLATE_SIDE
        ));
    }

    if template.placeholders.is_empty() {
        errors.push("At least one placeholder is required".to_string());
    }

    let missing: Vec<&str> = REQUIRED_PLACEHOLDERS
        .iter()
        .copied()
        .filter(|required| !template.placeholders.iter().any(|p| p.id == *required))
        .collect();
    if !missing.is_empty() {
        errors.push(format!("Missing required placeholders: {}", missing.join(", ")));
    }

    for placeholder in &template.placeholders {
        if placeholder.x < 0.0 || placeholder.y < 0.0 {
            errors.push(format!("Invalid position for placeholder {}", placeholder.id));
        }
        if let Some(size) = placeholder.font_size {
            if size != 0.0 && size < MIN_FONT_SIZE {
                errors.push(format!("Font size too small for placeholder {}", placeholder.id));
            }
        }
    }

    errors
}

// =============================================================================
// Unit Tests
// =============================================================================
