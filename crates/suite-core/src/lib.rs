//! # suite-core: Pure Business Logic for Streamline Suite
//!
//! Document types, the pricing/tax calculator, the template registry and
//! validation rules. Zero I/O, no logging.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Streamline Suite Documents                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   apps/cli (`suite` binary)                     │   │
//! │  │     totals, quote, render, convert, template, company          │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼─────────────┐  ┌─────────────▼──────────────────┐    │
//! │  │ suite-docs                 │  │ suite-store                    │    │
//! │  │ layout, assets, PDF,       │  │ AppState, KeyValueStore,       │    │
//! │  │ previews                   │  │ upload, config                 │    │
//! │  └──────────────┬─────────────┘  └─────────────┬──────────────────┘    │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────────────────▼──────────────────┐    │
//! │  │               ★ suite-core (THIS CRATE) ★                      │    │
//! │  │                                                                 │    │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────┐ │    │
//! │  │  │  types  │ │  money  │ │ pricing │ │templates │ │validation│ │    │
//! │  │  │ records │ │  Rate   │ │ convert │ │ layouts  │ │  rules   │ │    │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └──────────┘ └──────────┘ │    │
//! │  │                                                                 │    │
//! │  │        NO I/O • NO NETWORK • NO LOGGING • PURE FUNCTIONS       │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Quotation, Invoice, LineItem, CompanyDetails, CustomTemplate
//! - [`records`] - Inventory, expense and staff records
//! - [`money`] - Money and Rate
//! - [`pricing`] - Markup, VAT, withholding tax, profit, conversion
//! - [`templates`] - Built-in layouts, accent colours, default placeholders
//! - [`validation`] - Field and template validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use suite_core::money::Rate;
//! use suite_core::{Customer, LineItem, Quotation};
//!
//! let quotation = Quotation::new(
//!     "q-1",
//!     Customer::new("Tech Solutions", "123 Tech Avenue"),
//!     NaiveDate::from_ymd_opt(2024, 7, 28).unwrap(),
//!     vec![LineItem::priced("Widget", 2.0, 100.0, 25.0)],
//!     Rate::from_percent(7.5),
//!     Rate::from_percent(5.0),
//! );
//!
//! assert_eq!(quotation.subtotal.to_string(), "$250.00");
//! assert_eq!(quotation.vat.to_string(), "$18.75");
//! assert_eq!(quotation.total.to_string(), "$268.75");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod records;
pub mod templates;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Rate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// VAT applied to invoices when none is given.
pub const DEFAULT_INVOICE_VAT_RATE: f64 = 7.5;

/// VAT pre-filled on new quotations.
pub const DEFAULT_QUOTATION_VAT_RATE: f64 = 7.5;

/// Withholding tax pre-filled on new quotations.
pub const DEFAULT_WHT_RATE: f64 = 5.0;

/// Markup pre-filled on new quotation lines.
pub const DEFAULT_MARKUP_PERCENT: f64 = 10.0;

/// Days between an invoice's date and its due date.
pub const DEFAULT_DUE_DAYS: u32 = 30;
