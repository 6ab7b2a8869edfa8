//! # suite-docs: Document Rendering for Streamline Suite
//!
//! Turns quotations and invoices into paginated PDF documents, either with one
//! of the five built-in templates or on a user-uploaded custom template.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Quotation / Invoice ──┐                                              │
//! │   CompanyDetails ───────┤                                              │
//! │                         ▼                                              │
//! │              ┌────────────────────┐     ┌──────────────────────────┐   │
//! │              │ service            │────►│ assets (async)           │   │
//! │              │ DocumentService    │     │ timeout + cancellation   │   │
//! │              └─────────┬──────────┘     └──────────────────────────┘   │
//! │                        │                                               │
//! │         ┌──────────────┴──────────────┐                                │
//! │         ▼                             ▼                                │
//! │  ┌─────────────┐              ┌──────────────┐                         │
//! │  │ renderer    │              │ custom       │ ── BindingReport        │
//! │  │ (built-in)  │              │ (uploaded)   │                         │
//! │  └──────┬──────┘              └──────┬───────┘                         │
//! │         │   table, metrics           │                                 │
//! │         └──────────────┬─────────────┘                                 │
//! │                        ▼                                               │
//! │                 ┌─────────────┐      ┌─────────┐     ┌──────────┐      │
//! │                 │ Surface     │─────►│ pdf     │────►│ export / │      │
//! │                 │ (mm, y down)│      │printpdf │     │ preview  │      │
//! │                 └─────────────┘      └─────────┘     └──────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Layout is synchronous and deterministic. The only async work is fetching
//! remote images and writing exports; a failed image never fails a render.
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use suite_core::money::Rate;
//! use suite_core::{CompanyDetails, Customer, LineItem, Quotation, TemplateKind, AccentColor};
//! use suite_docs::assets::AssetBundle;
//! use suite_docs::renderer;
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
//! let surface = renderer::render(
//!     &quotation,
//!     &CompanyDetails::default(),
//!     TemplateKind::Modern,
//!     AccentColor::Blue,
//!     &AssetBundle::default(),
//! )
//! .unwrap();
//!
//! assert!(surface.contains_text("$268.75"));
//! let pdf = suite_docs::pdf::write_pdf(&surface, "Quotation q-1").unwrap();
//! assert!(pdf.starts_with(b"%PDF"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod assets;
pub mod custom;
pub mod error;
pub mod metrics;
pub mod pdf;
pub mod preview;
pub mod renderer;
pub mod service;
pub mod surface;
pub mod table;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use assets::{AssetBundle, AssetFetch, AssetResolver, HttpImageFetcher, ImageFetcher};
pub use custom::{Binding, BindingRegistry, BindingReport};
pub use error::{DocError, DocResult};
pub use preview::{PreviewHandle, PreviewRegistry};
pub use service::{DocumentService, ExportedDocument, RenderedDocument};
pub use surface::Surface;
