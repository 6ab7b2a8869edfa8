//! # Commands Module
//!
//! Every subcommand of the `suite` binary.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (CommandOutput)
//! ├── documents.rs  ◄─── totals, render, preview, convert
//! ├── quote.rs      ◄─── draft a quotation from cost lines
//! ├── template.rs   ◄─── template catalog | add | list | validate | remove
//! ├── inventory.rs  ◄─── inventory list | checkout | return
//! └── company.rs    ◄─── company show | set | import | reset
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  suite render inv-2024-001 --template modern                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  handler(&mut Session, args) -> CliResult<XxxResponse>                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  CommandOutput ── Display ──► plain text on stdout                      │
//! │                └─ Serialize ─► JSON on stdout (--json)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod company;
pub mod documents;
pub mod inventory;
pub mod quote;
pub mod template;

use std::fmt;

use serde::Serialize;

use company::CompanyResponse;
use documents::{ConvertResponse, PreviewResponse, RenderResponse, TotalsResponse};
use inventory::InventoryResponse;
use quote::QuoteResponse;
use template::{CatalogResponse, TemplateListResponse, TemplateResponse, ValidationResponse};

/// What a command produced.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Totals(TotalsResponse),
    Render(RenderResponse),
    Preview(PreviewResponse),
    Convert(ConvertResponse),
    Quote(QuoteResponse),
    Template(TemplateResponse),
    Templates(TemplateListResponse),
    Validation(ValidationResponse),
    Catalog(CatalogResponse),
    Inventory(InventoryResponse),
    Company(CompanyResponse),
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutput::Totals(r) => r.fmt(f),
            CommandOutput::Render(r) => r.fmt(f),
            CommandOutput::Preview(r) => r.fmt(f),
            CommandOutput::Convert(r) => r.fmt(f),
            CommandOutput::Quote(r) => r.fmt(f),
            CommandOutput::Template(r) => r.fmt(f),
            CommandOutput::Templates(r) => r.fmt(f),
            CommandOutput::Validation(r) => r.fmt(f),
            CommandOutput::Catalog(r) => r.fmt(f),
            CommandOutput::Inventory(r) => r.fmt(f),
            CommandOutput::Company(r) => r.fmt(f),
        }
    }
}
