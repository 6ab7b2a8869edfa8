//! # Document Commands
//!
//! Totals, PDF export, previews and quotation conversion.
//!
//! ## Document Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌───────────┐  convert   ┌───────────┐  render   ┌──────────────────┐  │
//! │  │ Quotation │──────────► │  Invoice  │─────────► │ Invoice-<id>.pdf │  │
//! │  │ (Accepted)│            │  (Draft)  │           └──────────────────┘  │
//! │  └─────┬─────┘            └─────┬─────┘                                 │
//! │        │ totals / render / preview (any status)                         │
//! │        ▼                        ▼                                       │
//! │   subtotal, VAT, total, WHT profit estimate                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Style flags (`--template`, `--accent`, `--custom-template`) restyle the
//! session copy only.

use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use suite_core::money::{Money, Rate};
use suite_core::types::{
    AccentColor, BillingDocument, DocumentKind, Invoice, LineItem, Quotation, TemplateKind,
};
use suite_docs::custom::{BackgroundStatus, BindingReport};
use suite_store::AppState;
use tracing::{debug, info};

use crate::error::{CliError, CliResult};
use crate::session::Session;

// =============================================================================
// Arguments
// =============================================================================

/// Overrides for how a document is styled.
#[derive(Debug, Clone, Default, Args)]
pub struct StyleArgs {
    /// Built-in template: classic, modern, minimalist, corporate, creative
    #[arg(long)]
    pub template: Option<TemplateKind>,

    /// Accent colour: teal, blue, crimson, slate
    #[arg(long)]
    pub accent: Option<AccentColor>,

    /// Render on an uploaded custom template
    #[arg(long, value_name = "TEMPLATE_ID")]
    pub custom_template: Option<String>,
}

impl StyleArgs {
    pub fn apply(
        &self,
        template: &mut TemplateKind,
        accent: &mut AccentColor,
        custom_id: &mut Option<String>,
    ) {
        if let Some(kind) = self.template {
            *template = kind;
        }
        if let Some(color) = self.accent {
            *accent = color;
        }
        if let Some(id) = &self.custom_template {
            *template = TemplateKind::Custom;
            *custom_id = Some(id.clone());
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Quotation or invoice id
    pub id: String,

    #[command(flatten)]
    pub style: StyleArgs,
}

#[derive(Debug, Clone, Args)]
pub struct PreviewArgs {
    /// Quotation or invoice id
    pub id: String,

    #[command(flatten)]
    pub style: StyleArgs,

    /// Also write the laid-out page operations as JSON
    #[arg(long, value_name = "FILE")]
    pub dump_surface: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Id of an accepted quotation
    pub quotation_id: String,

    /// Export the new invoice as PDF
    #[arg(long)]
    pub render: bool,
}

// =============================================================================
// Document Lookup
// =============================================================================

/// A session copy of a quotation or invoice.
#[derive(Debug, Clone)]
pub enum DocumentRecord {
    Quotation(Quotation),
    Invoice(Invoice),
}

impl DocumentRecord {
    pub fn find(state: &AppState, id: &str) -> CliResult<Self> {
        if let Ok(quotation) = state.quotations.get(id) {
            return Ok(DocumentRecord::Quotation(quotation.clone()));
        }
        if let Ok(invoice) = state.invoices.get(id) {
            return Ok(DocumentRecord::Invoice(invoice.clone()));
        }
        Err(CliError::not_found("Quotation or invoice", id))
    }

    pub fn as_document(&self) -> &dyn BillingDocument {
        match self {
            DocumentRecord::Quotation(q) => q,
            DocumentRecord::Invoice(i) => i,
        }
    }

    /// Applies style overrides. A custom template id implies `custom`.
    pub fn restyle(&mut self, style: &StyleArgs) {
        match self {
            DocumentRecord::Quotation(q) => {
                style.apply(&mut q.template, &mut q.accent_color, &mut q.custom_template_id)
            }
            DocumentRecord::Invoice(i) => {
                style.apply(&mut i.template, &mut i.accent_color, &mut i.custom_template_id)
            }
        }
    }

    fn status(&self) -> String {
        match self {
            DocumentRecord::Quotation(q) => format!("{:?}", q.status),
            DocumentRecord::Invoice(i) => format!("{:?}", i.status),
        }
    }
}

fn styled(session: &Session, id: &str, style: &StyleArgs) -> CliResult<DocumentRecord> {
    let mut record = DocumentRecord::find(&session.state, id)?;
    record.restyle(style);
    let doc = record.as_document();
    debug!(
        id,
        template = %doc.template(),
        accent = doc.accent_color().as_str(),
        "Document styled"
    );
    Ok(record)
}

// =============================================================================
// totals
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub description: String,
    pub quantity: f64,
    pub unit_price: Money,
    pub total: Money,
}

impl From<&LineItem> for LineView {
    fn from(item: &LineItem) -> Self {
        LineView {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total: item.line_total(),
        }
    }
}

/// Computed figures for one document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsResponse {
    pub id: String,
    pub kind: DocumentKind,
    pub customer: String,
    pub status: String,
    pub items: Vec<LineView>,
    pub vat_rate: Rate,
    pub subtotal: Money,
    pub vat: Money,
    pub total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wht_rate: Option<Rate>,
    /// Estimated profit after withholding tax (quotations only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit: Option<Money>,
}

impl fmt::Display for TotalsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} ({}) for {}", self.kind.label(), self.id, self.status, self.customer)?;
        for line in &self.items {
            writeln!(
                f,
                "  {} x {} @ {} = {}",
                line.quantity, line.description, line.unit_price, line.total
            )?;
        }
        writeln!(f, "{:<18}{:>14}", "Subtotal:", self.subtotal.to_string())?;
        writeln!(f, "{:<18}{:>14}", format!("VAT ({}%):", self.vat_rate), self.vat.to_string())?;
        write!(f, "{:<18}{:>14}", "Total:", self.total.to_string())?;
        if let Some(due) = self.due_date {
            write!(f, "\nDue date: {}", due.format("%Y-%m-%d"))?;
        }
        if let (Some(wht), Some(profit)) = (self.wht_rate, self.profit) {
            write!(f, "\nEstimated profit after {}% WHT: {}", wht, profit)?;
        }
        Ok(())
    }
}

pub fn totals(session: &Session, id: &str) -> CliResult<TotalsResponse> {
    let record = DocumentRecord::find(&session.state, id)?;
    let status = record.status();
    let doc = record.as_document();

    let (wht_rate, profit) = match &record {
        DocumentRecord::Quotation(q) => (Some(q.wht_rate), Some(q.profit())),
        DocumentRecord::Invoice(_) => (None, None),
    };

    Ok(TotalsResponse {
        id: doc.id().to_string(),
        kind: doc.kind(),
        customer: doc.customer().name.clone(),
        status,
        items: doc.items().iter().map(LineView::from).collect(),
        vat_rate: doc.vat_rate(),
        subtotal: doc.subtotal(),
        vat: doc.vat(),
        total: doc.total(),
        due_date: doc.due_date(),
        wht_rate,
        profit,
    })
}

// =============================================================================
// render
// =============================================================================

/// Result of a PDF export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub path: PathBuf,
    pub pages: usize,
    pub bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<BindingReport>,
}

impl fmt::Display for RenderResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exported {} ({} page{}, {} bytes)",
            self.path.display(),
            self.pages,
            if self.pages == 1 { "" } else { "s" },
            self.bytes
        )?;
        if let Some(report) = &self.report {
            write_report(f, report)?;
        }
        Ok(())
    }
}

fn write_report(f: &mut fmt::Formatter<'_>, report: &BindingReport) -> fmt::Result {
    if report.is_clean() {
        return write!(f, "\nAll placeholders rendered");
    }
    if !report.unbound.is_empty() {
        write!(f, "\nUnbound placeholders: {}", report.unbound.join(", "))?;
    }
    if !report.unresolved.is_empty() {
        write!(f, "\nUnknown placeholders (not drawn): {}", report.unresolved.join(", "))?;
    }
    if !report.missing_assets.is_empty() {
        write!(f, "\nImages not loaded: {}", report.missing_assets.join(", "))?;
    }
    if let BackgroundStatus::Skipped(reason) = &report.background {
        write!(f, "\nBackground not drawn: {}", reason)?;
    }
    Ok(())
}

pub async fn render(session: &Session, args: &RenderArgs) -> CliResult<RenderResponse> {
    let record = styled(session, &args.id, &args.style)?;
    let exported = session
        .documents
        .export_pdf(record.as_document(), session.state.company.details(), &session.cancel)
        .await?;

    Ok(RenderResponse {
        path: exported.path,
        pages: exported.pages,
        bytes: exported.bytes,
        report: exported.report,
    })
}

// =============================================================================
// preview
// =============================================================================

/// A rendered preview, inspected and then released.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub url: String,
    pub file_name: String,
    pub pages: usize,
    pub bytes: usize,
    /// Text drawn on the pages, in drawing order.
    pub text: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_dump: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<BindingReport>,
    /// No preview buffers remain after the handle closed.
    pub released: bool,
}

impl fmt::Display for PreviewResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}, {} pages, {} bytes)", self.file_name, self.url, self.pages, self.bytes)?;
        for line in &self.text {
            writeln!(f, "  {}", line)?;
        }
        if let Some(path) = &self.surface_dump {
            write!(f, "Surface written to {}", path.display())?;
        }
        if let Some(report) = &self.report {
            write_report(f, report)?;
        }
        Ok(())
    }
}

pub async fn preview(session: &Session, args: &PreviewArgs) -> CliResult<PreviewResponse> {
    let record = styled(session, &args.id, &args.style)?;
    let (rendered, pdf) = session
        .documents
        .render_pdf(record.as_document(), session.state.company.details(), &session.cancel)
        .await?;

    if let Some(path) = &args.dump_surface {
        tokio::fs::write(path, serde_json::to_vec_pretty(&rendered.surface)?).await?;
        info!(path = %path.display(), "Surface written");
    }

    let handle = session.documents.previews().open(pdf, rendered.file_name.clone());
    let bytes = handle.bytes()?.len();
    let url = handle.url();
    handle.close();

    Ok(PreviewResponse {
        url,
        file_name: rendered.file_name,
        pages: rendered.surface.page_count(),
        bytes,
        text: rendered.surface.text_content(),
        surface_dump: args.dump_surface.clone(),
        report: rendered.report,
        released: session.documents.previews().is_empty(),
    })
}

// =============================================================================
// convert
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub quotation_id: String,
    pub invoice_id: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported: Option<RenderResponse>,
}

impl fmt::Display for ConvertResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quotation {} converted to invoice {} (total {}, due {})",
            self.quotation_id,
            self.invoice_id,
            self.total,
            self.due_date.format("%Y-%m-%d")
        )?;
        if let Some(exported) = &self.exported {
            write!(f, "\n{}", exported)?;
        }
        Ok(())
    }
}

pub async fn convert(session: &mut Session, args: &ConvertArgs) -> CliResult<ConvertResponse> {
    let due_days = session.config.documents.invoice_due_days;
    let invoice = session
        .state
        .convert_quotation(&args.quotation_id, Utc::now(), due_days)?
        .clone();

    let exported = if args.render {
        let exported = session
            .documents
            .export_pdf(&invoice, session.state.company.details(), &session.cancel)
            .await?;
        Some(RenderResponse {
            path: exported.path,
            pages: exported.pages,
            bytes: exported.bytes,
            report: exported.report,
        })
    } else {
        None
    };

    Ok(ConvertResponse {
        quotation_id: args.quotation_id.clone(),
        invoice_id: invoice.id,
        date: invoice.date,
        due_date: invoice.due_date,
        total: invoice.total,
        exported,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionOptions;

    async fn session(dir: &std::path::Path) -> Session {
        Session::open(SessionOptions {
            output_dir: Some(dir.to_path_buf()),
            offline: true,
            ephemeral: true,
            ..SessionOptions::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_quotation_totals_include_profit() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path()).await;

        let quotation = totals(&session, "q-2024-001").unwrap();
        assert_eq!(quotation.total.to_string(), "$4703.13");
        assert!(quotation.profit.is_some());
        assert!(quotation.to_string().contains("VAT (7.5%):"));

        let invoice = totals(&session, "inv-2024-001").unwrap();
        assert!(invoice.profit.is_none());
        assert!(invoice.to_string().contains("Due date: 2024-08-28"));
    }

    #[tokio::test]
    async fn test_render_with_style_override() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path()).await;

        let args = RenderArgs {
            id: "inv-2024-003".to_string(),
            style: StyleArgs {
                template: Some(TemplateKind::Corporate),
                accent: Some(AccentColor::Crimson),
                custom_template: None,
            },
        };
        let response = render(&session, &args).await.unwrap();
        assert_eq!(response.path, dir.path().join("Invoice-inv-2024-003.pdf"));
        assert!(response.path.exists());
        assert!(response.report.is_none());
    }

    #[tokio::test]
    async fn test_render_missing_custom_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path()).await;

        let args = RenderArgs {
            id: "q-2024-001".to_string(),
            style: StyleArgs {
                custom_template: Some("custom_404".to_string()),
                ..StyleArgs::default()
            },
        };
        let err = render(&session, &args).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::TemplateNotFound);
        assert!(!dir.path().join("Quotation-q-2024-001.pdf").exists());
    }

    #[tokio::test]
    async fn test_preview_releases_buffer_and_dumps_surface() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path()).await;
        let dump = dir.path().join("surface.json");

        let args = PreviewArgs {
            id: "q-2024-002".to_string(),
            style: StyleArgs::default(),
            dump_surface: Some(dump.clone()),
        };
        let response = preview(&session, &args).await.unwrap();

        assert!(response.released);
        assert!(response.url.starts_with("preview://"));
        assert!(response.text.iter().any(|t| t.contains("$4300.00")));
        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&dump).unwrap()).unwrap();
        assert!(json["pages"].is_array());
    }

    #[tokio::test]
    async fn test_convert_and_render() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path()).await;

        let response = convert(
            &mut session,
            &ConvertArgs {
                quotation_id: "q-2024-001".to_string(),
                render: true,
            },
        )
        .await
        .unwrap();

        assert!(response.invoice_id.starts_with("inv-"));
        assert_eq!(response.total.to_string(), "$4703.13");
        assert!(response.exported.unwrap().path.exists());
        assert!(session.state.invoices.get(&response.invoice_id).is_ok());
    }

    #[tokio::test]
    async fn test_convert_sent_quotation_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path()).await;
        let err = convert(
            &mut session,
            &ConvertArgs {
                quotation_id: "q-2024-002".to_string(),
                render: false,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidStatus);
    }
}
