//! # Document Service
//!
//! The end-to-end pipeline used by the CLI.
//!
//! ```text
//!  document + company
//!         │
//!         ▼
//!  ┌──────────────┐  template == custom   ┌───────────────────────────┐
//!  │ pick layout  │ ────────────────────► │ company.custom_template() │── None ─► TemplateNotFound
//!  └──────┬───────┘                       └────────────┬──────────────┘
//!         │ built-in                                   │
//!         ▼                                            ▼
//!  resolve logo (async, timeout)        resolve bound images (async, timeout)
//!         │                                            │
//!         ▼                                            ▼
//!  renderer::render                      custom::render (+ BindingReport)
//!         └──────────────────┬─────────────────────────┘
//!                            ▼
//!                     pdf::write_pdf ──► export to output_dir
//!                                   └──► PreviewRegistry (handle)
//! ```

use std::path::{Path, PathBuf};

use suite_core::types::{BillingDocument, CompanyDetails, TemplateKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::assets::AssetResolver;
use crate::custom::{self, BindingRegistry, BindingReport};
use crate::error::{DocError, DocResult};
use crate::pdf::write_pdf;
use crate::preview::{PreviewHandle, PreviewRegistry};
use crate::renderer;
use crate::surface::Surface;

/// A document laid out and ready for a backend.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// `{Quotation|Invoice}-{id}.pdf`
    pub file_name: String,
    pub title: String,
    pub surface: Surface,
    /// Present for custom templates.
    pub report: Option<BindingReport>,
}

/// Where an export landed and what it contained.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub path: PathBuf,
    pub pages: usize,
    pub bytes: usize,
    /// Present for custom templates.
    pub report: Option<BindingReport>,
}

/// Renders, exports and previews documents.
#[derive(Clone)]
pub struct DocumentService {
    resolver: AssetResolver,
    registry: BindingRegistry,
    previews: PreviewRegistry,
    output_dir: PathBuf,
}

impl DocumentService {
    pub fn new(resolver: AssetResolver, output_dir: impl Into<PathBuf>) -> Self {
        DocumentService {
            resolver,
            registry: BindingRegistry::standard(),
            previews: PreviewRegistry::new(),
            output_dir: output_dir.into(),
        }
    }

    /// Replaces the placeholder bindings used for custom templates.
    pub fn with_bindings(mut self, registry: BindingRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Lays out `document` with its own template and accent.
    pub async fn layout(
        &self,
        document: &dyn BillingDocument,
        company: &CompanyDetails,
        cancel: &CancellationToken,
    ) -> DocResult<RenderedDocument> {
        let file_name = document.file_name();
        let title = format!("{} {}", document.kind().label(), document.id());

        if document.template() == TemplateKind::Custom {
            let id = document.custom_template_id().unwrap_or_default();
            let Some(template) = company.custom_template(id) else {
                let available: Vec<&str> =
                    company.custom_templates.iter().map(|t| t.id.as_str()).collect();
                warn!(document = document.id(), template = id, ?available, "Custom template not found");
                return Err(DocError::TemplateNotFound { id: id.to_string() });
            };

            let urls = custom::image_urls(&self.registry, template, document, company);
            let assets = self.resolver.resolve(urls, cancel).await;
            let rendered = custom::render_with(&self.registry, template, document, company, &assets);
            return Ok(RenderedDocument {
                file_name,
                title,
                surface: rendered.surface,
                report: Some(rendered.report),
            });
        }

        let assets = self
            .resolver
            .resolve(std::iter::once(company.logo_url.clone()), cancel)
            .await;
        let surface = renderer::render(
            document,
            company,
            document.template(),
            document.accent_color(),
            &assets,
        )?;

        Ok(RenderedDocument {
            file_name,
            title,
            surface,
            report: None,
        })
    }

    /// Lays out `document` and serializes it to PDF.
    pub async fn render_pdf(
        &self,
        document: &dyn BillingDocument,
        company: &CompanyDetails,
        cancel: &CancellationToken,
    ) -> DocResult<(RenderedDocument, Vec<u8>)> {
        let rendered = self.layout(document, company, cancel).await?;
        let bytes = write_pdf(&rendered.surface, &rendered.title)?;
        Ok((rendered, bytes))
    }

    /// Writes `{Quotation|Invoice}-{id}.pdf` into the output directory.
    pub async fn export_pdf(
        &self,
        document: &dyn BillingDocument,
        company: &CompanyDetails,
        cancel: &CancellationToken,
    ) -> DocResult<ExportedDocument> {
        let (rendered, bytes) = self.render_pdf(document, company, cancel).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(&rendered.file_name);
        tokio::fs::write(&path, &bytes).await?;

        let pages = rendered.surface.page_count();
        info!(
            path = %path.display(),
            bytes = bytes.len(),
            pages,
            "Document exported"
        );
        Ok(ExportedDocument {
            path,
            pages,
            bytes: bytes.len(),
            report: rendered.report,
        })
    }

    /// Renders into a preview buffer owned by the returned handle.
    pub async fn preview(
        &self,
        document: &dyn BillingDocument,
        company: &CompanyDetails,
        cancel: &CancellationToken,
    ) -> DocResult<PreviewHandle> {
        let (rendered, bytes) = self.render_pdf(document, company, cancel).await?;
        Ok(self.previews.open(bytes, rendered.file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use suite_core::money::Rate;
    use suite_core::templates::default_placeholders;
    use suite_core::types::{AccentColor, Customer, CustomTemplate, Dimensions, Invoice, LineItem};

    fn invoice() -> Invoice {
        Invoice::new(
            "inv-2024-001",
            Customer::new("Tech Solutions", "123 Tech Avenue, Silicon Valley, CA 94043"),
            NaiveDate::from_ymd_opt(2024, 7, 29).unwrap(),
            30,
            vec![LineItem::direct("Server Setup & Configuration", 1.0, 2500.0).with_sku("HW-SRV-001")],
            Rate::from_percent(7.5),
        )
    }

    fn custom_company() -> CompanyDetails {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        CompanyDetails {
            custom_templates: vec![CustomTemplate {
                id: "custom_1".to_string(),
                name: "Letterhead".to_string(),
                description: None,
                template_file: "data:application/pdf;base64,JVBERi0xLjQ=".to_string(),
                placeholders: default_placeholders(),
                dimensions: Dimensions::A4,
                created_at: now,
                updated_at: now,
            }],
            ..CompanyDetails::default()
        }
    }

    fn service(dir: &Path) -> DocumentService {
        DocumentService::new(AssetResolver::offline(), dir)
    }

    #[tokio::test]
    async fn test_export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let exported = service(dir.path())
            .export_pdf(&invoice(), &CompanyDetails::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(exported.path.file_name().unwrap(), "Invoice-inv-2024-001.pdf");
        assert_eq!(exported.pages, 1);
        assert!(exported.report.is_none());
        let bytes = std::fs::read(&exported.path).unwrap();
        assert_eq!(bytes.len(), exported.bytes);
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_rendering_twice_gives_same_output() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let company = CompanyDetails::default();
        let cancel = CancellationToken::new();

        for kind in [
            TemplateKind::Classic,
            TemplateKind::Modern,
            TemplateKind::Minimalist,
            TemplateKind::Corporate,
            TemplateKind::Creative,
        ] {
            let mut invoice = invoice();
            invoice.template = kind;
            invoice.accent_color = AccentColor::Crimson;

            let (first, first_bytes) = service.render_pdf(&invoice, &company, &cancel).await.unwrap();
            let (second, second_bytes) = service.render_pdf(&invoice, &company, &cancel).await.unwrap();

            assert_eq!(first_bytes.len(), second_bytes.len(), "{}", kind);
            assert_eq!(first.surface.page_count(), second.surface.page_count(), "{}", kind);
            assert_eq!(first.surface.text_content(), second.surface.text_content(), "{}", kind);
        }
    }

    #[tokio::test]
    async fn test_unreachable_logo_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let company = CompanyDetails {
            logo_url: "https://unreachable.invalid/logo.png".to_string(),
            ..CompanyDetails::default()
        };
        let (rendered, bytes) = service(dir.path())
            .render_pdf(&invoice(), &company, &CancellationToken::new())
            .await
            .unwrap();
        assert!(rendered.surface.contains_text("$2687.50"));
        assert!(!bytes.is_empty());
    }

    #[tokio::test]
    async fn test_missing_custom_template_fails_both_paths() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let mut invoice = invoice();
        invoice.template = TemplateKind::Custom;
        invoice.custom_template_id = Some("custom_gone".to_string());
        let cancel = CancellationToken::new();

        let preview = service.preview(&invoice, &custom_company(), &cancel).await;
        assert!(matches!(preview, Err(DocError::TemplateNotFound { ref id }) if id == "custom_gone"));

        let export = service.export_pdf(&invoice, &custom_company(), &cancel).await;
        assert!(matches!(export, Err(DocError::TemplateNotFound { .. })));
        assert!(!dir.path().join("Invoice-inv-2024-001.pdf").exists());
    }

    #[tokio::test]
    async fn test_custom_template_reports_skipped_background() {
        let dir = tempfile::tempdir().unwrap();
        let mut invoice = invoice();
        invoice.template = TemplateKind::Custom;
        invoice.custom_template_id = Some("custom_1".to_string());

        let rendered = service(dir.path())
            .layout(&invoice, &custom_company(), &CancellationToken::new())
            .await
            .unwrap();
        let report = rendered.report.expect("custom report");
        assert!(matches!(report.background, custom::BackgroundStatus::Skipped(_)));
        assert!(rendered.surface.contains_text("Total: $2687.50"));
    }

    #[tokio::test]
    async fn test_custom_bindings_replace_standard_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut invoice = invoice();
        invoice.template = TemplateKind::Custom;
        invoice.custom_template_id = Some("custom_1".to_string());

        let mut registry = custom::BindingRegistry::empty();
        registry.register("total", |c| custom::Binding::Text(format!("Due {}", c.document.total())));
        let rendered = service(dir.path())
            .with_bindings(registry)
            .layout(&invoice, &custom_company(), &CancellationToken::new())
            .await
            .unwrap();

        let report = rendered.report.expect("custom report");
        assert!(report.unresolved.iter().any(|id| id == "companyName"));
        assert!(!report.unresolved.iter().any(|id| id == "total"));
        assert!(rendered.surface.contains_text("Due $2687.50"));
    }

    #[tokio::test]
    async fn test_preview_handle_releases() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let handle = service
            .preview(&invoice(), &CompanyDetails::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(handle.file_name(), "Invoice-inv-2024-001.pdf");
        assert_eq!(service.previews().len(), 1);
        drop(handle);
        assert!(service.previews().is_empty());
    }
}
