//! # Custom Template Processor
//!
//! Renders a document onto a user-uploaded template: a flat background image
//! with absolutely positioned placeholders.
//!
//! ## Binding Flow
//! ```text
//! ┌────────────────────┐   id    ┌──────────────────┐  Binding  ┌──────────────┐
//! │ TemplatePlaceholder│ ──────► │ BindingRegistry  │ ────────► │ draw by      │
//! │ id, type, x, y ... │         │ id -> resolver   │           │ placeholder  │
//! └────────────────────┘         └────────┬─────────┘           │ type         │
//!                                         │                     └──────┬───────┘
//!                      custom_*  ─► Unbound("custom_x")  "[custom_x]"  │
//!                      other     ─► Unresolved           not drawn     ▼
//!                                                              BindingReport
//! ```
//!
//! Template coordinates are points from the top-left corner. The surface is
//! in millimetres, so every coordinate is scaled by [`PT_TO_MM`] on the way in.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use suite_core::money::Money;
use suite_core::templates::Color;
use suite_core::types::{
    BillingDocument, CompanyDetails, CustomTemplate, FontWeight, PlaceholderKind,
    TemplatePlaceholder, TextAlign,
};
use tracing::{debug, warn};

use crate::assets::{decode_data_url, AssetBundle, ImageAsset, ImageFormat};
use crate::metrics::{line_height_mm, wrap_text, Font, PT_TO_MM};
use crate::surface::{DrawOp, ImageOp, Surface, TextOp};
use crate::table::{draw_items_table, TableFrame, TableTheme};

/// Font size used when a placeholder sets none.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
/// Wrap width of text placeholders without a width, in points.
pub const DEFAULT_TEXT_WIDTH: f64 = 200.0;
/// Width of a table placeholder without a width, in points.
pub const DEFAULT_TABLE_WIDTH: f64 = 400.0;
/// Box of an image placeholder without a size, in points.
pub const DEFAULT_IMAGE_SIZE: (f64, f64) = (50.0, 30.0);
/// Where tables resume on continuation pages, in points.
pub const CONTINUATION_MARGIN: f64 = 40.0;

// =============================================================================
// Bindings
// =============================================================================

/// The value a placeholder id resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Text(String),
    /// An amount with its caption (`Subtotal`, `VAT (7.5%)`, `Total`).
    Money { caption: String, amount: Money },
    Date(NaiveDate),
    /// Image source URL (`http(s)://` or `data:`).
    Image(String),
    /// The document's line items.
    Items,
    /// A user-defined `custom_*` field with no data source yet.
    Unbound(String),
    /// An id nothing knows about.
    Unresolved,
}

/// What resolvers can read.
pub struct BindingContext<'a> {
    pub document: &'a dyn BillingDocument,
    pub company: &'a CompanyDetails,
}

pub type Resolver = fn(&BindingContext<'_>) -> Binding;

/// Maps placeholder ids to resolver functions.
#[derive(Clone)]
pub struct BindingRegistry {
    resolvers: HashMap<&'static str, Resolver>,
}

impl BindingRegistry {
    /// An empty registry. Every id resolves to `Unbound` or `Unresolved`.
    pub fn empty() -> Self {
        BindingRegistry {
            resolvers: HashMap::new(),
        }
    }

    /// Registry with every document and company field.
    pub fn standard() -> Self {
        let mut registry = BindingRegistry::empty();

        registry.register("documentNumber", |c| Binding::Text(c.document.id().to_string()));
        registry.register("documentDate", |c| Binding::Date(c.document.date()));
        registry.register("dueDate", |c| match c.document.due_date() {
            Some(date) => Binding::Date(date),
            None => Binding::Text(String::new()),
        });
        registry.register("documentType", |c| Binding::Text(c.document.kind().title().to_string()));
        registry.register("documentTitle", |c| Binding::Text(c.document.kind().title().to_string()));
        registry.register("customerName", |c| Binding::Text(c.document.customer().name.clone()));
        registry.register("customerAddress", |c| {
            Binding::Text(c.document.customer().address.clone())
        });
        registry.register("subtotal", |c| Binding::Money {
            caption: "Subtotal".to_string(),
            amount: c.document.subtotal(),
        });
        registry.register("vat", |c| Binding::Money {
            caption: format!("VAT ({}%)", c.document.vat_rate()),
            amount: c.document.vat(),
        });
        registry.register("vatRate", |c| Binding::Text(format!("{}%", c.document.vat_rate())));
        registry.register("total", |c| Binding::Money {
            caption: "Total".to_string(),
            amount: c.document.total(),
        });
        registry.register("terms", |c| Binding::Text(c.document.terms().to_string()));
        registry.register("itemsTable", |_| Binding::Items);

        registry.register("companyName", |c| Binding::Text(c.company.name.clone()));
        registry.register("companyAddress", |c| Binding::Text(c.company.address.clone()));
        registry.register("companyContact", |c| Binding::Text(c.company.contact.clone()));
        registry.register("companyTagline", |c| Binding::Text(c.company.tagline.clone()));
        registry.register("companyLogo", |c| Binding::Image(c.company.logo_url.clone()));

        registry
    }

    pub fn register(&mut self, id: &'static str, resolver: Resolver) {
        self.resolvers.insert(id, resolver);
    }

    pub fn resolve(&self, id: &str, context: &BindingContext<'_>) -> Binding {
        match self.resolvers.get(id) {
            Some(resolver) => resolver(context),
            None if id.starts_with("custom_") => Binding::Unbound(id.to_string()),
            None => Binding::Unresolved,
        }
    }
}

impl Default for BindingRegistry {
    fn default() -> Self {
        BindingRegistry::standard()
    }
}

// =============================================================================
// Report
// =============================================================================

/// What happened to the template background.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum BackgroundStatus {
    Drawn,
    Skipped(String),
}

/// Everything that did not render as data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingReport {
    /// `custom_*` placeholders drawn as bracket labels.
    pub unbound: Vec<String>,
    /// Placeholders with unknown ids, not drawn.
    pub unresolved: Vec<String>,
    /// Image URLs that were bound but not loaded.
    pub missing_assets: Vec<String>,
    pub background: BackgroundStatus,
}

impl BindingReport {
    /// True when every placeholder rendered real data.
    pub fn is_clean(&self) -> bool {
        self.unbound.is_empty()
            && self.unresolved.is_empty()
            && self.missing_assets.is_empty()
            && self.background == BackgroundStatus::Drawn
    }
}

/// A laid-out custom document.
#[derive(Debug, Clone)]
pub struct CustomRender {
    pub surface: Surface,
    pub report: BindingReport,
}

// =============================================================================
// Rendering
// =============================================================================

/// Decodes the template file into a drawable background.
pub fn load_background(template_file: &str) -> Result<ImageAsset, String> {
    let data = decode_data_url(template_file)?;
    if data.media_type == "application/pdf" {
        return Err("PDF backgrounds cannot be drawn".to_string());
    }
    if ImageFormat::from_media_type(&data.media_type).is_none() {
        return Err(format!("unsupported background type '{}'", data.media_type));
    }
    ImageAsset::from_bytes(data.bytes)
}

/// Image URLs the template's placeholders bind to, for prefetching.
pub fn image_urls(
    registry: &BindingRegistry,
    template: &CustomTemplate,
    document: &dyn BillingDocument,
    company: &CompanyDetails,
) -> Vec<String> {
    let context = BindingContext { document, company };
    template
        .placeholders
        .iter()
        .filter_map(|p| match registry.resolve(&p.id, &context) {
            Binding::Image(url) if !url.is_empty() => Some(url),
            _ => None,
        })
        .collect()
}

/// Renders `document` on `template` with the standard bindings.
pub fn render(
    template: &CustomTemplate,
    document: &dyn BillingDocument,
    company: &CompanyDetails,
    assets: &AssetBundle,
) -> CustomRender {
    render_with(&BindingRegistry::standard(), template, document, company, assets)
}

/// Renders `document` on `template` using `registry` to bind placeholders.
pub fn render_with(
    registry: &BindingRegistry,
    template: &CustomTemplate,
    document: &dyn BillingDocument,
    company: &CompanyDetails,
    assets: &AssetBundle,
) -> CustomRender {
    let width = template.dimensions.width * PT_TO_MM;
    let height = template.dimensions.height * PT_TO_MM;
    let mut surface = Surface::new(width, height);

    let (background, status) = match load_background(&template.template_file) {
        Ok(asset) => (Some(asset), BackgroundStatus::Drawn),
        Err(reason) => {
            warn!(template = %template.id, %reason, "Template background skipped");
            (None, BackgroundStatus::Skipped(reason))
        }
    };

    let mut paint_background = |surface: &mut Surface, page: usize| {
        if let Some(asset) = &background {
            surface.push_to(
                page,
                DrawOp::Image(ImageOp {
                    asset: asset.clone(),
                    x: 0.0,
                    y: 0.0,
                    width,
                    height,
                }),
            );
        }
    };
    paint_background(&mut surface, 0);

    let mut report = BindingReport {
        unbound: Vec::new(),
        unresolved: Vec::new(),
        missing_assets: Vec::new(),
        background: status,
    };
    let context = BindingContext { document, company };

    for placeholder in &template.placeholders {
        let binding = registry.resolve(&placeholder.id, &context);
        let mut painter = Painter {
            surface: &mut surface,
            placeholder,
        };

        if placeholder.kind == PlaceholderKind::Table || binding == Binding::Items {
            painter.table(document, &mut paint_background);
            continue;
        }

        match binding {
            Binding::Unresolved => {
                debug!(id = %placeholder.id, "Placeholder has no data source");
                report.unresolved.push(placeholder.id.clone());
            }
            Binding::Unbound(id) => {
                painter.text(&format!("[{}]", id));
                report.unbound.push(id);
            }
            Binding::Image(url) => match assets.image(&url) {
                Some(asset) => painter.image(asset),
                None => {
                    if !url.is_empty() {
                        report.missing_assets.push(url);
                    }
                    painter.image_fallback();
                }
            },
            _ if placeholder.kind == PlaceholderKind::Image => painter.image_fallback(),
            other => {
                if let Some(text) = format_binding(&other, placeholder) {
                    painter.text(&text);
                }
            }
        }
    }

    if !report.is_clean() {
        debug!(
            template = %template.id,
            unbound = report.unbound.len(),
            unresolved = report.unresolved.len(),
            missing_assets = report.missing_assets.len(),
            "Custom template rendered with gaps"
        );
    }

    CustomRender { surface, report }
}

/// Text shown for a binding on a non-image, non-table placeholder.
pub fn format_binding(binding: &Binding, placeholder: &TemplatePlaceholder) -> Option<String> {
    let text = match binding {
        Binding::Text(text) => text.clone(),
        Binding::Money { caption, amount } => match placeholder.kind {
            PlaceholderKind::Currency => amount.to_string(),
            _ => format!("{}: {}", caption, amount),
        },
        Binding::Date(date) => format_date(*date, placeholder.format.as_deref()),
        Binding::Unbound(id) => format!("[{}]", id),
        Binding::Image(_) | Binding::Items | Binding::Unresolved => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Formats a date for a date placeholder.
///
/// `None` keeps the stored `YYYY-MM-DD` form. Unknown formats fall back to
/// `M/D/YYYY`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use suite_docs::custom::format_date;
///
/// let date = NaiveDate::from_ymd_opt(2024, 7, 5).unwrap();
/// assert_eq!(format_date(date, Some("DD/MM/YYYY")), "05/07/2024");
/// assert_eq!(format_date(date, Some("long")), "7/5/2024");
/// ```
pub fn format_date(date: NaiveDate, format: Option<&str>) -> String {
    match format {
        None | Some("YYYY-MM-DD") => date.format("%Y-%m-%d").to_string(),
        Some("MM/DD/YYYY") => date.format("%m/%d/%Y").to_string(),
        Some("DD/MM/YYYY") => date.format("%d/%m/%Y").to_string(),
        Some(_) => format!("{}/{}/{}", date.month(), date.day(), date.year()),
    }
}

/// Draws one placeholder.
struct Painter<'a> {
    surface: &'a mut Surface,
    placeholder: &'a TemplatePlaceholder,
}

impl Painter<'_> {
    fn font(&self) -> Font {
        match self.placeholder.font_weight {
            Some(FontWeight::Bold) => Font::Bold,
            _ => Font::Regular,
        }
    }

    fn size(&self) -> f64 {
        match self.placeholder.font_size {
            Some(size) if size > 0.0 => size,
            _ => DEFAULT_FONT_SIZE,
        }
    }

    fn color(&self) -> Color {
        self.placeholder
            .font_color
            .as_deref()
            .and_then(Color::from_hex)
            .unwrap_or(Color::BLACK)
    }

    fn origin(&self) -> (f64, f64) {
        (self.placeholder.x * PT_TO_MM, self.placeholder.y * PT_TO_MM)
    }

    fn text(&mut self, text: &str) {
        let p = self.placeholder;
        let (font, size, color) = (self.font(), self.size(), self.color());
        let (x, y) = self.origin();

        let lines: Vec<String> = if p.max_lines.is_some() || p.width.is_some() {
            let width = p.width.unwrap_or(DEFAULT_TEXT_WIDTH) * PT_TO_MM;
            let mut lines = wrap_text(text, font, size, width);
            if let Some(max) = p.max_lines {
                lines.truncate(max as usize);
            }
            lines
        } else {
            text.lines().map(str::to_string).collect()
        };

        let align = p.align.unwrap_or(TextAlign::Left);
        for (i, line) in lines.into_iter().enumerate() {
            let op = TextOp::new(line, x, y + i as f64 * line_height_mm(size), size)
                .font(font)
                .color(color)
                .align(align);
            self.surface.push_to(0, DrawOp::Text(op));
        }
    }

    fn image(&mut self, asset: &ImageAsset) {
        let p = self.placeholder;
        let (x, y) = self.origin();
        let box_w = p.width.unwrap_or(DEFAULT_IMAGE_SIZE.0) * PT_TO_MM;
        let box_h = p.height.unwrap_or(DEFAULT_IMAGE_SIZE.1) * PT_TO_MM;
        let (width, height) = asset.fit_within(box_w, box_h);
        self.surface.push_to(
            0,
            DrawOp::Image(ImageOp {
                asset: asset.clone(),
                x,
                y,
                width,
                height,
            }),
        );
    }

    fn image_fallback(&mut self) {
        let (x, y) = self.origin();
        self.surface
            .push_to(0, DrawOp::Text(TextOp::new("[Image]", x, y, 8.0).color(self.color())));
    }

    fn table(&mut self, document: &dyn BillingDocument, on_new_page: &mut dyn FnMut(&mut Surface, usize)) {
        let p = self.placeholder;
        let (x, y) = self.origin();
        let width = p.width.unwrap_or(DEFAULT_TABLE_WIDTH) * PT_TO_MM;
        let page_height = self.surface.height;
        let margin = CONTINUATION_MARGIN * PT_TO_MM;

        draw_items_table(
            self.surface,
            document.items(),
            &TableTheme::custom(),
            TableFrame {
                x,
                width,
                page: 0,
                y,
                continuation_top: margin,
                bottom: page_height - margin,
            },
            on_new_page,
        );
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
