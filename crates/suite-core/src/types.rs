//! # Domain Types
//!
//! Core document types used throughout Streamline Suite.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Quotation     │   │    Invoice      │   │ CompanyDetails  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id  q-<millis> │   │  id inv-<millis>│   │  name, address  │       │
//! │  │  customer       │   │  customer       │   │  contact, logo  │       │
//! │  │  items[]        │──►│  items[]        │   │  customTemplates│       │
//! │  │  vatRate/whtRate│   │  dueDate        │   └────────┬────────┘       │
//! │  │  totals         │   │  quotationId?   │            │                │
//! │  └─────────────────┘   └─────────────────┘            ▼                │
//! │          convert_to_invoice (one-way)       ┌─────────────────┐        │
//! │                                             │ CustomTemplate  │        │
//! │  ┌─────────────────┐  ┌─────────────────┐   │  ─────────────  │        │
//! │  │  TemplateKind   │  │  AccentColor    │   │  templateFile   │        │
//! │  │  classic        │  │  teal           │   │  placeholders[] │        │
//! │  │  modern  ...    │  │  blue ...       │   │  dimensions     │        │
//! │  │  custom ────────┼──┼─────────────────┼──►└─────────────────┘        │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! JSON field names are camelCase so persisted profiles and records files
//! keep the shape the web front end already reads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Rate};

/// Anything stored in a store collection and addressed by id.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Generates a client-side document id such as `q-1722124800000`.
pub fn document_id(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, now.timestamp_millis())
}

// =============================================================================
// Template & Accent Selection
// =============================================================================

/// Visual template chosen for a document.
///
/// `Custom` is a sentinel: the layout comes from the company's uploaded
/// [`CustomTemplate`] referenced by `custom_template_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TemplateKind {
    #[default]
    Classic,
    Modern,
    Minimalist,
    Corporate,
    Creative,
    Custom,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Classic => "classic",
            TemplateKind::Modern => "modern",
            TemplateKind::Minimalist => "minimalist",
            TemplateKind::Corporate => "corporate",
            TemplateKind::Creative => "creative",
            TemplateKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(TemplateKind::Classic),
            "modern" => Ok(TemplateKind::Modern),
            "minimalist" => Ok(TemplateKind::Minimalist),
            "corporate" => Ok(TemplateKind::Corporate),
            "creative" => Ok(TemplateKind::Creative),
            "custom" => Ok(TemplateKind::Custom),
            other => Err(format!(
                "Unknown template: '{}'. Valid options: classic, modern, minimalist, corporate, creative, custom",
                other
            )),
        }
    }
}

/// Theme colour applied to headers and table styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AccentColor {
    #[default]
    Teal,
    Blue,
    Crimson,
    Slate,
}

impl AccentColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccentColor::Teal => "teal",
            AccentColor::Blue => "blue",
            AccentColor::Crimson => "crimson",
            AccentColor::Slate => "slate",
        }
    }
}

impl std::str::FromStr for AccentColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "teal" => Ok(AccentColor::Teal),
            "blue" => Ok(AccentColor::Blue),
            "crimson" => Ok(AccentColor::Crimson),
            "slate" => Ok(AccentColor::Slate),
            other => Err(format!(
                "Unknown accent color: '{}'. Valid options: teal, blue, crimson, slate",
                other
            )),
        }
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// Bill-to party printed on a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub name: String,
    pub address: String,
}

impl Customer {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Customer {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// A line on a quotation or invoice.
///
/// ## Pricing Modes
/// - **Quotation lines** carry `cost_price` and `markup_percent`; the
///   calculator derives `unit_price` from them.
/// - **Invoice lines** carry neither; `unit_price` is entered directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub id: String,

    pub description: String,

    pub quantity: f64,

    /// Price the item was bought for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Money>,

    /// Markup added on top of the cost price, in percent.
    #[serde(
        default,
        alias = "sellingPricePercentage",
        skip_serializing_if = "Option::is_none"
    )]
    pub markup_percent: Option<f64>,

    /// Selling price for one unit.
    #[serde(default)]
    pub unit_price: Money,

    /// Stock Keeping Unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

impl LineItem {
    /// Creates a quotation line priced from cost and markup.
    ///
    /// `unit_price` stays zero until the calculator runs.
    pub fn priced(
        description: impl Into<String>,
        quantity: f64,
        cost_price: f64,
        markup_percent: f64,
    ) -> Self {
        LineItem {
            id: line_item_id(),
            description: description.into(),
            quantity,
            cost_price: Some(Money::new(cost_price)),
            markup_percent: Some(markup_percent),
            unit_price: Money::zero(),
            sku: None,
        }
    }

    /// Creates an invoice line with a directly entered unit price.
    pub fn direct(description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        LineItem {
            id: line_item_id(),
            description: description.into(),
            quantity,
            cost_price: None,
            markup_percent: None,
            unit_price: Money::new(unit_price),
            sku: None,
        }
    }

    /// Sets the SKU (builder style).
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        let sku = sku.into();
        self.sku = if sku.trim().is_empty() { None } else { Some(sku) };
        self
    }

    /// True when the unit price is derived from cost and markup.
    pub fn has_cost_pricing(&self) -> bool {
        self.cost_price.is_some() || self.markup_percent.is_some()
    }

    /// `quantity × unit_price`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// `cost_price × quantity` (zero for lines without a cost).
    #[inline]
    pub fn line_cost(&self) -> Money {
        self.cost_price
            .unwrap_or_default()
            .multiply_quantity(self.quantity)
    }
}

fn line_item_id() -> String {
    format!("li-{}", uuid::Uuid::new_v4())
}

// =============================================================================
// Statuses
// =============================================================================

/// Quotation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum QuotationStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

/// Invoice lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
}

// =============================================================================
// Documents
// =============================================================================

/// Which kind of document is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DocumentKind {
    Quotation,
    Invoice,
}

impl DocumentKind {
    /// Title printed in document headers (`QUOTATION`, `INVOICE`).
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Quotation => "QUOTATION",
            DocumentKind::Invoice => "INVOICE",
        }
    }

    /// Human label (`Quotation`, `Invoice`).
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Quotation => "Quotation",
            DocumentKind::Invoice => "Invoice",
        }
    }

    /// Deterministic export file name: `{Quotation|Invoice}-{id}.pdf`.
    ///
    /// ## Example
    /// ```rust
    /// use suite_core::types::DocumentKind;
    ///
    /// assert_eq!(DocumentKind::Invoice.file_name("inv-1"), "Invoice-inv-1.pdf");
    /// ```
    pub fn file_name(&self, id: &str) -> String {
        format!("{}-{}.pdf", self.label(), id)
    }
}

/// A quotation sent to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Quotation {
    pub id: String,
    pub customer: Customer,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub status: QuotationStatus,
    pub items: Vec<LineItem>,
    pub vat_rate: Rate,
    /// Withholding tax, used only for profit estimation.
    pub wht_rate: Rate,
    pub subtotal: Money,
    pub vat: Money,
    pub total: Money,
    pub terms: String,
    pub template: TemplateKind,
    pub accent_color: AccentColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_template_id: Option<String>,
}

fn default_invoice_vat() -> Rate {
    Rate::from_percent(crate::DEFAULT_INVOICE_VAT_RATE)
}

/// An invoice issued to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    pub customer: Customer,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub items: Vec<LineItem>,
    #[serde(default = "default_invoice_vat")]
    pub vat_rate: Rate,
    pub subtotal: Money,
    pub vat: Money,
    pub total: Money,
    pub terms: String,
    /// Quotation this invoice was converted from (one-way back-reference).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotation_id: Option<String>,
    pub template: TemplateKind,
    pub accent_color: AccentColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_template_id: Option<String>,
}

impl Identified for Quotation {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Invoice {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Read-only view shared by quotations and invoices.
///
/// Renderers take `&dyn BillingDocument` so one layout path serves both.
pub trait BillingDocument: Send + Sync {
    fn kind(&self) -> DocumentKind;
    fn id(&self) -> &str;
    fn customer(&self) -> &Customer;
    fn date(&self) -> NaiveDate;
    /// Due date, invoices only.
    fn due_date(&self) -> Option<NaiveDate>;
    fn items(&self) -> &[LineItem];
    fn vat_rate(&self) -> Rate;
    fn subtotal(&self) -> Money;
    fn vat(&self) -> Money;
    fn total(&self) -> Money;
    fn terms(&self) -> &str;
    fn template(&self) -> TemplateKind;
    fn accent_color(&self) -> AccentColor;
    fn custom_template_id(&self) -> Option<&str>;

    /// Export file name for this document.
    fn file_name(&self) -> String {
        self.kind().file_name(self.id())
    }
}

impl BillingDocument for Quotation {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Quotation
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn customer(&self) -> &Customer {
        &self.customer
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn due_date(&self) -> Option<NaiveDate> {
        None
    }
    fn items(&self) -> &[LineItem] {
        &self.items
    }
    fn vat_rate(&self) -> Rate {
        self.vat_rate
    }
    fn subtotal(&self) -> Money {
        self.subtotal
    }
    fn vat(&self) -> Money {
        self.vat
    }
    fn total(&self) -> Money {
        self.total
    }
    fn terms(&self) -> &str {
        &self.terms
    }
    fn template(&self) -> TemplateKind {
        self.template
    }
    fn accent_color(&self) -> AccentColor {
        self.accent_color
    }
    fn custom_template_id(&self) -> Option<&str> {
        self.custom_template_id.as_deref()
    }
}

impl BillingDocument for Invoice {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Invoice
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn customer(&self) -> &Customer {
        &self.customer
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn due_date(&self) -> Option<NaiveDate> {
        Some(self.due_date)
    }
    fn items(&self) -> &[LineItem] {
        &self.items
    }
    fn vat_rate(&self) -> Rate {
        self.vat_rate
    }
    fn subtotal(&self) -> Money {
        self.subtotal
    }
    fn vat(&self) -> Money {
        self.vat
    }
    fn total(&self) -> Money {
        self.total
    }
    fn terms(&self) -> &str {
        &self.terms
    }
    fn template(&self) -> TemplateKind {
        self.template
    }
    fn accent_color(&self) -> AccentColor {
        self.accent_color
    }
    fn custom_template_id(&self) -> Option<&str> {
        self.custom_template_id.as_deref()
    }
}

// =============================================================================
// Company Profile
// =============================================================================

/// Singleton company profile applied to every rendered document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompanyDetails {
    pub name: String,
    pub address: String,
    pub contact: String,
    /// `http(s)://` URL or `data:` URL of the logo; empty for none.
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub custom_templates: Vec<CustomTemplate>,
}

impl Default for CompanyDetails {
    fn default() -> Self {
        CompanyDetails {
            name: "Streamline Suite".to_string(),
            address: "123 Business Avenue, Suite 100".to_string(),
            contact: "contact@yourcompany.com | (555) 555-5555".to_string(),
            logo_url: String::new(),
            tagline: String::new(),
            custom_templates: Vec::new(),
        }
    }
}

impl CompanyDetails {
    /// Finds an uploaded template by id.
    pub fn custom_template(&self, id: &str) -> Option<&CustomTemplate> {
        self.custom_templates.iter().find(|t| t.id == id)
    }
}

// =============================================================================
// Custom Templates
// =============================================================================

/// What a placeholder renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PlaceholderKind {
    Text,
    Image,
    Table,
    Currency,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// An absolute-position content slot on a template background.
///
/// Coordinates and sizes are in points, measured from the top-left corner
/// of the template page. `x` is the anchor for `align`; `y` is the text
/// baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TemplatePlaceholder {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PlaceholderKind,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Hex colour such as `#333333`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
    /// Date format (`MM/DD/YYYY`, `DD/MM/YYYY`, `YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl TemplatePlaceholder {
    /// A placeholder with only the required fields set.
    pub fn new(id: impl Into<String>, kind: PlaceholderKind, x: f64, y: f64) -> Self {
        TemplatePlaceholder {
            id: id.into(),
            kind,
            x,
            y,
            width: None,
            height: None,
            font_size: None,
            font_color: None,
            font_weight: None,
            align: None,
            max_lines: None,
            format: None,
        }
    }
}

/// Page size of a custom template, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    /// A4 portrait in points.
    pub const A4: Dimensions = Dimensions {
        width: 595.0,
        height: 842.0,
    };
}

impl Default for Dimensions {
    fn default() -> Self {
        Dimensions::A4
    }
}

/// A user-uploaded template: a flat background image plus placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomTemplate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Background as a `data:<media-type>;base64,<payload>` URL.
    pub template_file: String,
    pub placeholders: Vec<TemplatePlaceholder>,
    pub dimensions: Dimensions,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Identified for CustomTemplate {
    fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_kind_parsing() {
        assert_eq!("Modern".parse::<TemplateKind>(), Ok(TemplateKind::Modern));
        assert_eq!("custom".parse::<TemplateKind>(), Ok(TemplateKind::Custom));
        assert!("fancy".parse::<TemplateKind>().is_err());
        assert_eq!(TemplateKind::Corporate.to_string(), "corporate");
    }

    #[test]
    fn test_file_name_pattern() {
        assert_eq!(
            DocumentKind::Quotation.file_name("q-2024-001"),
            "Quotation-q-2024-001.pdf"
        );
        assert_eq!(DocumentKind::Invoice.title(), "INVOICE");
    }

    #[test]
    fn test_line_item_accepts_legacy_markup_field() {
        let json = r#"{
            "id": "1",
            "description": "Dell PowerEdge R750 Server",
            "quantity": 1,
            "sellingPricePercentage": 25,
            "costPrice": 3500,
            "unitPrice": 4375,
            "sku": "HW-SRV-001"
        }"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.markup_percent, Some(25.0));
        assert_eq!(item.cost_price, Some(Money::new(3500.0)));
        assert_eq!(item.line_total().amount(), 4375.0);
    }

    #[test]
    fn test_placeholder_type_field() {
        let json = r#"{"id":"total","type":"currency","x":550,"y":510,"fontSize":14,"fontWeight":"bold","align":"right"}"#;
        let p: TemplatePlaceholder = serde_json::from_str(json).unwrap();
        assert_eq!(p.kind, PlaceholderKind::Currency);
        assert_eq!(p.font_weight, Some(FontWeight::Bold));
        assert_eq!(p.align, Some(TextAlign::Right));

        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back["type"], "currency");
        assert!(back.get("maxLines").is_none());
    }

    #[test]
    fn test_with_sku_blank_is_none() {
        let item = LineItem::direct("Audit", 1.0, 4000.0).with_sku("  ");
        assert_eq!(item.sku, None);
        assert!(!item.has_cost_pricing());
    }

    #[test]
    fn test_document_id() {
        let now = DateTime::from_timestamp_millis(1_722_124_800_000).unwrap();
        assert_eq!(document_id("q", now), "q-1722124800000");
    }
}
