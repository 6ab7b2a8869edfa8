//! # Template Registry
//!
//! Static lookup from a [`TemplateKind`] to its layout descriptor and from an
//! [`AccentColor`] to its colour. No state, no persistence.
//!
//! ## Built-in Layouts
//! ```text
//! ┌──────────────┬──────────────┬───────────┬─────────┐
//! │ Template     │ Header       │ Watermark │ Table   │
//! ├──────────────┼──────────────┼───────────┼─────────┤
//! │ classic      │ Letterhead   │ no        │ Striped │
//! │ modern       │ Banner       │ no        │ Striped │
//! │ minimalist   │ Letterhead   │ no        │ Grid    │
//! │ corporate    │ SidePanel    │ no        │ Striped │
//! │ creative     │ Letterhead   │ yes       │ Striped │
//! │ custom       │ (uploaded template, see suite-docs::custom)      │
//! └──────────────┴──────────────┴───────────┴─────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::types::{
    AccentColor, FontWeight, PlaceholderKind, TemplateKind, TemplatePlaceholder, TextAlign,
};

// =============================================================================
// Colours
// =============================================================================

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub const fn gray(level: u8) -> Self {
        Color::rgb(level, level, level)
    }

    /// Parses `#RRGGBB`, `RRGGBB` or the short `#RGB` form.
    ///
    /// ## Example
    /// ```rust
    /// use suite_core::templates::Color;
    ///
    /// assert_eq!(Color::from_hex("#14B8A6"), Some(Color::rgb(20, 184, 166)));
    /// assert_eq!(Color::from_hex("#333"), Some(Color::gray(0x33)));
    /// assert_eq!(Color::from_hex("teal"), None);
    /// ```
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            6 => {
                let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
                Some(Color::rgb(r, g, b))
            }
            3 => {
                let expand = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|v| v * 17);
                Some(Color::rgb(expand(0).ok()?, expand(1).ok()?, expand(2).ok()?))
            }
            _ => None,
        }
    }

    /// `#RRGGBB` in upper case.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Components scaled to `0.0..=1.0` for PDF colour operators.
    pub fn to_unit(&self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

impl AccentColor {
    /// Fixed hex code of the accent.
    pub fn hex(&self) -> &'static str {
        match self {
            AccentColor::Teal => "#14B8A6",
            AccentColor::Blue => "#3B82F6",
            AccentColor::Crimson => "#DC2626",
            AccentColor::Slate => "#64748B",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            AccentColor::Teal => Color::rgb(0x14, 0xB8, 0xA6),
            AccentColor::Blue => Color::rgb(0x3B, 0x82, 0xF6),
            AccentColor::Crimson => Color::rgb(0xDC, 0x26, 0x26),
            AccentColor::Slate => Color::rgb(0x64, 0x74, 0x8B),
        }
    }

    pub const ALL: [AccentColor; 4] = [
        AccentColor::Teal,
        AccentColor::Blue,
        AccentColor::Crimson,
        AccentColor::Slate,
    ];
}

// =============================================================================
// Layout Descriptors
// =============================================================================

/// How the top of the first page is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// Accent-coloured title with company name and address underneath.
    Letterhead,
    /// Full-width accent band with the title in white.
    Banner,
    /// Accent column down the left edge carrying the company block.
    SidePanel,
}

/// How item rows are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    /// Alternating row fill.
    Striped,
    /// Bordered cells.
    Grid,
}

/// Everything the renderer needs to know about a built-in template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateLayout {
    pub kind: TemplateKind,
    pub header: HeaderStyle,
    /// Diagonal company-name watermark on the first page.
    pub watermark: bool,
    pub table: TableStyle,
}

/// Left edge of the body column beside a side panel, in mm.
pub const SIDE_PANEL_CONTENT_X: f64 = 60.0;
/// Width of the side panel, in mm.
pub const SIDE_PANEL_WIDTH: f64 = 50.0;
/// Side margin of every other layout, in mm.
pub const PAGE_MARGIN: f64 = 14.0;

impl TemplateLayout {
    /// Left edge of the body column, in mm.
    pub fn content_x(&self) -> f64 {
        match self.header {
            HeaderStyle::SidePanel => SIDE_PANEL_CONTENT_X,
            _ => PAGE_MARGIN,
        }
    }

    /// Width of the body column on a page `page_width` mm wide.
    pub fn content_width(&self, page_width: f64) -> f64 {
        match self.header {
            HeaderStyle::SidePanel => page_width - (SIDE_PANEL_CONTENT_X + 10.0),
            _ => page_width - 2.0 * PAGE_MARGIN,
        }
    }
}

/// Looks up the layout of a built-in template. `None` for `Custom`.
pub fn layout_for(kind: TemplateKind) -> Option<TemplateLayout> {
    let (header, watermark, table) = match kind {
        TemplateKind::Classic => (HeaderStyle::Letterhead, false, TableStyle::Striped),
        TemplateKind::Modern => (HeaderStyle::Banner, false, TableStyle::Striped),
        TemplateKind::Minimalist => (HeaderStyle::Letterhead, false, TableStyle::Grid),
        TemplateKind::Corporate => (HeaderStyle::SidePanel, false, TableStyle::Striped),
        TemplateKind::Creative => (HeaderStyle::Letterhead, true, TableStyle::Striped),
        TemplateKind::Custom => return None,
    };
    Some(TemplateLayout {
        kind,
        header,
        watermark,
        table,
    })
}

/// Entry in the template picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateInfo {
    pub kind: TemplateKind,
    pub label: &'static str,
    pub description: &'static str,
}

/// Built-in templates in picker order.
pub fn catalog() -> &'static [TemplateInfo] {
    const CATALOG: [TemplateInfo; 5] = [
        TemplateInfo {
            kind: TemplateKind::Classic,
            label: "Classic",
            description: "Accent title over a plain letterhead",
        },
        TemplateInfo {
            kind: TemplateKind::Modern,
            label: "Modern",
            description: "Full-width colour banner",
        },
        TemplateInfo {
            kind: TemplateKind::Minimalist,
            label: "Minimalist",
            description: "Letterhead with a bordered grid table",
        },
        TemplateInfo {
            kind: TemplateKind::Corporate,
            label: "Corporate",
            description: "Company details in a side panel",
        },
        TemplateInfo {
            kind: TemplateKind::Creative,
            label: "Creative",
            description: "Letterhead with a diagonal name watermark",
        },
    ];
    &CATALOG
}

// =============================================================================
// Placeholders
// =============================================================================

fn text(id: &str, x: f64, y: f64, font_size: f64) -> TemplatePlaceholder {
    let mut p = TemplatePlaceholder::new(id, PlaceholderKind::Text, x, y);
    p.font_size = Some(font_size);
    p
}

/// Starting layout offered when a template is uploaded (A4, points).
pub fn default_placeholders() -> Vec<TemplatePlaceholder> {
    let bold = Some(FontWeight::Bold);
    let right = Some(TextAlign::Right);
    let left = Some(TextAlign::Left);

    let mut title = text("documentTitle", 450.0, 160.0, 24.0);
    title.font_weight = bold;
    title.align = right;

    let mut company = text("companyName", 50.0, 50.0, 18.0);
    company.font_weight = bold;
    company.align = left;

    let mut address = text("companyAddress", 50.0, 80.0, 10.0);
    address.align = left;

    let mut number = text("documentNumber", 550.0, 180.0, 12.0);
    number.align = right;

    let mut date = TemplatePlaceholder::new("documentDate", PlaceholderKind::Date, 550.0, 155.0);
    date.font_size = Some(10.0);
    date.align = right;
    date.format = Some("MM/DD/YYYY".to_string());

    let mut customer = text("customerName", 50.0, 200.0, 12.0);
    customer.font_weight = bold;

    let mut customer_address = text("customerAddress", 50.0, 220.0, 10.0);
    customer_address.max_lines = Some(3);

    let mut table = TemplatePlaceholder::new("itemsTable", PlaceholderKind::Table, 50.0, 260.0);
    table.width = Some(550.0);
    table.height = Some(200.0);

    let mut subtotal = text("subtotal", 550.0, 470.0, 10.0);
    subtotal.align = right;

    let mut vat = text("vat", 550.0, 490.0, 10.0);
    vat.align = right;

    let mut total = text("total", 550.0, 510.0, 14.0);
    total.font_weight = bold;
    total.align = right;

    let mut terms = text("terms", 50.0, 550.0, 10.0);
    terms.max_lines = Some(10);
    terms.width = Some(500.0);

    vec![
        title,
        company,
        address,
        number,
        date,
        customer,
        customer_address,
        table,
        subtotal,
        vat,
        total,
        terms,
    ]
}

/// A free-form placeholder added by the user (`custom_<millis>`).
pub fn custom_placeholder(now: DateTime<Utc>) -> TemplatePlaceholder {
    let mut p = text(&format!("custom_{}", now.timestamp_millis()), 100.0, 100.0, 10.0);
    p.align = Some(TextAlign::Left);
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_table() {
        let minimalist = layout_for(TemplateKind::Minimalist).unwrap();
        assert_eq!(minimalist.table, TableStyle::Grid);
        assert_eq!(minimalist.header, HeaderStyle::Letterhead);

        let corporate = layout_for(TemplateKind::Corporate).unwrap();
        assert_eq!(corporate.header, HeaderStyle::SidePanel);
        assert_eq!(corporate.content_x(), 60.0);
        assert_eq!(corporate.content_width(210.0), 140.0);

        let modern = layout_for(TemplateKind::Modern).unwrap();
        assert_eq!(modern.content_width(210.0), 182.0);

        assert!(layout_for(TemplateKind::Creative).unwrap().watermark);
        assert!(!layout_for(TemplateKind::Classic).unwrap().watermark);
        assert!(layout_for(TemplateKind::Custom).is_none());
    }

    #[test]
    fn test_accent_hex_matches_color() {
        for accent in AccentColor::ALL {
            assert_eq!(Color::from_hex(accent.hex()), Some(accent.color()));
            assert_eq!(accent.color().to_hex(), accent.hex());
        }
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GGGGGG"), None);
        assert_eq!(Color::from_hex("ffffff"), Some(Color::WHITE));
    }

    #[test]
    fn test_default_placeholders_cover_required_ids() {
        let ids: Vec<String> = default_placeholders().into_iter().map(|p| p.id).collect();
        for required in ["companyName", "documentNumber", "customerName", "total"] {
            assert!(ids.iter().any(|id| id == required), "missing {}", required);
        }
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn test_catalog_excludes_custom() {
        assert_eq!(catalog().len(), 5);
        assert!(catalog().iter().all(|t| t.kind != TemplateKind::Custom));
    }
}
