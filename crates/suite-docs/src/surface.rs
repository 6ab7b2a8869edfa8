//! # Surface
//!
//! The paginated display list every renderer produces.
//!
//! ## Coordinates
//! ```text
//!  (0,0) ──────────────────────► x (mm)
//!    │  ┌──────────────────────┐
//!    │  │ Rect: top-left + w/h │
//!    │  │                      │
//!    │  │ Text: x, y=baseline  │   Text x is already resolved for
//!    │  │                      │   alignment; the backend just draws.
//!    ▼  └──────────────────────┘
//!    y (mm, grows downward)
//! ```
//!
//! A `Surface` is backend-agnostic: [`crate::pdf`] turns it into bytes, and
//! tests inspect it directly through [`Surface::text_content`].

use serde::Serialize;
use suite_core::templates::Color;
use suite_core::types::TextAlign;

use crate::assets::ImageAsset;
use crate::metrics::{text_width_mm, Font};

/// A4 portrait in millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

// =============================================================================
// Draw Operations
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOp {
    pub text: String,
    pub x: f64,
    /// Baseline.
    pub y: f64,
    /// Font size in points.
    pub size: f64,
    #[serde(skip)]
    pub font: Font,
    #[serde(skip)]
    pub color: Color,
    /// Counter-clockwise rotation in degrees around (x, y).
    pub rotation: f64,
}

impl TextOp {
    pub fn new(text: impl Into<String>, x: f64, y: f64, size: f64) -> Self {
        TextOp {
            text: text.into(),
            x,
            y,
            size,
            font: Font::Regular,
            color: Color::BLACK,
            rotation: 0.0,
        }
    }

    pub fn font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    pub fn bold(self) -> Self {
        self.font(Font::Bold)
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Moves `x` so the text is aligned on the anchor it currently holds.
    pub fn align(mut self, align: TextAlign) -> Self {
        let width = text_width_mm(&self.text, self.font, self.size);
        match align {
            TextAlign::Left => {}
            TextAlign::Center => self.x -= width / 2.0,
            TextAlign::Right => self.x -= width,
        }
        self
    }

    /// Rendered width in millimetres.
    pub fn width(&self) -> f64 {
        text_width_mm(&self.text, self.font, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectOp {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip)]
    pub fill: Option<Color>,
    /// Outline colour and thickness in points.
    #[serde(skip)]
    pub stroke: Option<(Color, f64)>,
}

impl RectOp {
    pub fn filled(x: f64, y: f64, width: f64, height: f64, fill: Color) -> Self {
        RectOp {
            x,
            y,
            width,
            height,
            fill: Some(fill),
            stroke: None,
        }
    }

    pub fn outlined(x: f64, y: f64, width: f64, height: f64, color: Color, thickness: f64) -> Self {
        RectOp {
            x,
            y,
            width,
            height,
            fill: None,
            stroke: Some((color, thickness)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineOp {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(skip)]
    pub color: Color,
    /// Thickness in points.
    pub thickness: f64,
}

/// An image stretched into a box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageOp {
    #[serde(skip)]
    pub asset: ImageAsset,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DrawOp {
    Text(TextOp),
    Rect(RectOp),
    Line(LineOp),
    Image(ImageOp),
}

// =============================================================================
// Pages
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &TextOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image(i) => Some(i),
            _ => None,
        })
    }
}

/// A paginated display list. Dimensions are in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    pub pages: Vec<Page>,
}

impl Surface {
    /// A surface with one empty page.
    pub fn new(width: f64, height: f64) -> Self {
        Surface {
            width,
            height,
            pages: vec![Page::default()],
        }
    }

    pub fn a4() -> Self {
        Surface::new(A4_WIDTH_MM, A4_HEIGHT_MM)
    }

    /// Appends an empty page and returns its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.pages.len() - 1
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Draws on the last page.
    pub fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        self.pages[last].ops.push(op);
    }

    /// Draws on a specific page, adding pages as needed.
    pub fn push_to(&mut self, page: usize, op: DrawOp) {
        while self.pages.len() <= page {
            self.pages.push(Page::default());
        }
        self.pages[page].ops.push(op);
    }

    pub fn text(&mut self, op: TextOp) {
        self.push(DrawOp::Text(op));
    }

    pub fn rect(&mut self, op: RectOp) {
        self.push(DrawOp::Rect(op));
    }

    /// Draws a straight line on `page`.
    pub fn line(
        &mut self,
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
        thickness: f64,
    ) {
        self.push_to(
            page,
            DrawOp::Line(LineOp {
                x1: from.0,
                y1: from.1,
                x2: to.0,
                y2: to.1,
                color,
                thickness,
            }),
        );
    }

    pub fn image(&mut self, asset: ImageAsset, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawOp::Image(ImageOp {
            asset,
            x,
            y,
            width,
            height,
        }));
    }

    /// Every text run in drawing order, across all pages.
    pub fn text_content(&self) -> Vec<String> {
        self.pages
            .iter()
            .flat_map(|p| p.texts().map(|t| t.text.clone()))
            .collect()
    }

    /// True if any page holds a text run equal to `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages.iter().any(|p| p.texts().any(|t| t.text == needle))
    }
}
