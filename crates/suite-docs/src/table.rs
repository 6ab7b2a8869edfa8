//! # Items Table
//!
//! Lays out document line items as a paginated table on a [`Surface`].
//!
//! ## Pagination
//! ```text
//!   page n                         page n+1
//!  ┌──────────────────────┐       ┌──────────────────────┐
//!  │ ...                  │       │ (on_new_page hook)   │
//!  │ ┌──┬────────┬──┬───┐ │       │ ┌──┬────────┬──┬───┐ │ ◄ header repeated
//!  │ │# │Descr.  │..│Tot│ │       │ │# │Descr.  │..│Tot│ │
//!  │ ├──┼────────┼──┼───┤ │       │ ├──┼────────┼──┼───┤ │
//!  │ │1 │...     │  │   │ │       │ │3 │...     │  │   │ │ ◄ row moved whole
//!  │ │2 │...     │  │   │ │       │ │4 │tail of │  │   │ │ ◄ or split by lines
//!  ├─┴──┴────────┴──┴───┴─┤ bottom│ │  │a tall  │  │   │ │   when taller than
//!  └──────────────────────┘       └──────────────────────┘   a whole page
//! ```
//!
//! All geometry is in millimetres. Callers working in points convert first.

use suite_core::money::sanitize_non_negative;
use suite_core::templates::{Color, TableStyle};
use suite_core::types::{LineItem, TextAlign};

use crate::metrics::{ascent_mm, line_height_mm, wrap_text, Font, PT_TO_MM};
use crate::surface::{DrawOp, RectOp, Surface, TextOp};

// =============================================================================
// Columns
// =============================================================================

/// A table column: header label, share of the table width, alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub header: &'static str,
    pub weight: f64,
    pub align: TextAlign,
}

/// Columns shared by every layout.
pub const COLUMNS: [Column; 6] = [
    Column {
        header: "#",
        weight: 0.06,
        align: TextAlign::Left,
    },
    Column {
        header: "Description",
        weight: 0.38,
        align: TextAlign::Left,
    },
    Column {
        header: "Quantity",
        weight: 0.10,
        align: TextAlign::Right,
    },
    Column {
        header: "SKU",
        weight: 0.14,
        align: TextAlign::Left,
    },
    Column {
        header: "Unit Price",
        weight: 0.16,
        align: TextAlign::Right,
    },
    Column {
        header: "Total",
        weight: 0.16,
        align: TextAlign::Right,
    },
];

/// Cell texts for one line item (`index` is 0-based).
pub fn item_cells(index: usize, item: &LineItem) -> [String; 6] {
    [
        (index + 1).to_string(),
        item.description.clone(),
        sanitize_non_negative(item.quantity).to_string(),
        item.sku.clone().unwrap_or_default(),
        item.unit_price.to_string(),
        item.line_total().to_string(),
    ]
}

// =============================================================================
// Theme
// =============================================================================

/// Visual styling of a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableTheme {
    pub header_fill: Color,
    pub header_text: Color,
    pub header_size: f64,
    pub body_size: f64,
    pub body_text: Color,
    /// Fill of every other body row.
    pub stripe: Option<Color>,
    /// Cell border colour and thickness in points.
    pub grid: Option<(Color, f64)>,
    /// Cell padding in millimetres.
    pub padding: f64,
}

impl TableTheme {
    /// Theme of the built-in templates: accent header, striped or grid body.
    pub fn built_in(style: TableStyle, accent: Color) -> Self {
        let (stripe, grid) = match style {
            TableStyle::Striped => (Some(Color::gray(245)), None),
            TableStyle::Grid => (None, Some((Color::gray(200), 0.1))),
        };
        TableTheme {
            header_fill: accent,
            header_text: Color::WHITE,
            header_size: 10.0,
            body_size: 10.0,
            body_text: Color::gray(80),
            stripe,
            grid,
            padding: 1.8,
        }
    }

    /// Neutral theme used on uploaded templates.
    pub fn custom() -> Self {
        TableTheme {
            header_fill: Color::rgb(0xF8, 0xF9, 0xFA),
            header_text: Color::gray(0x33),
            header_size: 10.0,
            body_size: 9.0,
            body_text: Color::gray(0x33),
            stripe: Some(Color::rgb(0xF8, 0xF9, 0xFA)),
            grid: Some((Color::gray(0xDD), 0.1)),
            padding: 4.0 * PT_TO_MM,
        }
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Where a table may be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableFrame {
    pub x: f64,
    pub width: f64,
    /// Page the table starts on.
    pub page: usize,
    /// Top of the table on its first page.
    pub y: f64,
    /// Top of the table on continuation pages.
    pub continuation_top: f64,
    /// Lowest y any row may reach.
    pub bottom: f64,
}

/// Where the table ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableEnd {
    pub page: usize,
    pub y: f64,
}

struct Row {
    cells: Vec<Vec<String>>,
}

impl Row {
    fn line_count(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0).max(1)
    }
}

struct Cursor<'a> {
    surface: &'a mut Surface,
    frame: TableFrame,
    theme: &'a TableTheme,
    widths: Vec<f64>,
    page: usize,
    y: f64,
}

impl Cursor<'_> {
    fn row_height(&self, lines: usize, size: f64) -> f64 {
        lines as f64 * line_height_mm(size) + 2.0 * self.theme.padding
    }

    fn header_height(&self) -> f64 {
        self.row_height(1, self.theme.header_size)
    }

    fn remaining(&self) -> f64 {
        self.frame.bottom - self.y
    }

    fn next_page(&mut self, on_new_page: &mut dyn FnMut(&mut Surface, usize)) {
        self.page += 1;
        if self.page >= self.surface.page_count() {
            self.surface.add_page();
            on_new_page(self.surface, self.page);
        }
        self.y = self.frame.continuation_top;
        self.draw_header();
    }

    fn draw_header(&mut self) {
        let height = self.header_height();
        let theme = *self.theme;
        self.surface.push_to(
            self.page,
            DrawOp::Rect(RectOp::filled(
                self.frame.x,
                self.y,
                self.frame.width,
                height,
                theme.header_fill,
            )),
        );
        let cells: Vec<Vec<String>> = COLUMNS.iter().map(|c| vec![c.header.to_string()]).collect();
        self.draw_cells(&cells, 0, 1, height, Font::Bold, theme.header_size, theme.header_text);
        self.y += height;
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_cells(
        &mut self,
        cells: &[Vec<String>],
        from: usize,
        to: usize,
        height: f64,
        font: Font,
        size: f64,
        color: Color,
    ) {
        let padding = self.theme.padding;
        let line_height = line_height_mm(size);
        let mut cell_x = self.frame.x;

        for (i, column) in COLUMNS.iter().enumerate() {
            let width = self.widths[i];

            if let Some((grid, thickness)) = self.theme.grid {
                self.surface.push_to(
                    self.page,
                    DrawOp::Rect(RectOp::outlined(cell_x, self.y, width, height, grid, thickness)),
                );
            }

            let anchor = match column.align {
                TextAlign::Left => cell_x + padding,
                TextAlign::Center => cell_x + width / 2.0,
                TextAlign::Right => cell_x + width - padding,
            };
            let lines = cells.get(i).map(Vec::as_slice).unwrap_or_default();
            let end = to.min(lines.len());
            for (n, line) in lines.iter().enumerate().take(end).skip(from) {
                let baseline = self.y + padding + ascent_mm(size) + (n - from) as f64 * line_height;
                let op = TextOp::new(line.clone(), anchor, baseline, size)
                    .font(font)
                    .color(color)
                    .align(column.align);
                self.surface.push_to(self.page, DrawOp::Text(op));
            }

            cell_x += width;
        }
    }

    fn draw_row_segment(&mut self, row: &Row, striped: bool, from: usize, to: usize) {
        let theme = *self.theme;
        let height = self.row_height(to - from, theme.body_size);
        if let (true, Some(fill)) = (striped, theme.stripe) {
            self.surface.push_to(
                self.page,
                DrawOp::Rect(RectOp::filled(self.frame.x, self.y, self.frame.width, height, fill)),
            );
        }
        self.draw_cells(&row.cells, from, to, height, Font::Regular, theme.body_size, theme.body_text);
        self.y += height;
    }
}

/// Draws the items table and returns where it ended.
///
/// `on_new_page` runs once for every page the table appends, before the
/// repeated header is drawn on it. Pages that already exist are reused.
pub fn draw_items_table(
    surface: &mut Surface,
    items: &[LineItem],
    theme: &TableTheme,
    frame: TableFrame,
    on_new_page: &mut dyn FnMut(&mut Surface, usize),
) -> TableEnd {
    let widths: Vec<f64> = COLUMNS.iter().map(|c| c.weight * frame.width).collect();
    let rows: Vec<Row> = items
        .iter()
        .enumerate()
        .map(|(i, item)| Row {
            cells: item_cells(i, item)
                .iter()
                .zip(&widths)
                .map(|(text, width)| {
                    let lines = wrap_text(text, Font::Regular, theme.body_size, width - 2.0 * theme.padding);
                    if lines.is_empty() {
                        vec![String::new()]
                    } else {
                        lines
                    }
                })
                .collect(),
        })
        .collect();

    let mut cursor = Cursor {
        surface,
        frame,
        theme,
        widths,
        page: frame.page,
        y: frame.y,
    };

    if cursor.remaining() < cursor.header_height() + cursor.row_height(1, theme.body_size) {
        cursor.page += 1;
        if cursor.page >= cursor.surface.page_count() {
            cursor.surface.add_page();
            on_new_page(cursor.surface, cursor.page);
        }
        cursor.y = frame.continuation_top;
    }
    cursor.draw_header();

    let line_height = line_height_mm(theme.body_size);
    let mut page_has_rows = false;
    for (index, row) in rows.iter().enumerate() {
        let striped = index % 2 == 1;
        let total = row.line_count();
        let full_height = cursor.row_height(total, theme.body_size);
        let fresh_page_room = frame.bottom - frame.continuation_top - cursor.header_height();

        if full_height > cursor.remaining() && full_height <= fresh_page_room {
            cursor.next_page(on_new_page);
            page_has_rows = false;
        }

        let mut drawn = 0;
        while drawn < total {
            let room = cursor.remaining() - 2.0 * theme.padding;
            let mut fit = ((room / line_height).floor().max(0.0) as usize).min(total - drawn);
            if fit == 0 && page_has_rows {
                cursor.next_page(on_new_page);
                page_has_rows = false;
                continue;
            }
            // A page too short for one line still takes one, clipped at the edge.
            fit = fit.max(1);
            cursor.draw_row_segment(row, striped, drawn, drawn + fit);
            page_has_rows = true;
            drawn += fit;
        }
    }

    TableEnd {
        page: cursor.page,
        y: cursor.y,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> TableFrame {
        TableFrame {
            x: 14.0,
            width: 182.0,
            page: 0,
            y: 90.0,
            continuation_top: 20.0,
            bottom: 277.0,
        }
    }

    fn items(n: usize) -> Vec<LineItem> {
        (0..n)
            .map(|i| LineItem::direct(format!("Item {}", i + 1), 1.0, 10.0))
            .collect()
    }

    fn header_count(surface: &Surface, page: usize) -> usize {
        surface.pages[page].texts().filter(|t| t.text == "Description").count()
    }

    #[test]
    fn test_cells() {
        let item = LineItem::direct("Network Security Audit", 2.0, 4000.0).with_sku("SEC-01");
        let cells = item_cells(0, &item);
        assert_eq!(cells[0], "1");
        assert_eq!(cells[2], "2");
        assert_eq!(cells[3], "SEC-01");
        assert_eq!(cells[4], "$4000.00");
        assert_eq!(cells[5], "$8000.00");

        let fractional = LineItem::direct("Hours", 2.5, 10.0);
        assert_eq!(item_cells(1, &fractional)[2], "2.5");
    }

    #[test]
    fn test_empty_table_draws_header_only() {
        let mut surface = Surface::a4();
        let end = draw_items_table(
            &mut surface,
            &[],
            &TableTheme::built_in(TableStyle::Striped, Color::BLACK),
            frame(),
            &mut |_, _| {},
        );
        assert_eq!(end.page, 0);
        assert!(end.y > 90.0);
        assert_eq!(surface.text_content(), COLUMNS.map(|c| c.header).to_vec());
    }

    #[test]
    fn test_long_table_repeats_header() {
        let mut surface = Surface::a4();
        let mut hooked = Vec::new();
        let end = draw_items_table(
            &mut surface,
            &items(60),
            &TableTheme::built_in(TableStyle::Grid, Color::BLACK),
            frame(),
            &mut |_, page| hooked.push(page),
        );

        assert!(surface.page_count() >= 2);
        assert_eq!(end.page, surface.page_count() - 1);
        assert_eq!(hooked.len(), surface.page_count() - 1);
        for page in 0..surface.page_count() {
            assert_eq!(header_count(&surface, page), 1);
        }
        for text in surface.pages[0].texts().chain(surface.pages[1].texts()) {
            assert!(text.y <= 277.0);
        }
        assert!(surface.contains_text("Item 60"));
    }

    #[test]
    fn test_tall_row_is_split_across_pages() {
        let description = "word ".repeat(900);
        let mut surface = Surface::a4();
        draw_items_table(
            &mut surface,
            &[LineItem::direct(description, 1.0, 1.0)],
            &TableTheme::built_in(TableStyle::Striped, Color::BLACK),
            frame(),
            &mut |_, _| {},
        );
        assert!(surface.page_count() >= 2);
        assert!(surface.pages[1].texts().any(|t| t.text.starts_with("word")));
    }

    #[test]
    fn test_short_page_draws_one_line_per_page() {
        let short = TableFrame {
            x: 4.0,
            width: 290.0,
            page: 0,
            y: 4.0,
            continuation_top: 4.0,
            bottom: 31.0,
        };
        let mut surface = Surface::new(297.0, 35.0);
        draw_items_table(
            &mut surface,
            &items(6),
            &TableTheme::custom(),
            short,
            &mut |_, _| {},
        );

        // At most the first page plus one page per row.
        assert!(surface.page_count() <= 7);
        assert!(surface.contains_text("Item 1"));
        assert!(surface.contains_text("Item 6"));
    }

    #[test]
    fn test_existing_pages_are_reused() {
        let mut surface = Surface::a4();
        surface.add_page();
        surface.add_page();
        let mut hooked = 0;
        draw_items_table(
            &mut surface,
            &items(60),
            &TableTheme::custom(),
            frame(),
            &mut |_, _| hooked += 1,
        );
        assert_eq!(surface.page_count(), 3);
        assert_eq!(hooked, 0);
    }
}
