//! # Built-in Document Renderer
//!
//! Lays out a quotation or invoice on A4 using one of the five built-in
//! templates.
//!
//! ## Page Layout (mm)
//! ```text
//! ┌───────────────────────────────────────────────┐ 0
//! │ header (banner / side panel / letterhead)     │
//! │                                               │ 40
//! │ BILL TO:                  QUOTATION #: q-1    │ 70
//! │ customer name                 Date: 2024-07-28│ 75
//! │ customer address          (Due Date: invoice) │ 80
//! │ ┌───────────────────────────────────────────┐ │ 90
//! │ │ items table (paginates, header repeats)   │ │
//! │ └───────────────────────────────────────────┘ │
//! │                         Subtotal:    $250.00  │ end + 10
//! │                       VAT (7.5%):     $18.75  │
//! │                           Total:     $268.75  │
//! │ Terms & Conditions                            │ end + 30
//! │ wrapped terms ...                             │
//! └───────────────────────────────────────────────┘ 297 (bottom margin 20)
//! ```

use suite_core::templates::{layout_for, Color, HeaderStyle, TemplateLayout, PAGE_MARGIN};
use suite_core::types::{
    AccentColor, BillingDocument, CompanyDetails, TemplateKind, TextAlign,
};
use tracing::debug;

use crate::assets::AssetBundle;
use crate::error::{DocError, DocResult};
use crate::metrics::{line_height_mm, wrap_text, Font};
use crate::surface::{DrawOp, RectOp, Surface, TextOp};
use crate::table::{draw_items_table, TableFrame, TableTheme};

/// Space kept free at the bottom of every page.
pub const BOTTOM_MARGIN: f64 = 20.0;
/// Where content resumes on continuation pages.
pub const CONTINUATION_TOP: f64 = 20.0;

const BODY_TOP: f64 = 70.0;
const TABLE_TOP: f64 = 90.0;
const BANNER_HEIGHT: f64 = 40.0;
const WATERMARK_SIZE: f64 = 80.0;

/// Renders `doc` with a built-in template.
///
/// `template` and `accent` are passed separately so a caller can preview a
/// document in a style other than the one stored on it. `Custom` is refused
/// with [`DocError::CustomTemplateRequired`].
pub fn render(
    doc: &dyn BillingDocument,
    company: &CompanyDetails,
    template: TemplateKind,
    accent: AccentColor,
    assets: &AssetBundle,
) -> DocResult<Surface> {
    let layout = layout_for(template).ok_or(DocError::CustomTemplateRequired)?;
    let accent = accent.color();
    let mut surface = Surface::a4();

    if layout.watermark {
        draw_watermark(&mut surface, &company.name);
    }

    match layout.header {
        HeaderStyle::Banner => draw_banner(&mut surface, doc, company, accent, assets),
        HeaderStyle::SidePanel => draw_side_panel(&mut surface, 0, company, accent, assets),
        HeaderStyle::Letterhead => draw_letterhead(&mut surface, doc, company, accent, assets),
    }

    draw_body(&mut surface, doc, company, &layout, accent, assets);

    debug!(
        id = doc.id(),
        template = %template,
        pages = surface.page_count(),
        "Document laid out"
    );
    Ok(surface)
}

// =============================================================================
// Headers
// =============================================================================

fn draw_logo(
    surface: &mut Surface,
    company: &CompanyDetails,
    assets: &AssetBundle,
    x: f64,
    y: f64,
    max_width: f64,
    max_height: f64,
) {
    if company.logo_url.is_empty() {
        return;
    }
    match assets.image(&company.logo_url) {
        Some(asset) => {
            let (width, height) = asset.fit_within(max_width, max_height);
            surface.image(asset.clone(), x, y, width, height);
        }
        None => debug!("Logo unavailable, header drawn without it"),
    }
}

fn draw_watermark(surface: &mut Surface, name: &str) {
    if name.trim().is_empty() {
        return;
    }
    let op = TextOp::new(name, 0.0, 0.0, WATERMARK_SIZE)
        .bold()
        .color(Color::gray(235))
        .rotated(-45.0);
    let half = op.width() / 2.0;
    let step = std::f64::consts::FRAC_1_SQRT_2;
    let cx = surface.width / 2.0;
    let cy = surface.height / 2.0;
    surface.text(TextOp {
        x: cx - half * step,
        y: cy - half * step,
        ..op
    });
}

fn draw_banner(
    surface: &mut Surface,
    doc: &dyn BillingDocument,
    company: &CompanyDetails,
    accent: Color,
    assets: &AssetBundle,
) {
    let width = surface.width;
    surface.rect(RectOp::filled(0.0, 0.0, width, BANNER_HEIGHT, accent));
    draw_logo(surface, company, assets, PAGE_MARGIN, 15.0, 30.0, 10.0);
    surface.text(
        TextOp::new(doc.kind().title(), width - PAGE_MARGIN, 25.0, 22.0)
            .bold()
            .color(Color::WHITE)
            .align(TextAlign::Right),
    );
    surface.text(
        TextOp::new(company.name.clone(), PAGE_MARGIN, 32.0, 10.0)
            .bold()
            .color(Color::WHITE),
    );
}

/// Accent column down the left edge with the company block centred in it.
fn draw_side_panel(
    surface: &mut Surface,
    page: usize,
    company: &CompanyDetails,
    accent: Color,
    assets: &AssetBundle,
) {
    const PANEL_TEXT_WIDTH: f64 = 40.0;
    let center = suite_core::templates::SIDE_PANEL_WIDTH / 2.0;
    let height = surface.height;
    surface.push_to(
        page,
        DrawOp::Rect(RectOp::filled(
            0.0,
            0.0,
            suite_core::templates::SIDE_PANEL_WIDTH,
            height,
            accent,
        )),
    );
    if page > 0 {
        return;
    }

    draw_logo(surface, company, assets, PAGE_MARGIN, 15.0, 22.0, 22.0);

    let blocks = [
        (company.name.as_str(), Font::Bold, 45.0),
        (company.address.as_str(), Font::Regular, 55.0),
        (company.contact.as_str(), Font::Regular, 75.0),
    ];
    for (text, font, top) in blocks {
        for (i, line) in wrap_text(text, font, 10.0, PANEL_TEXT_WIDTH).into_iter().enumerate() {
            surface.text(
                TextOp::new(line, center, top + i as f64 * line_height_mm(10.0), 10.0)
                    .font(font)
                    .color(Color::WHITE)
                    .align(TextAlign::Center),
            );
        }
    }
}

fn draw_letterhead(
    surface: &mut Surface,
    doc: &dyn BillingDocument,
    company: &CompanyDetails,
    accent: Color,
    assets: &AssetBundle,
) {
    let width = surface.width;
    draw_logo(surface, company, assets, PAGE_MARGIN, 15.0, 30.0, 10.0);
    surface.text(
        TextOp::new(doc.kind().title(), width - PAGE_MARGIN, 25.0, 20.0)
            .bold()
            .color(accent)
            .align(TextAlign::Right),
    );
    surface.text(TextOp::new(company.name.clone(), PAGE_MARGIN, 32.0, 10.0));
    surface.text(TextOp::new(company.address.clone(), PAGE_MARGIN, 37.0, 10.0));
}

// =============================================================================
// Body
// =============================================================================

fn draw_body(
    surface: &mut Surface,
    doc: &dyn BillingDocument,
    company: &CompanyDetails,
    layout: &TemplateLayout,
    accent: Color,
    assets: &AssetBundle,
) {
    let muted = Color::gray(100);
    let x = layout.content_x();
    let width = layout.content_width(surface.width);
    let right = x + width;
    let bottom = surface.height - BOTTOM_MARGIN;

    surface.text(TextOp::new("BILL TO:", x, BODY_TOP, 10.0).bold().color(muted));
    surface.text(TextOp::new(doc.customer().name.clone(), x, BODY_TOP + 5.0, 10.0).color(muted));
    surface.text(TextOp::new(doc.customer().address.clone(), x, BODY_TOP + 10.0, 10.0).color(muted));

    let mut meta = vec![
        format!("{} #: {}", doc.kind().title(), doc.id()),
        format!("Date: {}", doc.date().format("%Y-%m-%d")),
    ];
    if let Some(due) = doc.due_date() {
        meta.push(format!("Due Date: {}", due.format("%Y-%m-%d")));
    }
    for (i, line) in meta.into_iter().enumerate() {
        surface.text(
            TextOp::new(line, right, BODY_TOP + i as f64 * 5.0, 12.0)
                .color(muted)
                .align(TextAlign::Right),
        );
    }

    let side_panel = layout.header == HeaderStyle::SidePanel;
    let mut on_new_page = |surface: &mut Surface, page: usize| {
        if side_panel {
            draw_side_panel(surface, page, company, accent, assets);
        }
    };
    let end = draw_items_table(
        surface,
        doc.items(),
        &TableTheme::built_in(layout.table, accent),
        TableFrame {
            x,
            width,
            page: 0,
            y: TABLE_TOP,
            continuation_top: CONTINUATION_TOP,
            bottom,
        },
        &mut on_new_page,
    );

    // Totals: labels right-aligned 30 mm left of the amounts.
    let amount_x = surface.width - 15.0;
    let label_x = amount_x - 30.0;
    let mut page = end.page;
    let mut top = end.y + 10.0;
    if top + 14.0 > bottom {
        page = new_page(surface, &mut on_new_page);
        top = CONTINUATION_TOP + 10.0;
    }

    let rows = [
        ("Subtotal:".to_string(), doc.subtotal().to_string(), 0.0, 10.0, Font::Regular),
        (format!("VAT ({}%):", doc.vat_rate()), doc.vat().to_string(), 7.0, 10.0, Font::Regular),
        ("Total:".to_string(), doc.total().to_string(), 14.0, 12.0, Font::Bold),
    ];
    // Rule between VAT and the grand total.
    let rule_y = top + 9.5;
    surface.line(page, (label_x - 25.0, rule_y), (amount_x, rule_y), muted, 0.3);
    for (label, amount, offset, size, font) in rows {
        for (text, anchor) in [(label, label_x), (amount, amount_x)] {
            surface.push_to(
                page,
                DrawOp::Text(
                    TextOp::new(text, anchor, top + offset, size)
                        .font(font)
                        .color(muted)
                        .align(TextAlign::Right),
                ),
            );
        }
    }

    // Terms follow the totals, or start a fresh page when they do not fit.
    let terms = wrap_text(doc.terms(), Font::Regular, 8.0, width);
    if terms.is_empty() {
        return;
    }
    let terms_height = 5.0 + terms.len() as f64 * line_height_mm(8.0);
    let mut heading_y = top + 30.0;
    if heading_y + terms_height > bottom {
        page = new_page(surface, &mut on_new_page);
        heading_y = CONTINUATION_TOP + 5.0;
    }

    let faint = Color::gray(150);
    surface.push_to(
        page,
        DrawOp::Text(TextOp::new("Terms & Conditions", x, heading_y, 8.0).bold().color(faint)),
    );
    for (i, line) in terms.into_iter().enumerate() {
        let y = heading_y + 5.0 + i as f64 * line_height_mm(8.0);
        surface.push_to(page, DrawOp::Text(TextOp::new(line, x, y, 8.0).color(faint)));
    }
}

fn new_page(surface: &mut Surface, on_new_page: &mut dyn FnMut(&mut Surface, usize)) -> usize {
    let page = surface.add_page();
    on_new_page(surface, page);
    page
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::png_asset;
    use crate::assets::AssetFetch;
    use crate::surface::LineOp;
    use chrono::NaiveDate;
    use suite_core::money::Rate;
    use suite_core::types::{Customer, Invoice, LineItem, Quotation};

    fn quotation() -> Quotation {
        Quotation::new(
            "q-1",
            Customer::new("Tech Solutions", "123 Tech Avenue, Silicon Valley, CA 94043"),
            NaiveDate::from_ymd_opt(2024, 7, 28).unwrap(),
            vec![LineItem::priced("Widget", 2.0, 100.0, 25.0)],
            Rate::from_percent(7.5),
            Rate::from_percent(5.0),
        )
    }

    fn invoice(lines: usize) -> Invoice {
        let items = (0..lines)
            .map(|i| LineItem::direct(format!("Service {}", i + 1), 1.0, 100.0))
            .collect();
        Invoice::new(
            "inv-1",
            Customer::new("Global Corp", "456 Business Blvd"),
            NaiveDate::from_ymd_opt(2024, 7, 26).unwrap(),
            30,
            items,
            Rate::from_percent(7.5),
        )
    }

    #[test]
    fn test_quotation_totals_block() {
        let surface = render(
            &quotation(),
            &CompanyDetails::default(),
            TemplateKind::Classic,
            AccentColor::Teal,
            &AssetBundle::default(),
        )
        .unwrap();

        assert_eq!(surface.page_count(), 1);
        for text in [
            "QUOTATION",
            "QUOTATION #: q-1",
            "Date: 2024-07-28",
            "BILL TO:",
            "Subtotal:",
            "$250.00",
            "VAT (7.5%):",
            "$18.75",
            "Total:",
            "$268.75",
            "Terms & Conditions",
        ] {
            assert!(surface.contains_text(text), "missing {}", text);
        }
        assert!(!surface.text_content().iter().any(|t| t.starts_with("Due Date")));

        let rules: Vec<&LineOp> = surface.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Line(line) => Some(line),
                _ => None,
            })
            .collect();
        assert_eq!(rules.len(), 1);
        let total_y = surface.pages[0].texts().find(|t| t.text == "Total:").unwrap().y;
        assert!(rules[0].y1 < total_y && rules[0].y1 == rules[0].y2);
    }

    #[test]
    fn test_invoice_shows_due_date() {
        let surface = render(
            &invoice(1),
            &CompanyDetails::default(),
            TemplateKind::Minimalist,
            AccentColor::Slate,
            &AssetBundle::default(),
        )
        .unwrap();
        assert!(surface.contains_text("INVOICE #: inv-1"));
        assert!(surface.contains_text("Due Date: 2024-08-25"));
    }

    #[test]
    fn test_banner_and_side_panel_use_accent() {
        for (kind, expected_width) in [(TemplateKind::Modern, 210.0), (TemplateKind::Corporate, 50.0)] {
            let surface = render(
                &quotation(),
                &CompanyDetails::default(),
                kind,
                AccentColor::Crimson,
                &AssetBundle::default(),
            )
            .unwrap();
            let first = &surface.pages[0].ops[0];
            match first {
                DrawOp::Rect(rect) => {
                    assert_eq!(rect.width, expected_width);
                    assert_eq!(rect.fill, Some(AccentColor::Crimson.color()));
                }
                other => panic!("expected accent rect, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_creative_watermark_is_rotated() {
        let surface = render(
            &quotation(),
            &CompanyDetails::default(),
            TemplateKind::Creative,
            AccentColor::Teal,
            &AssetBundle::default(),
        )
        .unwrap();
        let watermark = surface.pages[0]
            .texts()
            .find(|t| t.size == WATERMARK_SIZE)
            .expect("watermark");
        assert_eq!(watermark.text, "Streamline Suite");
        assert_eq!(watermark.rotation, -45.0);
    }

    #[test]
    fn test_custom_is_refused() {
        let result = render(
            &quotation(),
            &CompanyDetails::default(),
            TemplateKind::Custom,
            AccentColor::Teal,
            &AssetBundle::default(),
        );
        assert!(matches!(result, Err(DocError::CustomTemplateRequired)));
    }

    #[test]
    fn test_logo_drawn_only_when_loaded() {
        let company = CompanyDetails {
            logo_url: "https://example.com/logo.png".to_string(),
            ..CompanyDetails::default()
        };

        let missing = render(&quotation(), &company, TemplateKind::Classic, AccentColor::Teal, &AssetBundle::default()).unwrap();
        assert_eq!(missing.pages[0].images().count(), 0);

        let mut assets = AssetBundle::default();
        assets.insert(company.logo_url.clone(), AssetFetch::Loaded(png_asset(300, 100)));
        let loaded = render(&quotation(), &company, TemplateKind::Classic, AccentColor::Teal, &assets).unwrap();
        let logo = loaded.pages[0].images().next().expect("logo");
        assert_eq!((logo.x, logo.y), (14.0, 15.0));
        assert!((logo.width - 30.0).abs() < 1e-9);
        assert!((logo.height - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_invoice_paginates() {
        let surface = render(
            &invoice(80),
            &CompanyDetails::default(),
            TemplateKind::Corporate,
            AccentColor::Blue,
            &AssetBundle::default(),
        )
        .unwrap();

        assert!(surface.page_count() >= 3);
        for page in &surface.pages {
            assert!(matches!(&page.ops[0], DrawOp::Rect(r) if r.width == 50.0));
            if page.texts().any(|t| t.text.starts_with("Service")) {
                assert_eq!(page.texts().filter(|t| t.text == "Description").count(), 1);
            }
        }
        let last = surface.pages.last().unwrap();
        assert!(last.texts().any(|t| t.text == "Total:"));
        assert!(surface.contains_text("Service 80"));
    }
}
