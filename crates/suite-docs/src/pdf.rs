//! # PDF Backend
//!
//! Writes a [`Surface`] to PDF bytes with printpdf.
//!
//! The surface measures y downward from the top of the page; PDF measures it
//! upward from the bottom. Every coordinate is flipped here and nowhere else.

use std::io::BufWriter;

use printpdf::image_crate::{self, DynamicImage};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color as PdfColor, Image, ImageTransform, IndirectFontRef, Line, Mm,
    PdfDocument, PdfLayerReference, Point, Pt, Rect, Rgb, TextMatrix,
};
use suite_core::templates::Color;
use tracing::warn;

use crate::assets::ImageAsset;
use crate::error::{DocError, DocResult};
use crate::metrics::Font;
use crate::surface::{DrawOp, ImageOp, LineOp, RectOp, Surface, TextOp};

const IMAGE_DPI: f32 = 300.0;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        }
    }
}

fn pdf_color(color: Color) -> PdfColor {
    let (r, g, b) = color.to_unit();
    PdfColor::Rgb(Rgb::new(r, g, b, None))
}

fn mm(value: f64) -> Mm {
    Mm(value as f32)
}

/// Serializes `surface` into a PDF document titled `title`.
pub fn write_pdf(surface: &Surface, title: &str) -> DocResult<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, mm(surface.width), mm(surface.height), "Layer 1");

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DocError::Pdf(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| DocError::Pdf(e.to_string()))?,
    };

    for (index, page) in surface.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(mm(surface.width), mm(surface.height), format!("Layer {}", index + 1));
            doc.get_page(page_index).get_layer(layer_index)
        };

        for op in &page.ops {
            match op {
                DrawOp::Rect(rect) => draw_rect(&layer, rect, surface.height),
                DrawOp::Line(line) => draw_line(&layer, line, surface.height),
                DrawOp::Text(text) => draw_text(&layer, &fonts, text, surface.height),
                DrawOp::Image(image) => draw_image(&layer, image, surface.height),
            }
        }
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| DocError::Pdf(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| DocError::Pdf(e.to_string()))
}

fn draw_rect(layer: &PdfLayerReference, op: &RectOp, page_height: f64) {
    let lower_left_y = page_height - op.y - op.height;
    let upper_right_y = page_height - op.y;
    let rect = Rect::new(mm(op.x), mm(lower_left_y), mm(op.x + op.width), mm(upper_right_y));

    match (op.fill, op.stroke) {
        (Some(fill), Some((stroke, thickness))) => {
            layer.set_fill_color(pdf_color(fill));
            layer.set_outline_color(pdf_color(stroke));
            layer.set_outline_thickness(thickness as f32);
            layer.add_rect(rect.with_mode(PaintMode::FillStroke));
        }
        (Some(fill), None) => {
            layer.set_fill_color(pdf_color(fill));
            layer.add_rect(rect.with_mode(PaintMode::Fill));
        }
        (None, Some((stroke, thickness))) => {
            layer.set_outline_color(pdf_color(stroke));
            layer.set_outline_thickness(thickness as f32);
            layer.add_rect(rect.with_mode(PaintMode::Stroke));
        }
        (None, None) => {}
    }
}

fn draw_line(layer: &PdfLayerReference, op: &LineOp, page_height: f64) {
    layer.set_outline_color(pdf_color(op.color));
    layer.set_outline_thickness(op.thickness as f32);
    layer.add_line(Line {
        points: vec![
            (Point::new(mm(op.x1), mm(page_height - op.y1)), false),
            (Point::new(mm(op.x2), mm(page_height - op.y2)), false),
        ],
        is_closed: false,
    });
}

fn draw_text(layer: &PdfLayerReference, fonts: &Fonts, op: &TextOp, page_height: f64) {
    if op.text.is_empty() {
        return;
    }
    let font = fonts.get(op.font);
    let y = page_height - op.y;
    layer.set_fill_color(pdf_color(op.color));

    if op.rotation == 0.0 {
        layer.use_text(op.text.as_str(), op.size as f32, mm(op.x), mm(y), font);
        return;
    }

    layer.begin_text_section();
    layer.set_font(font, op.size as f32);
    layer.set_text_matrix(TextMatrix::TranslateRotate(
        Pt::from(mm(op.x)),
        Pt::from(mm(y)),
        op.rotation as f32,
    ));
    layer.write_text(op.text.as_str(), font);
    layer.end_text_section();
}

fn decode(asset: &ImageAsset) -> Result<DynamicImage, String> {
    let decoded = image_crate::load_from_memory(&asset.bytes).map_err(|e| e.to_string())?;
    // Alpha channels are flattened; printpdf embeds RGB only.
    Ok(DynamicImage::ImageRgb8(decoded.to_rgb8()))
}

fn draw_image(layer: &PdfLayerReference, op: &ImageOp, page_height: f64) {
    let decoded = match decode(&op.asset) {
        Ok(decoded) => decoded,
        Err(reason) => {
            warn!(%reason, "Image could not be decoded, leaving it out of the PDF");
            return;
        }
    };

    let natural_width = f64::from(op.asset.width_px.max(1)) / f64::from(IMAGE_DPI) * 25.4;
    let natural_height = f64::from(op.asset.height_px.max(1)) / f64::from(IMAGE_DPI) * 25.4;

    Image::from_dynamic_image(&decoded).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(mm(op.x)),
            translate_y: Some(mm(page_height - op.y - op.height)),
            scale_x: Some((op.width / natural_width) as f32),
            scale_y: Some((op.height / natural_height) as f32),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::png_asset;

    #[test]
    fn test_writes_multi_page_pdf() {
        let mut surface = Surface::a4();
        surface.rect(RectOp::filled(0.0, 0.0, 210.0, 40.0, Color::rgb(20, 184, 166)));
        surface.text(TextOp::new("INVOICE", 196.0, 25.0, 22.0).bold().color(Color::WHITE));
        surface.text(TextOp::new("Acme", 105.0, 148.0, 80.0).rotated(-45.0));
        surface.line(0, (14.0, 50.0), (196.0, 50.0), Color::gray(200), 0.1);
        surface.image(png_asset(20, 10), 14.0, 15.0, 30.0, 15.0);
        surface.add_page();
        surface.rect(RectOp::outlined(14.0, 20.0, 50.0, 10.0, Color::BLACK, 0.1));

        let bytes = write_pdf(&surface, "Invoice-inv-1").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_undecodable_image_is_left_out() {
        let mut surface = Surface::a4();
        let mut asset = png_asset(2, 2);
        asset.bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0].into();
        surface.image(asset, 0.0, 0.0, 10.0, 10.0);
        assert!(write_pdf(&surface, "broken").is_ok());
    }
}
