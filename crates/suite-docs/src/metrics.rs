//! # Text Metrics
//!
//! Widths for the two built-in PDF fonts and greedy word wrapping.
//!
//! Glyph widths come from the standard Helvetica and Helvetica-Bold font
//! metrics (units of 1/1000 em, WinAnsi encoding). Characters outside
//! printable ASCII use the width of `0`.

/// Millimetres per PostScript point.
pub const PT_TO_MM: f64 = 25.4 / 72.0;

/// Line spacing as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.15;

const DEFAULT_WIDTH: u16 = 556;

/// Helvetica, characters 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
    278, 278, 584, 584, 584, 556, 1015, // : - @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A - M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
    278, 278, 278, 469, 556, 333, // [ - `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a - m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n - z
    334, 260, 334, 584, // { - ~
];

/// Helvetica-Bold, characters 32..=126.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
    333, 333, 584, 584, 584, 611, 975, // : - @
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A - M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
    333, 278, 333, 584, 556, 333, // [ - `
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a - m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n - z
    389, 280, 389, 584, // { - ~
];

/// One of the two built-in fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Font {
    #[default]
    Regular,
    Bold,
}

impl Font {
    fn glyph_width(&self, c: char) -> u16 {
        let table = match self {
            Font::Regular => &HELVETICA,
            Font::Bold => &HELVETICA_BOLD,
        };
        let code = c as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            DEFAULT_WIDTH
        }
    }
}

/// Width of `text` in points at `size` pt.
pub fn text_width_pt(text: &str, font: Font, size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(font.glyph_width(c))).sum();
    f64::from(units) * size / 1000.0
}

/// Width of `text` in millimetres at `size` pt.
pub fn text_width_mm(text: &str, font: Font, size: f64) -> f64 {
    text_width_pt(text, font, size) * PT_TO_MM
}

/// Baseline-to-baseline distance in millimetres at `size` pt.
pub fn line_height_mm(size: f64) -> f64 {
    size * LINE_HEIGHT_FACTOR * PT_TO_MM
}

/// Distance from the top of a line box to its baseline, in millimetres.
pub fn ascent_mm(size: f64) -> f64 {
    size * 0.78 * PT_TO_MM
}

/// Splits `text` into lines no wider than `max_width_mm`.
///
/// Explicit newlines always break. Words wider than the limit are broken
/// between characters. Blank input yields no lines.
///
/// ## Example
/// ```rust
/// use suite_docs::metrics::{wrap_text, Font};
///
/// let lines = wrap_text("Payment is due within 30 days", Font::Regular, 10.0, 30.0);
/// assert!(lines.len() > 1);
/// assert_eq!(lines.join(" "), "Payment is due within 30 days");
/// ```
pub fn wrap_text(text: &str, font: Font, size: f64, max_width_mm: f64) -> Vec<String> {
    let mut lines = Vec::new();
    if text.trim().is_empty() {
        return lines;
    }

    for paragraph in text.lines() {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if text_width_mm(&candidate, font, size) <= max_width_mm {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if text_width_mm(word, font, size) <= max_width_mm {
                current = word.to_string();
            } else {
                let mut pieces = break_word(word, font, size, max_width_mm);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        lines.push(current);
    }

    lines
}

fn break_word(word: &str, font: Font, size: f64, max_width_mm: f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.chars() {
        piece.push(c);
        if piece.chars().count() > 1 && text_width_mm(&piece, font, size) > max_width_mm {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        // "A" is 667 units: 667 / 1000 × 10pt
        assert!((text_width_pt("A", Font::Regular, 10.0) - 6.67).abs() < 1e-9);
        assert!((text_width_pt("$268.75", Font::Regular, 10.0) - 36.14).abs() < 1e-9);
        assert!(text_width_pt("Total:", Font::Bold, 12.0) > text_width_pt("Total:", Font::Regular, 12.0));
    }

    #[test]
    fn test_non_ascii_uses_default_width() {
        assert_eq!(text_width_pt("€", Font::Regular, 1000.0), 556.0);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "1. All prices are exclusive of applicable taxes. 2. This quotation is valid for 30 days from the date of issue.";
        let lines = wrap_text(text, Font::Regular, 8.0, 60.0);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(text_width_mm(line, Font::Regular, 8.0) <= 60.0);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_keeps_newlines() {
        let lines = wrap_text("first\nsecond", Font::Regular, 10.0, 100.0);
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn test_long_word_is_broken() {
        let lines = wrap_text(&"W".repeat(40), Font::Bold, 10.0, 20.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "W".repeat(40));
    }

    #[test]
    fn test_blank_text_has_no_lines() {
        assert!(wrap_text("   ", Font::Regular, 10.0, 50.0).is_empty());
    }
}
