//! Thin drawing layer over printpdf: a US-letter document with a vertical
//! cursor that flows onto new pages when content runs out of room.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};

use super::charts::RgbColor;
use crate::errors::ReportError;

pub const PAGE_WIDTH: f32 = 215.9;
pub const PAGE_HEIGHT: f32 = 279.4;
/// Half an inch on every side.
pub const MARGIN: f32 = 12.7;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const PT_TO_MM: f32 = 0.352_778;

pub const BLACK: RgbColor = RgbColor::from_hex(0x000000);
pub const WHITE: RgbColor = RgbColor::from_hex(0xffffff);
pub const GREY: RgbColor = RgbColor::from_hex(0x808080);

fn render_error(context: &str, e: impl std::fmt::Debug) -> ReportError {
    ReportError::RenderError(format!("{context}: {e:?}"))
}

fn pdf_color(color: RgbColor) -> Color {
    let (r, g, b) = color.unit();
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn ring(points: &[(f32, f32)]) -> Vec<(Point, bool)> {
    points
        .iter()
        .map(|(x, y)| (Point::new(Mm(*x), Mm(*y)), false))
        .collect()
}

/// Approximate advance width of Helvetica text in millimetres.
#[must_use]
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let em: f32 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.28,
            'f' | 't' | 'r' | ' ' | '(' | ')' | '-' | '/' => 0.33,
            'm' | 'w' | 'M' | 'W' | '%' | '@' => 0.85,
            c if c.is_ascii_uppercase() => 0.68,
            _ => 0.556,
        })
        .sum();
    let weight = if bold { 1.05 } else { 1.0 };
    em * size * PT_TO_MM * weight
}

pub struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    cursor: f32,
    pages: usize,
}

impl Canvas {
    /// # Errors
    ///
    /// Returns a render error if the built-in fonts cannot be registered.
    pub fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| render_error("font", e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| render_error("font", e))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            cursor: PAGE_HEIGHT - MARGIN,
            pages: 1,
        })
    }

    /// Distance from the bottom of the page to the top of the next element.
    #[must_use]
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    #[must_use]
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn advance(&mut self, height: f32) {
        self.cursor -= height;
    }

    /// Starts a new page unless `height` still fits above the bottom margin.
    /// Returns whether a page was added.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        if self.cursor - height >= MARGIN {
            return false;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
        true
    }

    pub fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32, color: RgbColor) {
        self.fill_polygon(
            &[(x, y), (x + width, y), (x + width, y + height), (x, y + height)],
            color,
        );
    }

    pub fn stroke_rect(
        &self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: RgbColor,
        thickness: f32,
    ) {
        self.polyline(
            &[(x, y), (x + width, y), (x + width, y + height), (x, y + height)],
            color,
            thickness,
            true,
        );
    }

    pub fn fill_polygon(&self, points: &[(f32, f32)], color: RgbColor) {
        if points.len() < 3 {
            return;
        }
        self.layer.set_fill_color(pdf_color(color));
        self.layer.add_polygon(Polygon {
            rings: vec![ring(points)],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    pub fn polyline(&self, points: &[(f32, f32)], color: RgbColor, thickness: f32, closed: bool) {
        if points.len() < 2 {
            return;
        }
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: ring(points),
            is_closed: closed,
        });
    }

    /// Draws `text` with its baseline starting at `(x, y)`.
    pub fn text(&self, text: &str, x: f32, y: f32, size: f32, bold: bool, color: RgbColor) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(pdf_color(color));
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    pub fn text_centered(
        &self,
        text: &str,
        center_x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: RgbColor,
    ) {
        let x = center_x - text_width(text, size, bold) / 2.0;
        self.text(text, x, y, size, bold, color);
    }

    pub fn text_right(
        &self,
        text: &str,
        right_x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: RgbColor,
    ) {
        let x = right_x - text_width(text, size, bold);
        self.text(text, x, y, size, bold, color);
    }

    /// # Errors
    ///
    /// Returns a render error if the document cannot be serialized.
    pub fn finish(self) -> Result<Vec<u8>, ReportError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| render_error("save", e))
    }
}

/// Converts points to millimetres.
#[must_use]
pub fn pt(points: f32) -> f32 {
    points * PT_TO_MM
}
