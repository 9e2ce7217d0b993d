use super::canvas::{BLACK, Canvas, GREY, PAGE_WIDTH, pt};
use super::charts::RgbColor;

#[derive(Debug, Clone)]
pub struct Cell {
    pub text: String,
    pub bold: bool,
    pub color: RgbColor,
    pub fill: Option<RgbColor>,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            color: BLACK,
            fill: None,
        }
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub fn colored(mut self, color: RgbColor, fill: RgbColor) -> Self {
        self.color = color;
        self.fill = Some(fill);
        self
    }
}

#[derive(Debug, Clone)]
pub struct TableStyle {
    pub header_fill: RgbColor,
    pub header_color: RgbColor,
    pub header_size: f32,
    pub header_height: f32,
    pub body_size: f32,
    pub row_height: f32,
    /// Alternating body row backgrounds.
    pub row_fills: [RgbColor; 2],
    pub grid_color: RgbColor,
    pub grid_thickness: f32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_fill: RgbColor::from_hex(0x4472c4),
            header_color: RgbColor::from_hex(0xf5f5f5),
            header_size: 10.0,
            header_height: 7.0,
            body_size: 9.0,
            row_height: 6.0,
            row_fills: [RgbColor::from_hex(0xffffff), RgbColor::from_hex(0xf9f9f9)],
            grid_color: GREY,
            grid_thickness: 0.5,
        }
    }
}

pub struct Table {
    pub columns: Vec<f32>,
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<Cell>>,
    pub style: TableStyle,
}

impl Table {
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns.iter().sum()
    }

    fn draw_row(
        &self,
        canvas: &Canvas,
        cells: &[Cell],
        top: f32,
        height: f32,
        size: f32,
        fill: RgbColor,
    ) {
        let left = (PAGE_WIDTH - self.width()) / 2.0;
        let bottom = top - height;
        let baseline = bottom + (height - pt(size) * 0.7) / 2.0;

        let mut x = left;
        for (width, cell) in self.columns.iter().zip(cells) {
            canvas.fill_rect(x, bottom, *width, height, cell.fill.unwrap_or(fill));
            canvas.text_centered(
                &cell.text,
                x + width / 2.0,
                baseline,
                size,
                cell.bold,
                cell.color,
            );
            canvas.stroke_rect(
                x,
                bottom,
                *width,
                height,
                self.style.grid_color,
                self.style.grid_thickness,
            );
            x += width;
        }
    }

    fn draw_header(&self, canvas: &mut Canvas) {
        let Some(header) = &self.header else {
            return;
        };
        let style = &self.style;
        let cells: Vec<Cell> = header
            .iter()
            .map(|h| {
                let mut cell = Cell::new(h.as_str()).bold();
                cell.color = style.header_color;
                cell
            })
            .collect();
        self.draw_row(
            canvas,
            &cells,
            canvas.cursor(),
            style.header_height,
            style.header_size,
            style.header_fill,
        );
        canvas.advance(style.header_height);
    }

    /// Draws the table centred on the page at the cursor. Rows that do not
    /// fit continue on a new page under a repeated header.
    pub fn draw(&self, canvas: &mut Canvas) {
        let style = &self.style;
        canvas.ensure_space(style.header_height + style.row_height);
        self.draw_header(canvas);

        for (i, row) in self.rows.iter().enumerate() {
            if canvas.ensure_space(style.row_height) {
                self.draw_header(canvas);
            }
            self.draw_row(
                canvas,
                row,
                canvas.cursor(),
                style.row_height,
                style.body_size,
                style.row_fills[i % 2],
            );
            canvas.advance(style.row_height);
        }
    }
}
