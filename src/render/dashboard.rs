//! One-page portfolio dashboard PDF.

use chrono::NaiveDate;

use super::canvas::{BLACK, CONTENT_WIDTH, Canvas, GREY, MARGIN, PAGE_WIDTH, WHITE};
use super::charts::{
    RgbColor, area_outline, line_points, pie_slices, polar, trailing_dates, value_range,
    wedge_outline,
};
use super::format;
use super::table::{Cell, Table, TableStyle};
use crate::analytics::{PortfolioMetrics, PortfolioSummary, RiskMetrics};
use crate::errors::ReportError;

pub const TITLE: &str = "Portfolio Dashboard";

const INCH: f32 = 25.4;
const BRAND: RgbColor = RgbColor::from_hex(0x1f4788);
const ACCENT: RgbColor = RgbColor::from_hex(0x4472c4);
/// `ACCENT` at 30% opacity over white.
const ACCENT_AREA: RgbColor = RgbColor::from_hex(0xc7d5ed);
const PALE_BLUE: RgbColor = RgbColor::from_hex(0xe8f4f8);
const GAIN_FILL: RgbColor = RgbColor::from_hex(0xd4edda);
const GAIN_TEXT: RgbColor = RgbColor::from_hex(0x155724);
const LOSS_FILL: RgbColor = RgbColor::from_hex(0xf8d7da);
const LOSS_TEXT: RgbColor = RgbColor::from_hex(0x721c24);
const GRID: RgbColor = RgbColor::from_hex(0xdddddd);

/// Everything the dashboard shows.
pub struct DashboardData<'a> {
    pub metrics: &'a PortfolioMetrics,
    pub summary: PortfolioSummary,
    pub history: &'a [f64],
    pub risk: RiskMetrics,
    pub as_of: NaiveDate,
}

fn section_header(canvas: &mut Canvas, title: &str) {
    canvas.ensure_space(14.0);
    canvas.advance(5.0);
    canvas.text(title, MARGIN, canvas.cursor(), 12.0, true, BRAND);
    canvas.advance(3.5);
}

fn summary_table(summary: &PortfolioSummary) -> Table {
    let rows = [
        ("Total Portfolio Value", format::currency(summary.total_value)),
        (
            "Daily P&L",
            format!(
                "{} ({})",
                format::signed_currency(summary.daily_pnl),
                format::signed_percent(summary.daily_pnl_pct)
            ),
        ),
        ("Overall Return", format::signed_percent(summary.overall_return)),
    ];

    Table {
        columns: vec![2.5 * INCH, 2.0 * INCH],
        header: None,
        rows: rows
            .into_iter()
            .map(|(label, value)| vec![Cell::new(label).bold(), Cell::new(value)])
            .collect(),
        style: TableStyle {
            body_size: 11.0,
            row_height: 8.0,
            row_fills: [PALE_BLUE, WHITE],
            grid_thickness: 1.0,
            ..TableStyle::default()
        },
    }
}

/// Holdings rows. The day-change cell is green for gains and red for losses.
#[must_use]
pub fn holdings_table(metrics: &PortfolioMetrics) -> Table {
    let rows = metrics
        .holdings
        .iter()
        .map(|h| {
            let mut change = Cell::new(format::signed_percent(h.day_change));
            if h.day_change > 0.0 {
                change = change.colored(GAIN_TEXT, GAIN_FILL);
            } else if h.day_change < 0.0 {
                change = change.colored(LOSS_TEXT, LOSS_FILL);
            }
            vec![
                Cell::new(h.ticker.as_str()),
                Cell::new(format::shares(h.shares)),
                Cell::new(format!("${:.2}", h.current_price)),
                change,
                Cell::new(format::currency(h.position_value)),
            ]
        })
        .collect();

    Table {
        columns: vec![1.0 * INCH, 1.0 * INCH, 1.2 * INCH, 1.3 * INCH, 1.5 * INCH],
        header: Some(
            ["Ticker", "Shares", "Price", "Day Change", "Position Value"]
                .map(String::from)
                .to_vec(),
        ),
        rows,
        style: TableStyle::default(),
    }
}

fn metrics_table(risk: &RiskMetrics, holdings: usize) -> Table {
    let values = [
        format!("{:.2}", risk.sharpe),
        format::percent(risk.volatility),
        format!("{:.2}", risk.beta),
        format::percent(risk.max_drawdown),
        holdings.to_string(),
    ];

    Table {
        columns: vec![1.4 * INCH; 5],
        header: Some(
            ["Sharpe Ratio", "Volatility", "Beta", "Max Drawdown", "Holdings"]
                .map(String::from)
                .to_vec(),
        ),
        rows: vec![values.into_iter().map(|v| Cell::new(v).bold()).collect()],
        style: TableStyle {
            header_size: 9.0,
            body_size: 12.0,
            row_height: 14.0,
            row_fills: [PALE_BLUE, PALE_BLUE],
            grid_thickness: 1.0,
            ..TableStyle::default()
        },
    }
}

fn draw_pie_chart(
    canvas: &Canvas,
    metrics: &PortfolioMetrics,
    left: f32,
    bottom: f32,
    size: f32,
) {
    let cx = left + size / 2.0;
    let title_y = bottom + size - 4.0;
    canvas.text_centered("Allocation by Ticker", cx, title_y, 10.0, true, BLACK);

    let radius = size * 0.32;
    let cy = bottom + (size - 8.0) / 2.0;
    let items: Vec<(String, f64)> = metrics
        .holdings
        .iter()
        .map(|h| (h.ticker.clone(), h.position_value))
        .collect();

    for slice in pie_slices(&items) {
        let outline = wedge_outline(cx, cy, radius, &slice);
        canvas.fill_polygon(&outline, slice.color);
        canvas.polyline(&outline, WHITE, 0.5, true);

        let (lx, ly) = polar(cx, cy, radius * 1.15, slice.mid_angle());
        let label_y = ly - 1.0;
        if lx >= cx {
            canvas.text(&slice.label, lx, label_y, 7.0, false, BLACK);
        } else {
            canvas.text_right(&slice.label, lx, label_y, 7.0, false, BLACK);
        }

        let (px, py) = polar(cx, cy, radius * 0.6, slice.mid_angle());
        canvas.text_centered(&slice.percent_label(), px, py - 1.0, 6.0, false, BLACK);
    }
}

fn draw_line_chart(
    canvas: &Canvas,
    history: &[f64],
    as_of: NaiveDate,
    left: f32,
    bottom: f32,
    width: f32,
    height: f32,
) {
    canvas.text_centered(
        "30-Day Portfolio Value Trend",
        left + width / 2.0,
        bottom + height - 4.0,
        10.0,
        true,
        BLACK,
    );

    // Plot box inside the chart area, leaving room for axis labels.
    let plot_x = left + 20.0;
    let plot_y = bottom + 12.0;
    let plot_w = width - 24.0;
    let plot_h = height - 22.0;

    canvas.text("Value ($)", left, plot_y + plot_h + 2.0, 7.0, false, BLACK);
    canvas.text_centered("Date", plot_x + plot_w / 2.0, bottom + 1.0, 7.0, false, BLACK);

    if history.is_empty() {
        canvas.stroke_rect(plot_x, plot_y, plot_w, plot_h, GREY, 0.5);
        canvas.text_centered(
            "No history available",
            plot_x + plot_w / 2.0,
            plot_y + plot_h / 2.0,
            8.0,
            false,
            GREY,
        );
        return;
    }

    let (lo, hi) = value_range(history);
    for step in 0..=4 {
        let fraction = step as f32 / 4.0;
        let y = plot_y + plot_h * fraction;
        canvas.polyline(&[(plot_x, y), (plot_x + plot_w, y)], GRID, 0.3, false);
        let value = lo + (hi - lo) * f64::from(fraction);
        canvas.text_right(
            &format!("{value:.0}"),
            plot_x - 1.0,
            y - 0.8,
            6.0,
            false,
            BLACK,
        );
    }

    let dates = trailing_dates(history.len(), as_of);
    let points = line_points(history, plot_x, plot_y, plot_w, plot_h);
    let label_every = (history.len() / 5).max(1);
    for (i, ((x, _), date)) in points.iter().zip(&dates).enumerate() {
        if i % label_every != 0 && i + 1 != points.len() {
            continue;
        }
        canvas.polyline(&[(*x, plot_y), (*x, plot_y + plot_h)], GRID, 0.3, false);
        canvas.text_centered(
            &date.format("%m-%d").to_string(),
            *x,
            plot_y - 4.0,
            6.0,
            false,
            BLACK,
        );
    }

    canvas.fill_polygon(&area_outline(&points, plot_y), ACCENT_AREA);
    canvas.polyline(&points, ACCENT, 0.7, false);
    canvas.stroke_rect(plot_x, plot_y, plot_w, plot_h, GREY, 0.5);
}

/// Renders the dashboard and returns the PDF bytes.
///
/// # Errors
///
/// Returns a render error if the PDF cannot be produced.
pub fn create_pdf_dashboard(data: &DashboardData<'_>) -> Result<Vec<u8>, ReportError> {
    let mut canvas = Canvas::new(TITLE)?;
    let center = PAGE_WIDTH / 2.0;

    canvas.advance(8.5);
    canvas.text_centered(TITLE, center, canvas.cursor(), 24.0, true, BRAND);
    canvas.advance(8.0);
    canvas.text_centered(
        &data.as_of.format("%B %d, %Y").to_string(),
        center,
        canvas.cursor(),
        10.0,
        false,
        GREY,
    );
    canvas.advance(9.0);

    summary_table(&data.summary).draw(&mut canvas);
    canvas.advance(5.0);

    section_header(&mut canvas, "Current Holdings");
    holdings_table(data.metrics).draw(&mut canvas);
    canvas.advance(7.5);

    let pie_size = 3.0 * INCH;
    let line_width = 4.0 * INCH;
    let chart_height = pie_size;
    canvas.ensure_space(chart_height);
    let chart_bottom = canvas.cursor() - chart_height;
    let gap = (CONTENT_WIDTH - pie_size - line_width) / 3.0;
    draw_pie_chart(&canvas, data.metrics, MARGIN + gap, chart_bottom, pie_size);
    draw_line_chart(
        &canvas,
        data.history,
        data.as_of,
        MARGIN + 2.0 * gap + pie_size,
        chart_bottom + (chart_height - 2.0 * INCH) / 2.0,
        line_width,
        2.0 * INCH,
    );
    canvas.advance(chart_height);

    section_header(&mut canvas, "Key Metrics");
    metrics_table(&data.risk, data.metrics.holdings.len()).draw(&mut canvas);

    canvas.finish()
}
