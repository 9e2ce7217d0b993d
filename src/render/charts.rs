//! Chart geometry for the dashboard, independent of the PDF backend.
//!
//! Coordinates are in millimetres with the origin at the bottom left, the
//! way PDF pages measure them.

use std::f32::consts::{FRAC_PI_2, TAU};

use chrono::{Duration, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Channels scaled to `0.0..=1.0`.
    #[must_use]
    pub fn unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

/// Qualitative palette for allocation slices (ColorBrewer Set3).
pub const SET3: [RgbColor; 12] = [
    RgbColor::from_hex(0x8dd3c7),
    RgbColor::from_hex(0xffffb3),
    RgbColor::from_hex(0xbebada),
    RgbColor::from_hex(0xfb8072),
    RgbColor::from_hex(0x80b1d3),
    RgbColor::from_hex(0xfdb462),
    RgbColor::from_hex(0xb3de69),
    RgbColor::from_hex(0xfccde5),
    RgbColor::from_hex(0xd9d9d9),
    RgbColor::from_hex(0xbc80bd),
    RgbColor::from_hex(0xccebc5),
    RgbColor::from_hex(0xffed6f),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub fraction: f32,
    /// Radians, counter-clockwise from the positive x axis.
    pub start_angle: f32,
    pub sweep: f32,
    pub color: RgbColor,
}

impl PieSlice {
    #[must_use]
    pub fn mid_angle(&self) -> f32 {
        self.start_angle + self.sweep / 2.0
    }

    /// `12.3%`
    #[must_use]
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }
}

/// Slices laid out counter-clockwise starting at twelve o'clock. Non-positive
/// values get no slice.
#[must_use]
pub fn pie_slices(items: &[(String, f64)]) -> Vec<PieSlice> {
    let positive: Vec<_> = items.iter().filter(|(_, v)| *v > 0.0).collect();
    let total: f64 = positive.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut angle = FRAC_PI_2;
    positive
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let fraction = (value / total) as f32;
            let slice = PieSlice {
                label: label.clone(),
                fraction,
                start_angle: angle,
                sweep: fraction * TAU,
                color: SET3[i % SET3.len()],
            };
            angle += slice.sweep;
            slice
        })
        .collect()
}

#[must_use]
pub fn polar(cx: f32, cy: f32, radius: f32, angle: f32) -> (f32, f32) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// Closed outline of a wedge: the centre followed by points along the arc.
#[must_use]
pub fn wedge_outline(cx: f32, cy: f32, radius: f32, slice: &PieSlice) -> Vec<(f32, f32)> {
    // One segment per ~3 degrees keeps arcs smooth at dashboard size.
    let segments = ((slice.sweep / TAU) * 120.0).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(segments + 2);
    points.push((cx, cy));
    for step in 0..=segments {
        let angle = slice.start_angle + slice.sweep * step as f32 / segments as f32;
        points.push(polar(cx, cy, radius, angle));
    }
    points
}

/// Vertical range shown on the trend chart, padded so the line never touches
/// the frame.
#[must_use]
pub fn value_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span == 0.0 {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
        return (min - pad, max + pad);
    }
    (min - span * 0.05, max + span * 0.05)
}

/// Points of the value series scaled into the plot box.
#[must_use]
pub fn line_points(values: &[f64], x: f32, y: f32, width: f32, height: f32) -> Vec<(f32, f32)> {
    let (lo, hi) = value_range(values);
    let steps = values.len().saturating_sub(1).max(1) as f32;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let px = if values.len() == 1 {
                x + width / 2.0
            } else {
                x + width * i as f32 / steps
            };
            let py = y + height * ((v - lo) / (hi - lo)) as f32;
            (px, py)
        })
        .collect()
}

/// The line's polygon down to the bottom of the plot box, for the shaded area.
#[must_use]
pub fn area_outline(points: &[(f32, f32)], baseline: f32) -> Vec<(f32, f32)> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    let mut outline = Vec::with_capacity(points.len() + 2);
    outline.push((first.0, baseline));
    outline.extend_from_slice(points);
    outline.push((last.0, baseline));
    outline
}

/// One calendar day per value, ending on `end`.
#[must_use]
pub fn trailing_dates(count: usize, end: NaiveDate) -> Vec<NaiveDate> {
    (0..count)
        .rev()
        .map(|back| end - Duration::days(back as i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wedge_starts_at_centre_and_ends_on_arc() {
        let slices = pie_slices(&[("A".to_string(), 1.0), ("B".to_string(), 1.0)]);
        let outline = wedge_outline(0.0, 0.0, 10.0, &slices[0]);
        assert_eq!(outline[0], (0.0, 0.0));
        let (x, y) = outline[1];
        assert!(x.abs() < 1e-4 && (y - 10.0).abs() < 1e-4);
        let (x, y) = *outline.last().unwrap();
        assert!(x.abs() < 1e-3 && (y + 10.0).abs() < 1e-3);
    }

    #[test]
    fn flat_series_gets_a_visible_range() {
        let (lo, hi) = value_range(&[100.0, 100.0]);
        assert!(lo < 100.0 && hi > 100.0);
        assert_eq!(value_range(&[]), (0.0, 1.0));
    }
}
