//! Plotters-powered line chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! Dates are mapped to fractional years so the x axis stays a plain `f64` range.

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::chart::Chart;

/// Colorblind-safe palette (blue, orange, brown, gray).
pub const PALETTE: [(u8, u8, u8); 4] = [(0x37, 0x7e, 0xb8), (0xff, 0x7f, 0x00), (0xa6, 0x56, 0x28), (0x99, 0x99, 0x99)];

pub fn series_color(idx: usize) -> Color {
    let (r, g, b) = PALETTE[idx % PALETTE.len()];
    Color::Rgb(r, g, b)
}

/// Render-only view of a [`Chart`]; bounds are computed in [`ChartView::new`].
pub struct ChartView<'a> {
    lines: Vec<Vec<(f64, f64)>>,
    markers: Vec<f64>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    y_label: &'a str,
}

impl<'a> ChartView<'a> {
    pub fn new(chart: &'a Chart) -> Option<Self> {
        let (d0, d1) = chart.date_range()?;

        let lines: Vec<Vec<(f64, f64)>> = chart
            .series
            .iter()
            .map(|s| s.points.iter().map(|&(d, y)| (year_fraction(d), y)).collect())
            .collect();

        let mut x0 = year_fraction(d0);
        let mut x1 = year_fraction(d1);
        if x1 <= x0 {
            x0 -= 0.5;
            x1 += 0.5;
        }

        let (mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(_, y) in lines.iter().flatten() {
            y0 = y0.min(y);
            y1 = y1.max(y);
        }
        if !y0.is_finite() || !y1.is_finite() || y1 <= y0 {
            y0 = 0.0;
            y1 = y1.max(1.0);
        }
        // Counts read best from a zero baseline.
        let y0 = y0.min(0.0);
        let pad = ((y1 - y0).abs() * 0.05).max(1e-12);

        Some(Self {
            lines,
            markers: chart.visible_markers().iter().map(|m| year_fraction(m.start)).collect(),
            x_bounds: [x0, x1],
            y_bounds: [y0, y1 + pad],
            y_label: chart.y_label,
        })
    }
}

impl Widget for ChartView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("Date")
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{:.0}", v.floor()))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Administration changes: thin vertical lines behind the data.
            let marker_color = RGBColor(0x60, 0x60, 0x60);
            for &x in &self.markers {
                chart.draw_series(LineSeries::new([(x, y0), (x, y1)], &marker_color))?;
            }

            for (idx, line) in self.lines.iter().enumerate() {
                let (r, g, b) = PALETTE[idx % PALETTE.len()];
                chart.draw_series(LineSeries::new(line.iter().copied(), &RGBColor(r, g, b)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// `2025-07-02` is roughly `2025.5`.
pub fn year_fraction(date: NaiveDate) -> f64 {
    let days_in_year = if date.leap_year() { 366.0 } else { 365.0 };
    date.year() as f64 + date.ordinal0() as f64 / days_in_year
}
