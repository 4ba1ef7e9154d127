//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - one glyph per series, connected with line segments
//! - administration markers: `:` columns

use chrono::NaiveDate;

use crate::chart::Chart;

const SERIES_GLYPHS: [char; 4] = ['*', '+', 'x', 'o'];

/// Render every series of `chart` into a `width` x `height` grid.
pub fn render_ascii_chart(chart: &Chart, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = String::new();
    out.push_str(&chart.title);
    out.push('\n');

    let Some((d_min, d_max)) = chart.date_range() else {
        out.push_str("(no data)\n");
        return out;
    };

    let (y_min, y_max) = y_range(chart).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let span_days = (d_max - d_min).num_days().max(1) as f64;
    let x_of = |d: NaiveDate| (d - d_min).num_days() as f64 / span_days;

    let mut grid = vec![vec![' '; width]; height];

    for marker in chart.visible_markers() {
        let x = map_x(x_of(marker.start), width);
        for row in grid.iter_mut() {
            row[x] = ':';
        }
    }

    for (idx, series) in chart.series.iter().enumerate() {
        let glyph = SERIES_GLYPHS[idx % SERIES_GLYPHS.len()];
        let mut prev = None;
        for &(d, y) in &series.points {
            let x = map_x(x_of(d), width);
            let yy = map_y(y, y_min, y_max, height);
            match prev {
                Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, yy, glyph),
                None => grid[yy][x] = glyph,
            }
            prev = Some((x, yy));
        }
    }

    out.push_str(&format!(
        "{}: [{}, {}] | {}: [{:.0}, {:.0}]\n",
        chart.x_label, d_min, d_max, chart.y_label, y_min, y_max
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let legend: Vec<String> = chart
        .series
        .iter()
        .enumerate()
        .map(|(idx, s)| format!("{} {}", SERIES_GLYPHS[idx % SERIES_GLYPHS.len()], s.name))
        .collect();
    out.push_str(&legend.join("  "));
    out.push('\n');

    let markers: Vec<String> = chart
        .visible_markers()
        .iter()
        .map(|m| {
            if m.president.is_empty() {
                format!(": {}", m.start)
            } else {
                format!(": {} {}", m.start, m.president)
            }
        })
        .collect();
    if !markers.is_empty() {
        out.push_str(&markers.join("  "));
        out.push('\n');
    }

    out
}

fn y_range(chart: &Chart) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for s in &chart.series {
        for &(_, y) in &s.points {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && min_y == max_y {
        Some((min_y - 1.0, max_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(u: f64, width: usize) -> usize {
    let width = width.max(2);
    (u.clamp(0.0, 1.0) * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Overwrites blanks and marker columns.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if *cell == ' ' || *cell == ':' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
