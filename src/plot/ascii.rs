//! ASCII plotting for terminal output.
//!
//! Fixed-size character output, optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Charts:
//! - horizontal histograms (close price, days on market, final adjusted price)
//! - adjustment scatter: market adjustment % (x) vs final adjusted price (y),
//!   drawn with `U` (upward), `D` (downward), `N` (none)

use crate::domain::{AdjustedRow, AdjustmentType};
use crate::report::effective_days_on_market;

/// Histogram of close prices.
pub fn render_close_price_histogram(rows: &[AdjustedRow], bins: usize, width: usize) -> String {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.row.close_price).collect();
    render_histogram("Close price", &values, bins, width)
}

/// Histogram of days on market.
pub fn render_days_on_market_histogram(rows: &[AdjustedRow], bins: usize, width: usize) -> String {
    let values: Vec<f64> = rows.iter().filter_map(effective_days_on_market).collect();
    render_histogram("Days on market", &values, bins, width)
}

/// Histogram of final adjusted prices.
pub fn render_adjusted_price_histogram(rows: &[AdjustedRow], bins: usize, width: usize) -> String {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.final_adjusted_price).collect();
    render_histogram("Final adjusted price", &values, bins, width)
}

/// Render a horizontal histogram with `bins` equal-width bins.
///
/// The last bin is closed on the right so the maximum value is counted.
pub fn render_histogram(title: &str, values: &[f64], bins: usize, width: usize) -> String {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let mut out = format!("{title} (n={})\n", values.len());
    let Some((min, max)) = value_range(&values) else {
        out.push_str("  (no data)\n");
        return out;
    };

    let bins = if max > min { bins.max(1) } else { 1 };
    let width = width.max(1);
    let span = max - min;

    let mut counts = vec![0usize; bins];
    for &v in &values {
        let idx = if span > 0.0 {
            (((v - min) / span) * bins as f64).floor() as usize
        } else {
            0
        };
        counts[idx.min(bins - 1)] += 1;
    }

    let peak = counts.iter().copied().max().unwrap_or(0).max(1);
    for (i, &count) in counts.iter().enumerate() {
        let lo = min + span * i as f64 / bins as f64;
        let hi = min + span * (i + 1) as f64 / bins as f64;
        let len = ((count as f64 / peak as f64) * width as f64).round() as usize;
        let bar = "#".repeat(len);
        out.push_str(format!("{lo:>12.1} - {hi:>12.1} | {bar:<width$} {count}\n").trim_end());
        out.push('\n');
    }
    out
}

/// Scatter of market adjustment % against final adjusted price.
pub fn render_adjustment_scatter(rows: &[AdjustedRow], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let points: Vec<(f64, f64, AdjustmentType)> = rows
        .iter()
        .filter_map(|r| Some((r.market_adjustment_pct, r.final_adjusted_price?, r.adjustment_type)))
        .filter(|(x, y, _)| x.is_finite() && y.is_finite())
        .collect();

    let Some((x_min, x_max)) = value_range(&points.iter().map(|p| p.0).collect::<Vec<_>>()) else {
        return "Adjustment scatter: (no adjusted prices to plot)\n".to_string();
    };
    let Some((y_min, y_max)) = value_range(&points.iter().map(|p| p.1).collect::<Vec<_>>()) else {
        return "Adjustment scatter: (no adjusted prices to plot)\n".to_string();
    };
    let (x_min, x_max) = pad_range(x_min, x_max, 0.05);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for &(x, y, kind) in &points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = glyph(kind);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Adjustment scatter: market adj=[{x_min:.2}, {x_max:.2}]% | final=[{y_min:.0}, {y_max:.0}] | U=upward D=downward N=none\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn glyph(kind: AdjustmentType) -> char {
    match kind {
        AdjustmentType::Upward => 'U',
        AdjustmentType::Downward => 'D',
        AdjustmentType::None => 'N',
    }
}

fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() { Some((min, max)) } else { None }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    // A flat series still needs a visible range.
    let pad = if span > 0.0 { span * frac } else { min.abs().max(1.0) * frac };
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y max is the top row.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjust::adjust;
    use crate::domain::{AdjustConfig, Column, ComparableBatch, ComparableRow};

    #[test]
    fn histogram_golden_snapshot_small() {
        let txt = render_histogram("DOM", &[0.0, 10.0, 10.0, 20.0, 40.0], 2, 10);
        let expected = concat!(
            "DOM (n=5)\n",
            "         0.0 -         20.0 | ########## 3\n",
            "        20.0 -         40.0 | #######    2\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn histogram_of_constant_values_uses_one_bin() {
        let txt = render_histogram("Flat", &[5.0, 5.0], 4, 4);
        assert_eq!(txt.lines().count(), 2);
        assert!(txt.ends_with("| #### 2\n"));
    }

    #[test]
    fn histogram_without_data() {
        assert_eq!(render_histogram("Empty", &[], 5, 10), "Empty (n=0)\n  (no data)\n");
    }

    #[test]
    fn scatter_marks_each_adjustment_type() {
        let rows: Vec<ComparableRow> = [(300_000.0, 0.95, 7.0), (320_000.0, 1.10, 7.0), (310_000.0, 1.0, 0.0)]
            .into_iter()
            .enumerate()
            .map(|(i, (price, ratio, trend))| ComparableRow {
                id: format!("C{i}"),
                close_price: Some(price),
                sp_lp_ratio: Some(ratio),
                market_trend_pct: Some(trend),
                ..ComparableRow::default()
            })
            .collect();
        let batch = ComparableBatch {
            headers: Vec::new(),
            columns: [Column::ClosePrice, Column::MarketTrend].into_iter().collect(),
            rows,
        };
        let out = adjust(&batch, None, &AdjustConfig::default()).unwrap();

        let txt = render_adjustment_scatter(&out.rows, 20, 6);
        let body: String = txt.lines().skip(1).collect();
        assert_eq!(txt.lines().count(), 7);
        assert_eq!(body.matches('U').count(), 1);
        assert_eq!(body.matches('D').count(), 1);
        assert_eq!(body.matches('N').count(), 1);
    }

    #[test]
    fn close_price_histogram_skips_missing_prices() {
        let rows: Vec<ComparableRow> = [Some(200_000.0), None, Some(400_000.0)]
            .into_iter()
            .map(|close_price| ComparableRow {
                close_price,
                ..ComparableRow::default()
            })
            .collect();
        let batch = ComparableBatch {
            headers: Vec::new(),
            columns: [Column::ClosePrice].into_iter().collect(),
            rows,
        };
        let out = adjust(&batch, None, &AdjustConfig::default()).unwrap();

        let txt = render_close_price_histogram(&out.rows, 2, 4);
        let expected = concat!(
            "Close price (n=2)\n",
            "    200000.0 -     300000.0 | #### 1\n",
            "    300000.0 -     400000.0 | #### 1\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn scatter_without_prices() {
        let txt = render_adjustment_scatter(&[], 20, 6);
        assert_eq!(txt, "Adjustment scatter: (no adjusted prices to plot)\n");
    }
}
