//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine and aggregation code stay clean and testable
//! - output changes are localized

use crate::adjust::AdjustOutput;
use crate::domain::{AdjustConfig, AdjustedRow, GroupBy, Notice};
use crate::io::ingest::{IngestedData, RowIssue};
use crate::report::{CategoryCount, GroupMean, MarketSummary, MonthlyTrend};

/// Format the run header (input, configuration, headline numbers).
pub fn format_run_summary(
    source: &str,
    ingest: &IngestedData,
    output: &AdjustOutput,
    summary: &MarketSummary,
    config: &AdjustConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== comps - Comparable Sales Adjustments ===\n");
    out.push_str(&format!("Input: {source}\n"));
    out.push_str(&format!(
        "Rows: read={} | adjusted={} | row issues={}\n",
        ingest.rows_read,
        output.rows.len(),
        ingest.row_issues.len()
    ));
    out.push_str(&format!(
        "Default market trend: {:.2}%\n",
        config.default_market_trend_pct
    ));

    out.push_str("\nSummary:\n");
    out.push_str(&format!("- average close price:        {}\n", fmt_money(summary.avg_close_price)));
    out.push_str(&format!("- median close price:         {}\n", fmt_money(summary.median_close_price)));
    out.push_str(&format!("- average price per sqft:     {}\n", fmt_money(summary.avg_price_per_sqft)));
    out.push_str(&format!("- median days on market:      {}\n", fmt_days(summary.median_days_on_market)));
    out.push_str(&format!("- average final adjusted:     {}\n", fmt_money(summary.avg_final_adjusted_price)));
    out.push_str(&format!("- median final adjusted:      {}\n", fmt_money(summary.median_final_adjusted_price)));
    out.push_str(&format!(
        "- adjustment types:           upward={} downward={} none={}\n",
        summary.adjustment_types.upward, summary.adjustment_types.downward, summary.adjustment_types.none
    ));
    out.push_str(&format!(
        "- listing outcomes:           closed={} withdrawn={} expired={}\n",
        summary.outcomes.closed, summary.outcomes.withdrawn, summary.outcomes.expired
    ));
    out.push('\n');

    out
}

/// Plain-text market commentary.
pub fn format_commentary(summary: &MarketSummary) -> String {
    let mut out = String::new();
    out.push_str("Market Analysis Report:\n");
    out.push_str(&format!(
        "- The average close price in the area is {}.\n",
        fmt_money(summary.avg_close_price)
    ));
    out.push_str(&format!(
        "- The median close price is {}.\n",
        fmt_money(summary.median_close_price)
    ));
    out.push_str(&format!(
        "- The average price per square foot is {}.\n",
        fmt_money(summary.avg_price_per_sqft)
    ));
    out.push_str(&format!(
        "- The median days on market (DOM) is {} days.\n",
        fmt_days(summary.median_days_on_market)
    ));
    out
}

/// Format the adjusted-row table (first `top_n` rows, input order).
pub fn format_adjusted_table(rows: &[AdjustedRow], top_n: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<16} {:>6} {:>14} {:>9} {:<9} {:>14} {:>12} {:>14} {:<9}\n",
            "id", "dom", "close", "mkt_adj%", "type", "after_mkt", "features", "final", "outcome"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<16} {:-<6} {:-<14} {:-<9} {:-<9} {:-<14} {:-<12} {:-<14} {:-<9}\n",
            "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows.iter().take(top_n) {
        out.push_str(
            format!(
                "{:<16} {:>6} {:>14} {:>9.2} {:<9} {:>14} {:>12} {:>14} {:<9}\n",
                truncate(&r.row.id, 16),
                r.days_on_market.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                fmt_money(r.row.close_price),
                r.market_adjustment_pct,
                r.adjustment_type.label(),
                fmt_money(r.price_after_market),
                fmt_money(Some(r.total_adjustments)),
                fmt_money(r.final_adjusted_price),
                r.outcome.label(),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if rows.len() > top_n {
        out.push_str(&format!("... {} more row(s)\n", rows.len() - top_n));
    }

    out
}

pub fn format_monthly_trends(trends: &[MonthlyTrend]) -> String {
    let mut out = String::from("Monthly average close price:\n");
    if trends.is_empty() {
        out.push_str("  (no rows with both close date and close price)\n");
        return out;
    }
    for t in trends {
        out.push_str(&format!("  {}  {:>14}  (n={})\n", t.month, fmt_money(Some(t.avg_close_price)), t.n));
    }
    out
}

pub fn format_distribution(counts: &[CategoryCount]) -> String {
    let mut out = String::from("Property type distribution:\n");
    if counts.is_empty() {
        out.push_str("  (no property type column)\n");
        return out;
    }
    for c in counts {
        out.push_str(&format!("  {:<24} {:>5}\n", truncate(&c.value, 24), c.count));
    }
    out
}

pub fn format_group_comparison(group_by: GroupBy, groups: &[GroupMean]) -> String {
    let mut out = format!("Comparison by {}:\n", group_by.display_name());
    if groups.is_empty() {
        out.push_str("  (no matching groups)\n");
        return out;
    }
    for g in groups {
        out.push_str(&format!(
            "  {:<24} {:>14}  (n={})\n",
            truncate(&g.value, 24),
            fmt_money(Some(g.avg_close_price)),
            g.n
        ));
    }
    out
}

pub fn format_notices(notices: &[Notice]) -> String {
    let mut out = String::new();
    for n in notices {
        out.push_str(&format!("note: {n}\n"));
    }
    out
}

/// Format up to `max` row issues, with a count of the rest.
pub fn format_row_issues(issues: &[RowIssue], max: usize) -> String {
    let mut out = String::new();
    if issues.is_empty() {
        return out;
    }
    out.push_str(&format!("Row issues ({}):\n", issues.len()));
    for issue in issues.iter().take(max) {
        out.push_str(&format!(
            "  line {:>4} {:<12} {:<18} {}\n",
            issue.line,
            truncate(issue.id.as_deref().unwrap_or("-"), 12),
            issue.column.unwrap_or("-"),
            issue.message
        ));
    }
    if issues.len() > max {
        out.push_str(&format!("  ... {} more\n", issues.len() - max));
    }
    out
}

/// `$1,234,567.89`, or `-` when absent.
pub fn fmt_money(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return "-".to_string();
    };
    let sign = if v < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", v.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{cents}")
}

fn fmt_days(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.0}"),
        _ => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
