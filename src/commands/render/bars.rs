//! Bar views shared by the overview and dataset pages.

use std::collections::BTreeMap;

use crate::chart::{BarSeries, ChartLayout, grouped_bar_chart};
use crate::format::{format_color, format_ms};
use crate::metrics::Metric;

use super::RenderContext;
use super::page::{legend_item, note};

pub const COLUMN_TYPES: [(&str, &str); 5] = [
    ("numeric", "#2f4a36"),
    ("text", "#e38b2c"),
    ("date", "#4c6fa8"),
    ("bool", "#a84c6f"),
    ("other", "#8a7e6b"),
];

pub const LATENCY_METRICS: [(Metric, &str); 3] = [
    (Metric::FullScan, "Full scan"),
    (Metric::Selective, "Selective predicate"),
    (Metric::RandomAccess, "Random access"),
];

/// Query latencies grouped by query kind with one series per format. Kinds
/// that no format has a timing for are left out.
pub fn latency_groups(rows: &[(String, [Option<f64>; 3])]) -> (Vec<String>, Vec<BarSeries>) {
    let kept: Vec<usize> = (0..LATENCY_METRICS.len())
        .filter(|&idx| {
            rows.iter()
                .any(|(_, values)| values[idx].is_some_and(f64::is_finite))
        })
        .collect();

    let categories = kept
        .iter()
        .map(|&idx| LATENCY_METRICS[idx].1.to_string())
        .collect();
    let series = rows
        .iter()
        .map(|(name, values)| BarSeries {
            label: name.clone(),
            color: format_color(name).to_string(),
            values: kept.iter().map(|&idx| values[idx]).collect(),
        })
        .collect();
    (categories, series)
}

pub fn latency_chart(rows: &[(String, [Option<f64>; 3])], ctx: &RenderContext) -> String {
    let (categories, series) = latency_groups(rows);
    if categories.is_empty() {
        return note("Query timings not available.");
    }
    grouped_bar_chart(
        &categories,
        &series,
        &|value: f64| format_ms(Some(value)),
        ChartLayout::grouped_bar(ctx.chart_width),
        &ctx.options,
    )
}

/// Single stacked bar of column counts per type, with a legend.
pub fn column_type_bar(counts: &BTreeMap<String, u64>) -> String {
    let total: u64 = COLUMN_TYPES
        .iter()
        .map(|(key, _)| counts.get(*key).copied().unwrap_or(0))
        .sum();
    if total == 0 {
        return note("No column type data.");
    }

    let mut bar = String::from(r#"<div class="stacked-bar">"#);
    let mut legend = String::from(r#"<div class="legend">"#);
    for (key, color) in COLUMN_TYPES {
        let value = counts.get(key).copied().unwrap_or(0);
        if value == 0 {
            continue;
        }
        let pct = value as f64 / total as f64 * 100.0;
        bar.push_str(&format!(
            r#"<div class="stacked-segment" style="width:{pct:.2}%;background:{color}" title="{key} ({value})"></div>"#
        ));
        legend.push_str(&legend_item(&format!("{key} ({value})"), color));
    }
    bar.push_str("</div>");
    legend.push_str("</div>");
    bar + &legend
}
