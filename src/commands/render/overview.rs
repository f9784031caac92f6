use std::collections::BTreeMap;

use crate::chart::{
    AxisTitles, BarSeries, ChartLayout, LinePoint, ScatterPoint, ScatterSeries, grouped_bar_chart,
    line_chart, scatter3d_chart,
};
use crate::format::{MISSING, escape_html, format_bytes, format_color, format_ms, format_number};
use crate::metrics::Metric;
use crate::model::{FormatSummary, OverallSummary, RowScalingSummary};
use crate::stats::mean;

use super::RenderContext;
use super::bars::{COLUMN_TYPES, LATENCY_METRICS, column_type_bar, latency_chart};
use super::loader::DashboardData;
use super::page::{dataset_href, details, document, kv, note, panel, row_scaling_href, stat_tile};

const MIN_LEADER_WIDTH: f64 = 12.0;
const INPUT_SIZE_COLOR: &str = "#4c6fa8";
const ROWS_COLOR: &str = "#2f4a36";

/// Geomeans shown on each overall format card, in display order.
const CARD_METRICS: [Metric; 10] = [
    Metric::CompressionRatio,
    Metric::OutputSize,
    Metric::WriteTime,
    Metric::CompressionSpeed,
    Metric::DecompressionTime,
    Metric::DecompressionSpeed,
    Metric::FullScan,
    Metric::Selective,
    Metric::RandomAccess,
    Metric::ColdFullScan,
];

#[derive(Debug, Clone, PartialEq)]
pub struct OverallStats {
    pub datasets: usize,
    pub total_rows: u64,
    pub total_input_bytes: u64,
    pub mean_numeric_ndv: Option<f64>,
}

pub fn overall_stats(summary: &OverallSummary) -> OverallStats {
    let ndv: Vec<f64> = summary
        .datasets
        .iter()
        .filter_map(|ds| ds.ndv_ratio_by_type.get("numeric").copied().flatten())
        .filter(|value| value.is_finite())
        .collect();

    OverallStats {
        datasets: summary.dataset_count,
        total_rows: summary.datasets.iter().filter_map(|ds| ds.rows).sum(),
        total_input_bytes: summary
            .datasets
            .iter()
            .filter_map(|ds| ds.input_size_bytes)
            .sum(),
        mean_numeric_ndv: mean(&ndv),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderEntry {
    pub name: String,
    pub score: f64,
    pub width_pct: f64,
}

/// Formats ranked by random-access geomean, fastest first. Bar width is
/// inverted so faster formats get longer bars.
pub fn leaderboard(formats: &BTreeMap<String, FormatSummary>) -> Vec<LeaderEntry> {
    let mut valid: Vec<(String, f64)> = formats
        .iter()
        .filter_map(|(name, body)| {
            body.query_median_ms_geomean
                .random_access
                .filter(|score| score.is_finite())
                .map(|score| (name.clone(), score))
        })
        .collect();
    if valid.is_empty() {
        return Vec::new();
    }

    let max = valid.iter().map(|(_, score)| *score).fold(f64::MIN, f64::max);
    valid.sort_by(|a, b| a.1.total_cmp(&b.1));

    valid
        .into_iter()
        .map(|(name, score)| {
            let width_pct = if max > 0.0 {
                (100.0 - score / max * 100.0).max(MIN_LEADER_WIDTH)
            } else {
                MIN_LEADER_WIDTH
            };
            LeaderEntry {
                name,
                score,
                width_pct,
            }
        })
        .collect()
}

/// NDV tile text. A zero mean reads as no data.
pub fn ndv_tile(mean_numeric_ndv: Option<f64>) -> String {
    mean_numeric_ndv
        .filter(|value| *value != 0.0)
        .map(|value| format!("{value:.3}"))
        .unwrap_or_else(|| MISSING.to_string())
}

fn stats_section(summary: &OverallSummary) -> String {
    let stats = overall_stats(summary);
    format!(
        r#"<div class="stats-grid">{}{}{}{}</div>"#,
        stat_tile("Datasets", &format_number(Some(stats.datasets as f64), 0)),
        stat_tile("Total rows", &format_number(Some(stats.total_rows as f64), 0)),
        stat_tile("Input size", &format_bytes(Some(stats.total_input_bytes as f64))),
        stat_tile("Mean numeric NDV ratio", &ndv_tile(stats.mean_numeric_ndv)),
    )
}

fn format_cards(formats: &BTreeMap<String, FormatSummary>) -> String {
    if formats.is_empty() {
        return note("No format summaries available.");
    }
    let mut out = String::from(r#"<div class="format-grid">"#);
    for (name, body) in formats {
        let rows: String = CARD_METRICS
            .into_iter()
            .map(|metric| {
                let text = metric
                    .summary_geomean(body)
                    .filter(|v| v.is_finite())
                    .map(|v| metric.format_value(v))
                    .unwrap_or_else(|| MISSING.to_string());
                kv(metric.label(), &text, "")
            })
            .collect();
        out.push_str(&format!(
            r#"<div class="format-card"><h3>{}</h3>{rows}{}</div>"#,
            escape_html(name),
            kv("Datasets", &body.datasets.to_string(), ""),
        ));
    }
    out.push_str("</div>");
    out
}

fn latency_geomeans(formats: &BTreeMap<String, FormatSummary>, ctx: &RenderContext) -> String {
    let rows: Vec<(String, [Option<f64>; 3])> = formats
        .iter()
        .map(|(name, body)| {
            (
                name.clone(),
                LATENCY_METRICS.map(|(metric, _)| metric.summary_geomean(body)),
            )
        })
        .collect();
    latency_chart(&rows, ctx)
}

/// LIKE latency geomeans by pattern type, one series per format.
pub fn like_geomean_series(formats: &BTreeMap<String, FormatSummary>) -> Vec<BarSeries> {
    formats
        .iter()
        .map(|(name, body)| {
            let like = &body.like_median_ms_geomean;
            BarSeries {
                label: name.clone(),
                color: format_color(name).to_string(),
                values: vec![like.prefix, like.suffix, like.contains],
            }
        })
        .collect()
}

fn like_geomeans(formats: &BTreeMap<String, FormatSummary>, ctx: &RenderContext) -> String {
    let series = like_geomean_series(formats);
    let timed = series
        .iter()
        .any(|item| item.values.iter().any(|v| v.is_some_and(f64::is_finite)));
    if !timed {
        return note("LIKE timings not available.");
    }
    let categories: Vec<String> = ["prefix", "suffix", "contains"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    grouped_bar_chart(
        &categories,
        &series,
        &|value: f64| format_ms(Some(value)),
        ChartLayout::grouped_bar(ctx.chart_width),
        &ctx.options,
    )
}

/// Input size, rows, column types and NDV ratios side by side across datasets.
fn dataset_overview(summary: &OverallSummary, ctx: &RenderContext) -> String {
    if summary.datasets.is_empty() {
        return note("No datasets summarized yet.");
    }
    let names: Vec<String> = summary.datasets.iter().map(|ds| ds.name.clone()).collect();
    let single = |label: &str, color: &str, values: Vec<Option<f64>>| BarSeries {
        label: label.to_string(),
        color: color.to_string(),
        values,
    };

    let sizes = grouped_bar_chart(
        &names,
        &[single(
            "Input size",
            INPUT_SIZE_COLOR,
            summary
                .datasets
                .iter()
                .map(|ds| ds.input_size_bytes.map(|b| b as f64))
                .collect(),
        )],
        &|value: f64| format_bytes(Some(value)),
        ChartLayout::grouped_bar(ctx.chart_width),
        &ctx.options,
    );
    let rows = grouped_bar_chart(
        &names,
        &[single(
            "Rows",
            ROWS_COLOR,
            summary.datasets.iter().map(|ds| ds.rows.map(|r| r as f64)).collect(),
        )],
        &|value: f64| format_number(Some(value), 0),
        ChartLayout::grouped_bar(ctx.chart_width),
        &ctx.options,
    );

    let column_types: String = summary
        .datasets
        .iter()
        .map(|ds| {
            format!(
                r#"<div class="chart-card"><h3>{}</h3>{}</div>"#,
                escape_html(&ds.name),
                column_type_bar(&ds.column_type_counts)
            )
        })
        .collect();

    let ndv_series: Vec<BarSeries> = COLUMN_TYPES
        .into_iter()
        .map(|(key, color)| {
            single(
                key,
                color,
                summary
                    .datasets
                    .iter()
                    .map(|ds| ds.ndv_ratio_by_type.get(key).copied().flatten())
                    .collect(),
            )
        })
        .collect();
    let ndv = grouped_bar_chart(
        &names,
        &ndv_series,
        &|value: f64| format_number(Some(value), 3),
        ChartLayout::grouped_bar(ctx.chart_width),
        &ctx.options,
    );

    [
        details("Input size by dataset", &sizes, true),
        details("Rows by dataset", &rows, false),
        details("Column types by dataset", &column_types, false),
        details("NDV ratio by type and dataset", &ndv, false),
    ]
    .concat()
}

fn leaderboard_section(formats: &BTreeMap<String, FormatSummary>) -> String {
    let entries = leaderboard(formats);
    if entries.is_empty() {
        return note("Random access timings not available.");
    }
    entries
        .iter()
        .map(|entry| {
            format!(
                r#"<div class="leader-item"><div><strong>{}</strong></div><div class="leader-bar"><div class="leader-fill" style="width:{:.1}%"></div></div><div>{}</div></div>"#,
                escape_html(&entry.name),
                entry.width_pct,
                escape_html(&format_ms(Some(entry.score))),
            )
        })
        .collect()
}

fn dataset_grid(summary: &OverallSummary) -> String {
    if summary.datasets.is_empty() {
        return note("No datasets summarized yet.");
    }
    let mut out = String::from(r#"<div class="dataset-grid">"#);
    for ds in &summary.datasets {
        let columns: u64 = ds.column_type_counts.values().sum();
        out.push_str(&format!(
            r#"<a class="dataset-card" href="{}"><div class="dataset-title">{}</div><div class="dataset-meta">{} rows</div><div class="dataset-meta">{} input</div><div class="dataset-meta">Columns: {}</div></a>"#,
            escape_html(&dataset_href(&ds.name)),
            escape_html(&ds.name),
            format_number(ds.rows.map(|r| r as f64), 0),
            format_bytes(ds.input_size_bytes.map(|b| b as f64)),
            columns,
        ));
    }
    out.push_str("</div>");
    out
}

/// Per-format line charts of each metric across datasets. Format choices come
/// from the first dataset that has a report.
fn metric_charts(data: &DashboardData, ctx: &RenderContext) -> String {
    let Some(first) = data
        .summary
        .datasets
        .iter()
        .find_map(|ds| data.report(&ds.name))
    else {
        return note("Dataset reports not available.");
    };

    let mut out = String::new();
    for (format_index, format) in first.formats.keys().enumerate() {
        let mut charts = String::new();
        for metric in Metric::CHARTED {
            let points: Vec<LinePoint> = data
                .summary
                .datasets
                .iter()
                .map(|ds| LinePoint {
                    label: ds.name.clone(),
                    value: data
                        .report(&ds.name)
                        .and_then(|report| report.formats.get(format))
                        .and_then(|body| metric.extract(body)),
                    size: ds.rows.map(|rows| rows as f64),
                    size_label: Some(format!(
                        "{} rows",
                        format_number(ds.rows.map(|r| r as f64), 0)
                    )),
                })
                .collect();
            let formatter = |value: f64| metric.format_value(value);
            let chart = line_chart(
                &points,
                &formatter,
                ChartLayout::line(ctx.chart_width),
                &ctx.options,
            );
            charts.push_str(&format!(
                r#"<div class="chart-card"><h3>{} by dataset</h3>{chart}</div>"#,
                escape_html(metric.label())
            ));
        }
        out.push_str(&details(format, &charts, format_index == 0));
    }
    out
}

fn scatter_section(data: &DashboardData) -> String {
    let series: Vec<ScatterSeries> = data
        .summary
        .formats
        .keys()
        .map(|format| {
            let points = data
                .summary
                .datasets
                .iter()
                .filter_map(|ds| {
                    let body = data.report(&ds.name)?.formats.get(format)?;
                    let positive = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);
                    Some(ScatterPoint {
                        label: ds.name.clone(),
                        x: positive(Metric::CompressionRatio.extract(body))?,
                        y: positive(Metric::FullScan.extract(body))?,
                        z: positive(Metric::RandomAccess.extract(body))?,
                    })
                })
                .collect();
            ScatterSeries {
                label: format.clone(),
                color: format_color(format).to_string(),
                points,
            }
        })
        .collect();

    scatter3d_chart(
        "format-scatter",
        &series,
        &AxisTitles {
            x: "Compression ratio",
            y: "Full scan median (ms)",
            z: "Random access median (ms)",
        },
    )
}

fn row_scaling_links(scaling: &[RowScalingSummary]) -> String {
    let items: String = scaling
        .iter()
        .map(|summary| {
            format!(
                r#"<a class="sidebar-item" href="{}"><div>{}</div><span>{} row counts</span></a>"#,
                escape_html(&row_scaling_href(&summary.dataset)),
                escape_html(&summary.dataset),
                summary.row_counts.len(),
            )
        })
        .collect();
    format!(r#"<div class="sidebar">{items}</div>"#)
}

pub fn render_overview(
    data: &DashboardData,
    scaling: &[RowScalingSummary],
    nav: &[(String, String)],
    ctx: &RenderContext,
) -> String {
    let mut body = String::new();
    if data.from_cache {
        body.push_str(r#"<div class="banner">Showing cached data; the latest inputs could not be read.</div>"#);
    }
    body.push_str(&stats_section(&data.summary));
    body.push_str(&panel("Format geomeans", &format_cards(&data.summary.formats)));
    body.push_str(&panel(
        "Scan and predicate (geomean)",
        &latency_geomeans(&data.summary.formats, ctx),
    ));
    body.push_str(&panel(
        "LIKE summary (geomean)",
        &like_geomeans(&data.summary.formats, ctx),
    ));
    body.push_str(&panel(
        "Random access leaderboard",
        &leaderboard_section(&data.summary.formats),
    ));
    body.push_str(&panel("Datasets", &dataset_grid(&data.summary)));
    body.push_str(&panel("Dataset overview", &dataset_overview(&data.summary, ctx)));
    body.push_str(&panel("Metrics by dataset", &metric_charts(data, ctx)));
    body.push_str(&panel("Ratio vs latency", &scatter_section(data)));
    if !scaling.is_empty() {
        body.push_str(&panel("Row scaling", &row_scaling_links(scaling)));
    }

    document("Columnar format benchmarks", nav, &body)
}
