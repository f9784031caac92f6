use std::collections::BTreeMap;

use crate::chart::{
    BarSeries, ChartLayout, LinePoint, LineSeries, grouped_bar_chart, line_chart, multi_line_chart,
};
use crate::format::{MISSING, escape_html, format_bytes, format_color, format_ms, format_number};
use crate::metrics::Metric;
use crate::model::{DatasetInfo, DatasetReport, FormatReport, LikeMeasurement};
use crate::stats::{finite_max, finite_min, is_best_max, is_best_min, mean};

use super::RenderContext;
use super::bars::{LATENCY_METRICS, column_type_bar, latency_chart};
use super::loader::DashboardData;
use super::page::{dataset_href, details, document, kv, note, panel, stat_tile, table};

const VISIBLE_ENCODING_COLUMNS: usize = 8;
const SLOWEST_PATTERNS: usize = 5;
const LIKE_CATEGORIES: [&str; 3] = ["prefix", "suffix", "contains"];
const WARM_COLOR: &str = "#2f4a36";
const COLD_COLOR: &str = "#e38b2c";
const BASELINE_COLOR: &str = "#4c6fa8";

/// Metrics shown on each format card, in display order.
const CARD_METRICS: [Metric; 7] = [
    Metric::CompressionRatio,
    Metric::OutputSize,
    Metric::WriteTime,
    Metric::CompressionSpeed,
    Metric::FullScan,
    Metric::Selective,
    Metric::RandomAccess,
];

/// Best value of `metric` across formats: the maximum for metrics where higher
/// wins, the minimum otherwise.
pub fn best_value(formats: &BTreeMap<String, FormatReport>, metric: Metric) -> Option<f64> {
    let values = formats.values().map(|body| metric.extract(body));
    if metric.prefers_higher() {
        finite_max(values)
    } else {
        finite_min(values)
    }
}

fn is_best(metric: Metric, value: Option<f64>, best: Option<f64>) -> bool {
    if metric.prefers_higher() {
        is_best_max(value, best)
    } else {
        is_best_min(value, best)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub label: &'static str,
    pub format: Option<String>,
}

fn pick(
    formats: &BTreeMap<String, FormatReport>,
    metric: Metric,
    better: fn(f64, f64) -> bool,
) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for (name, body) in formats {
        let Some(value) = metric.extract(body).filter(|v| v.is_finite()) else {
            continue;
        };
        if best.is_none_or(|(_, current)| better(value, current)) {
            best = Some((name.as_str(), value));
        }
    }
    best.map(|(name, _)| name.to_string())
}

pub fn recommendations(formats: &BTreeMap<String, FormatReport>) -> Vec<Recommendation> {
    vec![
        Recommendation {
            label: "Storage-first",
            format: pick(formats, Metric::CompressionRatio, |a, b| a > b),
        },
        Recommendation {
            label: "Read-latency-first",
            format: pick(formats, Metric::RandomAccess, |a, b| a < b),
        },
        Recommendation {
            label: "Scan-first",
            format: pick(formats, Metric::FullScan, |a, b| a < b),
        },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct LikeTypeStat {
    pub pattern_type: String,
    pub count: usize,
    pub mean_ms: f64,
}

/// Pattern count and mean latency per pattern type, in first-seen order.
/// Missing timings count as zero.
pub fn like_type_stats(rows: &[&LikeMeasurement]) -> Vec<LikeTypeStat> {
    let mut stats: Vec<(String, usize, f64)> = Vec::new();
    for item in rows {
        let key = item.pattern_type.as_deref().unwrap_or("unknown");
        let value = item.median_ms.filter(|v| v.is_finite()).unwrap_or(0.0);
        match stats.iter_mut().find(|(name, _, _)| name == key) {
            Some((_, count, total)) => {
                *count += 1;
                *total += value;
            }
            None => stats.push((key.to_string(), 1, value)),
        }
    }
    stats
        .into_iter()
        .map(|(pattern_type, count, total)| LikeTypeStat {
            pattern_type,
            count,
            mean_ms: total / count as f64,
        })
        .collect()
}

pub fn slowest_patterns<'a>(rows: &[&'a LikeMeasurement], limit: usize) -> Vec<&'a LikeMeasurement> {
    let mut timed: Vec<&LikeMeasurement> = rows
        .iter()
        .copied()
        .filter(|item| item.median_ms.is_some_and(f64::is_finite))
        .collect();
    timed.sort_by(|a, b| {
        b.median_ms
            .unwrap_or_default()
            .total_cmp(&a.median_ms.unwrap_or_default())
    });
    timed.truncate(limit);
    timed
}

/// Mean latency per LIKE category over timed rows only.
fn like_category_means(rows: &[LikeMeasurement]) -> Vec<Option<f64>> {
    LIKE_CATEGORIES
        .iter()
        .map(|category| {
            let values: Vec<f64> = rows
                .iter()
                .filter(|item| item.pattern_type.as_deref() == Some(*category))
                .filter_map(|item| item.median_ms.filter(|v| v.is_finite()))
                .collect();
            mean(&values)
        })
        .collect()
}

fn selectivity_label(p: f64) -> String {
    format!("{}%", (p * 100.0).round() as i64)
}

/// Links to every dataset registered in the manifest.
fn sidebar(data: &DashboardData, active: &str) -> String {
    let mut out = String::from(r#"<aside class="sidebar">"#);
    for entry in &data.manifest.datasets {
        let class = if entry.name == active {
            "sidebar-item is-active"
        } else {
            "sidebar-item"
        };
        let status = if data.report(&entry.name).is_some() {
            "report"
        } else {
            "missing"
        };
        out.push_str(&format!(
            r#"<a class="{class}" href="{}"><div>{}</div><span>{status}</span></a>"#,
            escape_html(&dataset_href(&entry.name)),
            escape_html(&entry.name),
        ));
    }
    out.push_str("</aside>");
    out
}

fn dataset_stats(dataset: &DatasetInfo) -> String {
    let columns: u64 = dataset.column_type_counts.values().sum();
    format!(
        r#"<div class="stats-grid">{}{}{}{}</div>"#,
        stat_tile("Rows", &format_number(dataset.rows.map(|r| r as f64), 0)),
        stat_tile(
            "Input size",
            &format_bytes(dataset.input_size_bytes.map(|b| b as f64))
        ),
        stat_tile(
            "Dropped rows",
            &format_number(Some(dataset.dropped_rows.unwrap_or(0) as f64), 0)
        ),
        stat_tile("Columns", &format_number(Some(columns as f64), 0)),
    )
}

fn format_card(name: &str, body: &FormatReport, best: &[(Metric, Option<f64>)]) -> String {
    let mut rows = String::new();
    for (metric, target) in best {
        let value = metric.extract(body);
        let text = value
            .filter(|v| v.is_finite())
            .map(|v| metric.format_value(v))
            .unwrap_or_else(|| MISSING.to_string());
        let class = if is_best(*metric, value, *target) {
            "is-best"
        } else {
            ""
        };
        rows.push_str(&kv(metric.label(), &text, class));
    }

    let mismatch = body.validation.as_ref().is_some_and(|v| v.has_mismatch());
    rows.push_str(&kv(
        "Validation",
        if mismatch { "Mismatch" } else { "OK" },
        if mismatch { "is-bad" } else { "" },
    ));

    format!(
        r#"<div class="format-card"><h3>{}</h3>{rows}</div>"#,
        escape_html(name)
    )
}

fn format_cards(formats: &BTreeMap<String, FormatReport>) -> String {
    if formats.is_empty() {
        return note("No format results in this report.");
    }
    let best: Vec<(Metric, Option<f64>)> = CARD_METRICS
        .into_iter()
        .map(|metric| (metric, best_value(formats, metric)))
        .collect();
    let cards: String = formats
        .iter()
        .map(|(name, body)| format_card(name, body, &best))
        .collect();
    format!(r#"<div class="format-grid">{cards}</div>"#)
}

fn metric_charts(formats: &BTreeMap<String, FormatReport>, ctx: &RenderContext) -> String {
    let mut out = String::new();
    for (index, metric) in Metric::CHARTED.into_iter().enumerate() {
        let points: Vec<LinePoint> = formats
            .iter()
            .map(|(name, body)| LinePoint {
                label: name.clone(),
                value: metric.extract(body),
                ..LinePoint::default()
            })
            .collect();
        let formatter = |value: f64| metric.format_value(value);
        let chart = line_chart(
            &points,
            &formatter,
            ChartLayout::line(ctx.chart_width),
            &ctx.options,
        );
        out.push_str(&details(metric.label(), &chart, index == 0));
    }
    out
}

/// Median latency per query kind for every format that was written.
fn scan_predicate_latency(formats: &BTreeMap<String, FormatReport>, ctx: &RenderContext) -> String {
    let rows: Vec<(String, [Option<f64>; 3])> = formats
        .iter()
        .filter(|(_, body)| body.write.is_some())
        .map(|(name, body)| {
            (
                name.clone(),
                LATENCY_METRICS.map(|(metric, _)| metric.extract(body)),
            )
        })
        .collect();
    latency_chart(&rows, ctx)
}

fn ndv_ratios(dataset: &DatasetInfo) -> String {
    let items: Vec<(&String, f64)> = dataset
        .ndv_ratio_by_type
        .iter()
        .filter_map(|(key, value)| value.filter(|v| v.is_finite()).map(|v| (key, v)))
        .collect();
    if items.is_empty() {
        return note("NDV ratios not available.");
    }
    items
        .into_iter()
        .map(|(key, value)| {
            format!(
                r#"<div class="mini-bar-row"><div class="mini-bar-label">{}</div><div class="mini-bar-track"><div class="mini-bar-fill" style="width:{:.1}%"></div></div><div class="mini-bar-value">{value:.3}</div></div>"#,
                escape_html(key),
                (value * 100.0).min(100.0),
            )
        })
        .collect()
}

fn recommendation_cards(formats: &BTreeMap<String, FormatReport>) -> String {
    if formats.is_empty() {
        return note("No recommendations available.");
    }
    let cards: String = recommendations(formats)
        .into_iter()
        .map(|rec| {
            let class = if rec.format.is_some() {
                "rec-card is-selected"
            } else {
                "rec-card"
            };
            format!(
                r#"<div class="{class}"><div class="rec-label">{}</div><div class="rec-value">{}</div></div>"#,
                rec.label,
                escape_html(rec.format.as_deref().unwrap_or("N/A")),
            )
        })
        .collect();
    format!(r#"<div class="rec-grid">{cards}</div>"#)
}

fn encoding_lines(columns: &[(&String, &Vec<String>)]) -> String {
    columns
        .iter()
        .map(|(col, encodings)| {
            escape_html(&format!("{col}: {}", encodings.join(", ")))
        })
        .collect::<Vec<_>>()
        .join("<br />")
}

fn encodings(formats: &BTreeMap<String, FormatReport>) -> String {
    if formats.is_empty() {
        return note("No encoding data.");
    }
    let mut out = String::new();
    for (index, (name, body)) in formats.iter().enumerate() {
        let columns: Vec<(&String, &Vec<String>)> = body.encodings.per_column.iter().collect();
        let split = columns.len().min(VISIBLE_ENCODING_COLUMNS);
        let (visible, hidden) = columns.split_at(split);

        let mut group = String::from(r#"<div class="encoding-group"><div class="encoding-body">"#);
        if visible.is_empty() {
            group.push_str("No encoding metadata.");
        } else {
            group.push_str(&encoding_lines(visible));
        }
        if !hidden.is_empty() {
            group.push_str(&details(
                &format!("+{} more columns", hidden.len()),
                &encoding_lines(hidden),
                false,
            ));
        }
        group.push_str("</div></div>");
        out.push_str(&details(name, &group, index == 0));
    }
    out
}

fn selectivity(formats: &BTreeMap<String, FormatReport>, ctx: &RenderContext) -> String {
    let Some(first) = formats.values().next() else {
        return note("Selectivity data not available.");
    };
    let columns: Vec<&String> = first.queries.selectivity_by_col.keys().collect();
    if columns.is_empty() {
        return note("Selectivity data not available.");
    }

    let mut out = String::new();
    for (index, column) in columns.into_iter().enumerate() {
        let mut x_labels: Vec<String> = Vec::new();
        let mut series = Vec::new();
        for (name, body) in formats {
            let points = body
                .queries
                .selectivity_by_col
                .get(column)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            if x_labels.is_empty() && !points.is_empty() {
                x_labels = points.iter().map(|point| selectivity_label(point.p)).collect();
            }
            series.push(LineSeries {
                label: name.clone(),
                color: format_color(name).to_string(),
                values: points.iter().map(|point| point.median_ms).collect(),
            });
        }

        let body = if x_labels.is_empty() {
            note("Selectivity data not available.")
        } else {
            multi_line_chart(
                &series,
                &x_labels,
                &|value: f64| format_ms(Some(value)),
                ChartLayout::multi_line(ctx.chart_width),
                &ctx.options,
            )
        };
        out.push_str(&details(column, &body, index == 0));
    }

    let best_cols = formats
        .iter()
        .map(|(name, body)| {
            format!("{name}: {}", body.best_select_col.as_deref().unwrap_or("n/a"))
        })
        .collect::<Vec<_>>()
        .join(" · ");
    out.push_str(&note(&format!("Best selectivity column: {best_cols}")));
    out
}

fn like_summary(name: &str, rows: &[&LikeMeasurement]) -> String {
    let lines: String = like_type_stats(rows)
        .iter()
        .map(|stat| {
            format!(
                r#"<div class="like-row"><span>{}</span><strong>{} patterns · {}</strong></div>"#,
                escape_html(&stat.pattern_type),
                stat.count,
                format_ms(Some(stat.mean_ms)),
            )
        })
        .collect();
    let slowest: String = slowest_patterns(rows, SLOWEST_PATTERNS)
        .into_iter()
        .map(|item| {
            format!(
                r#"<div class="like-table-row"><span>{} on {}</span><strong>{}</strong></div>"#,
                escape_html(item.pattern_type.as_deref().unwrap_or("unknown")),
                escape_html(item.pattern.as_deref().unwrap_or(MISSING)),
                format_ms(item.median_ms),
            )
        })
        .collect();
    format!(
        r#"<div class="like-grid"><div class="like-card"><div class="like-title">{name}</div>{lines}</div><div class="like-card"><div class="like-title">{name} · Slowest patterns</div>{slowest}</div></div>"#,
        name = escape_html(name),
    )
}

fn like_predicates(formats: &BTreeMap<String, FormatReport>, ctx: &RenderContext) -> String {
    if formats.is_empty() {
        return note("No LIKE predicate data.");
    }
    let categories: Vec<String> = LIKE_CATEGORIES.iter().map(|c| c.to_string()).collect();

    let mut out = String::new();
    for (index, (name, body)) in formats.iter().enumerate() {
        let like_by_col = &body.queries.like_by_col;
        let rows: Vec<&LikeMeasurement> = like_by_col.values().flatten().collect();
        if rows.is_empty() {
            out.push_str(&format!(
                r#"<div class="like-note">{}: LIKE predicates not available.</div>"#,
                escape_html(name)
            ));
            continue;
        }

        let mut section = like_summary(name, &rows);
        for (column, measurements) in like_by_col {
            let chart = if measurements.iter().any(|m| m.median_ms.is_some_and(f64::is_finite)) {
                grouped_bar_chart(
                    &categories,
                    &[BarSeries {
                        label: name.clone(),
                        color: format_color(name).to_string(),
                        values: like_category_means(measurements),
                    }],
                    &|value: f64| format_ms(Some(value)),
                    ChartLayout::grouped_bar(ctx.chart_width),
                    &ctx.options,
                )
            } else {
                note("No LIKE predicate data.")
            };
            section.push_str(&format!(
                r#"<div class="chart-card"><h3>{}</h3>{chart}</div>"#,
                escape_html(column)
            ));
        }
        out.push_str(&details(name, &section, index == 0));
    }
    out
}

fn diagnostics(formats: &BTreeMap<String, FormatReport>, ctx: &RenderContext) -> String {
    if formats.is_empty() {
        return note("No diagnostics available.");
    }
    let headers: Vec<String> = ["Format", "Full scan (ms)", "Cold (ms)", "Row groups", "Note"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = formats
        .iter()
        .map(|(name, body)| {
            vec![
                name.clone(),
                format_ms(Metric::FullScan.extract(body)),
                format_ms(Metric::ColdFullScan.extract(body)),
                body.write
                    .as_ref()
                    .and_then(|w| w.row_group_count)
                    .map(|count| count.to_string())
                    .unwrap_or_else(|| MISSING.to_string()),
                body.note.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let categories: Vec<String> = formats.keys().cloned().collect();
    let warm: Vec<Option<f64>> = formats.values().map(|b| Metric::FullScan.extract(b)).collect();
    let cold: Vec<Option<f64>> = formats
        .values()
        .map(|b| Metric::ColdFullScan.extract(b))
        .collect();
    let formatter = |value: f64| format_ms(Some(value));

    let warm_cold = grouped_bar_chart(
        &categories,
        &[
            BarSeries {
                label: "Warm".to_string(),
                color: WARM_COLOR.to_string(),
                values: warm.clone(),
            },
            BarSeries {
                label: "Cold".to_string(),
                color: COLD_COLOR.to_string(),
                values: cold,
            },
        ],
        &formatter,
        ChartLayout::grouped_bar(ctx.chart_width),
        &ctx.options,
    );
    let baseline = grouped_bar_chart(
        &categories,
        &[BarSeries {
            label: "Median".to_string(),
            color: BASELINE_COLOR.to_string(),
            values: warm,
        }],
        &formatter,
        ChartLayout::grouped_bar(ctx.chart_width),
        &ctx.options,
    );

    format!(
        r#"{}<div class="chart-card"><h3>Warm vs cold full scan</h3>{warm_cold}</div><div class="chart-card"><h3>Full scan median</h3>{baseline}</div>"#,
        table(&headers, &rows)
    )
}

fn report_sections(name: &str, report: &DatasetReport, ctx: &RenderContext) -> String {
    let dataset = &report.dataset;
    let formats = &report.formats;
    let label = dataset.name.as_deref().unwrap_or(name);
    let caption = format!(
        "{label} | {} rows",
        format_number(dataset.rows.map(|r| r as f64), 0)
    );

    let mut body = format!(r#"<p class="caption">{}</p>"#, escape_html(&caption));
    body.push_str(&dataset_stats(dataset));
    body.push_str(&panel("Formats", &format_cards(formats)));
    body.push_str(&panel("Metrics by format", &metric_charts(formats, ctx)));
    body.push_str(&panel(
        "Scan and predicate latency",
        &scan_predicate_latency(formats, ctx),
    ));
    body.push_str(&panel("Column types", &column_type_bar(&dataset.column_type_counts)));
    body.push_str(&panel("NDV ratio by type", &ndv_ratios(dataset)));
    body.push_str(&panel("Recommendations", &recommendation_cards(formats)));
    body.push_str(&panel("Encodings", &encodings(formats)));
    body.push_str(&panel("Selectivity", &selectivity(formats, ctx)));
    body.push_str(&panel("LIKE predicates", &like_predicates(formats, ctx)));
    body.push_str(&panel("Diagnostics", &diagnostics(formats, ctx)));
    body
}

pub fn render_dataset_page(
    name: &str,
    data: &DashboardData,
    nav: &[(String, String)],
    ctx: &RenderContext,
) -> String {
    let content = match data.report(name) {
        Some(report) => report_sections(name, report, ctx),
        None => note(&format!("Report not available for {name}.")),
    };
    let body = format!(
        r#"<h1>{}</h1><div class="layout">{}<div>{content}</div></div>"#,
        escape_html(name),
        sidebar(data, name),
    );
    document(&format!("{name} · Columnar format benchmarks"), nav, &body)
}
