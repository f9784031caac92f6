use crate::chart::{ChartLayout, LineSeries, multi_line_chart};
use crate::format::{MISSING, display_name, escape_html, format_color, format_number, format_row_count};
use crate::metrics::Metric;
use crate::model::{MetricDescriptor, RowScalingSummary};

use super::RenderContext;
use super::page::{details, document, note, panel, table};

#[derive(Debug, Clone, PartialEq)]
pub struct RowBest {
    pub row_count: u64,
    pub format: Option<String>,
    pub value: Option<f64>,
}

fn metric_formatter(key: &str) -> impl Fn(f64) -> String {
    let metric = Metric::from_key(key);
    move |value| match metric {
        Some(metric) => metric.format_value(value),
        None => format_number(Some(value), 2),
    }
}

fn prefers_higher(key: &str) -> bool {
    Metric::from_key(key).is_some_and(Metric::prefers_higher)
}

/// Winning format at every row count. Ties keep the earlier format.
pub fn best_per_row_count(summary: &RowScalingSummary, metric_key: &str) -> Vec<RowBest> {
    let higher = prefers_higher(metric_key);
    summary
        .row_counts
        .iter()
        .enumerate()
        .map(|(idx, &row_count)| {
            let mut best: Option<(&str, f64)> = None;
            for format in &summary.formats {
                let Some(value) = summary
                    .values(metric_key, format)
                    .get(idx)
                    .copied()
                    .flatten()
                    .filter(|v| v.is_finite())
                else {
                    continue;
                };
                let better = match best {
                    None => true,
                    Some((_, current)) if higher => value > current,
                    Some((_, current)) => value < current,
                };
                if better {
                    best = Some((format.as_str(), value));
                }
            }
            RowBest {
                row_count,
                format: best.map(|(name, _)| name.to_string()),
                value: best.map(|(_, value)| value),
            }
        })
        .collect()
}

fn metric_section(
    summary: &RowScalingSummary,
    metric: &MetricDescriptor,
    row_labels: &[String],
    ctx: &RenderContext,
) -> String {
    let formatter = metric_formatter(&metric.key);
    let series: Vec<LineSeries> = summary
        .formats
        .iter()
        .map(|format| LineSeries {
            label: display_name(format),
            color: format_color(format).to_string(),
            values: summary.values(&metric.key, format).to_vec(),
        })
        .collect();

    let chart = multi_line_chart(
        &series,
        row_labels,
        &formatter,
        ChartLayout::multi_line(ctx.chart_width),
        &ctx.options,
    );

    let mut headers = vec!["Row count".to_string()];
    headers.extend(summary.formats.iter().map(|format| display_name(format)));
    let value_rows: Vec<Vec<String>> = summary
        .row_counts
        .iter()
        .enumerate()
        .map(|(idx, count)| {
            let mut row = vec![count.to_string()];
            row.extend(summary.formats.iter().map(|format| {
                summary
                    .values(&metric.key, format)
                    .get(idx)
                    .copied()
                    .flatten()
                    .filter(|v| v.is_finite())
                    .map(&formatter)
                    .unwrap_or_else(|| MISSING.to_string())
            }));
            row
        })
        .collect();

    let best_headers = vec!["Row count".to_string(), "Best format".to_string(), "Value".to_string()];
    let best_rows: Vec<Vec<String>> = best_per_row_count(summary, &metric.key)
        .into_iter()
        .map(|best| {
            vec![
                best.row_count.to_string(),
                best.format
                    .as_deref()
                    .map(display_name)
                    .unwrap_or_else(|| MISSING.to_string()),
                best.value
                    .map(&formatter)
                    .unwrap_or_else(|| MISSING.to_string()),
            ]
        })
        .collect();

    let counts = summary
        .row_counts
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"{chart}{}<h3>Values</h3>{}<h3>Best per row count</h3>{}"#,
        note(&format!("Row counts: {counts}")),
        table(&headers, &value_rows),
        table(&best_headers, &best_rows),
    )
}

pub fn render_row_scaling_page(
    summary: &RowScalingSummary,
    nav: &[(String, String)],
    ctx: &RenderContext,
) -> String {
    let row_labels: Vec<String> = summary
        .row_counts
        .iter()
        .map(|count| format_row_count(Some(*count as f64)))
        .collect();

    let mut body = format!(
        r#"<h1>Row scaling · {}</h1><p class="caption">Generated {}</p>"#,
        escape_html(&summary.dataset),
        escape_html(&summary.generated_at),
    );

    if summary.row_counts.is_empty() || summary.metrics.is_empty() {
        body.push_str(&note("Row scaling data not available."));
    } else {
        let sections: String = summary
            .metrics
            .iter()
            .enumerate()
            .map(|(index, metric)| {
                details(
                    &metric.label,
                    &metric_section(summary, metric, &row_labels, ctx),
                    index == 0,
                )
            })
            .collect();
        body.push_str(&panel("Metric trends", &sections));
    }

    document(
        &format!("Row scaling · {}", summary.dataset),
        nav,
        &body,
    )
}
