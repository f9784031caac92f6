use crate::format::{short_label, split_label};

use super::svg::SvgWriter;
use super::{
    ChartLayout, ChartOptions, Scale, draw_value_axis, legend_html, tooltip_value, wrap_chart,
};

const PIXELS_PER_CATEGORY: f64 = 90.0;
const GROUP_FILL: f64 = 0.7;
const GROUP_INSET: f64 = 0.15;
const BAR_FILL: f64 = 0.9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    pub label: String,
    pub color: String,
    pub values: Vec<Option<f64>>,
}

/// Side-by-side bars per category, one bar per series. Missing values draw as
/// zero-height bars so the group layout stays aligned.
pub fn grouped_bar_chart(
    categories: &[String],
    series: &[BarSeries],
    formatter: &dyn Fn(f64) -> String,
    base: ChartLayout,
    options: &ChartOptions,
) -> String {
    let layout = base.widen_for(categories.len(), PIXELS_PER_CATEGORY);
    let all_values: Vec<f64> = series
        .iter()
        .flat_map(|item| item.values.iter().copied().flatten())
        .collect();
    let scale = Scale::fit(&all_values, options);

    let mut svg = SvgWriter::new(layout.width, layout.height);
    draw_value_axis(&mut svg, &scale, &layout, formatter);

    let chart_width = layout.chart_width();
    let chart_height = layout.chart_height();
    let group_width = if categories.is_empty() {
        0.0
    } else {
        chart_width / categories.len() as f64
    };
    let bar_width = if series.is_empty() {
        0.0
    } else {
        group_width * GROUP_FILL / series.len() as f64
    };

    let min_label_x = layout.padding.left + 6.0;
    let max_label_x = layout.width - layout.padding.right - 6.0;
    let baseline = layout.padding.top + chart_height;

    for (index, category) in categories.iter().enumerate() {
        let group_left = layout.padding.left + index as f64 * group_width;
        let x_start = group_left + group_width * GROUP_INSET;
        let label_x = (group_left + group_width * 0.5).clamp(min_label_x, max_label_x);
        svg.text_lines(
            label_x,
            layout.height - 40.0,
            11,
            &split_label(&short_label(category)),
        );

        for (series_index, item) in series.iter().enumerate() {
            let value = item.values.get(index).copied().flatten().unwrap_or(0.0);
            let bar_height = scale.ratio(value).unwrap_or(0.0) * chart_height;
            let clipped = scale.is_clipped(value);
            let tooltip = format!(
                "{} · {category}: {}",
                item.label,
                tooltip_value(&scale, value, formatter)
            );
            let x = x_start + series_index as f64 * bar_width;
            svg.rect(
                x,
                baseline - bar_height,
                bar_width * BAR_FILL,
                bar_height,
                &item.color,
                clipped,
                &tooltip,
            );
            if clipped {
                svg.clip_marker(x + bar_width * BAR_FILL / 2.0, baseline - bar_height);
            }
            if options.show_values && bar_height > 0.0 {
                let label_y = (baseline - bar_height - 6.0).max(layout.padding.top + 10.0);
                svg.text(
                    x + bar_width * BAR_FILL / 2.0,
                    label_y,
                    "middle",
                    10,
                    &formatter(value),
                );
            }
        }
    }

    let legend = if options.show_legend && series.len() > 1 {
        legend_html(
            series
                .iter()
                .map(|item| (item.label.as_str(), item.color.as_str())),
        )
    } else {
        String::new()
    };

    wrap_chart(svg.finish(), &legend)
}
