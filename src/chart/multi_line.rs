use super::svg::SvgWriter;
use super::{
    ChartLayout, ChartOptions, Scale, draw_value_axis, legend_html, tooltip_value, wrap_chart,
};

const PIXELS_PER_LABEL: f64 = 90.0;
const POINT_RADIUS: f64 = 4.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub color: String,
    pub values: Vec<Option<f64>>,
}

/// One line per series over shared x positions. The scale is fitted to every
/// finite value of every series; a missing value breaks its line.
pub fn multi_line_chart(
    series: &[LineSeries],
    x_labels: &[String],
    formatter: &dyn Fn(f64) -> String,
    base: ChartLayout,
    options: &ChartOptions,
) -> String {
    let layout = base.widen_for(x_labels.len(), PIXELS_PER_LABEL);
    let all_values: Vec<f64> = series
        .iter()
        .flat_map(|line| line.values.iter().copied().flatten())
        .collect();
    let scale = Scale::fit(&all_values, options);

    let mut svg = SvgWriter::new(layout.width, layout.height);
    draw_value_axis(&mut svg, &scale, &layout, formatter);

    let point_gap = if x_labels.len() > 1 {
        layout.chart_width() / (x_labels.len() - 1) as f64
    } else {
        0.0
    };

    for (index, label) in x_labels.iter().enumerate() {
        svg.text(
            layout.padding.left + point_gap * index as f64,
            layout.height - 24.0,
            "middle",
            12,
            label,
        );
    }

    for line in series {
        let placed: Vec<Option<(f64, f64)>> = line
            .values
            .iter()
            .take(x_labels.len())
            .enumerate()
            .map(|(index, &value)| {
                let x = layout.padding.left + point_gap * index as f64;
                value
                    .and_then(|value| scale.y(value, &layout))
                    .map(|y| (x, y))
            })
            .collect();
        svg.path(&placed, &line.color);

        for (index, position) in placed.iter().enumerate() {
            let (Some((x, y)), Some(value)) = (*position, line.values[index]) else {
                continue;
            };
            let clipped = scale.is_clipped(value);
            let tooltip = format!(
                "{} · {}: {}",
                line.label,
                x_labels[index],
                tooltip_value(&scale, value, formatter)
            );
            svg.circle(x, y, POINT_RADIUS, &line.color, clipped, &tooltip);
            if clipped {
                svg.clip_marker(x, y);
            }

            if options.show_values {
                let label_y = (y - 8.0).max(layout.padding.top + 10.0);
                svg.text(x, label_y, "middle", 10, &formatter(value));
            }
        }
    }

    let legend = if options.show_legend && series.len() > 1 {
        legend_html(
            series
                .iter()
                .map(|line| (line.label.as_str(), line.color.as_str())),
        )
    } else {
        String::new()
    };

    wrap_chart(svg.finish(), &legend)
}
