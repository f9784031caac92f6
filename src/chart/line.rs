use crate::format::split_label;
use crate::stats::{finite_max, finite_min};

use super::svg::SvgWriter;
use super::{ChartLayout, ChartOptions, Scale, draw_value_axis, tooltip_value, wrap_chart};

const LINE_STROKE: &str = "#2f4a36";
const POINT_FILL: &str = "#e38b2c";
const PIXELS_PER_POINT: f64 = 140.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinePoint {
    pub label: String,
    pub value: Option<f64>,
    /// Secondary magnitude encoded in the marker radius (row count on the overview).
    pub size: Option<f64>,
    pub size_label: Option<String>,
}

fn point_radius(size: Option<f64>, bounds: Option<(f64, f64)>) -> f64 {
    match (size.filter(|s| s.is_finite()), bounds) {
        (Some(_), Some((min, max))) if min == max => 7.0,
        (Some(size), Some((min, max))) => 4.0 + ((size - min) / (max - min)) * 6.0,
        _ => 5.0,
    }
}

pub fn line_chart(
    points: &[LinePoint],
    formatter: &dyn Fn(f64) -> String,
    base: ChartLayout,
    options: &ChartOptions,
) -> String {
    let layout = base.widen_for(points.len(), PIXELS_PER_POINT);
    let values: Vec<f64> = points.iter().filter_map(|point| point.value).collect();
    let scale = Scale::fit(&values, options);

    let size_bounds = finite_min(points.iter().map(|p| p.size))
        .zip(finite_max(points.iter().map(|p| p.size)));

    let mut svg = SvgWriter::new(layout.width, layout.height);
    draw_value_axis(&mut svg, &scale, &layout, formatter);

    let point_gap = if points.len() > 1 {
        layout.chart_width() / (points.len() - 1) as f64
    } else {
        0.0
    };

    let placed: Vec<Option<(f64, f64)>> = points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let x = layout.padding.left + point_gap * index as f64;
            point
                .value
                .and_then(|value| scale.y(value, &layout))
                .map(|y| (x, y))
        })
        .collect();

    svg.path(&placed, LINE_STROKE);

    for (index, point) in points.iter().enumerate() {
        let x = layout.padding.left + point_gap * index as f64;

        if let (Some((cx, cy)), Some(value)) = (placed[index], point.value) {
            let clipped = scale.is_clipped(value);
            let size_hint = point
                .size_label
                .as_ref()
                .map(|label| format!(" · {label}"))
                .unwrap_or_default();
            let tooltip = format!(
                "{}: {}{size_hint}",
                point.label,
                tooltip_value(&scale, value, formatter)
            );
            let radius = point_radius(point.size, size_bounds);
            svg.circle(cx, cy, radius, POINT_FILL, clipped, &tooltip);
            if clipped {
                svg.clip_marker(cx, cy);
            }
            if options.show_values {
                let label_y = (cy - 10.0).max(layout.padding.top + 10.0);
                svg.text(cx, label_y, "middle", 10, &formatter(value));
            }
        }

        let label_y = layout.height - layout.padding.bottom + 28.0;
        svg.text_lines(x, label_y, 11, &split_label(&point.label));
    }

    wrap_chart(svg.finish(), "")
}
