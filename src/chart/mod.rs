//! Hand-rolled SVG chart primitives.
//!
//! Every chart is a pure function from a data series to an HTML fragment
//! holding one `<svg>` element. Hover tooltips are SVG `<title>` children so
//! the output needs no script.

mod grouped_bar;
mod line;
mod multi_line;
mod scale;
mod scatter3d;
mod svg;
#[cfg(test)]
mod tests;

pub use grouped_bar::{BarSeries, grouped_bar_chart};
pub use line::{LinePoint, line_chart};
pub use multi_line::{LineSeries, multi_line_chart};
pub use scale::Scale;
pub use scatter3d::{AxisTitles, ScatterPoint, ScatterSeries, scatter3d_chart};

use crate::format::escape_html;

use svg::SvgWriter;

pub const TICK_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
}

impl ChartLayout {
    pub fn line(base_width: f64) -> Self {
        Self {
            width: base_width,
            height: 420.0,
            padding: Padding {
                top: 18.0,
                right: 16.0,
                bottom: 160.0,
                left: 56.0,
            },
        }
    }

    pub fn multi_line(base_width: f64) -> Self {
        Self {
            width: base_width,
            height: 320.0,
            padding: Padding {
                top: 18.0,
                right: 24.0,
                bottom: 60.0,
                left: 56.0,
            },
        }
    }

    pub fn grouped_bar(base_width: f64) -> Self {
        Self {
            width: base_width,
            height: 420.0,
            padding: Padding {
                top: 18.0,
                right: 40.0,
                bottom: 140.0,
                left: 64.0,
            },
        }
    }

    /// Grows the plot so each item keeps at least `per_item` pixels; the
    /// container scrolls horizontally instead of squeezing labels.
    pub fn widen_for(mut self, items: usize, per_item: f64) -> Self {
        self.width = self.width.max(items as f64 * per_item);
        self
    }

    pub fn chart_width(&self) -> f64 {
        self.width - self.padding.left - self.padding.right
    }

    pub fn chart_height(&self) -> f64 {
        self.height - self.padding.top - self.padding.bottom
    }
}

/// View toggles shared by all chart kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartOptions {
    pub log_scale: bool,
    pub cap_outliers: bool,
    pub show_values: bool,
    pub show_legend: bool,
}

/// Dashed gridlines with formatted tick labels along the left edge.
fn draw_value_axis(
    svg: &mut SvgWriter,
    scale: &Scale,
    layout: &ChartLayout,
    formatter: &dyn Fn(f64) -> String,
) {
    for tick in scale.ticks() {
        let Some(y) = scale.y(tick, layout) else {
            continue;
        };
        svg.grid_line(layout.padding.left, layout.width - layout.padding.right, y);
        svg.text(
            layout.padding.left - 8.0,
            y + 4.0,
            "end",
            11,
            &formatter(tick),
        );
    }
}

fn wrap_chart(svg: String, extra: &str) -> String {
    format!(r#"<div class="chart-scroll">{svg}</div>{extra}"#)
}

fn legend_html<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::from(r#"<div class="legend">"#);
    for (label, color) in items {
        out.push_str(&format!(
            r#"<div class="legend-item"><span class="legend-dot" style="background:{}"></span>{}</div>"#,
            escape_html(color),
            escape_html(label),
        ));
    }
    out.push_str("</div>");
    out
}

fn tooltip_value(scale: &Scale, value: f64, formatter: &dyn Fn(f64) -> String) -> String {
    if scale.is_clipped(value) {
        format!("{} (off scale)", formatter(value))
    } else {
        formatter(value)
    }
}
