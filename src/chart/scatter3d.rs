use serde_json::json;

use crate::format::escape_html;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub label: String,
    pub color: String,
    pub points: Vec<ScatterPoint>,
}

pub struct AxisTitles<'a> {
    pub x: &'a str,
    pub y: &'a str,
    pub z: &'a str,
}

/// Plotly `scatter3d` figure, one trace per series. The trace data is
/// serialized as JSON and handed to the plotting library on page load.
pub fn scatter3d_chart(element_id: &str, series: &[ScatterSeries], axes: &AxisTitles<'_>) -> String {
    let traces: Vec<serde_json::Value> = series
        .iter()
        .filter(|item| !item.points.is_empty())
        .map(|item| {
            json!({
                "type": "scatter3d",
                "mode": "markers",
                "name": item.label,
                "x": item.points.iter().map(|p| p.x).collect::<Vec<_>>(),
                "y": item.points.iter().map(|p| p.y).collect::<Vec<_>>(),
                "z": item.points.iter().map(|p| p.z).collect::<Vec<_>>(),
                "text": item.points.iter().map(|p| p.label.as_str()).collect::<Vec<_>>(),
                "hovertemplate": "%{text}<br>x=%{x}<br>y=%{y}<br>z=%{z}<extra>%{fullData.name}</extra>",
                "marker": { "size": 5, "color": item.color, "opacity": 0.85 },
            })
        })
        .collect();

    if traces.is_empty() {
        return r#"<p class="chart-empty">Not enough data for the 3D view.</p>"#.to_string();
    }

    let layout = json!({
        "margin": { "l": 0, "r": 0, "t": 0, "b": 0 },
        "scene": {
            "xaxis": { "title": { "text": axes.x } },
            "yaxis": { "title": { "text": axes.y }, "type": "log" },
            "zaxis": { "title": { "text": axes.z }, "type": "log" },
        },
        "legend": { "orientation": "h" },
    });

    // `</` inside JSON would end the script element early.
    let data = serde_json::Value::Array(traces).to_string().replace("</", "<\\/");
    let layout = layout.to_string().replace("</", "<\\/");
    let id = escape_html(element_id);

    format!(
        r#"<div id="{id}" class="scatter3d"></div>
<script src="{PLOTLY_CDN}"></script>
<script>Plotly.newPlot("{id}", {data}, {layout}, {{"responsive": true, "displaylogo": false}});</script>"#
    )
}
