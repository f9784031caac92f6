use super::*;

fn plain(value: f64) -> String {
    format!("{value:.1}")
}

fn linear() -> ChartOptions {
    ChartOptions::default()
}

fn point(label: &str, value: Option<f64>) -> LinePoint {
    LinePoint {
        label: label.to_string(),
        value,
        ..LinePoint::default()
    }
}

#[test]
fn linear_ticks_are_five_even_steps_from_zero() {
    let scale = Scale::fit(&[2.0, 8.0], &linear());
    assert_eq!(scale.ticks(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
}

#[test]
fn linear_scale_maps_values_to_pixel_rows() {
    let layout = ChartLayout::line(640.0);
    let scale = Scale::fit(&[10.0], &linear());
    let top = layout.padding.top;
    let bottom = layout.padding.top + layout.chart_height();

    assert_eq!(scale.y(10.0, &layout), Some(top));
    assert_eq!(scale.y(0.0, &layout), Some(bottom));
    assert_eq!(scale.y(5.0, &layout), Some((top + bottom) / 2.0));
    assert_eq!(scale.y(f64::NAN, &layout), None);
}

#[test]
fn log_scale_uses_decade_bounds_and_skips_non_positive_values() {
    let options = ChartOptions {
        log_scale: true,
        ..ChartOptions::default()
    };
    let scale = Scale::fit(&[5.0, 0.0, 250.0], &options);
    assert_eq!(
        scale,
        Scale::Log {
            min_exp: 0,
            max_exp: 3
        }
    );
    assert_eq!(scale.ticks().len(), 4);
    assert_eq!(scale.ratio(0.0), None);
    assert_eq!(scale.ratio(1.0), Some(0.0));
}

#[test]
fn widen_for_keeps_minimum_spacing() {
    let layout = ChartLayout::line(640.0).widen_for(10, 140.0);
    assert_eq!(layout.width, 1400.0);
    let narrow = ChartLayout::line(640.0).widen_for(2, 140.0);
    assert_eq!(narrow.width, 640.0);
}

#[test]
fn line_chart_draws_one_marker_per_present_value() {
    let points = vec![
        point("parquet_zstd", Some(3.0)),
        point("parquet_snappy", None),
        point("vortex_default", Some(5.0)),
    ];
    let out = line_chart(&points, &plain, ChartLayout::line(640.0), &linear());

    assert_eq!(out.matches("<circle").count(), 2);
    assert_eq!(out.matches("stroke-dasharray").count(), TICK_COUNT + 1);
    assert!(out.contains("<title>vortex_default: 5.0</title>"));
    assert!(out.contains(">pq_zstd</tspan>"));
}

#[test]
fn line_chart_scales_marker_radius_by_size() {
    let points = vec![
        LinePoint {
            size: Some(100.0),
            size_label: Some("100 rows".to_string()),
            ..point("a", Some(1.0))
        },
        LinePoint {
            size: Some(200.0),
            ..point("b", Some(2.0))
        },
    ];
    let out = line_chart(&points, &plain, ChartLayout::line(640.0), &linear());

    assert!(out.contains(r#"r="4""#));
    assert!(out.contains(r#"r="10""#));
    assert!(out.contains("<title>a: 1.0 · 100 rows</title>"));
}

#[test]
fn line_chart_with_no_points_still_draws_axis() {
    let out = line_chart(&[], &plain, ChartLayout::line(640.0), &linear());
    assert!(out.contains("<svg"));
    assert_eq!(out.matches("<circle").count(), 0);
    assert!(!out.contains("<path d="));
    assert_eq!(out.matches("stroke-dasharray").count(), TICK_COUNT + 1);
}

#[test]
fn line_chart_flags_capped_outliers() {
    let mut points: Vec<LinePoint> = (0..19)
        .map(|i| point(&format!("d{i}"), Some(1.0)))
        .collect();
    points.push(point("huge", Some(500.0)));
    let options = ChartOptions {
        cap_outliers: true,
        ..ChartOptions::default()
    };
    let out = line_chart(&points, &plain, ChartLayout::line(640.0), &options);

    assert_eq!(out.matches(r#"class="is-clipped""#).count(), 1);
    assert!(out.contains("huge: 500.0 (off scale)"));
    assert!(out.contains("clip-marker"));
}

#[test]
fn multi_line_chart_shares_scale_and_renders_legend_on_request() {
    let series = vec![
        LineSeries {
            label: "zstd".to_string(),
            color: "#2f4a36".to_string(),
            values: vec![Some(1.0), Some(2.0), Some(4.0)],
        },
        LineSeries {
            label: "vortex".to_string(),
            color: "#a84c6f".to_string(),
            values: vec![Some(8.0), None, Some(2.0)],
        },
    ];
    let labels = vec!["1M".to_string(), "2M".to_string(), "4M".to_string()];
    let options = ChartOptions {
        show_legend: true,
        show_values: true,
        ..ChartOptions::default()
    };
    let out = multi_line_chart(&series, &labels, &plain, ChartLayout::multi_line(640.0), &options);

    assert_eq!(out.matches("<circle").count(), 5);
    assert_eq!(out.matches("<path d=").count(), 2);
    assert!(out.contains("<title>vortex · 1M: 8.0</title>"));
    assert!(out.contains(r#"class="legend""#));
    assert!(out.contains(">8.0</text>"));
}

#[test]
fn multi_line_chart_hides_legend_for_single_series() {
    let series = vec![LineSeries {
        label: "only".to_string(),
        color: "#000".to_string(),
        values: vec![Some(1.0)],
    }];
    let options = ChartOptions {
        show_legend: true,
        ..ChartOptions::default()
    };
    let out = multi_line_chart(
        &series,
        &["10%".to_string()],
        &plain,
        ChartLayout::multi_line(640.0),
        &options,
    );
    assert!(!out.contains(r#"class="legend""#));
}

#[test]
fn grouped_bar_chart_draws_one_rect_per_category_and_series() {
    let categories = vec![
        "prefix".to_string(),
        "suffix".to_string(),
        "contains".to_string(),
    ];
    let series = vec![
        BarSeries {
            label: "Warm".to_string(),
            color: "#2f4a36".to_string(),
            values: vec![Some(10.0), Some(20.0), None],
        },
        BarSeries {
            label: "Cold".to_string(),
            color: "#e38b2c".to_string(),
            values: vec![Some(40.0), Some(30.0), Some(5.0)],
        },
    ];
    let out = grouped_bar_chart(
        &categories,
        &series,
        &plain,
        ChartLayout::grouped_bar(640.0),
        &linear(),
    );

    assert_eq!(out.matches("<rect").count(), 6);
    assert!(out.contains(r#"height="0""#));
    assert!(out.contains("<title>Cold · prefix: 40.0</title>"));
}

#[test]
fn scatter3d_emits_one_trace_per_non_empty_series() {
    let series = vec![
        ScatterSeries {
            label: "parquet_zstd".to_string(),
            color: "#2f4a36".to_string(),
            points: vec![ScatterPoint {
                label: "taxi".to_string(),
                x: 4.0,
                y: 12.0,
                z: 0.5,
            }],
        },
        ScatterSeries {
            label: "empty".to_string(),
            color: "#000".to_string(),
            points: Vec::new(),
        },
    ];
    let axes = AxisTitles {
        x: "ratio",
        y: "scan",
        z: "lookup",
    };
    let out = scatter3d_chart("scatter", &series, &axes);

    assert_eq!(out.matches(r#""type":"scatter3d""#).count(), 1);
    assert!(out.contains("Plotly.newPlot(\"scatter\""));

    let none = scatter3d_chart("scatter", &[], &axes);
    assert!(none.contains("chart-empty"));
}
