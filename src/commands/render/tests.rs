use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::json;

use super::dataset::{
    best_value, like_type_stats, recommendations, render_dataset_page, slowest_patterns,
};
use super::loader::{
    DashboardData, MANIFEST_SNAPSHOT, SUMMARY_SNAPSHOT, load_dashboard, load_row_scaling,
    report_path_for,
};
use super::bars::latency_groups;
use super::overview::{leaderboard, like_geomean_series, ndv_tile, overall_stats, render_overview};
use super::scaling::best_per_row_count;
use super::*;
use crate::cli::{ManifestArgs, RowScalingArgs};
use crate::commands::summarize::{SUMMARY_JSON, build_summary};
use crate::commands::{manifest, row_scaling};
use crate::metrics::Metric;
use crate::model::{
    DatasetReport, DatasetSummary, FormatReport, FormatSummary, LikeGeomeans, LikeMeasurement,
    Manifest, ManifestEntry, OverallSummary, QueryGeomeans, RowScalingSummary,
};
use crate::util::write_json_pretty;

fn ctx() -> RenderContext {
    RenderContext {
        options: ChartOptions {
            cap_outliers: true,
            ..ChartOptions::default()
        },
        chart_width: 640.0,
    }
}

fn sample_report() -> DatasetReport {
    let per_column: BTreeMap<String, Vec<String>> = (0..10)
        .map(|i| (format!("col{i:02}"), vec!["dict".to_string(), "rle".to_string()]))
        .collect();
    serde_json::from_value(json!({
        "dataset": {
            "name": "taxi",
            "rows": 1000,
            "input_size_bytes": 4096,
            "column_type_counts": {"numeric": 3, "text": 1},
            "ndv_ratio_by_type": {"numeric": 0.25, "text": null}
        },
        "formats": {
            "parquet_zstd": {
                "compression_ratio": 3.0,
                "write": {"output_size_bytes": 1000, "compression_time_s": 0.5, "row_group_count": 4},
                "queries": {
                    "full_scan_min": {"median_ms": 12.0, "cold_ms": 30.0},
                    "random_access": {"median_ms": 2.0},
                    "selectivity_by_col": {"fare": [{"p": 0.1, "median_ms": 3.0}, {"p": 0.5, "median_ms": 5.0}]},
                    "like_by_col": {"name": [
                        {"pattern_type": "prefix", "pattern": "ab%", "median_ms": 2.0},
                        {"pattern_type": "suffix", "pattern": "%yz", "median_ms": 6.0}
                    ]}
                },
                "encodings": {"per_column": per_column},
                "validation": {"count_match": true, "min_match": true},
                "best_select_col": "fare"
            },
            "vortex_default": {
                "compression_ratio": 2.0,
                "write": {"output_size_bytes": 1500, "compression_time_s": 0.2},
                "queries": {
                    "full_scan_min": {"median_ms": 8.0},
                    "random_access": {"median_ms": 4.0}
                },
                "validation": {"count_match": false},
                "note": "experimental"
            }
        }
    }))
    .expect("sample report should deserialize")
}

fn write_inputs(root: &Path) {
    let out = root.join("out");
    fs::create_dir_all(&out).expect("out dir");
    let report = sample_report();
    write_json_pretty(&out.join("report_taxi.json"), &report).expect("write report");
    write_json_pretty(&out.join(SUMMARY_JSON), &build_summary(&[report])).expect("write summary");
    manifest::run(ManifestArgs {
        reports_dir: out,
        manifest_path: root.join("website/data/datasets.json"),
        repo_root: root.to_path_buf(),
        prune: false,
    })
    .expect("manifest should succeed");
}

#[test]
fn loader_falls_back_to_snapshots_when_summary_breaks() {
    let root = tempfile::tempdir().expect("tempdir");
    write_inputs(root.path());
    let summary_path = root.path().join("out").join(SUMMARY_JSON);
    let manifest_path = root.path().join("website/data/datasets.json");
    let reports_dir = root.path().join("out");
    let cache_dir = root.path().join("site/cache");

    let fresh = load_dashboard(&summary_path, &manifest_path, root.path(), &reports_dir, &cache_dir)
        .expect("fresh load");
    assert!(!fresh.from_cache);
    assert!(cache_dir.join(SUMMARY_SNAPSHOT).exists());
    assert!(cache_dir.join(MANIFEST_SNAPSHOT).exists());

    fs::write(&summary_path, b"{broken").expect("corrupt summary");
    let cached = load_dashboard(&summary_path, &manifest_path, root.path(), &reports_dir, &cache_dir)
        .expect("cached load");
    assert!(cached.from_cache);
    assert_eq!(cached.summary.dataset_count, 1);
    assert!(cached.report("taxi").is_some());
}

#[test]
fn loader_fails_without_source_or_snapshot() {
    let root = tempfile::tempdir().expect("tempdir");
    let err = load_dashboard(
        &root.path().join("missing_summary.json"),
        &root.path().join("missing_manifest.json"),
        root.path(),
        root.path(),
        &root.path().join("cache"),
    )
    .expect_err("nothing to load");
    assert!(err.to_string().contains("summary or manifest not available"));
}

fn write_manifest(root: &Path, entries: &[(&str, &str)]) -> std::path::PathBuf {
    let manifest = Manifest {
        datasets: entries
            .iter()
            .map(|(name, report)| ManifestEntry {
                name: name.to_string(),
                report: report.to_string(),
            })
            .collect(),
    };
    let path = root.join("website/data/datasets.json");
    write_json_pretty(&path, &manifest).expect("write manifest");
    path
}

#[test]
fn manifest_report_paths_resolve_against_repo_root() {
    let root = tempfile::tempdir().expect("tempdir");
    let out = root.path().join("out");
    let report = sample_report();
    write_json_pretty(&out.join("report_taxi.json"), &report).expect("write report");
    write_json_pretty(&out.join(SUMMARY_JSON), &build_summary(&[report])).expect("write summary");
    let manifest_path = write_manifest(root.path(), &[("taxi", "./out/report_taxi.json")]);

    let data = load_dashboard(
        &out.join(SUMMARY_JSON),
        &manifest_path,
        root.path(),
        &root.path().join("elsewhere"),
        &root.path().join("site/cache"),
    )
    .expect("load");

    assert_eq!(data.reports.len(), 1);
    assert!(data.report("taxi").is_some());
}

#[test]
fn report_path_falls_back_when_manifest_target_is_missing() {
    let root = tempfile::tempdir().expect("tempdir");
    let out = root.path().join("out");
    write_json_pretty(&out.join("report_taxi.json"), &sample_report()).expect("write report");
    let manifest = Manifest {
        datasets: vec![
            ManifestEntry {
                name: "taxi".to_string(),
                report: "./out/report_taxi.json".to_string(),
            },
            ManifestEntry {
                name: "moved".to_string(),
                report: "./old/report_moved.json".to_string(),
            },
        ],
    };

    assert_eq!(
        report_path_for("taxi", &manifest, root.path(), Path::new("/unused")),
        root.path().join("./out/report_taxi.json")
    );
    assert_eq!(
        report_path_for("moved", &manifest, root.path(), &out),
        out.join("report_moved.json")
    );
    assert_eq!(
        report_path_for("weather", &manifest, root.path(), &out),
        out.join("report_weather.json")
    );
}

#[test]
fn leaderboard_sorts_fastest_first_with_minimum_width() {
    let mut formats = BTreeMap::new();
    for (name, score) in [("slow", 40.0), ("fast", 10.0)] {
        formats.insert(
            name.to_string(),
            FormatSummary {
                query_median_ms_geomean: QueryGeomeans {
                    random_access: Some(score),
                    ..QueryGeomeans::default()
                },
                ..FormatSummary::default()
            },
        );
    }
    formats.insert("untimed".to_string(), FormatSummary::default());

    let entries = leaderboard(&formats);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "fast");
    assert_eq!(entries[0].width_pct, 75.0);
    assert_eq!(entries[1].width_pct, 12.0);
}

#[test]
fn overall_stats_total_rows_and_mean_numeric_ndv() {
    let dataset = |rows, ndv: Option<f64>| DatasetSummary {
        rows: Some(rows),
        input_size_bytes: Some(100),
        ndv_ratio_by_type: [("numeric".to_string(), ndv)].into_iter().collect(),
        ..DatasetSummary::default()
    };
    let summary = OverallSummary {
        dataset_count: 3,
        datasets: vec![
            dataset(10, Some(0.2)),
            dataset(20, Some(0.4)),
            dataset(30, None),
        ],
        formats: BTreeMap::new(),
    };

    let stats = overall_stats(&summary);
    assert_eq!(stats.total_rows, 60);
    assert_eq!(stats.total_input_bytes, 300);
    let ndv = stats.mean_numeric_ndv.expect("ndv mean");
    assert!((ndv - 0.3).abs() < 1e-12);
}

#[test]
fn best_values_follow_metric_direction() {
    let report = sample_report();
    assert_eq!(best_value(&report.formats, Metric::CompressionRatio), Some(3.0));
    assert_eq!(best_value(&report.formats, Metric::FullScan), Some(8.0));
    assert_eq!(best_value(&report.formats, Metric::Selective), None);

    let recs = recommendations(&report.formats);
    let picked: Vec<Option<&str>> = recs.iter().map(|rec| rec.format.as_deref()).collect();
    assert_eq!(
        picked,
        vec![Some("parquet_zstd"), Some("parquet_zstd"), Some("vortex_default")]
    );

    let empty: BTreeMap<String, FormatReport> = BTreeMap::new();
    assert!(recommendations(&empty).iter().all(|rec| rec.format.is_none()));
}

#[test]
fn like_stats_group_by_type_and_rank_slowest() {
    let item = |kind: Option<&str>, pattern: &str, median: Option<f64>| LikeMeasurement {
        pattern_type: kind.map(ToOwned::to_owned),
        pattern: Some(pattern.to_string()),
        median_ms: median,
    };
    let rows = [
        item(Some("prefix"), "a%", Some(2.0)),
        item(Some("contains"), "%b%", Some(9.0)),
        item(Some("prefix"), "c%", None),
        item(None, "d", Some(1.0)),
    ];
    let refs: Vec<&LikeMeasurement> = rows.iter().collect();

    let stats = like_type_stats(&refs);
    assert_eq!(stats.len(), 3);
    assert_eq!(stats[0].pattern_type, "prefix");
    assert_eq!(stats[0].count, 2);
    assert_eq!(stats[0].mean_ms, 1.0);
    assert_eq!(stats[2].pattern_type, "unknown");

    let slowest = slowest_patterns(&refs, 2);
    assert_eq!(slowest.len(), 2);
    assert_eq!(slowest[0].pattern.as_deref(), Some("%b%"));
    assert_eq!(slowest[1].pattern.as_deref(), Some("a%"));
}

#[test]
fn best_per_row_count_respects_metric_direction() {
    let mut series = BTreeMap::new();
    series.insert(
        "compression_ratio".to_string(),
        BTreeMap::from([
            ("a".to_string(), vec![Some(2.0), Some(1.0)]),
            ("b".to_string(), vec![Some(3.0), None]),
        ]),
    );
    series.insert(
        "full_scan".to_string(),
        BTreeMap::from([
            ("a".to_string(), vec![Some(2.0), None]),
            ("b".to_string(), vec![Some(3.0), None]),
        ]),
    );
    let summary = RowScalingSummary {
        row_counts: vec![100, 200],
        formats: vec!["a".to_string(), "b".to_string()],
        series,
        ..RowScalingSummary::default()
    };

    let ratio = best_per_row_count(&summary, "compression_ratio");
    assert_eq!(ratio[0].format.as_deref(), Some("b"));
    assert_eq!(ratio[1].format.as_deref(), Some("a"));

    let scan = best_per_row_count(&summary, "full_scan");
    assert_eq!(scan[0].format.as_deref(), Some("a"));
    assert_eq!(scan[1].format, None);
    assert_eq!(scan[1].value, None);
}

#[test]
fn dataset_page_highlights_best_and_collapses_extra_encodings() {
    let root = tempfile::tempdir().expect("tempdir");
    write_inputs(root.path());
    let data = load_dashboard(
        &root.path().join("out").join(SUMMARY_JSON),
        &root.path().join("website/data/datasets.json"),
        root.path(),
        &root.path().join("out"),
        &root.path().join("site/cache"),
    )
    .expect("load");

    let html = render_dataset_page("taxi", &data, &[], &ctx());
    assert!(html.contains(r#"class="kv is-best""#));
    assert!(html.contains("Mismatch"));
    assert!(html.contains("+2 more columns"));
    assert!(html.contains("suffix on %yz"));
    assert!(html.contains("Storage-first"));
    assert!(html.contains("experimental"));
    assert!(html.contains("50%"));
    assert!(html.contains("Scan and predicate latency"));
    assert!(html.contains("vortex_default · Random access: 4.00 ms"));

    let missing = render_dataset_page("weather", &data, &[], &ctx());
    assert!(missing.contains("Report not available for weather."));
}

#[test]
fn run_writes_every_page_and_row_scaling_view() {
    let root = tempfile::tempdir().expect("tempdir");
    write_inputs(root.path());

    let scaling_root = root.path().join("out/row_scaling/taxi");
    for count in [100_u64, 1000] {
        let dir = scaling_root.join(format!("rows_{count}"));
        write_json_pretty(&dir.join("report_taxi.json"), &sample_report()).expect("run report");
    }
    row_scaling::run(RowScalingArgs {
        out_root: scaling_root,
        dataset: None,
        include_duckdb: false,
    })
    .expect("row scaling");

    let scaling = load_row_scaling(&root.path().join("out/row_scaling")).expect("scaling");
    assert_eq!(scaling.len(), 1);
    assert_eq!(scaling[0].dataset, "taxi");

    let site = root.path().join("site");
    run(RenderArgs {
        reports_dir: root.path().join("out"),
        summary_path: None,
        manifest_path: root.path().join("website/data/datasets.json"),
        repo_root: root.path().to_path_buf(),
        row_scaling_root: None,
        site_dir: site.clone(),
        axis: AxisMode::Log,
        show_legend: true,
        show_values: false,
        no_outlier_cap: false,
        chart_width: 640,
    })
    .expect("render should succeed");

    let index = fs::read_to_string(site.join("index.html")).expect("index");
    assert!(index.contains("dataset_taxi.html"));
    assert!(index.contains("row_scaling_taxi.html"));
    assert!(index.contains("Random access leaderboard"));
    assert!(index.contains("Scan and predicate (geomean)"));
    assert!(index.contains("LIKE summary (geomean)"));
    assert!(index.contains("NDV ratio by type and dataset"));
    assert!(site.join("dataset_taxi.html").exists());

    let scaling_page = fs::read_to_string(site.join("row_scaling_taxi.html")).expect("scaling page");
    assert!(scaling_page.contains("Best per row count"));
    assert!(scaling_page.contains("Parquet zstd"));
}

#[test]
fn latency_groups_drop_untimed_query_kinds() {
    let rows = vec![
        ("parquet_zstd".to_string(), [Some(12.0), None, Some(2.0)]),
        ("vortex_default".to_string(), [Some(8.0), None, None]),
    ];
    let (categories, series) = latency_groups(&rows);

    assert_eq!(categories, vec!["Full scan", "Random access"]);
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].values, vec![Some(12.0), Some(2.0)]);
    assert_eq!(series[1].values, vec![Some(8.0), None]);
    assert_eq!(series[1].color, "#a84c6f");
}

#[test]
fn overview_renders_geomean_bars_from_summary() {
    let formats = BTreeMap::from([(
        "parquet_zstd".to_string(),
        FormatSummary {
            datasets: 2,
            compression_speed_mb_s_geomean: Some(150.0),
            query_median_ms_geomean: QueryGeomeans {
                full_scan_min: Some(12.0),
                ..QueryGeomeans::default()
            },
            like_median_ms_geomean: LikeGeomeans {
                prefix: Some(3.0),
                contains: Some(9.0),
                ..LikeGeomeans::default()
            },
            ..FormatSummary::default()
        },
    )]);

    let series = like_geomean_series(&formats);
    assert_eq!(series[0].values, vec![Some(3.0), None, Some(9.0)]);

    let data = DashboardData {
        summary: OverallSummary {
            dataset_count: 2,
            datasets: Vec::new(),
            formats,
        },
        manifest: Manifest::default(),
        dataset_names: Vec::new(),
        reports: BTreeMap::new(),
        from_cache: false,
    };
    let html = render_overview(&data, &[], &[], &ctx());
    assert!(html.contains("150 MB/s"));
    assert!(html.contains("parquet_zstd · Full scan: 12.00 ms"));
    assert!(html.contains("parquet_zstd · contains: 9.00 ms"));
    assert!(!html.contains("Selective predicate:"));
}

#[test]
fn ndv_tile_treats_zero_mean_as_missing() {
    assert_eq!(ndv_tile(None), "--");
    assert_eq!(ndv_tile(Some(0.0)), "--");
    assert_eq!(ndv_tile(Some(0.25)), "0.250");
}

#[test]
fn sidebar_lists_manifest_datasets() {
    let data = DashboardData {
        summary: OverallSummary {
            dataset_count: 1,
            datasets: vec![DatasetSummary {
                name: "summary_only".to_string(),
                ..DatasetSummary::default()
            }],
            formats: BTreeMap::new(),
        },
        manifest: Manifest {
            datasets: vec![ManifestEntry {
                name: "taxi".to_string(),
                report: "./out/report_taxi.json".to_string(),
            }],
        },
        dataset_names: vec!["summary_only".to_string(), "taxi".to_string()],
        reports: BTreeMap::from([("taxi".to_string(), sample_report())]),
        from_cache: false,
    };

    let html = render_dataset_page("summary_only", &data, &[], &ctx());
    assert!(html.contains(r#"href="dataset_taxi.html"><div>taxi</div><span>report</span>"#));
    assert!(!html.contains(r#"href="dataset_summary_only.html""#));
    assert!(html.contains("Report not available for summary_only."));
}
