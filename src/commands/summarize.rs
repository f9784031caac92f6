use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

use crate::cli::SummarizeArgs;
use crate::format::{format_float, format_int, format_mb};
use crate::model::{
    ColdQueryStats, ColdStat, DatasetReport, DatasetSummary, FormatReport, FormatSummary,
    LikeGeomeans, LikeMeasurement, OverallSummary, QueryGeomeans, QueryTiming,
};
use crate::stats::{finite_max, finite_min, geomean, mean};
use crate::util::{list_matching_files, read_json, write_json_pretty, write_text};

pub const SUMMARY_JSON: &str = "overall_summary.json";
pub const SUMMARY_MD: &str = "overall_summary.md";

#[derive(Debug, Clone)]
pub struct LoadedReport {
    pub path: PathBuf,
    pub report: DatasetReport,
}

pub fn run(args: SummarizeArgs) -> Result<()> {
    let reports = load_reports(&args.reports_dir)?;
    if reports.is_empty() {
        warn!(
            reports_dir = %args.reports_dir.display(),
            "no reports found; overall summary not written"
        );
        return Ok(());
    }

    let bodies: Vec<DatasetReport> = reports.into_iter().map(|loaded| loaded.report).collect();
    let summary = build_summary(&bodies);

    if args.dry_run {
        info!(
            datasets = summary.dataset_count,
            formats = summary.formats.len(),
            "summarize dry-run complete"
        );
        return Ok(());
    }

    let out_dir = args.out_dir.unwrap_or_else(|| args.reports_dir.clone());
    let json_path = out_dir.join(SUMMARY_JSON);
    let md_path = out_dir.join(SUMMARY_MD);

    // Round-trip through a Value so keys come out sorted.
    let sorted = serde_json::to_value(&summary).context("failed to serialize overall summary")?;
    write_json_pretty(&json_path, &sorted)?;
    write_text(&md_path, &render_markdown(&summary))?;

    info!(path = %json_path.display(), "wrote overall summary");
    info!(
        path = %md_path.display(),
        datasets = summary.dataset_count,
        formats = summary.formats.len(),
        "summarize completed"
    );

    Ok(())
}

pub fn report_pattern() -> Result<Regex> {
    Regex::new(r"^report_(.+)\.json$").context("failed to compile report filename regex")
}

/// Reads every `report_*.json` in `dir`. Unreadable reports are skipped with a warning.
pub fn load_reports(dir: &Path) -> Result<Vec<LoadedReport>> {
    let pattern = report_pattern()?;
    let paths = list_matching_files(dir, &pattern)?;

    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        match read_json::<DatasetReport>(&path) {
            Ok(report) => reports.push(LoadedReport { path, report }),
            Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable report"),
        }
    }
    Ok(reports)
}

pub fn dataset_label(report: &DatasetReport) -> String {
    if let Some(name) = report.dataset.name.as_deref().filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }
    report
        .dataset
        .input
        .as_deref()
        .and_then(|input| Path::new(input).file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "dataset".to_string())
}

#[derive(Default)]
struct FormatSamples {
    ratio: Vec<f64>,
    comp_time: Vec<f64>,
    comp_speed: Vec<f64>,
    decomp_time: Vec<f64>,
    decomp_speed: Vec<f64>,
    size: Vec<f64>,
    full_scan: Vec<f64>,
    selective: Vec<f64>,
    random_access: Vec<f64>,
    like_prefix: Vec<f64>,
    like_suffix: Vec<f64>,
    like_contains: Vec<f64>,
    cold_full_scan: Vec<f64>,
    cold_selective: Vec<f64>,
    cold_random_access: Vec<f64>,
}

impl FormatSamples {
    fn add(&mut self, body: &FormatReport) {
        fn push(target: &mut Vec<f64>, value: Option<f64>) {
            if let Some(value) = value {
                target.push(value);
            }
        }
        let median = |timing: &Option<QueryTiming>| timing.as_ref().and_then(|t| t.median_ms);
        let cold = |timing: &Option<QueryTiming>| timing.as_ref().and_then(|t| t.cold_ms);

        push(&mut self.ratio, body.compression_ratio);
        if let Some(write) = &body.write {
            push(&mut self.comp_time, write.compression_time_s);
            push(&mut self.comp_speed, write.compression_speed_mb_s);
            push(&mut self.decomp_time, write.decompression_time_s);
            push(&mut self.decomp_speed, write.decompression_speed_mb_s);
            push(&mut self.size, write.output_size_bytes);
        }

        let queries = &body.queries;
        push(&mut self.full_scan, median(&queries.full_scan_min));
        push(&mut self.selective, median(&queries.selective_predicate));
        push(&mut self.random_access, median(&queries.random_access));
        push(&mut self.cold_full_scan, cold(&queries.full_scan_min));
        push(&mut self.cold_selective, cold(&queries.selective_predicate));
        push(&mut self.cold_random_access, cold(&queries.random_access));

        if !queries.like_by_col.is_empty() {
            let like = like_means_by_type(&queries.like_by_col);
            push(&mut self.like_prefix, like.prefix);
            push(&mut self.like_suffix, like.suffix);
            push(&mut self.like_contains, like.contains);
        }
    }

    fn dataset_count(&self) -> usize {
        [&self.ratio, &self.comp_time, &self.size]
            .into_iter()
            .map(Vec::len)
            .find(|count| *count > 0)
            .unwrap_or(0)
    }

    fn into_summary(self) -> FormatSummary {
        FormatSummary {
            datasets: self.dataset_count(),
            compression_ratio_geomean: geomean(self.ratio.iter().copied()),
            compression_time_s_geomean: geomean(self.comp_time.iter().copied()),
            compression_speed_mb_s_geomean: geomean(self.comp_speed.iter().copied()),
            decompression_time_s_geomean: geomean(self.decomp_time.iter().copied()),
            decompression_speed_mb_s_geomean: geomean(self.decomp_speed.iter().copied()),
            output_size_bytes_geomean: geomean(self.size.iter().copied()),
            query_median_ms_geomean: QueryGeomeans {
                full_scan_min: geomean(self.full_scan.iter().copied()),
                selective_predicate: geomean(self.selective.iter().copied()),
                random_access: geomean(self.random_access.iter().copied()),
            },
            like_median_ms_geomean: LikeGeomeans {
                prefix: geomean(self.like_prefix.iter().copied()),
                suffix: geomean(self.like_suffix.iter().copied()),
                contains: geomean(self.like_contains.iter().copied()),
            },
            cold_query_ms_stats: ColdQueryStats {
                full_scan_min: cold_stat(&self.cold_full_scan),
                selective_predicate: cold_stat(&self.cold_selective),
                random_access: cold_stat(&self.cold_random_access),
            },
        }
    }
}

/// Mean LIKE latency per pattern type across all columns of one report.
pub fn like_means_by_type(like_by_col: &BTreeMap<String, Vec<LikeMeasurement>>) -> LikeGeomeans {
    let mut prefix = Vec::new();
    let mut suffix = Vec::new();
    let mut contains = Vec::new();

    for item in like_by_col.values().flatten() {
        let Some(median) = item.median_ms else {
            continue;
        };
        match item.pattern_type.as_deref() {
            Some("prefix") => prefix.push(median),
            Some("suffix") => suffix.push(median),
            Some("contains") => contains.push(median),
            _ => {}
        }
    }

    LikeGeomeans {
        prefix: mean(&prefix),
        suffix: mean(&suffix),
        contains: mean(&contains),
    }
}

fn cold_stat(values: &[f64]) -> Option<ColdStat> {
    let finite: Vec<Option<f64>> = values.iter().map(|v| Some(*v)).collect();
    let min = finite_min(finite.iter().copied())?;
    let max = finite_max(finite.iter().copied())?;
    Some(ColdStat {
        count: values.iter().filter(|v| v.is_finite()).count(),
        min,
        max,
        geomean: geomean(values.iter().copied()),
    })
}

pub fn build_summary(reports: &[DatasetReport]) -> OverallSummary {
    let datasets: Vec<DatasetSummary> = reports
        .iter()
        .map(|report| {
            let ds = &report.dataset;
            DatasetSummary {
                name: dataset_label(report),
                input: ds.input.clone(),
                rows: ds.rows,
                input_rows: ds.input_rows,
                dropped_rows: ds.dropped_rows,
                input_size_bytes: ds.input_size_bytes,
                column_type_counts: ds.column_type_counts.clone(),
                ndv_ratio_by_type: ds.ndv_ratio_by_type.clone(),
            }
        })
        .collect();

    let format_names: BTreeSet<&str> = reports
        .iter()
        .flat_map(|report| report.formats.iter())
        .filter(|(_, body)| body.write.is_some())
        .map(|(name, _)| name.as_str())
        .collect();

    let mut formats = BTreeMap::new();
    for name in format_names {
        let mut samples = FormatSamples::default();
        for report in reports {
            if let Some(body) = report.formats.get(name) {
                samples.add(body);
            }
        }
        formats.insert(name.to_string(), samples.into_summary());
    }

    OverallSummary {
        dataset_count: datasets.len(),
        datasets,
        formats,
    }
}

pub fn render_markdown(summary: &OverallSummary) -> String {
    let mut lines = vec![
        "# Overall Summary".to_string(),
        String::new(),
        format!(
            "- datasets: **{}**",
            format_int(Some(summary.dataset_count as u64))
        ),
        String::new(),
        "## Datasets".to_string(),
        "name | rows | input_rows | dropped_rows | input_size_mb".to_string(),
        "--- | --- | --- | --- | ---".to_string(),
    ];

    for ds in &summary.datasets {
        lines.push(format!(
            "{} | {} | {} | {} | {}",
            ds.name,
            format_int(ds.rows),
            format_int(ds.input_rows),
            format_int(ds.dropped_rows),
            format_mb(ds.input_size_bytes.map(|b| b as f64)),
        ));
    }

    lines.push(String::new());
    lines.push("## Formats (Geomean)".to_string());
    lines.push(
        "format | comp_ratio | comp_time_s | comp_speed_mb_s | decomp_time_s | decomp_speed_mb_s | size_mb | full_scan_ms | selective_pred_ms | random_access_ms | cold_full_scan_ms"
            .to_string(),
    );
    lines.push("--- | --- | --- | --- | --- | --- | --- | --- | --- | --- | ---".to_string());

    for (name, body) in &summary.formats {
        let q = &body.query_median_ms_geomean;
        let size_mb = body.output_size_bytes_geomean.map(|b| b / (1024.0 * 1024.0));
        let cold_full = body
            .cold_query_ms_stats
            .full_scan_min
            .as_ref()
            .and_then(|stat| stat.geomean);
        lines.push(format!(
            "{name} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {}",
            format_float(body.compression_ratio_geomean),
            format_float(body.compression_time_s_geomean),
            format_float(body.compression_speed_mb_s_geomean),
            format_float(body.decompression_time_s_geomean),
            format_float(body.decompression_speed_mb_s_geomean),
            format_float(size_mb),
            format_float(q.full_scan_min),
            format_float(q.selective_predicate),
            format_float(q.random_access),
            format_float(cold_full),
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::model::{DatasetInfo, WriteStats};

    fn timing(median: f64, cold: Option<f64>) -> Option<QueryTiming> {
        Some(QueryTiming {
            median_ms: Some(median),
            cold_ms: cold,
            ..QueryTiming::default()
        })
    }

    fn format_body(ratio: f64, size: f64, scan: f64, cold: Option<f64>) -> FormatReport {
        let mut body = FormatReport {
            compression_ratio: Some(ratio),
            write: Some(WriteStats {
                output_size_bytes: Some(size),
                compression_time_s: Some(1.0),
                ..WriteStats::default()
            }),
            ..FormatReport::default()
        };
        body.queries.full_scan_min = timing(scan, cold);
        body
    }

    fn report(name: &str, formats: Vec<(&str, FormatReport)>) -> DatasetReport {
        DatasetReport {
            dataset: DatasetInfo {
                input: Some(format!("data/{name}.csv")),
                rows: Some(1000),
                ..DatasetInfo::default()
            },
            formats: formats
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    #[test]
    fn dataset_label_prefers_name_then_input_stem() {
        let mut r = report("taxi", Vec::new());
        assert_eq!(dataset_label(&r), "taxi");
        r.dataset.name = Some("nyc".to_string());
        assert_eq!(dataset_label(&r), "nyc");
        assert_eq!(dataset_label(&DatasetReport::default()), "dataset");
    }

    #[test]
    fn build_summary_computes_geomeans_across_reports() {
        let reports = vec![
            report(
                "a",
                vec![("parquet_zstd", format_body(2.0, 100.0, 10.0, Some(30.0)))],
            ),
            report(
                "b",
                vec![("parquet_zstd", format_body(8.0, 400.0, 40.0, Some(50.0)))],
            ),
        ];
        let summary = build_summary(&reports);

        assert_eq!(summary.dataset_count, 2);
        assert_eq!(summary.datasets[0].name, "a");
        let zstd = &summary.formats["parquet_zstd"];
        assert_eq!(zstd.datasets, 2);
        assert!((zstd.compression_ratio_geomean.unwrap() - 4.0).abs() < 1e-9);
        assert!((zstd.output_size_bytes_geomean.unwrap() - 200.0).abs() < 1e-9);
        assert!((zstd.query_median_ms_geomean.full_scan_min.unwrap() - 20.0).abs() < 1e-9);

        let cold = zstd.cold_query_ms_stats.full_scan_min.as_ref().unwrap();
        assert_eq!(cold.count, 2);
        assert_eq!(cold.min, 30.0);
        assert_eq!(cold.max, 50.0);
        assert!(zstd.cold_query_ms_stats.random_access.is_none());
    }

    #[test]
    fn build_summary_skips_formats_without_write_block() {
        let no_write = FormatReport {
            compression_ratio: Some(3.0),
            ..FormatReport::default()
        };
        let reports = vec![report(
            "a",
            vec![
                ("parquet_zstd", format_body(2.0, 100.0, 10.0, None)),
                ("duckdb_table", no_write),
            ],
        )];
        let summary = build_summary(&reports);
        assert_eq!(summary.formats.len(), 1);
        assert!(summary.formats.contains_key("parquet_zstd"));
    }

    #[test]
    fn like_means_group_by_pattern_type() {
        let mut by_col = BTreeMap::new();
        by_col.insert(
            "name".to_string(),
            vec![
                LikeMeasurement {
                    pattern_type: Some("prefix".to_string()),
                    pattern: Some("ab%".to_string()),
                    median_ms: Some(2.0),
                },
                LikeMeasurement {
                    pattern_type: Some("prefix".to_string()),
                    pattern: Some("cd%".to_string()),
                    median_ms: Some(4.0),
                },
                LikeMeasurement {
                    pattern_type: Some("contains".to_string()),
                    pattern: Some("%x%".to_string()),
                    median_ms: None,
                },
            ],
        );
        let means = like_means_by_type(&by_col);
        assert_eq!(means.prefix, Some(3.0));
        assert_eq!(means.contains, None);
        assert_eq!(means.suffix, None);
    }

    #[test]
    fn markdown_lists_datasets_and_formats() {
        let reports = vec![report(
            "taxi",
            vec![("parquet_zstd", format_body(2.5, 1048576.0, 10.0, None))],
        )];
        let md = render_markdown(&build_summary(&reports));
        assert!(md.starts_with("# Overall Summary"));
        assert!(md.contains("- datasets: **1**"));
        assert!(md.contains("taxi | 1,000 | n/a | n/a | n/a"));
        assert!(md.contains("parquet_zstd | 2.5 | 1 | n/a | n/a | n/a | 1 | 10 | n/a | n/a | n/a"));
    }

    #[test]
    fn run_writes_json_and_markdown_and_skips_bad_reports() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = report("taxi", vec![("parquet_zstd", format_body(2.0, 10.0, 1.0, None))]);
        fs::write(
            dir.path().join("report_taxi.json"),
            serde_json::to_vec(&good).expect("serialize"),
        )
        .expect("write report");
        fs::write(dir.path().join("report_broken.json"), b"{not json").expect("write broken");
        fs::write(dir.path().join("notes.json"), b"{}").expect("write other");

        run(SummarizeArgs {
            reports_dir: dir.path().to_path_buf(),
            out_dir: None,
            dry_run: false,
        })
        .expect("summarize should succeed");

        let summary: OverallSummary =
            read_json(&dir.path().join(SUMMARY_JSON)).expect("summary json");
        assert_eq!(summary.dataset_count, 1);
        assert!(dir.path().join(SUMMARY_MD).exists());
    }
}
