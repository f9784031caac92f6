use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::{info, warn};

use crate::cli::RowScalingArgs;
use crate::commands::summarize::report_pattern;
use crate::metrics::Metric;
use crate::model::{DatasetReport, RowScalingSummary};
use crate::util::{list_matching_files, now_utc_string, read_json, relative_path, write_json_pretty};

pub const SUMMARY_FILE: &str = "row_scaling_summary.json";

const ERROR_FORMAT: &str = "vortex_error";
const DUCKDB_FORMAT: &str = "duckdb_table";

/// One benchmark run at a fixed row count.
#[derive(Debug, Clone)]
pub struct RowRun {
    pub report_path: PathBuf,
    pub report: DatasetReport,
}

pub fn run(args: RowScalingArgs) -> Result<()> {
    let runs = discover_runs(&args.out_root)?;
    if runs.is_empty() {
        bail!("no rows_* reports found under {}", args.out_root.display());
    }

    let dataset = args.dataset.clone().unwrap_or_else(|| {
        args.out_root
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| "dataset".to_string())
    });

    let summary = build_row_scaling_summary(
        &dataset,
        &args.out_root,
        &runs,
        args.include_duckdb,
        now_utc_string(),
    );

    let out_path = args.out_root.join(SUMMARY_FILE);
    write_json_pretty(&out_path, &summary)?;
    info!(path = %out_path.display(), "wrote row scaling summary");
    info!(
        dataset = %summary.dataset,
        row_counts = summary.row_counts.len(),
        formats = summary.formats.len(),
        "row-scaling completed"
    );

    Ok(())
}

/// Loads the first sorted report of every `rows_<count>` directory, keyed by count.
pub fn discover_runs(out_root: &Path) -> Result<BTreeMap<u64, RowRun>> {
    let dir_pattern = Regex::new(r"^rows_(\d+)$").context("failed to compile run directory regex")?;
    let report_pattern = report_pattern()?;

    let entries =
        fs::read_dir(out_root).with_context(|| format!("failed to read {}", out_root.display()))?;

    let mut run_dirs = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", out_root.display()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let count = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| dir_pattern.captures(name))
            .and_then(|caps| caps[1].parse::<u64>().ok());
        if let Some(count) = count {
            run_dirs.push((count, path));
        }
    }
    run_dirs.sort();

    let mut runs = BTreeMap::new();
    for (count, dir) in run_dirs {
        let reports = list_matching_files(&dir, &report_pattern)?;
        let Some(report_path) = reports.into_iter().next() else {
            warn!(path = %dir.display(), "run directory has no report");
            continue;
        };
        match read_json::<DatasetReport>(&report_path) {
            Ok(report) => {
                runs.insert(
                    count,
                    RowRun {
                        report_path,
                        report,
                    },
                );
            }
            Err(err) => {
                warn!(path = %report_path.display(), error = %err, "skipping unreadable run report")
            }
        }
    }

    Ok(runs)
}

fn include_format(name: &str, include_duckdb: bool) -> bool {
    name != ERROR_FORMAT && (include_duckdb || name != DUCKDB_FORMAT)
}

pub fn build_row_scaling_summary(
    dataset: &str,
    out_root: &Path,
    runs: &BTreeMap<u64, RowRun>,
    include_duckdb: bool,
    generated_at: String,
) -> RowScalingSummary {
    let mut formats: Vec<String> = Vec::new();
    for run in runs.values() {
        for name in run.report.formats.keys() {
            if include_format(name, include_duckdb) && !formats.contains(name) {
                formats.push(name.clone());
            }
        }
    }

    let mut series = BTreeMap::new();
    for metric in Metric::ALL {
        let by_format: BTreeMap<String, Vec<Option<f64>>> = formats
            .iter()
            .map(|format| {
                let values = runs
                    .values()
                    .map(|run| run.report.formats.get(format).and_then(|body| metric.extract(body)))
                    .collect();
                (format.clone(), values)
            })
            .collect();
        series.insert(metric.key().to_string(), by_format);
    }

    let reports = runs
        .iter()
        .map(|(count, run)| {
            let rel = relative_path(out_root, &run.report_path);
            (count.to_string(), rel.trim_start_matches("./").to_string())
        })
        .collect();

    RowScalingSummary {
        dataset: dataset.to_string(),
        row_counts: runs.keys().copied().collect(),
        generated_at,
        metrics: Metric::ALL.into_iter().map(Metric::descriptor).collect(),
        formats,
        series,
        reports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_run(root: &Path, count: u64, body: serde_json::Value) {
        let dir = root.join(format!("rows_{count}"));
        fs::create_dir_all(&dir).expect("run dir");
        fs::write(
            dir.join("report_taxi.json"),
            serde_json::to_vec(&body).expect("serialize"),
        )
        .expect("write report");
    }

    fn sample_root() -> tempfile::TempDir {
        let root = tempfile::tempdir().expect("tempdir");
        write_run(
            root.path(),
            1000,
            serde_json::json!({
                "formats": {
                    "parquet_zstd": {"compression_ratio": 3.0},
                    "duckdb_table": {"compression_ratio": 1.0},
                    "vortex_error": "crash"
                }
            }),
        );
        write_run(
            root.path(),
            200,
            serde_json::json!({
                "formats": {
                    "vortex_default": {"compression_ratio": 5.0},
                    "vortex_error": {"message": "crash"}
                }
            }),
        );
        fs::create_dir_all(root.path().join("rows_abc")).expect("ignored dir");
        root
    }

    #[test]
    fn discover_runs_orders_by_numeric_row_count() {
        let root = sample_root();
        let runs = discover_runs(root.path()).expect("discover");
        assert_eq!(runs.keys().copied().collect::<Vec<_>>(), vec![200, 1000]);
    }

    #[test]
    fn summary_excludes_error_and_duckdb_by_default() {
        let root = sample_root();
        let runs = discover_runs(root.path()).expect("discover");
        let summary = build_row_scaling_summary(
            "taxi",
            root.path(),
            &runs,
            false,
            "2026-01-01T00:00:00Z".to_string(),
        );

        assert_eq!(summary.formats, vec!["vortex_default", "parquet_zstd"]);
        assert_eq!(summary.row_counts, vec![200, 1000]);
        assert_eq!(summary.metrics.len(), 12);
        assert_eq!(
            summary.values("compression_ratio", "parquet_zstd"),
            &[None, Some(3.0)]
        );
        assert_eq!(
            summary.values("compression_ratio", "vortex_default"),
            &[Some(5.0), None]
        );
        assert_eq!(summary.reports["200"], "rows_200/report_taxi.json");
    }

    #[test]
    fn summary_keeps_duckdb_when_requested() {
        let root = sample_root();
        let runs = discover_runs(root.path()).expect("discover");
        let summary =
            build_row_scaling_summary("taxi", root.path(), &runs, true, String::new());
        assert!(summary.formats.iter().any(|f| f == "duckdb_table"));
        assert!(!summary.formats.iter().any(|f| f == "vortex_error"));
    }

    #[test]
    fn run_fails_without_any_runs() {
        let root = tempfile::tempdir().expect("tempdir");
        let err = run(RowScalingArgs {
            out_root: root.path().to_path_buf(),
            dataset: None,
            include_duckdb: false,
        })
        .expect_err("empty root should fail");
        assert!(err.to_string().contains("no rows_* reports"));
    }

    #[test]
    fn run_writes_summary_next_to_runs() {
        let root = sample_root();
        run(RowScalingArgs {
            out_root: root.path().to_path_buf(),
            dataset: Some("taxi".to_string()),
            include_duckdb: false,
        })
        .expect("row-scaling should succeed");

        let summary: RowScalingSummary =
            read_json(&root.path().join(SUMMARY_FILE)).expect("summary json");
        assert_eq!(summary.dataset, "taxi");
        assert_eq!(summary.formats.len(), 2);
    }
}
