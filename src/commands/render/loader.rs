use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::commands::manifest::{resolve_report_path, resolve_repo_root};
use crate::commands::row_scaling::SUMMARY_FILE as ROW_SCALING_FILE;
use crate::model::{CachedSnapshot, DatasetReport, Manifest, OverallSummary, RowScalingSummary};
use crate::util::{now_utc_string, read_json, sha256_file, write_json_pretty};

pub const SUMMARY_SNAPSHOT: &str = "latest_summary.json";
pub const MANIFEST_SNAPSHOT: &str = "latest_manifest.json";

/// Everything the overview and dataset pages draw from.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub summary: OverallSummary,
    pub manifest: Manifest,
    /// Summary datasets first, then manifest-only datasets, without duplicates.
    pub dataset_names: Vec<String>,
    pub reports: BTreeMap<String, DatasetReport>,
    pub from_cache: bool,
}

impl DashboardData {
    pub fn report(&self, name: &str) -> Option<&DatasetReport> {
        self.reports.get(name)
    }
}

pub fn load_dashboard(
    summary_path: &Path,
    manifest_path: &Path,
    repo_root: &Path,
    reports_dir: &Path,
    cache_dir: &Path,
) -> Result<DashboardData> {
    let summary =
        load_with_snapshot::<OverallSummary>(summary_path, &cache_dir.join(SUMMARY_SNAPSHOT))?;
    let manifest =
        load_with_snapshot::<Manifest>(manifest_path, &cache_dir.join(MANIFEST_SNAPSHOT))?;

    let (Some((summary, summary_cached)), Some((manifest, manifest_cached))) = (summary, manifest)
    else {
        bail!("summary or manifest not available");
    };

    let mut dataset_names: Vec<String> =
        summary.datasets.iter().map(|ds| ds.name.clone()).collect();
    for entry in &manifest.datasets {
        if !dataset_names.contains(&entry.name) {
            dataset_names.push(entry.name.clone());
        }
    }

    let root = resolve_repo_root(repo_root)?;
    let mut reports = BTreeMap::new();
    for name in &dataset_names {
        let path = report_path_for(name, &manifest, &root, reports_dir);
        if let Some(report) = load_report(&path) {
            reports.insert(name.clone(), report);
        }
    }

    info!(
        datasets = dataset_names.len(),
        reports = reports.len(),
        from_cache = summary_cached || manifest_cached,
        "loaded dashboard data"
    );

    Ok(DashboardData {
        summary,
        manifest,
        dataset_names,
        reports,
        from_cache: summary_cached || manifest_cached,
    })
}

/// Reads `source`, refreshing its snapshot on success. When the source cannot
/// be read the last snapshot is used instead. The flag is true for snapshot data.
pub fn load_with_snapshot<T>(source: &Path, snapshot_path: &Path) -> Result<Option<(T, bool)>>
where
    T: Serialize + DeserializeOwned,
{
    match read_json::<T>(source) {
        Ok(value) => {
            store_snapshot(source, snapshot_path, &value)?;
            Ok(Some((value, false)))
        }
        Err(err) => {
            warn!(path = %source.display(), error = %err, "source unavailable; trying snapshot");
            if !snapshot_path.exists() {
                return Ok(None);
            }
            match read_json::<CachedSnapshot<T>>(snapshot_path) {
                Ok(snapshot) => {
                    info!(
                        path = %snapshot_path.display(),
                        cached_at = %snapshot.cached_at,
                        "using cached snapshot"
                    );
                    Ok(Some((snapshot.payload, true)))
                }
                Err(err) => {
                    warn!(path = %snapshot_path.display(), error = %err, "snapshot unreadable");
                    Ok(None)
                }
            }
        }
    }
}

pub fn store_snapshot<T: Serialize>(source: &Path, snapshot_path: &Path, value: &T) -> Result<()> {
    let snapshot = CachedSnapshot {
        cached_at: now_utc_string(),
        source_path: source.display().to_string(),
        source_sha256: sha256_file(source)?,
        payload: value,
    };
    write_json_pretty(snapshot_path, &snapshot)
}

/// Manifest path resolved against the repo root when that file exists, else
/// `<reports_dir>/report_<name>.json`.
pub fn report_path_for(
    name: &str,
    manifest: &Manifest,
    repo_root: &Path,
    reports_dir: &Path,
) -> PathBuf {
    let fallback = reports_dir.join(format!("report_{name}.json"));
    let Some(report) = manifest.report_for(name) else {
        return fallback;
    };
    let resolved = resolve_report_path(repo_root, report);
    if resolved.is_file() {
        return resolved;
    }
    warn!(
        dataset = name,
        report,
        fallback = %fallback.display(),
        "manifest report missing; using reports directory"
    );
    fallback
}

pub fn load_report(path: &Path) -> Option<DatasetReport> {
    if !path.is_file() {
        warn!(path = %path.display(), "report missing");
        return None;
    }
    match read_json(path) {
        Ok(report) => Some(report),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "report unreadable");
            None
        }
    }
}

/// Row scaling summaries in `root` itself and in its direct subdirectories.
pub fn load_row_scaling(root: &Path) -> Result<Vec<RowScalingSummary>> {
    if !root.is_dir() {
        info!(path = %root.display(), "no row scaling directory");
        return Ok(Vec::new());
    }

    let mut candidates = vec![root.join(ROW_SCALING_FILE)];
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("failed to read {}", root.display()))? {
        let entry = entry.with_context(|| format!("failed to read entry in {}", root.display()))?;
        if entry.path().is_dir() {
            subdirs.push(entry.path().join(ROW_SCALING_FILE));
        }
    }
    subdirs.sort();
    candidates.extend(subdirs);

    let mut summaries = Vec::new();
    for path in candidates.into_iter().filter(|path| path.is_file()) {
        match read_json::<RowScalingSummary>(&path) {
            Ok(summary) => summaries.push(summary),
            Err(err) => warn!(path = %path.display(), error = %err, "skipping row scaling summary"),
        }
    }
    Ok(summaries)
}
