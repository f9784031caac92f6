use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::manifest::{resolve_report_path, resolve_repo_root};
use crate::commands::render::loader::{MANIFEST_SNAPSHOT, SUMMARY_SNAPSHOT};
use crate::commands::summarize::{SUMMARY_JSON, report_pattern};
use crate::model::{CachedSnapshot, Manifest, OverallSummary};
use crate::util::{list_matching_files, read_json};

pub fn run(args: StatusArgs) -> Result<()> {
    let summary_path = args.reports_dir.join(SUMMARY_JSON);
    let cache_dir = args.site_dir.join("cache");

    info!(reports_dir = %args.reports_dir.display(), "status requested");

    if args.reports_dir.is_dir() {
        let reports = list_matching_files(&args.reports_dir, &report_pattern()?)?;
        info!(
            path = %args.reports_dir.display(),
            reports = reports.len(),
            "report directory"
        );
    } else {
        warn!(path = %args.reports_dir.display(), "report directory missing");
    }

    if summary_path.exists() {
        let summary: OverallSummary = read_json(&summary_path)?;
        info!(
            datasets = summary.dataset_count,
            formats = summary.formats.len(),
            "loaded overall summary"
        );
    } else {
        warn!(path = %summary_path.display(), "overall summary missing");
    }

    if args.manifest_path.exists() {
        let manifest: Manifest = read_json(&args.manifest_path)?;
        let root = resolve_repo_root(&args.repo_root)?;
        let missing = manifest
            .datasets
            .iter()
            .filter(|entry| !resolve_report_path(&root, &entry.report).is_file())
            .count();
        info!(
            entries = manifest.datasets.len(),
            missing_reports = missing,
            "loaded dataset manifest"
        );
    } else {
        warn!(path = %args.manifest_path.display(), "dataset manifest missing");
    }

    let index_path = args.site_dir.join("index.html");
    if index_path.exists() {
        info!(path = %index_path.display(), "site rendered");
    } else {
        warn!(path = %index_path.display(), "site not rendered yet");
    }

    for name in [SUMMARY_SNAPSHOT, MANIFEST_SNAPSHOT] {
        let path = cache_dir.join(name);
        if !path.exists() {
            warn!(path = %path.display(), "snapshot missing");
            continue;
        }
        match read_json::<CachedSnapshot<serde_json::Value>>(&path) {
            Ok(snapshot) => info!(
                path = %path.display(),
                cached_at = %snapshot.cached_at,
                source = %snapshot.source_path,
                "snapshot available"
            ),
            Err(err) => warn!(path = %path.display(), error = %err, "snapshot unreadable"),
        }
    }

    Ok(())
}
