use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::ManifestArgs;
use crate::commands::summarize::{LoadedReport, dataset_label, load_reports};
use crate::model::Manifest;
use crate::util::{read_json, write_json_pretty};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ManifestChanges {
    pub added: usize,
    pub updated: usize,
    pub pruned: usize,
}

pub fn run(args: ManifestArgs) -> Result<()> {
    let mut manifest = load_manifest(&args.manifest_path)?;
    let reports = load_reports(&args.reports_dir)?;

    if reports.is_empty() {
        warn!(reports_dir = %args.reports_dir.display(), "no reports found to register");
    }

    let root = resolve_repo_root(&args.repo_root)?;
    let changes = update_manifest(&mut manifest, &root, &reports, args.prune)?;

    write_json_pretty(&args.manifest_path, &manifest)?;
    info!(path = %args.manifest_path.display(), "wrote dataset manifest");
    info!(
        entries = manifest.datasets.len(),
        added = changes.added,
        updated = changes.updated,
        pruned = changes.pruned,
        "manifest completed"
    );

    Ok(())
}

/// Missing manifest files start out empty.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Ok(Manifest::default());
    }
    read_json(path)
}

/// Absolute form of the directory manifest report paths are relative to.
pub fn resolve_repo_root(root: &Path) -> Result<PathBuf> {
    std::path::absolute(root).with_context(|| format!("failed to resolve {}", root.display()))
}

/// Absolute report paths are kept as they are; relative ones hang off `root`.
pub fn resolve_report_path(root: &Path, report: &str) -> PathBuf {
    root.join(report)
}

/// `./`-prefixed path below `root`, or the absolute path for reports outside it.
pub fn repo_relative(root: &Path, target: &Path) -> String {
    match target.strip_prefix(root) {
        Ok(rel) => {
            let parts: Vec<String> = rel
                .components()
                .map(|part| part.as_os_str().to_string_lossy().into_owned())
                .collect();
            format!("./{}", parts.join("/"))
        }
        Err(_) => target.display().to_string(),
    }
}

/// Registers every report under its dataset label. Entry order is preserved;
/// new datasets are appended.
pub fn update_manifest(
    manifest: &mut Manifest,
    root: &Path,
    reports: &[LoadedReport],
    prune: bool,
) -> Result<ManifestChanges> {
    let mut changes = ManifestChanges::default();

    for loaded in reports {
        let name = dataset_label(&loaded.report);
        let target = std::path::absolute(&loaded.path)
            .with_context(|| format!("failed to resolve {}", loaded.path.display()))?;
        let report = repo_relative(root, &target);

        if manifest.upsert(&name, &report) {
            changes.added += 1;
        } else {
            changes.updated += 1;
        }
    }

    if prune {
        let before = manifest.datasets.len();
        manifest.datasets.retain(|entry| {
            let keep = resolve_report_path(root, &entry.report).is_file();
            if !keep {
                warn!(dataset = %entry.name, report = %entry.report, "pruning entry with missing report");
            }
            keep
        });
        changes.pruned = before - manifest.datasets.len();
    }

    Ok(changes)
}
