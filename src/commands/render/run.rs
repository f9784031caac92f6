use anyhow::Result;
use tracing::info;

use crate::cli::RenderArgs;
use crate::commands::summarize::SUMMARY_JSON;
use crate::util::{ensure_directory, write_text};

use super::RenderContext;
use super::dataset::render_dataset_page;
use super::loader::{load_dashboard, load_row_scaling};
use super::overview::render_overview;
use super::page::{dataset_href, row_scaling_href};
use super::scaling::render_row_scaling_page;

pub fn run(args: RenderArgs) -> Result<()> {
    let ctx = RenderContext::from_args(&args);
    let summary_path = args
        .summary_path
        .clone()
        .unwrap_or_else(|| args.reports_dir.join(SUMMARY_JSON));
    let cache_dir = args.site_dir.join("cache");
    let scaling_root = args
        .row_scaling_root
        .clone()
        .unwrap_or_else(|| args.reports_dir.join("row_scaling"));

    info!(
        site_dir = %args.site_dir.display(),
        axis = args.axis.as_str(),
        cap_outliers = ctx.options.cap_outliers,
        "render requested"
    );

    ensure_directory(&args.site_dir)?;
    let data = load_dashboard(
        &summary_path,
        &args.manifest_path,
        &args.repo_root,
        &args.reports_dir,
        &cache_dir,
    )?;
    let scaling = load_row_scaling(&scaling_root)?;

    let mut nav = vec![("index.html".to_string(), "Overview".to_string())];
    for summary in &scaling {
        nav.push((
            row_scaling_href(&summary.dataset),
            format!("Row scaling: {}", summary.dataset),
        ));
    }

    let index_path = args.site_dir.join("index.html");
    write_text(&index_path, &render_overview(&data, &scaling, &nav, &ctx))?;
    info!(path = %index_path.display(), "wrote overview page");

    for name in &data.dataset_names {
        let path = args.site_dir.join(dataset_href(name));
        write_text(&path, &render_dataset_page(name, &data, &nav, &ctx))?;
    }

    for summary in &scaling {
        let path = args.site_dir.join(row_scaling_href(&summary.dataset));
        write_text(&path, &render_row_scaling_page(summary, &nav, &ctx))?;
    }

    info!(
        datasets = data.dataset_names.len(),
        row_scaling_pages = scaling.len(),
        from_cache = data.from_cache,
        "render completed"
    );

    Ok(())
}
