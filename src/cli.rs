use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "colbench",
    version,
    about = "Columnar format benchmark summaries and dashboard rendering"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Summarize(SummarizeArgs),
    Manifest(ManifestArgs),
    RowScaling(RowScalingArgs),
    Render(RenderArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SummarizeArgs {
    #[arg(long, default_value = "out")]
    pub reports_dir: PathBuf,

    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    #[arg(long, default_value = "out")]
    pub reports_dir: PathBuf,

    #[arg(long, default_value = "website/data/datasets.json")]
    pub manifest_path: PathBuf,

    /// Directory that manifest report paths are relative to.
    #[arg(long, default_value = ".")]
    pub repo_root: PathBuf,

    /// Drop entries whose report file no longer exists.
    #[arg(long, default_value_t = false)]
    pub prune: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RowScalingArgs {
    #[arg(long)]
    pub out_root: PathBuf,

    /// Dataset label recorded in the summary; defaults to the out-root directory name.
    #[arg(long)]
    pub dataset: Option<String>,

    #[arg(long, default_value_t = false)]
    pub include_duckdb: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum AxisMode {
    Linear,
    Log,
}

impl AxisMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Log => "log",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[arg(long, default_value = "out")]
    pub reports_dir: PathBuf,

    #[arg(long)]
    pub summary_path: Option<PathBuf>,

    #[arg(long, default_value = "website/data/datasets.json")]
    pub manifest_path: PathBuf,

    /// Directory that manifest report paths are relative to.
    #[arg(long, default_value = ".")]
    pub repo_root: PathBuf,

    #[arg(long)]
    pub row_scaling_root: Option<PathBuf>,

    #[arg(long, default_value = "site")]
    pub site_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = AxisMode::Linear)]
    pub axis: AxisMode,

    #[arg(long, default_value_t = false)]
    pub show_legend: bool,

    #[arg(long, default_value_t = false)]
    pub show_values: bool,

    /// Keep the full value range even when a few points dwarf the rest.
    #[arg(long, default_value_t = false)]
    pub no_outlier_cap: bool,

    #[arg(long, default_value_t = 640)]
    pub chart_width: u32,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "out")]
    pub reports_dir: PathBuf,

    #[arg(long, default_value = "website/data/datasets.json")]
    pub manifest_path: PathBuf,

    /// Directory that manifest report paths are relative to.
    #[arg(long, default_value = ".")]
    pub repo_root: PathBuf,

    #[arg(long, default_value = "site")]
    pub site_dir: PathBuf,
}
