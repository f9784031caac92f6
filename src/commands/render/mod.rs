//! Static dashboard rendering: one overview page, one page per dataset and
//! one page per row scaling summary.

use crate::chart::ChartOptions;
use crate::cli::{AxisMode, RenderArgs};

mod bars;
mod dataset;
pub mod loader;
mod overview;
mod page;
mod run;
mod scaling;
#[cfg(test)]
mod tests;

pub use run::run;

/// View toggles and sizing shared by every page.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub options: ChartOptions,
    pub chart_width: f64,
}

impl RenderContext {
    pub fn from_args(args: &RenderArgs) -> Self {
        Self {
            options: ChartOptions {
                log_scale: args.axis == AxisMode::Log,
                cap_outliers: !args.no_outlier_cap,
                show_values: args.show_values,
                show_legend: args.show_legend,
            },
            chart_width: f64::from(args.chart_width),
        }
    }
}
