use crate::stats::compute_axis_max;

use super::{ChartLayout, ChartOptions, TICK_COUNT};

/// Maps data values onto the vertical extent of a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Zero-floored linear axis.
    Linear { max: f64, capped: bool },
    /// Decade-aligned log10 axis.
    Log { min_exp: i32, max_exp: i32 },
}

impl Scale {
    pub fn fit(values: &[f64], options: &ChartOptions) -> Self {
        if options.log_scale {
            return Self::fit_log(values);
        }
        let axis = compute_axis_max(values, options.cap_outliers);
        Self::Linear {
            max: axis.value,
            capped: axis.capped,
        }
    }

    fn fit_log(values: &[f64]) -> Self {
        let positive: Vec<f64> = values
            .iter()
            .copied()
            .filter(|v| v.is_finite() && *v > 0.0)
            .collect();
        if positive.is_empty() {
            return Self::Log {
                min_exp: 0,
                max_exp: 1,
            };
        }

        let min = positive.iter().copied().fold(f64::INFINITY, f64::min);
        let max = positive.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_exp = min.log10().floor() as i32;
        let mut max_exp = max.log10().ceil() as i32;
        if max_exp <= min_exp {
            max_exp = min_exp + 1;
        }
        Self::Log { min_exp, max_exp }
    }

    /// Position in `[0, 1]` from the bottom of the plot, or `None` when the
    /// value cannot be placed on this axis.
    pub fn ratio(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match *self {
            Self::Linear { max, .. } => Some((value / max).clamp(0.0, 1.0)),
            Self::Log { min_exp, max_exp } => {
                if value <= 0.0 {
                    return None;
                }
                let span = f64::from(max_exp - min_exp);
                Some(((value.log10() - f64::from(min_exp)) / span).clamp(0.0, 1.0))
            }
        }
    }

    pub fn is_clipped(&self, value: f64) -> bool {
        match *self {
            Self::Linear { max, capped } => capped && value > max,
            Self::Log { .. } => false,
        }
    }

    pub fn ticks(&self) -> Vec<f64> {
        match *self {
            Self::Linear { max, .. } => {
                let step = max / TICK_COUNT as f64;
                (0..=TICK_COUNT).map(|i| step * i as f64).collect()
            }
            Self::Log { min_exp, max_exp } => {
                (min_exp..=max_exp).map(|exp| 10_f64.powi(exp)).collect()
            }
        }
    }

    pub fn y(&self, value: f64, layout: &ChartLayout) -> Option<f64> {
        let chart_height = layout.chart_height();
        self.ratio(value)
            .map(|ratio| layout.padding.top + chart_height - ratio * chart_height)
    }
}
