pub const BEST_EPSILON: f64 = 1e-9;

const OUTLIER_MIN_POINTS: usize = 4;
const OUTLIER_FACTOR: f64 = 3.0;
const CAP_HEADROOM: f64 = 1.1;

/// Geometric mean over the strictly positive finite values.
pub fn geomean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut log_sum = 0.0_f64;
    let mut count = 0_usize;
    for value in values {
        if value.is_finite() && value > 0.0 {
            log_sum += value.ln();
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    Some((log_sum / count as f64).exp())
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn finite_values<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|value| value.is_finite())
        .collect()
}

pub fn finite_min<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    finite_values(values).into_iter().reduce(f64::min)
}

pub fn finite_max<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    finite_values(values).into_iter().reduce(f64::max)
}

pub fn is_best_max(value: Option<f64>, target: Option<f64>) -> bool {
    match (value, target) {
        (Some(value), Some(target)) if value.is_finite() && target.is_finite() => {
            value >= target - BEST_EPSILON
        }
        _ => false,
    }
}

pub fn is_best_min(value: Option<f64>, target: Option<f64>) -> bool {
    match (value, target) {
        (Some(value), Some(target)) if value.is_finite() && target.is_finite() => {
            value <= target + BEST_EPSILON
        }
        _ => false,
    }
}

/// Linear-interpolated quantile, `q` in `[0, 1]`.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMax {
    pub value: f64,
    pub capped: bool,
}

/// Upper bound for a zero-floored value axis. A handful of outliers far above
/// the 95th percentile would flatten every other point, so with enough points
/// the axis stops just above P95 instead and the outliers are drawn clipped.
pub fn compute_axis_max(values: &[f64], cap_outliers: bool) -> AxisMax {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if finite.is_empty() || max <= 0.0 {
        return AxisMax {
            value: 1.0,
            capped: false,
        };
    }

    if cap_outliers && finite.len() >= OUTLIER_MIN_POINTS {
        if let Some(p95) = percentile(&finite, 0.95) {
            if p95 > 0.0 && max > p95 * OUTLIER_FACTOR {
                return AxisMax {
                    value: p95 * CAP_HEADROOM,
                    capped: true,
                };
            }
        }
    }

    AxisMax {
        value: max,
        capped: false,
    }
}
