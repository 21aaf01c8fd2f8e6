//! Descriptive statistics over plain `f64` slices.

use crate::error::{AnalysisError, Result};
use crate::types::DescriptiveStats;

/// Linear-interpolation quantile of an ascending slice.
///
/// Uses position `q * (n - 1)`, the same convention as polars'
/// `QuantileMethod::Linear`. Returns `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Return an ascending copy of `values`.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (ddof = 1); 0 for a single value.
pub fn sample_variance(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Smallest of the most frequent values of an ascending slice.
fn mode_of_sorted(sorted: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let mut j = i;
        while j < sorted.len() && sorted[j] == value {
            j += 1;
        }
        let run = j - i;
        // Strictly greater keeps the smallest value on ties
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((value, run));
        }
        i = j;
    }
    best.map(|(value, _)| value)
}

/// Biased moment skewness and excess kurtosis; `None` when the data has no spread.
fn shape_moments(values: &[f64], mean: f64) -> (Option<f64>, Option<f64>) {
    let n = values.len() as f64;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    if m2 == 0.0 {
        return (None, None);
    }
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
    let m4 = values.iter().map(|v| (v - mean).powi(4)).sum::<f64>() / n;
    (Some(m3 / m2.powf(1.5)), Some(m4 / (m2 * m2) - 3.0))
}

/// Compute descriptive statistics of the given (non-missing) values.
///
/// Fails with `InsufficientData` when there are no values, and with
/// `Computation` when an intermediate result is not finite.
pub fn describe(values: &[f64], context: &str) -> Result<DescriptiveStats> {
    let count = values.len();
    let sorted = sorted_copy(values);
    let (Some(mean), Some(median), Some(q1), Some(q3), Some(mode)) = (
        mean(values),
        quantile(&sorted, 0.5),
        quantile(&sorted, 0.25),
        quantile(&sorted, 0.75),
        mode_of_sorted(&sorted),
    ) else {
        return Err(AnalysisError::insufficient(context, 1, count));
    };

    let variance = sample_variance(values, mean);
    let (skewness, kurtosis) = shape_moments(values, mean);

    let stats = DescriptiveStats {
        count,
        mean,
        median,
        mode,
        std_dev: variance.sqrt(),
        variance,
        min: sorted[0],
        max: sorted[count - 1],
        q1,
        q3,
        iqr: q3 - q1,
        skewness,
        kurtosis,
    };

    let scalars = [
        stats.mean,
        stats.median,
        stats.mode,
        stats.std_dev,
        stats.variance,
        stats.q1,
        stats.q3,
        stats.iqr,
    ];
    let moments_finite = [stats.skewness, stats.kurtosis]
        .iter()
        .flatten()
        .all(|v| v.is_finite());
    if !scalars.iter().all(|v| v.is_finite()) || !moments_finite {
        return Err(AnalysisError::computation(
            context,
            "statistics overflowed to a non-finite value",
        ));
    }

    Ok(stats)
}
