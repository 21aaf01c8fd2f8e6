//! Pairwise Pearson correlation between numeric columns.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::profiler::ColumnView;
use crate::types::{
    Computable, CorrelationAnalysis, CorrelationPair, CorrelationStrength, SkippedPair,
};
use std::cmp::Ordering;
use tracing::debug;

/// Correlate every unordered pair of numeric columns exactly once.
///
/// Rows are compared pairwise-complete: a row counts for a pair only when
/// both cells are present. Pairs without a defined coefficient are listed
/// in `skipped` with the reason.
pub fn correlation_analysis(views: &[ColumnView], config: &AnalysisConfig) -> CorrelationAnalysis {
    let numeric: Vec<&ColumnView> = views.iter().filter(|v| v.is_numeric()).collect();

    let mut all_pairs = Vec::new();
    let mut skipped = Vec::new();

    for (i, left) in numeric.iter().enumerate() {
        for right in &numeric[i + 1..] {
            // Canonical order: column_a < column_b
            let (a, b) = if left.name <= right.name {
                (*left, *right)
            } else {
                (*right, *left)
            };

            match pearson(&a.numbers, &b.numbers, &a.name, &b.name) {
                Ok((coefficient, observations)) => all_pairs.push(CorrelationPair {
                    column_a: a.name.clone(),
                    column_b: b.name.clone(),
                    coefficient,
                    strength: classify_strength(coefficient, config),
                    observations,
                }),
                Err(e) => {
                    debug!(column_a = %a.name, column_b = %b.name, error = %e, "Skipped correlation pair");
                    skipped.push(SkippedPair {
                        column_a: a.name.clone(),
                        column_b: b.name.clone(),
                        status: Computable::not_computable(&e),
                    });
                }
            }
        }
    }

    all_pairs.sort_by(compare_pairs);
    skipped.sort_by(|x, y| (&x.column_a, &x.column_b).cmp(&(&y.column_a, &y.column_b)));

    let significant = all_pairs
        .iter()
        .filter(|p| p.coefficient.abs() >= config.correlation_threshold)
        .cloned()
        .collect();

    CorrelationAnalysis {
        threshold: config.correlation_threshold,
        significant,
        all_pairs,
        skipped,
    }
}

/// Pearson r of two row-aligned columns, with the number of rows used.
pub fn pearson(
    x: &[Option<f64>],
    y: &[Option<f64>],
    name_x: &str,
    name_y: &str,
) -> Result<(f64, usize)> {
    let context = format!("correlation of '{}' and '{}'", name_x, name_y);
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return Err(AnalysisError::insufficient(context, 2, n));
    }

    let nf = n as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / nf;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Err(AnalysisError::computation(
            context,
            "a column has zero variance over the shared rows",
        ));
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    if !r.is_finite() {
        return Err(AnalysisError::computation(context, "coefficient is not finite"));
    }

    Ok((r.clamp(-1.0, 1.0), n))
}

fn classify_strength(r: f64, config: &AnalysisConfig) -> CorrelationStrength {
    let magnitude = r.abs();
    if magnitude >= config.correlation_threshold {
        CorrelationStrength::Strong
    } else if magnitude >= config.moderate_correlation_threshold {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Weak
    }
}

/// |r| descending, then column names ascending.
fn compare_pairs(a: &CorrelationPair, b: &CorrelationPair) -> Ordering {
    b.coefficient
        .abs()
        .total_cmp(&a.coefficient.abs())
        .then_with(|| a.column_a.cmp(&b.column_a))
        .then_with(|| a.column_b.cmp(&b.column_b))
}
