//! Linear trend fitting of numeric series against an ordered axis.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::profiler::ColumnView;
use crate::types::{
    AxisEncoding, Computable, TrendAxis, TrendConfidence, TrendDirection, TrendFit, TrendOutcome,
    TrendResult,
};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Minimum number of points for a fit.
pub const MIN_TREND_POINTS: usize = 3;

/// R² at or above which a fit is reported with high confidence.
pub const HIGH_CONFIDENCE_R2: f64 = 0.7;

/// R² at or above which a fit is reported with moderate confidence.
pub const MODERATE_CONFIDENCE_R2: f64 = 0.4;

/// Fit trends for the selected series.
///
/// The axis is the configured `trend_axis`, otherwise the first temporal
/// column. Series are the configured `trend_columns`, otherwise the first
/// numeric columns in table order (excluding the axis).
pub fn trend_analysis(views: &[ColumnView], config: &AnalysisConfig) -> TrendOutcome {
    if !config.trend_analysis {
        return TrendOutcome::Disabled;
    }

    let axis = match select_axis(views, config) {
        Ok(axis) => axis,
        Err(reason) => {
            info!("Trend analysis skipped: {}", reason);
            return TrendOutcome::Skipped { reason };
        }
    };

    let series = select_series(views, config, &axis.name);
    if series.is_empty() {
        let reason = format!("no numeric column to fit against '{}'", axis.name);
        info!("Trend analysis skipped: {}", reason);
        return TrendOutcome::Skipped { reason };
    }

    let encoding = if axis.is_temporal() {
        AxisEncoding::TemporalRank
    } else {
        AxisEncoding::Numeric
    };

    let results = series
        .into_iter()
        .map(|column| fit_series(axis, column, encoding, config.trend_r2_threshold))
        .collect();

    TrendOutcome::Fitted {
        axis: TrendAxis {
            column: axis.name.clone(),
            encoding,
        },
        results,
    }
}

fn select_axis<'a>(
    views: &'a [ColumnView],
    config: &AnalysisConfig,
) -> std::result::Result<&'a ColumnView, String> {
    match &config.trend_axis {
        Some(name) => {
            let view = views
                .iter()
                .find(|v| &v.name == name)
                .ok_or_else(|| format!("trend axis '{}' not found", name))?;
            if view.is_temporal() || view.is_numeric() {
                Ok(view)
            } else {
                Err(format!(
                    "trend axis '{}' is {}, not temporal or numeric",
                    name,
                    view.semantic_type.as_str()
                ))
            }
        }
        None => views
            .iter()
            .find(|v| v.is_temporal())
            .ok_or_else(|| "no temporal column to order by".to_string()),
    }
}

fn select_series<'a>(
    views: &'a [ColumnView],
    config: &AnalysisConfig,
    axis: &str,
) -> Vec<&'a ColumnView> {
    if config.trend_columns.is_empty() {
        views
            .iter()
            .filter(|v| v.is_numeric() && v.name != axis)
            .take(config.max_trend_series)
            .collect()
    } else {
        config
            .trend_columns
            .iter()
            .filter_map(|name| views.iter().find(|v| &v.name == name))
            .collect()
    }
}

fn fit_series(
    axis: &ColumnView,
    column: &ColumnView,
    encoding: AxisEncoding,
    r2_threshold: f64,
) -> TrendResult {
    let context = format!("trend of '{}' over '{}'", column.name, axis.name);
    let fit = if column.is_numeric() {
        let (x, y) = regression_points(axis, column, encoding);
        linear_fit(&x, &y, &context)
    } else {
        Err(AnalysisError::computation(
            context,
            format!("column is {}, not numeric", column.semantic_type.as_str()),
        ))
    };

    let result = match fit {
        Ok(fit) => TrendResult {
            column: column.name.clone(),
            direction: direction(&fit, r2_threshold),
            confidence: confidence(fit.r_squared),
            fit: Computable::Value(fit),
        },
        Err(e) => {
            let direction = if matches!(e, AnalysisError::InsufficientData { .. }) {
                TrendDirection::InsufficientData
            } else {
                TrendDirection::Flat
            };
            TrendResult {
                column: column.name.clone(),
                fit: Computable::not_computable(&e),
                direction,
                confidence: TrendConfidence::None,
            }
        }
    };

    debug!(
        column = %result.column,
        direction = ?result.direction,
        confidence = ?result.confidence,
        "Fitted trend"
    );
    result
}

/// Rows with both an axis and a series value, ordered along the axis.
fn regression_points(
    axis: &ColumnView,
    column: &ColumnView,
    encoding: AxisEncoding,
) -> (Vec<f64>, Vec<f64>) {
    let y_values = &column.numbers;
    match encoding {
        AxisEncoding::TemporalRank => {
            let mut rows: Vec<_> = axis
                .timestamps
                .iter()
                .zip(y_values)
                .filter_map(|(t, y)| Some(((*t)?, (*y)?)))
                .collect();
            // Stable: rows with equal timestamps keep table order
            rows.sort_by_key(|(t, _)| *t);
            let x = (0..rows.len()).map(|i| i as f64).collect();
            let y = rows.into_iter().map(|(_, y)| y).collect();
            (x, y)
        }
        AxisEncoding::Numeric => {
            let mut rows: Vec<(f64, f64)> = axis
                .numbers
                .iter()
                .zip(y_values)
                .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                .collect();
            rows.sort_by(|a, b| a.0.total_cmp(&b.0));
            rows.into_iter().unzip()
        }
    }
}

/// Ordinary least squares fit of `y` on `x`.
pub fn linear_fit(x: &[f64], y: &[f64], context: &str) -> Result<TrendFit> {
    let n = x.len().min(y.len());
    if n < MIN_TREND_POINTS {
        return Err(AnalysisError::insufficient(context, MIN_TREND_POINTS, n));
    }
    let (x, y) = (&x[..n], &y[..n]);
    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 {
        return Err(AnalysisError::computation(context, "axis has no spread"));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    // A constant series is perfectly flat but explains nothing
    let r_squared = if syy == 0.0 {
        0.0
    } else {
        ((sxy * sxy) / (sxx * syy)).clamp(0.0, 1.0)
    };

    if !(slope.is_finite() && intercept.is_finite() && r_squared.is_finite()) {
        return Err(AnalysisError::computation(context, "fit is not finite"));
    }

    Ok(TrendFit {
        slope,
        intercept,
        r_squared,
        points: n,
    })
}

fn direction(fit: &TrendFit, r2_threshold: f64) -> TrendDirection {
    if fit.r_squared < r2_threshold {
        return TrendDirection::Flat;
    }
    match fit.slope.partial_cmp(&0.0) {
        Some(Ordering::Greater) => TrendDirection::Increasing,
        Some(Ordering::Less) => TrendDirection::Decreasing,
        _ => TrendDirection::Flat,
    }
}

fn confidence(r_squared: f64) -> TrendConfidence {
    if r_squared >= HIGH_CONFIDENCE_R2 {
        TrendConfidence::High
    } else if r_squared >= MODERATE_CONFIDENCE_R2 {
        TrendConfidence::Moderate
    } else {
        TrendConfidence::Low
    }
}
