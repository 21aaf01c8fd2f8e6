//! Outlier detection for numeric columns.
//!
//! Detection goes through the [`OutlierDetector`] trait so further methods
//! can be registered next to [`IqrDetector`] without touching the pipeline.

use crate::config::OutlierMethod;
use crate::error::{AnalysisError, Result};
use crate::profiler::ColumnView;
use crate::profiler::statistics::{quantile, sorted_copy};
use crate::types::{Computable, IqrFences, OutlierReport};
use crate::utils::ratio;
use tracing::debug;

/// Minimum number of values for quartile fences to be meaningful.
pub const MIN_VALUES_FOR_FENCES: usize = 4;

/// Multiplier applied to the IQR to place the fences.
pub const IQR_FENCE_FACTOR: f64 = 1.5;

/// A method for flagging outlying values of a numeric column.
pub trait OutlierDetector: Send + Sync {
    fn method(&self) -> OutlierMethod;

    /// Produce a report for one column. Never fails; a column that cannot be
    /// scanned gets a not-computable marker and no flagged rows.
    fn detect(&self, column: &ColumnView) -> OutlierReport;
}

/// Tukey fences: values outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IqrDetector;

impl IqrDetector {
    pub fn fences(values: &[f64], context: &str) -> Result<IqrFences> {
        if values.len() < MIN_VALUES_FOR_FENCES {
            return Err(AnalysisError::insufficient(
                context,
                MIN_VALUES_FOR_FENCES,
                values.len(),
            ));
        }
        let sorted = sorted_copy(values);
        let (Some(q1), Some(q3)) = (quantile(&sorted, 0.25), quantile(&sorted, 0.75)) else {
            return Err(AnalysisError::insufficient(context, MIN_VALUES_FOR_FENCES, 0));
        };
        let iqr = q3 - q1;
        let fences = IqrFences {
            q1,
            q3,
            iqr,
            lower: q1 - IQR_FENCE_FACTOR * iqr,
            upper: q3 + IQR_FENCE_FACTOR * iqr,
        };
        if !(fences.lower.is_finite() && fences.upper.is_finite()) {
            return Err(AnalysisError::computation(context, "fences are not finite"));
        }
        Ok(fences)
    }
}

impl OutlierDetector for IqrDetector {
    fn method(&self) -> OutlierMethod {
        OutlierMethod::Iqr
    }

    fn detect(&self, column: &ColumnView) -> OutlierReport {
        let values = column.present_numbers();
        let context = format!("outliers in '{}'", column.name);

        let (fences, flagged_rows) = match Self::fences(&values, &context) {
            Ok(fences) => {
                let flagged: Vec<usize> = column
                    .numbers
                    .iter()
                    .enumerate()
                    .filter_map(|(row, v)| {
                        v.filter(|x| *x < fences.lower || *x > fences.upper)
                            .map(|_| row)
                    })
                    .collect();
                (Computable::Value(fences), flagged)
            }
            Err(e) => {
                debug!(column = %column.name, error = %e, "Outlier fences not computable");
                (Computable::not_computable(&e), Vec::new())
            }
        };

        let outlier_count = flagged_rows.len();
        OutlierReport {
            column: column.name.clone(),
            method: self.method(),
            fences,
            flagged_rows,
            outlier_count,
            outlier_percentage: ratio(outlier_count, values.len()) * 100.0,
        }
    }
}

/// Detector for a configured method.
pub fn detector_for(method: OutlierMethod) -> Box<dyn OutlierDetector> {
    match method {
        OutlierMethod::Iqr => Box::new(IqrDetector),
    }
}

/// One report per numeric column, in table order.
pub fn detect_outliers(views: &[ColumnView], method: OutlierMethod) -> Vec<OutlierReport> {
    let detector = detector_for(method);
    views
        .iter()
        .filter(|v| v.is_numeric())
        .map(|v| detector.detect(v))
        .collect()
}
