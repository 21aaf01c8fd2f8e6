//! Column profiling.
//!
//! This module provides:
//! - Semantic type classification ([`classify_columns`])
//! - Descriptive statistics for numeric columns
//! - Frequency summaries for categorical columns
//! - Date range and granularity for temporal columns

mod classifier;
pub mod statistics;
mod summaries;

pub use classifier::{ColumnView, classify_column, classify_columns};
pub use summaries::{TOP_VALUES, summarize_categorical, summarize_temporal};

use crate::error::ResultExt;
use crate::types::{CategoricalSummary, ColumnProfile, ColumnSummary, SemanticType};
use crate::utils::ratio;
use tracing::{debug, warn};

/// Builds one [`ColumnProfile`] per classified column.
pub struct ColumnProfiler;

impl ColumnProfiler {
    /// Profile every column, in table order.
    ///
    /// Never fails: a column whose statistics cannot be computed carries a
    /// not-computable marker instead.
    pub fn profile_columns(views: &[ColumnView]) -> Vec<ColumnProfile> {
        views.iter().map(Self::profile_column).collect()
    }

    pub fn profile_column(view: &ColumnView) -> ColumnProfile {
        let missing_count = view.missing_count();
        let summary = match view.semantic_type {
            SemanticType::Numeric => ColumnSummary::Numeric(
                statistics::describe(
                    &view.present_numbers(),
                    &format!("statistics of '{}'", view.name),
                )
                .into(),
            ),
            SemanticType::Categorical => ColumnSummary::Categorical(
                summarize_categorical(&view.text)
                    .context(format!("value counts of '{}'", view.name))
                    .unwrap_or_else(|e| {
                        warn!(column = %view.name, "{}", e);
                        CategoricalSummary::default()
                    }),
            ),
            SemanticType::Temporal => ColumnSummary::Temporal(
                summarize_temporal(&view.timestamps, &format!("date range of '{}'", view.name))
                    .into(),
            ),
            SemanticType::Unknown => ColumnSummary::Unknown,
        };

        debug!(
            column = %view.name,
            semantic_type = view.semantic_type.as_str(),
            missing = missing_count,
            "Profiled column"
        );

        ColumnProfile {
            name: view.name.clone(),
            dtype: view.dtype.clone(),
            semantic_type: view.semantic_type,
            missing_count,
            missing_percentage: ratio(missing_count, view.len()) * 100.0,
            summary,
        }
    }
}
