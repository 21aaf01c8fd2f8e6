//! Categorical and temporal column summaries.

use crate::error::{AnalysisError, Result};
use crate::types::{CategoricalSummary, TemporalGranularity, TemporalSummary, ValueCount};
use chrono::NaiveDateTime;
use polars::prelude::*;

/// Number of most frequent values kept in a categorical summary.
pub const TOP_VALUES: usize = 5;

/// Count distinct values and keep the most frequent ones.
///
/// Ties are ordered by value so the output is deterministic.
pub fn summarize_categorical(values: &[Option<String>]) -> PolarsResult<CategoricalSummary> {
    let series = Series::new("value".into(), values).drop_nulls();
    if series.is_empty() {
        return Ok(CategoricalSummary::default());
    }

    let ranked = series.value_counts(false, false, "count".into(), false)?.sort(
        ["count", "value"],
        SortMultipleOptions::default().with_order_descending_multi([true, false]),
    )?;
    let labels = ranked.column("value")?.as_materialized_series().str()?;
    let tallies = ranked
        .column("count")?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;

    let top_values = labels
        .into_iter()
        .zip(tallies.u64()?.into_iter())
        .take(TOP_VALUES)
        .filter_map(|(value, count)| {
            Some(ValueCount {
                value: value?.to_string(),
                count: count? as usize,
            })
        })
        .collect();

    Ok(CategoricalSummary {
        distinct_count: ranked.height(),
        top_values,
    })
}

/// Date range and sampling granularity of a temporal column.
pub fn summarize_temporal(values: &[Option<NaiveDateTime>], context: &str) -> Result<TemporalSummary> {
    let mut present: Vec<NaiveDateTime> = values.iter().flatten().copied().collect();
    present.sort();
    present.dedup();

    let (Some(start), Some(end)) = (present.first().copied(), present.last().copied()) else {
        return Err(AnalysisError::insufficient(context, 1, 0));
    };

    Ok(TemporalSummary {
        start,
        end,
        granularity: infer_granularity(&present),
    })
}

/// Classify the median gap between consecutive distinct timestamps.
fn infer_granularity(distinct_sorted: &[NaiveDateTime]) -> TemporalGranularity {
    if distinct_sorted.len() < 2 {
        return TemporalGranularity::Irregular;
    }

    let mut gaps: Vec<f64> = distinct_sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds() as f64 / 86_400.0)
        .collect();
    gaps.sort_by(f64::total_cmp);
    let mid = gaps.len() / 2;
    let median_days = if gaps.len() % 2 == 0 {
        (gaps[mid - 1] + gaps[mid]) / 2.0
    } else {
        gaps[mid]
    };

    match median_days {
        d if d < 1.0 => TemporalGranularity::SubDaily,
        d if d <= 2.0 => TemporalGranularity::Daily,
        d if (6.0..=8.0).contains(&d) => TemporalGranularity::Weekly,
        d if (27.0..=32.0).contains(&d) => TemporalGranularity::Monthly,
        d if (88.0..=93.0).contains(&d) => TemporalGranularity::Quarterly,
        d if (360.0..=370.0).contains(&d) => TemporalGranularity::Yearly,
        _ => TemporalGranularity::Irregular,
    }
}
