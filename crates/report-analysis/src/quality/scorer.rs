//! Data quality scoring.
//!
//! Completeness counts the cells a column can actually use: for numeric and
//! temporal columns that means cells that parsed, so the score agrees with
//! the statistics computed from the same column.

use crate::config::AnalysisConfig;
use crate::profiler::ColumnView;
use crate::types::{DatasetQuality, QualityReport, QualityScore};
use crate::utils::ratio;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Scores completeness and uniqueness per column and for the whole dataset.
pub struct QualityScorer;

impl QualityScorer {
    /// Score every column and the dataset as a whole.
    ///
    /// The quality threshold is advisory: a low score only attaches a caveat.
    pub fn score(views: &[ColumnView], row_count: usize, config: &AnalysisConfig) -> QualityReport {
        let weights = (
            config.quality_completeness_weight,
            config.quality_uniqueness_weight,
        );
        let columns: Vec<QualityScore> = views
            .iter()
            .map(|view| Self::score_column(view, row_count, weights))
            .collect();

        let overall = Self::score_dataset(views, &columns, row_count, weights, config.quality_threshold);
        if let Some(caveat) = &overall.caveat {
            warn!(score = overall.score, "{}", caveat);
        }

        QualityReport { columns, overall }
    }

    fn score_column(view: &ColumnView, row_count: usize, weights: (f64, f64)) -> QualityScore {
        let present: Vec<&str> = view.present_text().collect();
        let missing_count = row_count.saturating_sub(present.len());
        let distinct_count = present.iter().collect::<HashSet<_>>().len();

        let completeness = ratio(present.len(), row_count);
        let uniqueness = ratio(distinct_count, present.len());
        let score = composite(completeness, uniqueness, weights);

        debug!(
            column = %view.name,
            completeness,
            uniqueness,
            score,
            "Scored column quality"
        );

        QualityScore {
            column: view.name.clone(),
            missing_count,
            distinct_count,
            completeness,
            uniqueness,
            score,
        }
    }

    fn score_dataset(
        views: &[ColumnView],
        columns: &[QualityScore],
        row_count: usize,
        weights: (f64, f64),
        threshold: f64,
    ) -> DatasetQuality {
        let n = columns.len();
        let (completeness, uniqueness) = if n == 0 {
            (0.0, 0.0)
        } else {
            (
                columns.iter().map(|c| c.completeness).sum::<f64>() / n as f64,
                columns.iter().map(|c| c.uniqueness).sum::<f64>() / n as f64,
            )
        };
        let score = composite(completeness, uniqueness, weights);
        let below_threshold = score < threshold;
        let caveat = below_threshold.then(|| {
            format!(
                "Data quality score {:.2} is below the configured threshold {:.2}; findings may be unreliable",
                score, threshold
            )
        });

        DatasetQuality {
            completeness,
            uniqueness,
            score,
            total_cells: row_count * n,
            missing_cells: columns.iter().map(|c| c.missing_count).sum(),
            duplicate_rows: count_duplicate_rows(views, row_count),
            below_threshold,
            caveat,
        }
    }
}

/// Weighted mean of completeness and uniqueness, clamped to [0, 1].
fn composite(completeness: f64, uniqueness: f64, (wc, wu): (f64, f64)) -> f64 {
    let total = wc + wu;
    if total <= 0.0 {
        return 0.0;
    }
    ((wc * completeness + wu * uniqueness) / total).clamp(0.0, 1.0)
}

/// Rows whose full textual content repeats an earlier row.
fn count_duplicate_rows(views: &[ColumnView], row_count: usize) -> usize {
    if views.is_empty() {
        return 0;
    }
    let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(row_count);
    (0..row_count)
        .filter(|&row| {
            let key: Vec<Option<&str>> = views
                .iter()
                .map(|view| view.text.get(row).and_then(|v| v.as_deref()))
                .collect();
            !seen.insert(key)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::profiler::classify_columns;
    use polars::prelude::*;

    fn report(df: DataFrame, config: &AnalysisConfig) -> QualityReport {
        let dataset = Dataset::new(df);
        let views = classify_columns(&dataset, config);
        QualityScorer::score(&views, dataset.height(), config)
    }

    #[test]
    fn test_column_scores() {
        let config = AnalysisConfig::default();
        let result = report(
            df![
                "id" => [1i32, 2, 3, 4],
                "region" => [Some("North"), Some("North"), None, Some("South")],
            ]
            .unwrap(),
            &config,
        );

        let id = &result.columns[0];
        assert_eq!(id.completeness, 1.0);
        assert_eq!(id.uniqueness, 1.0);
        assert_eq!(id.score, 1.0);

        let region = &result.columns[1];
        assert_eq!(region.missing_count, 1);
        assert_eq!(region.distinct_count, 2);
        assert_eq!(region.completeness, 0.75);
        assert!((region.uniqueness - 2.0 / 3.0).abs() < 1e-12);

        assert_eq!(result.overall.total_cells, 8);
        assert_eq!(result.overall.missing_cells, 1);
        assert_eq!(result.overall.duplicate_rows, 0);
    }

    #[test]
    fn test_unparsed_numeric_cells_reduce_completeness() {
        let result = report(
            df!["amount" => ["10", "20", "30", "oops", "pending"]].unwrap(),
            &AnalysisConfig::default(),
        );
        let amount = &result.columns[0];
        assert_eq!(amount.missing_count, 2);
        assert_eq!(amount.distinct_count, 3);
        assert_eq!(amount.completeness, 0.6);
        assert_eq!(result.overall.missing_cells, 2);
    }

    #[test]
    fn test_weights_shift_the_score() {
        let config = AnalysisConfig::builder().quality_weights(1.0, 0.0).build().unwrap();
        let result = report(df!["flag" => ["y", "y", "y", "y"]].unwrap(), &config);
        // Complete but not unique: only completeness counts
        assert_eq!(result.columns[0].score, 1.0);

        let config = AnalysisConfig::builder().quality_weights(0.0, 1.0).build().unwrap();
        let result = report(df!["flag" => ["y", "y", "y", "y"]].unwrap(), &config);
        assert_eq!(result.columns[0].score, 0.25);
    }

    #[test]
    fn test_duplicate_rows() {
        let config = AnalysisConfig::default();
        let result = report(
            df![
                "a" => ["x", "x", "y", "x"],
                "b" => [1i32, 1, 2, 1],
            ]
            .unwrap(),
            &config,
        );
        assert_eq!(result.overall.duplicate_rows, 2);
    }

    #[test]
    fn test_low_quality_attaches_caveat() {
        let config = AnalysisConfig::builder().quality_threshold(0.9).build().unwrap();
        let result = report(
            df!["status" => [Some("ok"), None, None, Some("ok")]].unwrap(),
            &config,
        );
        assert!(result.overall.below_threshold);
        assert!(result.overall.caveat.is_some());
    }

    #[test]
    fn test_empty_dataset() {
        let result = QualityScorer::score(&[], 0, &AnalysisConfig::default());
        assert_eq!(result.overall.total_cells, 0);
        assert_eq!(result.overall.score, 0.0);
        assert!(result.columns.is_empty());
    }
}
