//! Key findings and recommendations.
//!
//! Text is assembled from fixed templates over the deterministic result, in a
//! fixed order: dataset shape, completeness, column mix, duplicates, strongest
//! correlations, then fitted trends.

use crate::types::{
    AnalysisResult, CorrelationPair, TrendConfidence, TrendDirection, TrendOutcome,
};

/// Cell completeness (percent) under which missing data is called out.
pub const COMPLETENESS_WARNING_PCT: f64 = 90.0;

/// Outlier share (percent) above which a column is called out.
pub const OUTLIER_WARNING_PCT: f64 = 5.0;

/// Maximum number of correlation pairs mentioned in the findings.
const MAX_CORRELATION_FINDINGS: usize = 3;

/// Maximum number of columns listed in the outlier recommendation.
const MAX_OUTLIER_COLUMNS: usize = 3;

/// Derives plain-language findings and recommendations from a result.
///
/// Output only depends on the result's content, so repeated analyses of the
/// same data produce identical text.
pub struct FindingsGenerator;

impl FindingsGenerator {
    /// Summary sentences, most general first.
    ///
    /// At most three correlations are mentioned. Trends are only mentioned
    /// when a fit exists and shows a direction.
    pub fn key_findings(result: &AnalysisResult) -> Vec<String> {
        let meta = &result.metadata;
        let quality = &result.quality.overall;
        let mut findings = vec![format!(
            "Dataset contains {} records across {} variables",
            format_thousands(meta.row_count),
            meta.column_count
        )];

        if quality.total_cells > 0 {
            findings.push(format!(
                "Data completeness: {:.1}% ({} missing values)",
                cell_completeness_pct(result),
                format_thousands(quality.missing_cells)
            ));
        }

        if meta.numeric_columns > 0 {
            let mut mix = format!(
                "Analysis includes {} numeric variables, {} categorical variables and {} temporal variables",
                meta.numeric_columns, meta.categorical_columns, meta.temporal_columns
            );
            if meta.unknown_columns > 0 {
                mix.push_str(&format!(
                    " ({} columns without usable values)",
                    meta.unknown_columns
                ));
            }
            findings.push(mix);
        }

        if quality.duplicate_rows > 0 {
            findings.push(format!(
                "{} duplicate rows detected",
                format_thousands(quality.duplicate_rows)
            ));
        }

        findings.extend(
            result
                .correlations
                .significant
                .iter()
                .take(MAX_CORRELATION_FINDINGS)
                .map(describe_correlation),
        );

        if let TrendOutcome::Fitted { axis, results } = &result.trends {
            for trend in results {
                let Some(fit) = trend.fit.value() else {
                    continue;
                };
                let direction = match trend.direction {
                    TrendDirection::Increasing => "an increasing",
                    TrendDirection::Decreasing => "a decreasing",
                    TrendDirection::Flat | TrendDirection::InsufficientData => continue,
                };
                findings.push(format!(
                    "{} shows {} trend over {} (R² = {:.2}, {} confidence)",
                    trend.column,
                    direction,
                    axis.column,
                    fit.r_squared,
                    confidence_label(trend.confidence)
                ));
            }
        }

        findings
    }

    /// Follow-up actions triggered by completeness, outliers, duplicates and low quality.
    pub fn recommendations(result: &AnalysisResult) -> Vec<String> {
        let quality = &result.quality.overall;
        let mut recommendations = Vec::new();

        if quality.total_cells > 0 && cell_completeness_pct(result) < COMPLETENESS_WARNING_PCT {
            recommendations
                .push("Consider addressing missing data to improve analysis accuracy".to_string());
        }

        let flagged: Vec<&str> = result
            .outliers
            .iter()
            .filter(|o| o.outlier_percentage > OUTLIER_WARNING_PCT)
            .map(|o| o.column.as_str())
            .take(MAX_OUTLIER_COLUMNS)
            .collect();
        if !flagged.is_empty() {
            recommendations.push(format!("Review outliers in: {}", flagged.join(", ")));
        }

        if quality.duplicate_rows > 0 {
            recommendations.push(format!(
                "Check whether the {} duplicate rows are expected before aggregating",
                format_thousands(quality.duplicate_rows)
            ));
        }

        if quality.below_threshold {
            recommendations.push(format!(
                "Data quality score is {:.2}; improve completeness and uniqueness before relying on these findings",
                quality.score
            ));
        }

        recommendations
    }
}

/// Share of non-missing cells, in percent.
fn cell_completeness_pct(result: &AnalysisResult) -> f64 {
    let quality = &result.quality.overall;
    if quality.total_cells == 0 {
        return 0.0;
    }
    (1.0 - quality.missing_cells as f64 / quality.total_cells as f64) * 100.0
}

fn describe_correlation(pair: &CorrelationPair) -> String {
    let sign = if pair.coefficient >= 0.0 {
        "positive"
    } else {
        "negative"
    };
    format!(
        "Strong {} correlation between {} and {} (r = {:.2})",
        sign, pair.column_a, pair.column_b, pair.coefficient
    )
}

fn confidence_label(confidence: TrendConfidence) -> &'static str {
    match confidence {
        TrendConfidence::High => "high",
        TrendConfidence::Moderate => "moderate",
        TrendConfidence::Low => "low",
        TrendConfidence::None => "no",
    }
}

/// Format an integer with `,` thousands separators.
pub fn format_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
