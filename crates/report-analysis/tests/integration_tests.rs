//! Integration tests for the analysis engine.
//!
//! These tests verify end-to-end behavior of the analyzer on CSV fixtures
//! and small in-memory frames.

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use report_analysis::types::{AxisEncoding, TemporalGranularity, TrendConfidence, TrendDirection};
use report_analysis::{
    AnalysisConfig, AnalysisError, AnalysisResult, AnalysisStage, Analyzer, ColumnSummary,
    Dataset, InsightAnnotation, InsightProvider, SemanticType, TrendOutcome, analyze,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn sales() -> Dataset {
    Dataset::new(load_csv("sales_history.csv"))
}

fn survey() -> Dataset {
    Dataset::new(load_csv("survey_responses.csv"))
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ============================================================================
// Profiling
// ============================================================================

#[test]
fn test_one_profile_per_column_in_table_order() {
    let dataset = sales();
    let result = analyze(&dataset, &AnalysisConfig::default()).unwrap();

    let names: Vec<&str> = result.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["month", "region", "channel", "units", "revenue", "returns"]
    );
    assert_eq!(result.columns.len(), dataset.width());
    assert_eq!(result.metadata.row_count, 12);
    assert_eq!(result.metadata.column_count, 6);

    let types: Vec<SemanticType> = result.columns.iter().map(|c| c.semantic_type).collect();
    assert_eq!(
        types,
        vec![
            SemanticType::Temporal,
            SemanticType::Categorical,
            SemanticType::Categorical,
            SemanticType::Numeric,
            SemanticType::Numeric,
            SemanticType::Numeric,
        ]
    );
}

#[test]
fn test_temporal_profile_detects_monthly_granularity() {
    let result = analyze(&sales(), &AnalysisConfig::default()).unwrap();
    let month = result.column("month").unwrap();

    let ColumnSummary::Temporal(summary) = &month.summary else {
        panic!("month should be profiled as temporal");
    };
    let summary = summary.value().unwrap();
    assert_eq!(summary.start.to_string(), "2023-01-01 00:00:00");
    assert_eq!(summary.end.to_string(), "2023-12-01 00:00:00");
    assert_eq!(summary.granularity, TemporalGranularity::Monthly);
}

#[test]
fn test_categorical_profile_counts_missing_cells() {
    let result = analyze(&sales(), &AnalysisConfig::default()).unwrap();
    let channel = result.column("channel").unwrap();

    assert_eq!(channel.missing_count, 2);
    let ColumnSummary::Categorical(summary) = &channel.summary else {
        panic!("channel should be categorical");
    };
    assert_eq!(summary.distinct_count, 2);
    assert_eq!(summary.top_values[0].value, "Online");
    assert_eq!(summary.top_values[0].count, 5);
}

#[test]
fn test_formatted_strings_are_profiled_as_numbers() {
    let result = analyze(&survey(), &AnalysisConfig::default()).unwrap();

    let income = result.column("income").unwrap();
    assert_eq!(income.semantic_type, SemanticType::Numeric);
    let stats = income.numeric_stats().unwrap();
    assert_eq!(stats.count, 6);
    assert_close(stats.mean, 2192.5);
    assert_close(stats.min, 1200.0);
    assert_close(stats.max, 3100.0);

    let satisfaction = result.column("satisfaction").unwrap();
    assert_eq!(satisfaction.semantic_type, SemanticType::Numeric);
    assert_eq!(satisfaction.missing_count, 2);
    assert_eq!(satisfaction.numeric_stats().unwrap().count, 4);

    let ColumnSummary::Temporal(signup) = &result.column("signup_date").unwrap().summary else {
        panic!("signup_date should be temporal");
    };
    assert_eq!(
        signup.value().unwrap().granularity,
        TemporalGranularity::Weekly
    );
}

#[test]
fn test_declared_type_overrides_inference() {
    let dataset = survey()
        .with_declared_type("respondent", SemanticType::Categorical)
        .unwrap();
    let result = analyze(&dataset, &AnalysisConfig::default()).unwrap();

    assert_eq!(
        result.column("respondent").unwrap().semantic_type,
        SemanticType::Categorical
    );
    assert!(result.outliers_for("respondent").is_none());
}

#[test]
fn test_descriptive_statistics_for_one_to_five() {
    let dataset = Dataset::new(df!["value" => [1.0, 2.0, 3.0, 4.0, 5.0]].unwrap());
    let result = analyze(&dataset, &AnalysisConfig::default()).unwrap();
    let stats = result.column("value").unwrap().numeric_stats().unwrap();

    assert_eq!(stats.count, 5);
    assert_close(stats.mean, 3.0);
    assert_close(stats.median, 3.0);
    assert_close(stats.min, 1.0);
    assert_close(stats.max, 5.0);
    assert_close(stats.q1, 2.0);
    assert_close(stats.q3, 4.0);
    assert_close(stats.variance, 2.5);
    assert!((stats.std_dev - 1.5811).abs() < 1e-4);
}

// ============================================================================
// Quality
// ============================================================================

#[test]
fn test_quality_reflects_missing_cells() {
    let result = analyze(&sales(), &AnalysisConfig::default()).unwrap();
    let overall = &result.quality.overall;

    assert_eq!(overall.total_cells, 72);
    assert_eq!(overall.missing_cells, 2);
    assert_eq!(overall.duplicate_rows, 0);
    assert!(overall.score > 0.0 && overall.score <= 1.0);
    assert_eq!(result.quality.columns.len(), 6);
    assert!(
        result
            .key_findings
            .contains(&"Data completeness: 97.2% (2 missing values)".to_string())
    );
}

// ============================================================================
// Correlations, Outliers, Trends
// ============================================================================

#[test]
fn test_strong_correlation_between_revenue_and_units() {
    let result = analyze(&sales(), &AnalysisConfig::default()).unwrap();
    let correlations = &result.correlations;

    assert_eq!(correlations.all_pairs.len(), 3);
    assert_eq!(correlations.significant.len(), 1);
    let pair = &correlations.significant[0];
    assert_eq!(pair.column_a, "revenue");
    assert_eq!(pair.column_b, "units");
    assert!(pair.coefficient > 0.999);
    assert_eq!(pair.observations, 12);
    assert!(
        result
            .key_findings
            .contains(&"Strong positive correlation between revenue and units (r = 1.00)".to_string())
    );
}

#[test]
fn test_correlation_order_is_deterministic() {
    let first = analyze(&sales(), &AnalysisConfig::default()).unwrap();
    let second = analyze(&sales(), &AnalysisConfig::default()).unwrap();
    assert_eq!(first.correlations, second.correlations);

    let magnitudes: Vec<f64> = first
        .correlations
        .all_pairs
        .iter()
        .map(|p| p.coefficient.abs())
        .collect();
    assert!(magnitudes.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_spike_is_flagged_as_outlier() {
    let result = analyze(&sales(), &AnalysisConfig::default()).unwrap();
    let returns = result.outliers_for("returns").unwrap();

    let fences = returns.fences.value().unwrap();
    assert_close(fences.lower, -0.5);
    assert_close(fences.upper, 3.5);
    assert_eq!(returns.flagged_rows, vec![11]);
    assert_eq!(returns.outlier_count, 1);
    assert!(
        result
            .recommendations
            .contains(&"Review outliers in: returns".to_string())
    );

    let units = result.outliers_for("units").unwrap();
    assert!(units.flagged_rows.is_empty());
}

#[test]
fn test_trend_along_temporal_axis() {
    let result = analyze(&sales(), &AnalysisConfig::default()).unwrap();

    let TrendOutcome::Fitted { axis, results } = &result.trends else {
        panic!("expected fitted trends, got {:?}", result.trends);
    };
    assert_eq!(axis.column, "month");
    assert_eq!(axis.encoding, AxisEncoding::TemporalRank);

    let columns: Vec<&str> = results.iter().map(|r| r.column.as_str()).collect();
    assert_eq!(columns, vec!["units", "revenue", "returns"]);

    let units = &results[0];
    assert_eq!(units.direction, TrendDirection::Increasing);
    assert_eq!(units.confidence, TrendConfidence::High);
    assert!(
        result
            .key_findings
            .iter()
            .any(|f| f.starts_with("units shows an increasing trend over month"))
    );
}

#[test]
fn test_exact_linear_trend_on_numeric_axis() {
    let dataset = Dataset::new(
        df![
            "x" => [1.0, 2.0, 3.0, 4.0, 5.0],
            "y" => [3.0, 5.0, 7.0, 9.0, 11.0],
        ]
        .unwrap(),
    );
    let config = AnalysisConfig::builder()
        .trend_axis("x")
        .trend_column("y")
        .build()
        .unwrap();
    let result = analyze(&dataset, &config).unwrap();

    let results = result.trends.results();
    assert_eq!(results.len(), 1);
    let fit = results[0].fit.value().unwrap();
    assert_close(fit.slope, 2.0);
    assert_close(fit.intercept, 1.0);
    assert_close(fit.r_squared, 1.0);
    assert_eq!(fit.points, 5);
    assert_eq!(results[0].direction, TrendDirection::Increasing);
}

#[test]
fn test_trend_disabled_by_config() {
    let config = AnalysisConfig::builder().trend_analysis(false).build().unwrap();
    let result = analyze(&sales(), &config).unwrap();
    assert_eq!(result.trends, TrendOutcome::Disabled);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_two_rows_still_analyze() {
    let dataset = Dataset::new(
        df![
            "a" => [1.0, 2.0],
            "b" => [3.0, 5.0],
        ]
        .unwrap(),
    );
    let result = analyze(&dataset, &AnalysisConfig::default()).unwrap();

    assert_eq!(result.columns.len(), 2);
    assert_eq!(
        result.column("a").unwrap().numeric_stats().unwrap().count,
        2
    );
    // Too few values for fences
    let outliers = result.outliers_for("a").unwrap();
    assert!(!outliers.fences.is_computed());
    assert!(outliers.flagged_rows.is_empty());
    assert!(matches!(result.trends, TrendOutcome::Skipped { .. }));
}

#[test]
fn test_single_value_has_zero_spread() {
    let dataset = Dataset::new(df!["only" => [42.0]].unwrap());
    let result = analyze(&dataset, &AnalysisConfig::default()).unwrap();
    let stats = result.column("only").unwrap().numeric_stats().unwrap();

    assert_eq!(stats.count, 1);
    assert_close(stats.mean, 42.0);
    assert_close(stats.std_dev, 0.0);
    assert_close(stats.iqr, 0.0);
    assert!(result.correlations.all_pairs.is_empty());
}

#[test]
fn test_all_missing_column_is_unknown() {
    let dataset = Dataset::new(
        df![
            "value" => [1.0, 2.0, 3.0],
            "empty" => [None::<&str>, None, None],
        ]
        .unwrap(),
    );
    let result = analyze(&dataset, &AnalysisConfig::default()).unwrap();
    let empty = result.column("empty").unwrap();

    assert_eq!(empty.semantic_type, SemanticType::Unknown);
    assert_eq!(empty.summary, ColumnSummary::Unknown);
    assert_eq!(result.metadata.unknown_columns, 1);
}

#[test]
fn test_nested_and_decimal_columns_are_profiled() {
    let amount = Series::new("amount".into(), [12.5f64, 13.25, 14.0, 15.75])
        .cast(&DataType::Decimal(Some(10), Some(2)))
        .unwrap();
    let tags = Series::new(
        "tags".into(),
        [
            Series::new("".into(), [1i32, 2]),
            Series::new("".into(), [3i32]),
            Series::new("".into(), [1i32, 2]),
            Series::new("".into(), [4i32, 5]),
        ],
    );
    let frame = DataFrame::new(vec![
        Column::new("x".into(), [1.0, 2.0, 3.0, 4.0]),
        amount.into_column(),
        tags.into_column(),
    ])
    .unwrap();

    let result = analyze(&Dataset::new(frame), &AnalysisConfig::default()).unwrap();

    assert_eq!(result.columns.len(), 3);
    assert_eq!(result.column("x").unwrap().semantic_type, SemanticType::Numeric);

    let amount = result.column("amount").unwrap();
    assert_eq!(amount.semantic_type, SemanticType::Numeric);
    assert_close(amount.numeric_stats().unwrap().min, 12.5);
    assert!(result.outliers_for("amount").is_some());

    let tags = result.column("tags").unwrap();
    assert_eq!(tags.semantic_type, SemanticType::Categorical);
    assert_eq!(tags.missing_count, 0);
    let ColumnSummary::Categorical(summary) = &tags.summary else {
        panic!("tags should be categorical");
    };
    assert_eq!(summary.distinct_count, 3);
    assert_eq!(summary.top_values[0].count, 2);
}

#[test]
fn test_analysis_is_idempotent() {
    let dataset = sales();
    let first = analyze(&dataset, &AnalysisConfig::default()).unwrap();
    let mut second = analyze(&dataset, &AnalysisConfig::default()).unwrap();
    second.metadata.generated_at = first.metadata.generated_at;

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_invalid_threshold_rejected_before_any_stage() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let config = AnalysisConfig {
        correlation_threshold: 1.5,
        ..AnalysisConfig::default()
    };

    let err = Analyzer::builder()
        .config(config)
        .on_stage(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .err()
        .unwrap();

    assert!(err.is_configuration());
    assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_min_rows_rejects_small_dataset() {
    let config = AnalysisConfig::builder().min_rows(50).build().unwrap();
    let err = analyze(&sales(), &config).unwrap_err();
    assert!(matches!(err, AnalysisError::Configuration(_)));
}

#[test]
fn test_config_from_json_keeps_defaults() {
    let config =
        AnalysisConfig::from_json_str(r#"{"correlation_threshold": 0.95, "trend_analysis": false}"#)
            .unwrap();
    assert_eq!(config.correlation_threshold, 0.95);
    assert!(!config.trend_analysis);
    assert_eq!(config.max_trend_series, 3);

    let result = analyze(&sales(), &config).unwrap();
    assert_eq!(result.correlations.threshold, 0.95);
    assert_eq!(result.trends, TrendOutcome::Disabled);
}

#[test]
fn test_stage_observer_sees_every_stage() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    Analyzer::builder()
        .on_stage(move |update| seen_clone.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .analyze(&sales())
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 6);
    assert_eq!(seen.last(), Some(&AnalysisStage::Complete));
}

// ============================================================================
// Enrichment
// ============================================================================

struct Summarizer;

impl InsightProvider for Summarizer {
    fn generate_insights(&self, result: &AnalysisResult) -> anyhow::Result<InsightAnnotation> {
        Ok(InsightAnnotation {
            provider: self.name().to_string(),
            insights: vec![format!("{} findings reviewed", result.key_findings.len())],
            recommendations: vec!["Track returns monthly".to_string()],
        })
    }

    fn name(&self) -> &str {
        "summarizer"
    }
}

struct Unavailable;

impl InsightProvider for Unavailable {
    fn generate_insights(&self, _result: &AnalysisResult) -> anyhow::Result<InsightAnnotation> {
        anyhow::bail!("service unavailable")
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

struct Sluggish;

impl InsightProvider for Sluggish {
    fn generate_insights(&self, _result: &AnalysisResult) -> anyhow::Result<InsightAnnotation> {
        thread::sleep(Duration::from_secs(5));
        Ok(InsightAnnotation::default())
    }

    fn name(&self) -> &str {
        "sluggish"
    }
}

fn analyze_with(provider: Arc<dyn InsightProvider>) -> AnalysisResult {
    Analyzer::builder()
        .config(
            AnalysisConfig::builder()
                .enrichment_timeout_secs(1)
                .build()
                .unwrap(),
        )
        .insight_provider(provider)
        .build()
        .unwrap()
        .analyze(&sales())
        .unwrap()
}

#[test]
fn test_enrichment_success_is_attached() {
    let plain = analyze(&sales(), &AnalysisConfig::default()).unwrap();
    let enriched = analyze_with(Arc::new(Summarizer));

    let annotation = enriched.enrichment.as_ref().unwrap();
    assert_eq!(annotation.provider, "summarizer");
    assert_eq!(
        annotation.insights,
        vec![format!("{} findings reviewed", plain.key_findings.len())]
    );
    assert_eq!(enriched.key_findings, plain.key_findings);
    assert_eq!(enriched.recommendations, plain.recommendations);
}

#[test]
fn test_enrichment_failure_leaves_result_intact() {
    let plain = analyze(&sales(), &AnalysisConfig::default()).unwrap();
    let result = analyze_with(Arc::new(Unavailable));

    assert!(result.enrichment.is_none());
    assert_eq!(result.key_findings, plain.key_findings);
    assert_eq!(result.outliers, plain.outliers);
}

#[test]
fn test_enrichment_timeout_returns_without_annotation() {
    let start = Instant::now();
    let result = analyze_with(Arc::new(Sluggish));

    assert!(result.enrichment.is_none());
    assert!(start.elapsed() < Duration::from_secs(4));
    assert!(!result.key_findings.is_empty());
}
