//! Analysis orchestrator.
//!
//! Runs the stages in a fixed order over one immutable [`Dataset`] and
//! assembles a single [`AnalysisResult`].

use crate::analysis::{correlation_analysis, detect_outliers, trend_analysis};
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::{AnalysisError, Result};
use crate::insights::{InsightProvider, enrich_with_timeout};
use crate::pipeline::progress::{
    AnalysisStage, ClosureStageObserver, StageObserver, StageUpdate,
};
use crate::profiler::{ColumnProfiler, ColumnView, classify_columns};
use crate::quality::QualityScorer;
use crate::reporting::FindingsGenerator;
use crate::types::{AnalysisResult, EngineMetadata, SemanticType};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The statistical analysis engine.
///
/// Use [`Analyzer::builder()`] to inject a configuration, an insight
/// provider, or a stage observer.
///
/// # Example
///
/// ```rust,ignore
/// use report_analysis::{AnalysisConfig, Analyzer, Dataset};
///
/// let result = Analyzer::builder()
///     .config(AnalysisConfig::builder().trend_axis("date").build()?)
///     .on_stage(|update| println!("{}", update.stage.display_name()))
///     .build()?
///     .analyze(&Dataset::new(df))?;
/// ```
pub struct Analyzer {
    config: AnalysisConfig,
    insight_provider: Option<Arc<dyn InsightProvider>>,
    stage_observer: Option<Arc<dyn StageObserver>>,
}

// Independent analyses may run on separate threads
static_assertions::assert_impl_all!(Analyzer: Send, Sync);

impl Analyzer {
    /// Create a new analyzer builder.
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a dataset.
    ///
    /// # Errors
    ///
    /// Only configuration problems are fatal: a dataset with fewer than
    /// `min_rows` rows, or trend settings naming absent columns. They are
    /// reported before any stage runs. Sub-analyses that cannot be computed
    /// are marked in the result instead.
    pub fn analyze(&self, dataset: &Dataset) -> Result<AnalysisResult> {
        self.check_preconditions(dataset).inspect_err(|e| {
            error!("Analysis rejected: {}", e);
        })?;
        self.run(dataset)
    }

    fn check_preconditions(&self, dataset: &Dataset) -> Result<()> {
        self.config.check_row_count(dataset.height())?;
        self.config
            .check_trend_columns(|name| dataset.has_column(name))?;
        Ok(())
    }

    fn report_stage(&self, stage: AnalysisStage, message: String) {
        info!("[{}] {}", stage.display_name(), message);
        if let Some(observer) = &self.stage_observer {
            observer.on_stage(StageUpdate::new(stage, message));
        }
    }

    fn run(&self, dataset: &Dataset) -> Result<AnalysisResult> {
        let start_time = Instant::now();
        let config = &self.config;
        let rows = dataset.height();
        debug!(
            rows,
            columns = dataset.width(),
            stage = ?AnalysisStage::Idle,
            "Starting analysis"
        );

        let views = classify_columns(dataset, config);
        let metadata = build_metadata(&views, rows);
        self.report_stage(
            AnalysisStage::Classified,
            format!(
                "{} numeric, {} categorical, {} temporal, {} unknown",
                metadata.numeric_columns,
                metadata.categorical_columns,
                metadata.temporal_columns,
                metadata.unknown_columns
            ),
        );

        let columns = ColumnProfiler::profile_columns(&views);
        let quality = QualityScorer::score(&views, rows, config);
        self.report_stage(
            AnalysisStage::Profiled,
            format!(
                "{} columns profiled, quality score {:.2}",
                columns.len(),
                quality.overall.score
            ),
        );

        let correlations = correlation_analysis(&views, config);
        self.report_stage(
            AnalysisStage::Correlated,
            format!(
                "{} pairs computed, {} at |r| >= {}, {} skipped",
                correlations.all_pairs.len(),
                correlations.significant.len(),
                correlations.threshold,
                correlations.skipped.len()
            ),
        );

        let outliers = detect_outliers(&views, config.outlier_method);
        self.report_stage(
            AnalysisStage::OutliersScanned,
            format!(
                "{} columns scanned with {}, {} values flagged",
                outliers.len(),
                config.outlier_method,
                outliers.iter().map(|o| o.outlier_count).sum::<usize>()
            ),
        );

        let trends = trend_analysis(&views, config);
        self.report_stage(
            AnalysisStage::TrendFit,
            format!("{} series fitted", trends.results().len()),
        );

        let mut result = AnalysisResult {
            metadata,
            columns,
            quality,
            correlations,
            outliers,
            trends,
            key_findings: Vec::new(),
            recommendations: Vec::new(),
            enrichment: None,
        };
        result.key_findings = FindingsGenerator::key_findings(&result);
        result.recommendations = FindingsGenerator::recommendations(&result);
        self.report_stage(
            AnalysisStage::Complete,
            format!(
                "{} findings, {} recommendations in {:.2?}",
                result.key_findings.len(),
                result.recommendations.len(),
                start_time.elapsed()
            ),
        );

        if config.enable_enrichment
            && let Some(provider) = &self.insight_provider
        {
            result.enrichment =
                enrich_with_timeout(provider.clone(), &result, config.enrichment_timeout());
        }

        Ok(result)
    }
}

fn build_metadata(views: &[ColumnView], rows: usize) -> EngineMetadata {
    let count = |ty: SemanticType| views.iter().filter(|v| v.semantic_type == ty).count();
    EngineMetadata {
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        row_count: rows,
        column_count: views.len(),
        numeric_columns: count(SemanticType::Numeric),
        categorical_columns: count(SemanticType::Categorical),
        temporal_columns: count(SemanticType::Temporal),
        unknown_columns: count(SemanticType::Unknown),
        generated_at: Utc::now(),
    }
}

/// Analyze a dataset with the given configuration and no collaborators.
pub fn analyze(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalysisResult> {
    Analyzer::builder()
        .config(config.clone())
        .build()?
        .analyze(dataset)
}

/// Builder for [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    config: Option<AnalysisConfig>,
    insight_provider: Option<Arc<dyn InsightProvider>>,
    stage_observer: Option<Arc<dyn StageObserver>>,
}

static_assertions::assert_impl_all!(AnalyzerBuilder: Send);

impl AnalyzerBuilder {
    /// Set the analysis configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the provider consulted for optional enrichment.
    ///
    /// Ignored when `enable_enrichment` is false.
    pub fn insight_provider(mut self, provider: Arc<dyn InsightProvider>) -> Self {
        self.insight_provider = Some(provider);
        self
    }

    /// Set an observer for stage transitions.
    pub fn stage_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.stage_observer = Some(observer);
        self
    }

    /// Set a stage callback closure.
    ///
    /// For more complex scenarios, use [`stage_observer`](Self::stage_observer).
    pub fn on_stage<F>(mut self, callback: F) -> Self
    where
        F: Fn(StageUpdate) + Send + Sync + 'static,
    {
        self.stage_observer = Some(Arc::new(ClosureStageObserver::new(callback)));
        self
    }

    /// Build the analyzer, validating the configuration.
    pub fn build(self) -> Result<Analyzer> {
        let config = self.config.unwrap_or_default();
        config.validate().map_err(AnalysisError::Configuration)?;
        Ok(Analyzer {
            config,
            insight_provider: self.insight_provider,
            stage_observer: self.stage_observer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigValidationError;
    use crate::types::InsightAnnotation;
    use polars::prelude::*;
    use std::sync::Mutex;

    fn sales() -> Dataset {
        Dataset::new(
            df![
                "date" => ["2024-01-01", "2024-02-01", "2024-03-01", "2024-04-01", "2024-05-01"],
                "region" => ["North", "South", "North", "East", "South"],
                "units" => [10.0, 12.0, 15.0, 14.0, 18.0],
                "revenue" => [100.0, 125.0, 149.0, 141.0, 182.0],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_stages_reported_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let analyzer = Analyzer::builder()
            .config(AnalysisConfig::default())
            .on_stage(move |update| seen_clone.lock().unwrap().push(update.stage))
            .build()
            .unwrap();

        analyzer.analyze(&sales()).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                AnalysisStage::Classified,
                AnalysisStage::Profiled,
                AnalysisStage::Correlated,
                AnalysisStage::OutliersScanned,
                AnalysisStage::TrendFit,
                AnalysisStage::Complete,
            ]
        );
    }

    #[test]
    fn test_metadata_counts() {
        let result = analyze(&sales(), &AnalysisConfig::default()).unwrap();
        assert_eq!(result.metadata.row_count, 5);
        assert_eq!(result.metadata.column_count, 4);
        assert_eq!(result.metadata.numeric_columns, 2);
        assert_eq!(result.metadata.categorical_columns, 1);
        assert_eq!(result.metadata.temporal_columns, 1);
        assert_eq!(result.metadata.engine_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(result.columns.len(), 4);
        assert_eq!(result.outliers.len(), 2);
    }

    #[test]
    fn test_min_rows_rejected_before_any_stage() {
        let calls = Arc::new(Mutex::new(0usize));
        let calls_clone = calls.clone();
        let analyzer = Analyzer::builder()
            .config(AnalysisConfig::builder().min_rows(10).build().unwrap())
            .on_stage(move |_| *calls_clone.lock().unwrap() += 1)
            .build()
            .unwrap();

        let err = analyzer.analyze(&sales()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Configuration(ConfigValidationError::MinRowsNotMet {
                required: 10,
                actual: 5
            })
        ));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_unknown_trend_axis_is_configuration_error() {
        let config = AnalysisConfig::builder().trend_axis("week").build().unwrap();
        let err = analyze(&sales(), &config).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_config_rejected_by_builder() {
        let config = AnalysisConfig {
            correlation_threshold: 1.5,
            ..AnalysisConfig::default()
        };
        let err = Analyzer::builder().config(config).build().err().unwrap();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    struct Echo;

    impl InsightProvider for Echo {
        fn generate_insights(&self, result: &AnalysisResult) -> anyhow::Result<InsightAnnotation> {
            Ok(InsightAnnotation {
                provider: "echo".to_string(),
                insights: result.key_findings.clone(),
                recommendations: Vec::new(),
            })
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_enrichment_is_additive() {
        let plain = analyze(&sales(), &AnalysisConfig::default()).unwrap();
        let enriched = Analyzer::builder()
            .insight_provider(Arc::new(Echo))
            .build()
            .unwrap()
            .analyze(&sales())
            .unwrap();

        let annotation = enriched.enrichment.as_ref().unwrap();
        assert_eq!(annotation.insights, enriched.key_findings);
        assert_eq!(plain.key_findings, enriched.key_findings);
        assert_eq!(plain.correlations, enriched.correlations);
        assert!(plain.enrichment.is_none());
    }

    #[test]
    fn test_enrichment_disabled_by_config() {
        let result = Analyzer::builder()
            .config(AnalysisConfig::builder().enable_enrichment(false).build().unwrap())
            .insight_provider(Arc::new(Echo))
            .build()
            .unwrap()
            .analyze(&sales())
            .unwrap();
        assert!(result.enrichment.is_none());
    }
}
