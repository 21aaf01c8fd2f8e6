//! Configuration types for the analysis engine.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic engine setup. Configuration is validated once,
//! when it is built or loaded, never inside individual stages.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Method used to detect outliers in numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Interquartile range fences (Q1 - 1.5*IQR, Q3 + 1.5*IQR)
    #[default]
    Iqr,
}

impl OutlierMethod {
    /// Identifier used in configuration files and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iqr => "iqr",
        }
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutlierMethod {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iqr" => Ok(Self::Iqr),
            _ => Err(ConfigValidationError::UnknownOutlierMethod(s.to_string())),
        }
    }
}

/// Configuration for the analysis engine.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use report_analysis::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .correlation_threshold(0.8)
///     .outlier_method_name("iqr")
///     .trend_axis("date")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum |r| for a correlation pair to be reported as strong (0.0 - 1.0).
    /// Default: 0.7
    pub correlation_threshold: f64,

    /// Minimum |r| for a pair below the strong threshold to count as moderate.
    /// Default: 0.4
    pub moderate_correlation_threshold: f64,

    /// Outlier detection method.
    /// Default: Iqr
    pub outlier_method: OutlierMethod,

    /// Whether to fit trends at all.
    /// Default: true
    pub trend_analysis: bool,

    /// Column used as the ordered axis for trends.
    /// If None, the first temporal column is used.
    /// Default: None
    pub trend_axis: Option<String>,

    /// Numeric columns to fit against the axis.
    /// If empty, numeric columns are picked in table order.
    /// Default: empty
    pub trend_columns: Vec<String>,

    /// Maximum number of auto-selected trend series.
    /// Default: 3
    pub max_trend_series: usize,

    /// Minimum R² for a trend to be called increasing or decreasing (0.0 - 1.0).
    /// Default: 0.1
    pub trend_r2_threshold: f64,

    /// Minimum number of rows required to run the analysis.
    /// Default: 1
    pub min_rows: usize,

    /// Share of non-missing values that must be exceeded by values parsing as
    /// numbers (or dates) for a text column to be classified as numeric (or
    /// temporal). The default requires a strict majority; exactly half is not
    /// enough.
    /// Default: 0.5
    pub min_numeric_ratio: f64,

    /// Weight of completeness in the composite quality score.
    /// Default: 1.0
    pub quality_completeness_weight: f64,

    /// Weight of uniqueness in the composite quality score.
    /// Default: 1.0
    pub quality_uniqueness_weight: f64,

    /// Composite quality score under which a caveat is attached (advisory only).
    /// Default: 0.5
    pub quality_threshold: f64,

    /// Whether to call an injected insight provider after the analysis.
    /// Default: true
    pub enable_enrichment: bool,

    /// Upper bound on the time spent waiting for the insight provider.
    /// Default: 30
    pub enrichment_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            correlation_threshold: 0.7,
            moderate_correlation_threshold: 0.4,
            outlier_method: OutlierMethod::default(),
            trend_analysis: true,
            trend_axis: None,
            trend_columns: Vec::new(),
            max_trend_series: 3,
            trend_r2_threshold: 0.1,
            min_rows: 1,
            min_numeric_ratio: 0.5,
            quality_completeness_weight: 1.0,
            quality_uniqueness_weight: 1.0,
            quality_threshold: 0.5,
            enable_enrichment: true,
            enrichment_timeout_secs: 30,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields take their defaults. Unknown outlier methods and
    /// out-of-range values are rejected as configuration errors.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)
            .map_err(|e| ConfigValidationError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Time budget for the optional enrichment call.
    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment_timeout_secs)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        let thresholds = [
            ("correlation_threshold", self.correlation_threshold),
            (
                "moderate_correlation_threshold",
                self.moderate_correlation_threshold,
            ),
            ("trend_r2_threshold", self.trend_r2_threshold),
            ("quality_threshold", self.quality_threshold),
        ];
        for (field, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        // Compared with a strict `>`, so 1.0 could never be met
        if !(0.0..1.0).contains(&self.min_numeric_ratio) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "min_numeric_ratio".to_string(),
                value: self.min_numeric_ratio,
            });
        }

        let (wc, wu) = (
            self.quality_completeness_weight,
            self.quality_uniqueness_weight,
        );
        if !wc.is_finite() || !wu.is_finite() || wc < 0.0 || wu < 0.0 || wc + wu <= 0.0 {
            return Err(ConfigValidationError::InvalidQualityWeights {
                completeness: wc,
                uniqueness: wu,
            });
        }

        if self.max_trend_series == 0 {
            return Err(ConfigValidationError::InvalidMaxTrendSeries(
                self.max_trend_series,
            ));
        }

        if self.enrichment_timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidEnrichmentTimeout(
                self.enrichment_timeout_secs,
            ));
        }

        Ok(())
    }

    /// Check dataset-dependent preconditions.
    pub fn check_row_count(&self, rows: usize) -> std::result::Result<(), ConfigValidationError> {
        if rows < self.min_rows {
            return Err(ConfigValidationError::MinRowsNotMet {
                required: self.min_rows,
                actual: rows,
            });
        }
        Ok(())
    }

    /// Check that every column the trend settings name exists.
    ///
    /// Only enforced when trend analysis is enabled.
    pub fn check_trend_columns(
        &self,
        mut has_column: impl FnMut(&str) -> bool,
    ) -> std::result::Result<(), ConfigValidationError> {
        if !self.trend_analysis {
            return Ok(());
        }
        if let Some(axis) = &self.trend_axis
            && !has_column(axis)
        {
            return Err(ConfigValidationError::UnknownColumn {
                field: "trend_axis".to_string(),
                column: axis.clone(),
            });
        }
        for column in &self.trend_columns {
            if !has_column(column) {
                return Err(ConfigValidationError::UnknownColumn {
                    field: "trend_columns".to_string(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Unknown outlier method '{0}' (supported: iqr)")]
    UnknownOutlierMethod(String),

    #[error(
        "Invalid quality weights: completeness={completeness}, uniqueness={uniqueness} (must be non-negative with a positive sum)"
    )]
    InvalidQualityWeights { completeness: f64, uniqueness: f64 },

    #[error("Invalid max trend series: {0} (must be at least 1)")]
    InvalidMaxTrendSeries(usize),

    #[error("Invalid enrichment timeout: {0}s (must be at least 1)")]
    InvalidEnrichmentTimeout(u64),

    #[error("Dataset has {actual} rows, minimum required: {required}")]
    MinRowsNotMet { required: usize, actual: usize },

    #[error("Column '{column}' named by '{field}' does not exist in the dataset")]
    UnknownColumn { field: String, column: String },

    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    correlation_threshold: Option<f64>,
    moderate_correlation_threshold: Option<f64>,
    outlier_method: Option<OutlierMethod>,
    outlier_method_name: Option<String>,
    trend_analysis: Option<bool>,
    trend_axis: Option<String>,
    trend_columns: Vec<String>,
    max_trend_series: Option<usize>,
    trend_r2_threshold: Option<f64>,
    min_rows: Option<usize>,
    min_numeric_ratio: Option<f64>,
    quality_completeness_weight: Option<f64>,
    quality_uniqueness_weight: Option<f64>,
    quality_threshold: Option<f64>,
    enable_enrichment: Option<bool>,
    enrichment_timeout_secs: Option<u64>,
}

impl AnalysisConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from a file).
    pub fn from_config(config: AnalysisConfig) -> Self {
        Self {
            correlation_threshold: Some(config.correlation_threshold),
            moderate_correlation_threshold: Some(config.moderate_correlation_threshold),
            outlier_method: Some(config.outlier_method),
            outlier_method_name: None,
            trend_analysis: Some(config.trend_analysis),
            trend_axis: config.trend_axis,
            trend_columns: config.trend_columns,
            max_trend_series: Some(config.max_trend_series),
            trend_r2_threshold: Some(config.trend_r2_threshold),
            min_rows: Some(config.min_rows),
            min_numeric_ratio: Some(config.min_numeric_ratio),
            quality_completeness_weight: Some(config.quality_completeness_weight),
            quality_uniqueness_weight: Some(config.quality_uniqueness_weight),
            quality_threshold: Some(config.quality_threshold),
            enable_enrichment: Some(config.enable_enrichment),
            enrichment_timeout_secs: Some(config.enrichment_timeout_secs),
        }
    }

    /// Set the |r| threshold for strong correlations.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.7)
    pub fn correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = Some(threshold);
        self
    }

    /// Set the |r| threshold for moderate correlations.
    pub fn moderate_correlation_threshold(mut self, threshold: f64) -> Self {
        self.moderate_correlation_threshold = Some(threshold);
        self
    }

    /// Set the outlier detection method.
    pub fn outlier_method(mut self, method: OutlierMethod) -> Self {
        self.outlier_method = Some(method);
        self.outlier_method_name = None;
        self
    }

    /// Set the outlier detection method by identifier (e.g. `"iqr"`).
    ///
    /// Unknown identifiers are rejected by [`build`](Self::build).
    pub fn outlier_method_name(mut self, name: impl Into<String>) -> Self {
        self.outlier_method_name = Some(name.into());
        self
    }

    /// Enable or disable trend fitting.
    pub fn trend_analysis(mut self, enable: bool) -> Self {
        self.trend_analysis = Some(enable);
        self
    }

    /// Set the column used as the ordered trend axis.
    pub fn trend_axis(mut self, column: impl Into<String>) -> Self {
        self.trend_axis = Some(column.into());
        self
    }

    /// Add a column to fit against the trend axis.
    pub fn trend_column(mut self, column: impl Into<String>) -> Self {
        self.trend_columns.push(column.into());
        self
    }

    /// Set the maximum number of auto-selected trend series.
    pub fn max_trend_series(mut self, max: usize) -> Self {
        self.max_trend_series = Some(max);
        self
    }

    /// Set the R² threshold for calling a trend direction.
    pub fn trend_r2_threshold(mut self, threshold: f64) -> Self {
        self.trend_r2_threshold = Some(threshold);
        self
    }

    /// Set the minimum number of rows required to analyze a dataset.
    pub fn min_rows(mut self, rows: usize) -> Self {
        self.min_rows = Some(rows);
        self
    }

    /// Set the share of parseable values needed to classify text columns.
    pub fn min_numeric_ratio(mut self, ratio: f64) -> Self {
        self.min_numeric_ratio = Some(ratio);
        self
    }

    /// Set the completeness/uniqueness weights of the composite quality score.
    pub fn quality_weights(mut self, completeness: f64, uniqueness: f64) -> Self {
        self.quality_completeness_weight = Some(completeness);
        self.quality_uniqueness_weight = Some(uniqueness);
        self
    }

    /// Set the advisory quality threshold.
    pub fn quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = Some(threshold);
        self
    }

    /// Enable or disable the optional insight enrichment.
    pub fn enable_enrichment(mut self, enable: bool) -> Self {
        self.enable_enrichment = Some(enable);
        self
    }

    /// Set the enrichment timeout in seconds.
    pub fn enrichment_timeout_secs(mut self, secs: u64) -> Self {
        self.enrichment_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let outlier_method = match self.outlier_method_name {
            Some(name) => name.parse()?,
            None => self.outlier_method.unwrap_or_default(),
        };

        let config = AnalysisConfig {
            correlation_threshold: self
                .correlation_threshold
                .unwrap_or(defaults.correlation_threshold),
            moderate_correlation_threshold: self
                .moderate_correlation_threshold
                .unwrap_or(defaults.moderate_correlation_threshold),
            outlier_method,
            trend_analysis: self.trend_analysis.unwrap_or(defaults.trend_analysis),
            trend_axis: self.trend_axis,
            trend_columns: self.trend_columns,
            max_trend_series: self.max_trend_series.unwrap_or(defaults.max_trend_series),
            trend_r2_threshold: self
                .trend_r2_threshold
                .unwrap_or(defaults.trend_r2_threshold),
            min_rows: self.min_rows.unwrap_or(defaults.min_rows),
            min_numeric_ratio: self.min_numeric_ratio.unwrap_or(defaults.min_numeric_ratio),
            quality_completeness_weight: self
                .quality_completeness_weight
                .unwrap_or(defaults.quality_completeness_weight),
            quality_uniqueness_weight: self
                .quality_uniqueness_weight
                .unwrap_or(defaults.quality_uniqueness_weight),
            quality_threshold: self.quality_threshold.unwrap_or(defaults.quality_threshold),
            enable_enrichment: self.enable_enrichment.unwrap_or(defaults.enable_enrichment),
            enrichment_timeout_secs: self
                .enrichment_timeout_secs
                .unwrap_or(defaults.enrichment_timeout_secs),
        };

        config.validate()?;
        Ok(config)
    }
}
