//! Result types produced by the analysis engine.
//!
//! Everything in here is created fresh by one `analyze` call and handed to
//! the report-generation collaborator read-only.

use crate::config::OutlierMethod;
use crate::error::AnalysisError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic type assigned to a column by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Numeric,
    Categorical,
    Temporal,
    Unknown,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Temporal => "temporal",
            Self::Unknown => "unknown",
        }
    }
}

/// A result slot that is either computed or explicitly marked as not computable.
///
/// Sub-analyses never drop a column or pair from the result; when the data
/// does not support a computation, the slot carries the error code and the
/// reason instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Computable<T> {
    Value(T),
    NotComputable { code: String, reason: String },
}

impl<T> Computable<T> {
    /// Build a marker from a non-fatal error.
    pub fn not_computable(error: &AnalysisError) -> Self {
        Computable::NotComputable {
            code: error.error_code().to_string(),
            reason: error.to_string(),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Computable::Value(v) => Some(v),
            Computable::NotComputable { .. } => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Computable::Value(_))
    }
}

impl<T> From<Result<T, AnalysisError>> for Computable<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(value) => Computable::Value(value),
            Err(e) => Computable::not_computable(&e),
        }
    }
}

// =============================================================================
// Column profiles
// =============================================================================

/// Descriptive statistics of a numeric column, over its non-missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Smallest of the most frequent values.
    pub mode: f64,
    /// Sample standard deviation (ddof = 1), 0 when count <= 1.
    pub std_dev: f64,
    /// Sample variance (ddof = 1), 0 when count <= 1.
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    /// Biased moment skewness; None when the variance is zero.
    pub skewness: Option<f64>,
    /// Biased excess kurtosis; None when the variance is zero.
    pub kurtosis: Option<f64>,
}

/// Frequency of one categorical value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub distinct_count: usize,
    pub top_values: Vec<ValueCount>,
}

/// Spacing between consecutive timestamps of a temporal column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalGranularity {
    SubDaily,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    Irregular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalSummary {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub granularity: TemporalGranularity,
}

/// Type-specific part of a column profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "summary", rename_all = "snake_case")]
pub enum ColumnSummary {
    Numeric(Computable<DescriptiveStats>),
    Categorical(CategoricalSummary),
    Temporal(Computable<TemporalSummary>),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub semantic_type: SemanticType,
    pub missing_count: usize,
    pub missing_percentage: f64,
    pub summary: ColumnSummary,
}

impl ColumnProfile {
    /// Descriptive statistics, if this is a numeric column with values.
    pub fn numeric_stats(&self) -> Option<&DescriptiveStats> {
        match &self.summary {
            ColumnSummary::Numeric(stats) => stats.value(),
            _ => None,
        }
    }
}

// =============================================================================
// Quality
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub column: String,
    pub missing_count: usize,
    pub distinct_count: usize,
    /// Non-missing / total rows.
    pub completeness: f64,
    /// Distinct non-missing / non-missing.
    pub uniqueness: f64,
    /// Weighted completeness and uniqueness, clamped to [0, 1].
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetQuality {
    pub completeness: f64,
    pub uniqueness: f64,
    pub score: f64,
    pub total_cells: usize,
    pub missing_cells: usize,
    pub duplicate_rows: usize,
    pub below_threshold: bool,
    pub caveat: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub columns: Vec<QualityScore>,
    pub overall: DatasetQuality,
}

// =============================================================================
// Correlations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

/// Pearson correlation of two numeric columns; `column_a < column_b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub column_a: String,
    pub column_b: String,
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub observations: usize,
}

/// A pair for which no coefficient could be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPair {
    pub column_a: String,
    pub column_b: String,
    pub status: Computable<()>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationAnalysis {
    pub threshold: f64,
    /// Pairs with |r| >= threshold, the ones a report renders.
    pub significant: Vec<CorrelationPair>,
    /// Every computed pair, including moderate and weak ones.
    pub all_pairs: Vec<CorrelationPair>,
    pub skipped: Vec<SkippedPair>,
}

// =============================================================================
// Outliers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IqrFences {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub column: String,
    pub method: OutlierMethod,
    pub fences: Computable<IqrFences>,
    /// Row indices into the original table.
    pub flagged_rows: Vec<usize>,
    pub outlier_count: usize,
    pub outlier_percentage: f64,
}

// =============================================================================
// Trends
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendConfidence {
    High,
    Moderate,
    Low,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub column: String,
    pub fit: Computable<TrendFit>,
    pub direction: TrendDirection,
    pub confidence: TrendConfidence,
}

/// How the trend axis is turned into the regressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisEncoding {
    /// Rows ordered by timestamp, regressed on their rank 0..n-1.
    TemporalRank,
    /// Numeric axis values regressed directly.
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAxis {
    pub column: String,
    pub encoding: AxisEncoding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendOutcome {
    Fitted {
        axis: TrendAxis,
        results: Vec<TrendResult>,
    },
    Skipped {
        reason: String,
    },
    Disabled,
}

impl TrendOutcome {
    pub fn results(&self) -> &[TrendResult] {
        match self {
            TrendOutcome::Fitted { results, .. } => results,
            _ => &[],
        }
    }
}

// =============================================================================
// Aggregate
// =============================================================================

/// Additive annotation from an optional insight provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InsightAnnotation {
    pub provider: String,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineMetadata {
    pub engine_version: String,
    pub row_count: usize,
    pub column_count: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    pub temporal_columns: usize,
    pub unknown_columns: usize,
    pub generated_at: DateTime<Utc>,
}

/// The complete output of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metadata: EngineMetadata,
    pub columns: Vec<ColumnProfile>,
    pub quality: QualityReport,
    pub correlations: CorrelationAnalysis,
    pub outliers: Vec<OutlierReport>,
    pub trends: TrendOutcome,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<InsightAnnotation>,
}

impl AnalysisResult {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn outliers_for(&self, name: &str) -> Option<&OutlierReport> {
        self.outliers.iter().find(|o| o.column == name)
    }
}
