//! Statistical Analysis Engine
//!
//! Deterministic statistical analysis of tabular datasets, built with Rust and Polars.
//! The engine sits between data ingestion and report rendering: it receives a
//! loaded table and returns a structured, serializable [`AnalysisResult`].
//!
//! # Overview
//!
//! One call to [`Analyzer::analyze`] runs these stages in order:
//!
//! - **Classification**: every column becomes numeric, categorical, temporal or unknown
//! - **Profiling**: descriptive statistics, top values, date ranges, quality scores
//! - **Correlation**: pairwise Pearson coefficients between numeric columns
//! - **Outliers**: IQR fences per numeric column, with flagged row indices
//! - **Trends**: least-squares fits of numeric series along a temporal or numeric axis
//! - **Findings**: plain-language key findings and recommendations
//!
//! An optional [`insights::InsightProvider`] can annotate the finished result.
//! It never changes the deterministic output.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use report_analysis::{AnalysisConfig, Analyzer, Dataset};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("sales.csv".into()))?
//!     .finish()?;
//!
//! let config = AnalysisConfig::builder()
//!     .correlation_threshold(0.8)
//!     .trend_axis("date")
//!     .build()?;
//!
//! let result = Analyzer::builder()
//!     .config(config)
//!     .on_stage(|update| println!("{}", update.stage.display_name()))
//!     .build()?
//!     .analyze(&Dataset::new(df))?;
//!
//! for finding in &result.key_findings {
//!     println!("- {}", finding);
//! }
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! ```
//!
//! # Errors
//!
//! Only configuration problems fail an analysis. Sub-analyses that the data
//! cannot support are recorded as [`types::Computable::NotComputable`] with a
//! stable error code.

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod insights;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, OutlierMethod};
pub use dataset::Dataset;
pub use error::{AnalysisError, ResultExt};
pub use insights::InsightProvider;
pub use pipeline::{
    AnalysisStage, Analyzer, AnalyzerBuilder, ClosureStageObserver, StageObserver, StageUpdate,
    analyze,
};
pub use types::{
    AnalysisResult, ColumnProfile, ColumnSummary, Computable, CorrelationAnalysis,
    CorrelationPair, DescriptiveStats, InsightAnnotation, OutlierReport, QualityReport,
    SemanticType, TrendOutcome, TrendResult,
};
