//! Insight provider trait for optional narrative enrichment.
//!
//! The deterministic analysis never depends on a provider. When one is
//! injected, it receives the finished [`AnalysisResult`] and may return extra
//! insights and recommendations, which are attached under `enrichment`.
//!
//! # Example
//!
//! ```rust,ignore
//! use report_analysis::insights::InsightProvider;
//! use report_analysis::types::{AnalysisResult, InsightAnnotation};
//!
//! struct Headline;
//!
//! impl InsightProvider for Headline {
//!     fn generate_insights(&self, result: &AnalysisResult) -> anyhow::Result<InsightAnnotation> {
//!         Ok(InsightAnnotation {
//!             provider: self.name().to_string(),
//!             insights: vec![format!("{} rows analyzed", result.metadata.row_count)],
//!             recommendations: Vec::new(),
//!         })
//!     }
//!
//!     fn name(&self) -> &str {
//!         "headline"
//!     }
//! }
//! ```

use crate::types::{AnalysisResult, InsightAnnotation};
use anyhow::Result;

/// Trait for external collaborators that annotate an analysis.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the call runs on a worker thread so
/// the engine can stop waiting after the configured timeout.
///
/// # Error Handling
///
/// Errors (and panics) are logged and the result is returned without
/// enrichment; they never fail the analysis.
pub trait InsightProvider: Send + Sync {
    /// Produce an annotation for a finished analysis.
    fn generate_insights(&self, result: &AnalysisResult) -> Result<InsightAnnotation>;

    /// Name recorded in the annotation, for logging and reports.
    fn name(&self) -> &str;
}
