//! Stage reporting for the analysis state machine.
//!
//! # Example
//!
//! ```rust,ignore
//! use report_analysis::Analyzer;
//!
//! let result = Analyzer::builder()
//!     .on_stage(|update| {
//!         println!("[{}] {}", update.stage.display_name(), update.message);
//!     })
//!     .build()?
//!     .analyze(&dataset)?;
//! ```

use serde::{Deserialize, Serialize};

/// States of one analysis run, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Nothing has run yet
    Idle,
    /// Every column has a semantic type
    Classified,
    /// Column profiles and quality scores are computed
    Profiled,
    /// Numeric pairs are correlated
    Correlated,
    /// Numeric columns are scanned for outliers
    OutliersScanned,
    /// Trends are fitted, skipped, or disabled
    TrendFit,
    /// Findings are assembled and the result is ready
    Complete,
}

impl AnalysisStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Classified => "Columns Classified",
            Self::Profiled => "Columns Profiled",
            Self::Correlated => "Correlations Computed",
            Self::OutliersScanned => "Outliers Scanned",
            Self::TrendFit => "Trends Fitted",
            Self::Complete => "Complete",
        }
    }

    /// The stage entered after this one; `None` once complete.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Classified),
            Self::Classified => Some(Self::Profiled),
            Self::Profiled => Some(Self::Correlated),
            Self::Correlated => Some(Self::OutliersScanned),
            Self::OutliersScanned => Some(Self::TrendFit),
            Self::TrendFit => Some(Self::Complete),
            Self::Complete => None,
        }
    }
}

/// A transition into `stage`, with a short summary of what it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageUpdate {
    pub stage: AnalysisStage,
    pub message: String,
}

impl StageUpdate {
    pub fn new(stage: AnalysisStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Receives stage transitions during an analysis.
///
/// Implementations must be `Send + Sync` so one observer can be shared by
/// analyses running on different threads. Calls are synchronous; keep them cheap.
pub trait StageObserver: Send + Sync {
    fn on_stage(&self, update: StageUpdate);
}

/// Wrapper that implements [`StageObserver`] using a closure.
pub struct ClosureStageObserver<F>
where
    F: Fn(StageUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureStageObserver<F>
where
    F: Fn(StageUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> StageObserver for ClosureStageObserver<F>
where
    F: Fn(StageUpdate) + Send + Sync,
{
    fn on_stage(&self, update: StageUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(StageUpdate: Send, Sync);
