//! Pipeline module.
//!
//! This module provides the analysis orchestrator and its stage reporting.

mod analyzer;
pub mod progress;

pub use analyzer::{Analyzer, AnalyzerBuilder, analyze};
pub use progress::{AnalysisStage, ClosureStageObserver, StageObserver, StageUpdate};
