//! Data quality scoring.
//!
//! Completeness and uniqueness per column, a weighted composite score, and
//! dataset-level aggregates (missing cells, duplicate rows).

mod scorer;

pub use scorer::QualityScorer;
