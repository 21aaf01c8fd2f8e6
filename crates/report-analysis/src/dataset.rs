//! Immutable input table for the analysis engine.
//!
//! The ingestion collaborator builds a [`Dataset`] once from a polars
//! `DataFrame` (which already guarantees equal column heights) and may attach
//! the semantic types it knows about. The engine only ever reads from it.

use crate::error::{AnalysisError, Result};
use crate::types::SemanticType;
use crate::utils::{numeric_view, temporal_view, text_view};
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::collections::HashMap;

/// A read-only rectangular table of named columns.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    declared_types: HashMap<String, SemanticType>,
}

impl Dataset {
    /// Wrap a DataFrame. Column types are inferred by the classifier.
    pub fn new(frame: DataFrame) -> Self {
        Self {
            frame,
            declared_types: HashMap::new(),
        }
    }

    /// Declare the semantic type of a column, overriding inference.
    ///
    /// A declared type is still overridden by `Unknown` when the column has
    /// no values at all.
    pub fn with_declared_type(
        mut self,
        column: impl Into<String>,
        semantic_type: SemanticType,
    ) -> Result<Self> {
        let column = column.into();
        if !self.has_column(&column) {
            return Err(AnalysisError::ColumnNotFound(column));
        }
        self.declared_types.insert(column, semantic_type);
        Ok(self)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    pub fn declared_type(&self, name: &str) -> Option<SemanticType> {
        self.declared_types.get(name).copied()
    }

    /// Borrow a column as a polars Series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|col| col.as_materialized_series())
            .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))
    }

    /// Polars dtype of a column, formatted for reports.
    pub fn dtype_name(&self, name: &str) -> Result<String> {
        Ok(format!("{:?}", self.series(name)?.dtype()))
    }

    /// Cell values as text; `None` marks a missing cell.
    pub fn text_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        Ok(text_view(self.series(name)?)?)
    }

    /// Cell values as numbers; `None` marks a missing or non-numeric cell.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        Ok(numeric_view(self.series(name)?)?)
    }

    /// Cell values as timestamps; `None` marks a missing or unparseable cell.
    pub fn temporal_values(&self, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
        Ok(temporal_view(self.series(name)?)?)
    }
}

impl From<DataFrame> for Dataset {
    fn from(frame: DataFrame) -> Self {
        Dataset::new(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            df![
                "region" => ["North", "South", "North"],
                "sales" => [10.0, 20.0, 30.0],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_shape_and_names() {
        let dataset = sample();
        assert_eq!(dataset.height(), 3);
        assert_eq!(dataset.width(), 2);
        assert_eq!(dataset.column_names(), vec!["region", "sales"]);
        assert!(dataset.has_column("sales"));
        assert!(!dataset.has_column("profit"));
    }

    #[test]
    fn test_declared_type() {
        let dataset = sample()
            .with_declared_type("sales", SemanticType::Categorical)
            .unwrap();
        assert_eq!(
            dataset.declared_type("sales"),
            Some(SemanticType::Categorical)
        );
        assert_eq!(dataset.declared_type("region"), None);
    }

    #[test]
    fn test_declared_type_for_missing_column() {
        let err = sample()
            .with_declared_type("profit", SemanticType::Numeric)
            .unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_series_not_found() {
        let err = sample().series("profit").unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound(name) if name == "profit"));
    }

    #[test]
    fn test_value_views() {
        let dataset = sample();
        assert_eq!(
            dataset.numeric_values("sales").unwrap(),
            vec![Some(10.0), Some(20.0), Some(30.0)]
        );
        assert_eq!(
            dataset.text_values("region").unwrap()[1].as_deref(),
            Some("South")
        );
        assert!(dataset.dtype_name("sales").unwrap().contains("Float64"));
    }
}
