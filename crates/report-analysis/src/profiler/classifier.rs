//! Semantic type classification.
//!
//! Each column gets exactly one [`SemanticType`]. Rules run in order:
//!
//! 1. A column with no non-missing values is `Unknown`.
//! 2. A type declared on the dataset wins.
//! 3. Native date/datetime columns are `Temporal`, native numeric ones `Numeric`.
//! 4. Text columns are `Temporal` when more than `min_numeric_ratio` of the
//!    values parse as dates, else `Numeric` when more than that share parse as
//!    numbers.
//! 5. Text columns whose name looks like a date field are `Temporal` if at
//!    least one value parses as a date.
//! 6. Everything else is `Categorical`.
//!
//! A column that cannot be read at all is kept as `Unknown` with every cell
//! missing, so one bad column never hides the others.

use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::{Result, ResultExt};
use crate::types::SemanticType;
use crate::utils::{
    is_numeric_dtype, is_temporal_dtype, parse_datetime_string, parse_numeric_string, ratio,
};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use polars::prelude::DataType;
use regex::Regex;
use tracing::{debug, warn};

static DATE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(date|time|timestamp|period|month|year|week|quarter|day)|_at$")
        .expect("Invalid regex: date column name")
});

/// A classified column with the typed values downstream stages need.
///
/// `numbers` is only filled for numeric columns and `timestamps` only for
/// temporal ones; both are row-aligned with `text`.
#[derive(Debug, Clone)]
pub struct ColumnView {
    pub name: String,
    pub dtype: String,
    pub semantic_type: SemanticType,
    pub text: Vec<Option<String>>,
    pub numbers: Vec<Option<f64>>,
    pub timestamps: Vec<Option<NaiveDateTime>>,
}

impl ColumnView {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether `row` holds a value usable for the column's semantic type.
    ///
    /// Numeric and temporal columns only count cells that parsed; a leftover
    /// label in a numeric column is missing.
    pub fn is_present(&self, row: usize) -> bool {
        match self.semantic_type {
            SemanticType::Numeric => self.numbers.get(row).is_some_and(Option::is_some),
            SemanticType::Temporal => self.timestamps.get(row).is_some_and(Option::is_some),
            SemanticType::Categorical | SemanticType::Unknown => {
                self.text.get(row).is_some_and(Option::is_some)
            }
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&row| !self.is_present(row)).count()
    }

    /// Text of the present cells, in row order.
    pub fn present_text(&self) -> impl Iterator<Item = &str> + '_ {
        self.text
            .iter()
            .enumerate()
            .filter(|(row, _)| self.is_present(*row))
            .filter_map(|(_, value)| value.as_deref())
    }

    pub fn is_numeric(&self) -> bool {
        self.semantic_type == SemanticType::Numeric
    }

    pub fn is_temporal(&self) -> bool {
        self.semantic_type == SemanticType::Temporal
    }

    /// Non-missing numeric values in row order.
    pub fn present_numbers(&self) -> Vec<f64> {
        self.numbers.iter().flatten().copied().collect()
    }
}

/// Classify every column of the dataset, in table order.
///
/// Never fails: a column that cannot be read is logged and kept as an
/// all-missing `Unknown` column.
pub fn classify_columns(dataset: &Dataset, config: &AnalysisConfig) -> Vec<ColumnView> {
    dataset
        .column_names()
        .into_iter()
        .map(|name| {
            classify_column(dataset, &name, config)
                .context(format!("Failed to classify column '{}'", name))
                .unwrap_or_else(|e| {
                    warn!(column = %name, code = e.error_code(), "{}", e);
                    unreadable_column(dataset, &name)
                })
        })
        .collect()
}

fn unreadable_column(dataset: &Dataset, name: &str) -> ColumnView {
    let rows = dataset.height();
    ColumnView {
        name: name.to_string(),
        dtype: dataset
            .dtype_name(name)
            .unwrap_or_else(|_| "unknown".to_string()),
        semantic_type: SemanticType::Unknown,
        text: vec![None; rows],
        numbers: Vec::new(),
        timestamps: Vec::new(),
    }
}

/// Classify a single column.
pub fn classify_column(dataset: &Dataset, name: &str, config: &AnalysisConfig) -> Result<ColumnView> {
    let dtype = dataset.series(name)?.dtype().clone();
    let text = dataset.text_values(name)?;
    let present = text.iter().filter(|v| v.is_some()).count();

    let semantic_type = if present == 0 {
        SemanticType::Unknown
    } else if let Some(declared) = dataset.declared_type(name)
        && declared != SemanticType::Unknown
    {
        declared
    } else {
        infer_semantic_type(name, &dtype, &text, present, config.min_numeric_ratio)
    };

    debug!(
        column = name,
        dtype = ?dtype,
        semantic_type = semantic_type.as_str(),
        "Classified column"
    );

    let numbers = if semantic_type == SemanticType::Numeric {
        dataset.numeric_values(name)?
    } else {
        Vec::new()
    };
    let timestamps = if semantic_type == SemanticType::Temporal {
        dataset.temporal_values(name)?
    } else {
        Vec::new()
    };

    Ok(ColumnView {
        name: name.to_string(),
        dtype: dataset.dtype_name(name)?,
        semantic_type,
        text,
        numbers,
        timestamps,
    })
}

fn infer_semantic_type(
    name: &str,
    dtype: &DataType,
    text: &[Option<String>],
    present: usize,
    min_ratio: f64,
) -> SemanticType {
    if is_temporal_dtype(dtype) {
        return SemanticType::Temporal;
    }
    if is_numeric_dtype(dtype) {
        return SemanticType::Numeric;
    }
    if dtype != &DataType::String {
        // Booleans, times of day, lists, structs
        return SemanticType::Categorical;
    }

    let values = text.iter().flatten();
    let dates = values
        .clone()
        .filter(|v| parse_datetime_string(v).is_some())
        .count();
    if ratio(dates, present) > min_ratio {
        return SemanticType::Temporal;
    }

    let numbers = values
        .filter(|v| parse_numeric_string(v).is_some())
        .count();
    if ratio(numbers, present) > min_ratio {
        return SemanticType::Numeric;
    }

    if dates > 0 && DATE_NAME.is_match(name) {
        return SemanticType::Temporal;
    }

    SemanticType::Categorical
}
