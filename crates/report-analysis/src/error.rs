//! Error types for the statistical analysis engine.
//!
//! Errors fall into three families:
//!
//! - **Configuration** errors are fatal and are raised before any stage runs.
//! - **Insufficient data** errors belong to a single sub-analysis (one column,
//!   one pair, one series). The orchestrator never propagates them; it turns
//!   them into a [`Computable::NotComputable`](crate::types::Computable) marker.
//! - **Computation** errors (non-finite intermediate values) are handled the
//!   same way as insufficient data.
//!
//! Errors are serializable so they can be handed to a frontend or written into
//! a JSON report alongside the analysis output.

use crate::config::ConfigValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analysis engine.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Invalid configuration, or a dataset that violates a configured precondition.
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigValidationError),

    /// Not enough values for a specific sub-analysis.
    #[error("Insufficient data for {context}: {actual} value(s), at least {required} required")]
    InsufficientData {
        context: String,
        required: usize,
        actual: usize,
    },

    /// Numeric failure (overflow, NaN propagation, zero variance).
    #[error("Computation failed for {context}: {reason}")]
    Computation { context: String, reason: String },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Shorthand for an [`AnalysisError::InsufficientData`] error.
    pub fn insufficient(context: impl Into<String>, required: usize, actual: usize) -> Self {
        AnalysisError::InsufficientData {
            context: context.into(),
            required,
            actual,
        }
    }

    /// Shorthand for an [`AnalysisError::Computation`] error.
    pub fn computation(context: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::Computation {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for downstream handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::Computation { .. } => "COMPUTATION_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error aborts an analysis.
    ///
    /// Insufficient data and computation failures only degrade a single
    /// result slot.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InsufficientData { .. } | Self::Computation { .. } => false,
            Self::WithContext { source, .. } => source.is_fatal(),
            _ => true,
        }
    }

    /// Check if this error stems from configuration.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::WithContext { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}
