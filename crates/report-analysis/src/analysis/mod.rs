//! Cross-column analyses run after profiling.
//!
//! - [`correlation_analysis`]: Pearson correlation of numeric column pairs
//! - [`detect_outliers`]: per-column outlier scan through an [`OutlierDetector`]
//! - [`trend_analysis`]: least-squares trend of numeric series along an axis

mod correlation;
mod outliers;
mod trend;

pub use correlation::{correlation_analysis, pearson};
pub use outliers::{
    IQR_FENCE_FACTOR, IqrDetector, MIN_VALUES_FOR_FENCES, OutlierDetector, detect_outliers,
    detector_for,
};
pub use trend::{
    HIGH_CONFIDENCE_R2, MIN_TREND_POINTS, MODERATE_CONFIDENCE_R2, linear_fit, trend_analysis,
};
