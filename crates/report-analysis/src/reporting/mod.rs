//! Plain-language findings and recommendations.
//!
//! The rendering collaborator turns these strings and the structured result
//! into documents; nothing in here formats a report.

mod findings;

pub use findings::{
    COMPLETENESS_WARNING_PCT, FindingsGenerator, OUTLIER_WARNING_PCT, format_thousands,
};
