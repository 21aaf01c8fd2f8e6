//! Shared utilities for the analysis engine.
//!
//! Cell parsing (numbers, dates, missing markers) and the conversions that
//! turn a polars `Series` into plain Rust views the statistics operate on.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer, float or fixed-point decimal).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float() || matches!(dtype, DataType::Decimal(_, _))
}

/// Check if a DataType holds calendar dates or timestamps.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Common missing value markers in data.
pub const MISSING_MARKERS: [&str; 9] = [
    "error", "unknown", "n/a", "na", "nan", "null", "missing", "none", "#n/a",
];

/// Clean a string for numeric parsing by removing formatting characters.
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Check if a string stands for a missing value (blank or a known marker).
pub fn is_missing_marker(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_ascii_lowercase();
    MISSING_MARKERS.iter().any(|&marker| lower == marker)
}

/// Try to parse a string as a finite numeric value.
///
/// Handles currency symbols, percentages and thousands separators.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

const DATE_ONLY_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").expect("Invalid regex: YYYY-MM"));

/// Try to parse a string as a date or timestamp under common formats.
///
/// Timezone-aware RFC 3339 values are normalized to UTC. A bare `YYYY-MM`
/// is read as the first day of that month.
pub fn parse_datetime_string(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in DATE_ONLY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    let caps = YEAR_MONTH.captures(trimmed)?;
    let year = caps[1].parse::<i32>().ok()?;
    let month = caps[2].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)
}

// =============================================================================
// Series Views
// =============================================================================

/// Textual view of a column: one entry per row, `None` for missing cells.
///
/// Dtypes polars cannot cast to String (lists, arrays, structs) fall back to
/// the display form of each cell.
pub fn text_view(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let Ok(strings) = series.cast(&DataType::String) else {
        return formatted_view(series);
    };
    let values = strings
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !is_missing_marker(s))
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

fn formatted_view(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    (0..series.len())
        .map(|row| {
            let value = series.get(row)?;
            Ok(match value {
                AnyValue::Null => None,
                other => Some(other.to_string()),
            })
        })
        .collect()
}

/// Numeric view of a column: one entry per row, `None` when the cell is
/// missing or not a number. NaN counts as missing.
pub fn numeric_view(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    if is_numeric_dtype(series.dtype()) || series.dtype() == &DataType::Boolean {
        let floats = series.cast(&DataType::Float64)?;
        let values = floats
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        return Ok(values);
    }

    if series.dtype() == &DataType::String {
        let values = series
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_numeric_string))
            .collect();
        return Ok(values);
    }

    Ok(vec![None; series.len()])
}

/// Temporal view of a column: one entry per row, `None` when the cell is
/// missing or not a recognizable date/timestamp.
pub fn temporal_view(series: &Series) -> PolarsResult<Vec<Option<NaiveDateTime>>> {
    match series.dtype() {
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            let values = days
                .i32()?
                .into_iter()
                .map(|v| v.and_then(date_from_epoch_days))
                .collect();
            Ok(values)
        }
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = series.cast(&DataType::Int64)?;
            let values = raw
                .i64()?
                .into_iter()
                .map(|v| v.and_then(|ts| datetime_from_epoch(ts, unit)))
                .collect();
            Ok(values)
        }
        DataType::String => {
            let values = series
                .str()?
                .into_iter()
                .map(|v| v.and_then(parse_datetime_string))
                .collect();
            Ok(values)
        }
        _ => Ok(vec![None; series.len()]),
    }
}

/// Days between 0001-01-01 and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn date_from_epoch_days(days: i32) -> Option<NaiveDateTime> {
    let days_from_ce = days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?;
    NaiveDate::from_num_days_from_ce_opt(days_from_ce)?.and_hms_opt(0, 0, 0)
}

fn datetime_from_epoch(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let utc = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    utc.map(|dt| dt.naive_utc())
}

/// Ratio of `matched` over `total`, 0 when there is nothing to compare.
#[inline]
pub fn ratio(matched: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64
    }
}

// =============================================================================
// Tests
// =============================================================================
