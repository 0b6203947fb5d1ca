//! Formatting helpers for report fields

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

/// Size units, indexed by power of 1024
const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Placeholder for a missing or unreadable value
pub const UNKNOWN: &str = "Unknown";

/// Format bytes into a human-readable string
///
/// The unit is `floor(log1024(bytes))` capped at TB, and the value always
/// carries two decimals, rounded half up.
///
/// # Example
/// ```
/// use unlinked_assets::services::file_utils::format_file_size;
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.50 KB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut magnitude = 0usize;
    let mut divisor: u128 = 1;
    while magnitude < SIZE_UNITS.len() - 1 && u128::from(bytes) >= divisor * 1024 {
        divisor *= 1024;
        magnitude += 1;
    }

    // Work in hundredths so rounding is exact
    let hundredths = (u128::from(bytes) * 200 + divisor) / (divisor * 2);
    format!(
        "{}.{:02} {}",
        hundredths / 100,
        hundredths % 100,
        SIZE_UNITS[magnitude]
    )
}

/// Format a raw `details.size` value.
///
/// Whole-number floats such as `1536.0` count as byte counts. Absent,
/// negative, fractional or non-numeric sizes are [UNKNOWN].
pub fn file_size_label(size: Option<&JsonValue>) -> String {
    match size.and_then(byte_count) {
        Some(bytes) => format_file_size(bytes),
        None => UNKNOWN.to_string(),
    }
}

fn byte_count(value: &JsonValue) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}

/// Format an ISO-8601 timestamp as a short `M/D/YYYY` date in UTC
pub fn format_locale_date(timestamp: Option<&str>) -> String {
    timestamp
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|dt| dt.with_timezone(&Utc).format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Filesystem-safe run timestamp: `2024-01-15T10-30-00`
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H-%M-%S").to_string()
}
