//! Time related utils.
//!
//! The router API validates `timestamp` against wall-clock time, so every
//! value here keeps the local offset it was captured with.

use crate::{Error, Result};

/// DateTime used across toprest: a wall-clock instant with its UTC offset.
pub type DateTime = chrono::DateTime<chrono::FixedOffset>;

/// Create a local datetime for now.
pub fn now() -> DateTime {
    chrono::Local::now().fixed_offset()
}

/// Format time into the protocol timestamp: `2024-05-01 12:30:45`
pub fn format_timestamp(t: DateTime) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format time into a file name stamp: `2024-05-01_12-30-45`
pub fn format_file_stamp(t: DateTime) -> String {
    t.format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Format time for trace lines: `2024-05-01 12:30:45,123`
pub fn format_trace_time(t: DateTime) -> String {
    t.format("%Y-%m-%d %H:%M:%S,%3f").to_string()
}

/// Parse an RFC 3339 string like `2024-05-01T12:30:45+08:00`.
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::invalid_argument(format!("invalid time {s}")).with_source(e))
}
