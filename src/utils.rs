//! A collection of utility functions
use std::io;
use std::time::SystemTime;

use chrono::DateTime;
use chrono::Utc;

/// Converts a platform timestamp, falling back to the Unix epoch when the
/// platform cannot report it.
pub fn to_utc(time: io::Result<SystemTime>) -> DateTime<Utc> {
    time.unwrap_or(SystemTime::UNIX_EPOCH).into()
}

/// Formats a timestamp in RFC 3339 - Z format.
/// For example "2018-01-26T18:30:09.453Z"
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
