//! Time helpers.

use chrono::{DateTime, Utc};

/// Current wall-clock time in UTC.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a UTC timestamp to Unix epoch seconds, the unit used on the wire.
pub fn to_unix_seconds(at: &DateTime<Utc>) -> i64 {
    at.timestamp()
}
