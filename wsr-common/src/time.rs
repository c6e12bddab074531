//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Event timestamp (UTC)
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as epoch milliseconds (the Snap timestamp unit)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
