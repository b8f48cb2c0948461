use chrono::{DateTime, Utc};

/// Mirror node point-in-time filter: `{seconds}.{nanoseconds}` with exactly
/// nine fractional digits.
pub fn query_timestamp(at: DateTime<Utc>) -> String {
    // leap seconds report nanos past 1e9
    let nanos = at.timestamp_subsec_nanos().min(999_999_999);
    format!("{}.{:09}", at.timestamp(), nanos)
}

pub fn current_query_timestamp() -> String {
    query_timestamp(Utc::now())
}
