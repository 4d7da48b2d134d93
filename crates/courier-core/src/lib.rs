pub mod credentials;
pub mod directory;
pub mod guard;
pub mod messages;

use chrono::{DateTime, DurationRound, SecondsFormat, TimeDelta, Utc};
use courier_types::error::{Error, Result};

/// Current time, truncated to the microsecond precision the RFC 3339
/// timestamp columns store. A value returned to a caller is byte-identical
/// to what a later read parses back.
pub(crate) fn now() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(TimeDelta::microseconds(1)).unwrap_or(now)
}

pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Storage(anyhow::anyhow!("corrupt timestamp {value:?}: {e}")))
}
