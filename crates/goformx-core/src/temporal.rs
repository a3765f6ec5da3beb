//! # Temporal Types — UTC Timestamps
//!
//! `Timestamp` is the type behind every `created_at`, `updated_at` and
//! `submitted_at` column. It is always UTC and truncated to whole seconds so
//! that values written to and read back from storage compare equal.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, ErrorCode};

/// A UTC timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string. Any offset is accepted and converted to UTC.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            DomainError::new(
                ErrorCode::ValidationInvalidFormat,
                format!("invalid RFC 3339 timestamp {s:?}: {e}"),
            )
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_rfc3339(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 2, 9, 15, 30).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(987_000_000).unwrap());
        assert_eq!(ts.to_rfc3339(), "2026-03-02T09:15:30Z");
    }

    #[test]
    fn test_parse_converts_offset_to_utc() {
        let ts = Timestamp::parse("2026-03-02T14:45:30+05:30").unwrap();
        assert_eq!(ts.to_string(), "2026-03-02T09:15:30Z");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Timestamp::parse("yesterday").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationInvalidFormat);
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_ordering() {
        let a = Timestamp::parse("2026-03-02T09:15:30Z").unwrap();
        let b = Timestamp::parse("2026-03-02T09:15:31Z").unwrap();
        assert!(a < b);
    }
}
