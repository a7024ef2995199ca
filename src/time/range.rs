//! The half-open time range handed to each worker

use crate::error::{Result, RunnerError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open interval `[start, end)` with `start <= end`
///
/// Ranges are immutable once built. The partitioner produces them, exactly one
/// worker consumes each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawTimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = RunnerError;

    fn try_from(raw: RawTimeRange) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(RunnerError::configuration(
                format!("range start {} is after end {}", start.to_rfc3339(), end.to_rfc3339()),
                "start",
                start.to_rfc3339(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Caller guarantees `start <= end`
    pub(crate) fn new_unchecked(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        let err = TimeRange::new(at(2), at(1)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_half_open_semantics() {
        let range = TimeRange::new(at(0), at(1)).unwrap();

        assert!(range.contains(at(0)));
        assert!(!range.contains(at(1)));
        assert_eq!(range.duration(), TimeDelta::hours(1));
        assert!(!range.is_empty());
        assert!(TimeRange::new(at(1), at(1)).unwrap().is_empty());
    }

    #[test]
    fn test_display_uses_rfc3339() {
        let range = TimeRange::new(at(0), at(1)).unwrap();
        assert_eq!(
            range.to_string(),
            "[2020-01-01T00:00:00+00:00, 2020-01-01T01:00:00+00:00)"
        );
    }

    #[test]
    fn test_deserialize_validates_order() {
        let ok: TimeRange = serde_json::from_str(
            r#"{"start":"2020-01-01T00:00:00Z","end":"2020-01-01T01:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(ok.end(), at(1));

        let inverted = serde_json::from_str::<TimeRange>(
            r#"{"start":"2020-01-01T02:00:00Z","end":"2020-01-01T01:00:00Z"}"#,
        );
        assert!(inverted.is_err());
    }
}
