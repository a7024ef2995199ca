//! Interval partitioning strategies
//!
//! A strategy turns `[start, end)` into an ordered list of disjoint
//! [`TimeRange`]s. Month and interval slicing are built in; `Custom` defers to
//! a function supplied by the job.

mod calendar;
mod interval;

pub use calendar::{calendar_month_partitions, calendar_month_partitions_in};
pub use interval::fixed_interval_partitions;

use crate::error::{Result, RunnerError};
use crate::time::TimeRange;
use chrono::{DateTime, FixedOffset, Utc};
use std::fmt;

/// How a run slices its interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartitionStrategy {
    /// Use the job's own partition function
    #[default]
    Custom,
    /// First-of-month boundaries in UTC
    CalendarMonth,
    /// First-of-month boundaries at a fixed UTC offset
    CalendarMonthIn(FixedOffset),
    /// Uniform windows of the given number of minutes
    FixedInterval { minutes: i64 },
}

impl PartitionStrategy {
    /// Slice `[start, end)` according to this strategy
    ///
    /// `custom` is consulted only for [`PartitionStrategy::Custom`]; returning
    /// `None` from it means the job has no partition function.
    pub fn partition<F>(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        custom: F,
    ) -> Result<Vec<TimeRange>>
    where
        F: FnOnce(DateTime<Utc>, DateTime<Utc>) -> Option<Vec<TimeRange>>,
    {
        if start > end {
            return Err(RunnerError::configuration(
                format!(
                    "run start {} is after end {}",
                    start.to_rfc3339(),
                    end.to_rfc3339()
                ),
                "start",
                start.to_rfc3339(),
            ));
        }

        match self {
            Self::Custom => custom(start, end).ok_or_else(|| {
                RunnerError::configuration(
                    "custom partitioning selected but no partition function was supplied",
                    "partition_fn",
                    "none",
                )
            }),
            Self::CalendarMonth => Ok(calendar_month_partitions(start, end)),
            Self::CalendarMonthIn(offset) => Ok(calendar_month_partitions_in(start, end, offset)),
            Self::FixedInterval { minutes } => fixed_interval_partitions(start, end, *minutes),
        }
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom => write!(f, "custom"),
            Self::CalendarMonth => write!(f, "calendar_month"),
            Self::CalendarMonthIn(offset) => write!(f, "calendar_month({offset})"),
            Self::FixedInterval { minutes } => write!(f, "fixed_interval({minutes}m)"),
        }
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
    fn test_custom_without_function_is_configuration_error() {
        let err = PartitionStrategy::Custom
            .partition(at(0), at(2), |_, _| None)
            .unwrap_err();

        match err {
            RunnerError::Configuration { field, .. } => assert_eq!(field, "partition_fn"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_delegates_verbatim() {
        let ranges = PartitionStrategy::Custom
            .partition(at(0), at(4), |start, end| {
                Some(vec![
                    TimeRange::new(start, at(1)).unwrap(),
                    TimeRange::new(at(3), end).unwrap(),
                ])
            })
            .unwrap();

        // Gaps in a custom slicing are the caller's business
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[1].start(), at(3));
    }

    #[test]
    fn test_custom_function_ignored_for_builtin_strategies() {
        let ranges = PartitionStrategy::FixedInterval { minutes: 60 }
            .partition(at(0), at(2), |_, _| panic!("custom slicer must not run"))
            .unwrap();
        assert_eq!(ranges.len(), 2);
    }

    #[test]
    fn test_inverted_interval_is_rejected() {
        let err = PartitionStrategy::CalendarMonth
            .partition(at(2), at(1), |_, _| None)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_display() {
        assert_eq!(PartitionStrategy::Custom.to_string(), "custom");
        assert_eq!(
            PartitionStrategy::FixedInterval { minutes: 15 }.to_string(),
            "fixed_interval(15m)"
        );
    }
}
