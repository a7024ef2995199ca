//! Fixed-size interval slicing

use crate::error::{Result, RunnerError};
use crate::time::TimeRange;
use chrono::{DateTime, TimeDelta, Utc};

/// Split `[start, end)` into consecutive windows of `minutes` minutes
///
/// Produces `ceil((end - start) / minutes)` windows, the last clamped to
/// `end`. A zero-length interval yields the single window `[start, start)`.
pub fn fixed_interval_partitions(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    minutes: i64,
) -> Result<Vec<TimeRange>> {
    if minutes <= 0 {
        return Err(RunnerError::configuration(
            "partition interval must be a positive number of minutes",
            "minutes",
            minutes,
        ));
    }
    let step = TimeDelta::try_minutes(minutes).ok_or_else(|| {
        RunnerError::configuration("partition interval is too large", "minutes", minutes)
    })?;
    let end = end.max(start);

    if start == end {
        return Ok(vec![TimeRange::new_unchecked(start, end)]);
    }

    let mut ranges = Vec::with_capacity(window_count(end - start, step));
    let mut cursor = start;
    while cursor < end {
        let next = cursor.checked_add_signed(step).map_or(end, |t| t.min(end));
        ranges.push(TimeRange::new_unchecked(cursor, next));
        cursor = next;
    }

    Ok(ranges)
}

fn window_count(span: TimeDelta, step: TimeDelta) -> usize {
    let (span, step) = (span.num_seconds(), step.num_seconds());
    usize::try_from((span + step - 1) / step).unwrap_or(0)
}
