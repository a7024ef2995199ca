//! Calendar-month slicing

use crate::time::calendar::{month_boundary_before, utc_offset};
use crate::time::TimeRange;
use chrono::{DateTime, FixedOffset, Utc};

/// Split `[start, end)` at UTC month boundaries
pub fn calendar_month_partitions(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<TimeRange> {
    calendar_month_partitions_in(start, end, &utc_offset())
}

/// Split `[start, end)` at month boundaries of a fixed UTC offset
///
/// Every boundary strictly inside the interval is a local first-of-month
/// midnight; the first range starts at `start` and the last ends at `end`.
pub fn calendar_month_partitions_in(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    offset: &FixedOffset,
) -> Vec<TimeRange> {
    let end = end.max(start);
    let mut ranges = Vec::new();
    let mut upper = end;

    // Walk backwards from `end`, peeling off one month per step
    loop {
        match month_boundary_before(upper, offset) {
            Some(boundary) if boundary > start => {
                ranges.push(TimeRange::new_unchecked(boundary, upper));
                upper = boundary;
            }
            _ => {
                ranges.push(TimeRange::new_unchecked(start, upper));
                break;
            }
        }
    }

    ranges.reverse();
    ranges
}
