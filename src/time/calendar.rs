//! Calendar helpers for month and day boundaries
//!
//! Boundaries are computed at local midnight of a fixed UTC offset and
//! returned as UTC instants. Fixed offsets have no DST gaps, so every local
//! midnight maps to exactly one instant.

use crate::error::{Result, RunnerError};
use chrono::{
    DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveTime, Offset, TimeZone, Utc,
};

/// The UTC offset used when no zone is configured
pub fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Build a fixed offset from whole hours east of UTC
pub fn fixed_offset_hours(hours: i32) -> Result<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            RunnerError::configuration(
                "UTC offset must lie strictly between -24 and +24 hours",
                "utc_offset_hours",
                hours,
            )
        })
}

fn local_midnight(date: NaiveDate, offset: &FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    let utc = local - chrono::TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc)
}

/// Midnight at the start of the local day containing `instant`
pub fn start_of_day(instant: DateTime<Utc>, offset: &FixedOffset) -> DateTime<Utc> {
    let date = instant.with_timezone(offset).date_naive();
    local_midnight(date, offset)
}

/// Midnight on the first day of the local month containing `instant`
pub fn first_of_month(instant: DateTime<Utc>, offset: &FixedOffset) -> DateTime<Utc> {
    let date = instant.with_timezone(offset).date_naive();
    let first = date.with_day(1).unwrap_or(date);
    local_midnight(first, offset)
}

/// The last month boundary strictly before `instant`
///
/// When `instant` sits exactly on a first-of-month the previous month's start
/// is returned, so a partition ending there is never zero-length. `None` only
/// when stepping back leaves chrono's representable range.
pub fn month_boundary_before(
    instant: DateTime<Utc>,
    offset: &FixedOffset,
) -> Option<DateTime<Utc>> {
    let first = first_of_month(instant, offset);
    if first != instant {
        return Some(first);
    }

    let date = instant.with_timezone(offset).date_naive();
    date.checked_sub_months(Months::new(1))
        .map(|previous| local_midnight(previous, offset))
}

/// Return the pair in chronological order
pub fn ordered(a: DateTime<Utc>, b: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_first_of_month_utc() {
        let offset = utc_offset();
        assert_eq!(first_of_month(utc(2020, 3, 17, 13), &offset), utc(2020, 3, 1, 0));
        assert_eq!(first_of_month(utc(2020, 3, 1, 0), &offset), utc(2020, 3, 1, 0));
    }

    #[test]
    fn test_first_of_month_respects_offset() {
        // 2020-03-31T20:00Z is already April 1st at UTC+8
        let offset = fixed_offset_hours(8).unwrap();
        assert_eq!(
            first_of_month(utc(2020, 3, 31, 20), &offset),
            utc(2020, 3, 31, 16)
        );
    }

    #[test]
    fn test_month_boundary_steps_back_on_exact_boundary() {
        let offset = utc_offset();
        assert_eq!(
            month_boundary_before(utc(2020, 4, 1, 0), &offset),
            Some(utc(2020, 3, 1, 0))
        );
        assert_eq!(
            month_boundary_before(utc(2020, 1, 1, 0), &offset),
            Some(utc(2019, 12, 1, 0))
        );
        assert_eq!(
            month_boundary_before(utc(2020, 4, 10, 5), &offset),
            Some(utc(2020, 4, 1, 0))
        );
    }

    #[test]
    fn test_start_of_day_with_negative_offset() {
        let offset = fixed_offset_hours(-5).unwrap();
        // 03:00Z on the 2nd is 22:00 on the 1st at UTC-5
        assert_eq!(start_of_day(utc(2020, 1, 2, 3), &offset), utc(2020, 1, 1, 5));
    }

    #[test]
    fn test_fixed_offset_hours_rejects_out_of_range() {
        assert!(fixed_offset_hours(24).is_err());
        assert!(fixed_offset_hours(-24).is_err());
        assert!(fixed_offset_hours(i32::MAX).is_err());
        assert!(fixed_offset_hours(14).is_ok());
    }

    #[test]
    fn test_ordered_swaps_inverted_pair() {
        let (a, b) = ordered(utc(2020, 2, 1, 0), utc(2020, 1, 1, 0));
        assert!(a < b);
    }
}
