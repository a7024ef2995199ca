//! Time values shared by the partitioner and the runner

pub mod calendar;
mod range;

pub use calendar::{first_of_month, fixed_offset_hours, ordered, start_of_day, utc_offset};
pub use range::TimeRange;
