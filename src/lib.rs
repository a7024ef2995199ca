//! # range-runner
//!
//! Fan a query out over slices of a time interval and fold the results back
//! together.
//!
//! ## Usage
//!
//! ```no_run
//! use chrono::{TimeZone, Utc};
//! use range_runner::{FnJob, PartitionStrategy, Runner, TimeRange};
//!
//! # async fn example() -> range_runner::Result<()> {
//! let job = FnJob::new(
//!     |range: TimeRange| async move { Ok(range.duration().num_minutes() as f64) },
//!     |total: f64, minutes: f64| Ok(total + minutes),
//! );
//!
//! let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2020, 1, 1, 2, 0, 0).unwrap();
//! let mut runner = Runner::new(job, start, end)
//!     .with_strategy(PartitionStrategy::FixedInterval { minutes: 60 })
//!     .with_pool_size(4);
//!
//! let total = runner.run(0.0).await?;
//! assert_eq!(total, 120.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `time` - The `TimeRange` value and calendar helpers
//! - `partition` - Custom, calendar-month and fixed-interval slicing
//! - `execution` - Job trait, work queue, worker pool and the aggregating runner
//! - `config` - Serializable runner configuration with env overrides
//! - `logging` - Tracing subscriber setup
//! - `error` - The crate error type
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod partition;
pub mod time;


pub use config::{ConfigLoader, PartitionConfig, RunnerConfig};
pub use error::{Result, RunnerError};
pub use execution::{
    run, run_with_interval_slices, run_with_month_slices, CancelMode, FnJob, RangeJob, RunState,
    Runner,
};
pub use partition::PartitionStrategy;
pub use time::TimeRange;
