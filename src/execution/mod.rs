//! Concurrent execution of a job over partitioned time ranges
//!
//! - [`job`]: the caller's partition / query / reduce operations
//! - [`queue`]: the preloaded work queue
//! - [`pool`]: workers and their outcome channels
//! - [`runner`]: the aggregating driver loop

pub mod job;
pub mod pool;
pub mod queue;
pub mod runner;

pub use job::{FnJob, PartitionFn, QueryFn, RangeJob, ReduceFn};
pub use pool::{effective_pool_size, CancelMode, Outcome, ShutdownReport, WorkerPool};
pub use queue::WorkQueue;
pub use runner::{
    run, run_with_interval_slices, run_with_month_slices, RunState, Runner, DEFAULT_POOL_SIZE,
};
