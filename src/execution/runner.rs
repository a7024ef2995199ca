//! Fan-out / sequential-reduce driver
//!
//! [`Runner`] slices its interval, preloads a [`WorkQueue`], starts a
//! [`WorkerPool`] and folds every successful query result into the
//! accumulator one at a time. The first failure of any kind cancels the
//! remaining work and is returned to the caller.
//!
//! The accumulator is moved into [`Runner::run`] and only handed back on
//! success, so a partially reduced value can never be observed after a
//! failure. Workers are always joined before `run` returns.
//!
//! Reduction happens in arrival order, which varies with pool size and
//! scheduling. Only commutative and associative reducers give the same result
//! for every pool size.

use super::job::RangeJob;
use super::pool::{CancelMode, Outcome, WorkerPool};
use super::queue::WorkQueue;
use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use crate::partition::PartitionStrategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Default number of concurrent workers
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Drives one job over a time interval
pub struct Runner<J: RangeJob> {
    job: Arc<J>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    strategy: PartitionStrategy,
    pool_size: usize,
    cancel_mode: CancelMode,
    state: watch::Sender<RunState>,
}

impl<J: RangeJob> Runner<J> {
    pub fn new(job: J, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::with_shared_job(Arc::new(job), start, end)
    }

    /// Build a runner around a job that is also used elsewhere
    pub fn with_shared_job(job: Arc<J>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            job,
            start,
            end,
            strategy: PartitionStrategy::default(),
            pool_size: DEFAULT_POOL_SIZE,
            cancel_mode: CancelMode::default(),
            state,
        }
    }

    /// Build a runner from loaded configuration
    pub fn from_config(
        job: J,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        config: &RunnerConfig,
    ) -> Result<Self> {
        let strategy = config.partition.to_strategy()?;
        Ok(Self::new(job, start, end)
            .with_strategy(strategy)
            .with_pool_size(config.pool_size)
            .with_cancel_mode(config.cancel_mode))
    }

    pub fn with_strategy(mut self, strategy: PartitionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_cancel_mode(mut self, cancel_mode: CancelMode) -> Self {
        self.cancel_mode = cancel_mode;
        self
    }

    pub fn strategy(&self) -> PartitionStrategy {
        self.strategy
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Observe state transitions of this runner
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Execute the run, returning the final accumulator
    ///
    /// Configuration problems are reported before any worker starts and leave
    /// the state untouched. Any query or reduction failure moves the runner to
    /// [`RunState::Failed`]; the accumulator is dropped in that case.
    pub async fn run(&mut self, accumulator: J::Accumulator) -> Result<J::Accumulator> {
        let job = Arc::clone(&self.job);
        let ranges = self
            .strategy
            .partition(self.start, self.end, |start, end| job.partition(start, end))?;
        let expected = ranges.len();
        let queue = WorkQueue::preload(ranges)?;
        let mut pool = WorkerPool::spawn(Arc::clone(&self.job), queue, self.pool_size)?;

        self.state.send_replace(RunState::Running);
        info!(
            "Starting run over [{}, {}) with {} ranges, strategy {}, {} workers",
            self.start.to_rfc3339(),
            self.end.to_rfc3339(),
            expected,
            self.strategy,
            pool.size()
        );
        let started = Instant::now();

        let result = self.aggregate(&mut pool, expected, accumulator).await;
        let report = pool.shutdown(self.cancel_mode).await;

        match &result {
            Ok(_) => {
                self.state.send_replace(RunState::Succeeded);
                info!(
                    "Run completed: {} ranges reduced in {:?}",
                    expected,
                    started.elapsed()
                );
            }
            Err(error) => {
                self.state.send_replace(RunState::Failed);
                warn!(
                    "Run failed after {:?}: {} ({} late outcomes discarded)",
                    started.elapsed(),
                    error,
                    report.discarded
                );
            }
        }
        result
    }

    async fn aggregate(
        &self,
        pool: &mut WorkerPool<J::Output>,
        expected: usize,
        mut accumulator: J::Accumulator,
    ) -> Result<J::Accumulator> {
        for received in 1..=expected {
            match pool.next_outcome().await {
                Some(Outcome::Success { range, value }) => {
                    accumulator = self
                        .job
                        .reduce(accumulator, value)
                        .map_err(|source| RunnerError::Reduction { range, source })?;
                    debug!("Reduced {} ({}/{})", range, received, expected);
                }
                Some(Outcome::Failure(error)) => {
                    pool.cancel();
                    return Err(error);
                }
                None => {
                    return Err(RunnerError::WorkerLost {
                        reason: format!(
                            "workers exited after {} of {} outcomes",
                            received - 1,
                            expected
                        ),
                    });
                }
            }
        }
        Ok(accumulator)
    }
}

impl<J: RangeJob> std::fmt::Debug for Runner<J> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("strategy", &self.strategy)
            .field("pool_size", &self.pool_size)
            .field("cancel_mode", &self.cancel_mode)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Run `job` using its own partition function
pub async fn run<J: RangeJob>(
    job: J,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    accumulator: J::Accumulator,
    pool_size: usize,
) -> Result<J::Accumulator> {
    Runner::new(job, start, end)
        .with_strategy(PartitionStrategy::Custom)
        .with_pool_size(pool_size)
        .run(accumulator)
        .await
}

/// Run `job` over UTC calendar months
pub async fn run_with_month_slices<J: RangeJob>(
    job: J,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    accumulator: J::Accumulator,
    pool_size: usize,
) -> Result<J::Accumulator> {
    Runner::new(job, start, end)
        .with_strategy(PartitionStrategy::CalendarMonth)
        .with_pool_size(pool_size)
        .run(accumulator)
        .await
}

/// Run `job` over fixed windows of `minutes` minutes
pub async fn run_with_interval_slices<J: RangeJob>(
    job: J,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    accumulator: J::Accumulator,
    pool_size: usize,
    minutes: i64,
) -> Result<J::Accumulator> {
    Runner::new(job, start, end)
        .with_strategy(PartitionStrategy::FixedInterval { minutes })
        .with_pool_size(pool_size)
        .run(accumulator)
        .await
}
