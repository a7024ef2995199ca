//! Worker pool executing range queries
//!
//! Workers pull ranges from the shared [`WorkQueue`], run the job's query and
//! report on one of two bounded channels: successes and failures. Both are
//! sized to the number of ranges, so a worker never waits to hand off a
//! result. A worker stops after its first failure; all workers stop pulling
//! new work once cancellation is broadcast.

use super::job::RangeJob;
use super::queue::WorkQueue;
use crate::error::{Result, RunnerError};
use crate::time::TimeRange;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// What happens to in-flight queries once a run is cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelMode {
    /// Let in-flight queries finish and discard their results
    #[default]
    Drain,
    /// Drop in-flight query futures at their next await point
    Abort,
}

impl std::str::FromStr for CancelMode {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drain" => Ok(Self::Drain),
            "abort" => Ok(Self::Abort),
            other => Err(RunnerError::configuration(
                "cancel mode must be `drain` or `abort`",
                "cancel_mode",
                other,
            )),
        }
    }
}

/// Result of processing one range
#[derive(Debug)]
pub enum Outcome<T> {
    Success { range: TimeRange, value: T },
    Failure(RunnerError),
}

/// Summary of a pool shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Outcomes produced but never handed to the aggregator
    pub discarded: usize,
    /// Worker tasks that ended by panicking or being aborted
    pub abnormal_exits: usize,
}

/// A running set of workers for one run
pub struct WorkerPool<T> {
    workers: JoinSet<()>,
    successes: mpsc::Receiver<(TimeRange, T)>,
    failures: mpsc::Receiver<RunnerError>,
    cancel: watch::Sender<bool>,
    size: usize,
}

/// Clamp the requested pool size to the available work
pub fn effective_pool_size(requested: usize, partitions: usize) -> Result<usize> {
    if requested == 0 {
        return Err(RunnerError::configuration(
            "pool size must be positive",
            "pool_size",
            requested,
        ));
    }
    if partitions == 0 {
        return Err(RunnerError::configuration(
            "partitioning produced no ranges to process",
            "partitions",
            partitions,
        ));
    }
    Ok(requested.min(partitions))
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Start `pool_size` workers (clamped to the queue length) on `queue`
    pub fn spawn<J>(job: Arc<J>, queue: WorkQueue, pool_size: usize) -> Result<Self>
    where
        J: RangeJob<Output = T>,
    {
        let capacity = queue.total();
        let size = effective_pool_size(pool_size, capacity)?;

        let (success_tx, successes) = mpsc::channel(capacity);
        let (failure_tx, failures) = mpsc::channel(capacity);
        let (cancel, cancel_rx) = watch::channel(false);

        let mut workers = JoinSet::new();
        for worker_id in 0..size {
            workers.spawn(run_worker(
                worker_id,
                Arc::clone(&job),
                queue.clone(),
                success_tx.clone(),
                failure_tx.clone(),
                cancel_rx.clone(),
            ));
        }
        debug!("Started {} workers for {} ranges", size, capacity);

        Ok(Self {
            workers,
            successes,
            failures,
            cancel,
            size,
        })
    }

    /// Number of workers started
    pub fn size(&self) -> usize {
        self.size
    }

    /// Wait for the next outcome from any worker
    ///
    /// Failures take priority over successes that are ready at the same time.
    /// Returns `None` once every worker has exited and both channels are
    /// empty. A panicking worker surfaces as a [`RunnerError::WorkerLost`]
    /// failure.
    pub async fn next_outcome(&mut self) -> Option<Outcome<T>> {
        loop {
            tokio::select! {
                biased;
                Some(error) = self.failures.recv() => return Some(Outcome::Failure(error)),
                Some((range, value)) = self.successes.recv() => {
                    return Some(Outcome::Success { range, value });
                }
                Some(joined) = self.workers.join_next(), if !self.workers.is_empty() => {
                    if let Err(error) = joined {
                        if error.is_panic() {
                            return Some(Outcome::Failure(RunnerError::WorkerLost {
                                reason: format!("worker panicked: {error}"),
                            }));
                        }
                    }
                }
                else => return None,
            }
        }
    }

    /// Broadcast cancellation to every worker
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Cancel remaining work and wait for every worker to exit
    pub async fn shutdown(mut self, mode: CancelMode) -> ShutdownReport {
        self.cancel();
        if mode == CancelMode::Abort {
            self.workers.abort_all();
        }

        let mut report = ShutdownReport::default();
        while let Some(joined) = self.workers.join_next().await {
            if joined.is_err() {
                report.abnormal_exits += 1;
            }
        }

        while self.successes.try_recv().is_ok() {
            report.discarded += 1;
        }
        while self.failures.try_recv().is_ok() {
            report.discarded += 1;
        }

        if report.discarded > 0 || report.abnormal_exits > 0 {
            debug!(
                "Worker pool shut down: {} outcomes discarded, {} abnormal exits",
                report.discarded, report.abnormal_exits
            );
        }
        report
    }
}

/// Resolves once cancellation has been broadcast or the pool is gone
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow_and_update() {
        if cancel.changed().await.is_err() {
            return;
        }
    }
}

async fn run_worker<J: RangeJob>(
    worker_id: usize,
    job: Arc<J>,
    queue: WorkQueue,
    successes: mpsc::Sender<(TimeRange, J::Output)>,
    failures: mpsc::Sender<RunnerError>,
    mut cancel: watch::Receiver<bool>,
) {
    loop {
        let range = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => {
                debug!("Worker {} observed cancellation", worker_id);
                return;
            }
            next = queue.next() => match next {
                Some(range) => range,
                None => {
                    debug!("Worker {} found the queue empty", worker_id);
                    return;
                }
            },
        };

        debug!("Worker {} querying {}", worker_id, range);
        match job.query(range).await {
            Ok(value) => {
                if successes.send((range, value)).await.is_err() {
                    return;
                }
            }
            Err(source) => {
                warn!("Worker {} query failed for {}: {:#}", worker_id, range, source);
                let _ = failures.send(RunnerError::Query { range, source }).await;
                return;
            }
        }
    }
}
