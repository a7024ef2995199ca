//! Preloaded work queue shared by the worker pool

use crate::error::{Result, RunnerError};
use crate::time::TimeRange;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

/// Bounded queue filled once with every range of a run
///
/// The producer side is dropped as soon as the queue is loaded, so `next`
/// returns `None` once the last range has been claimed. Each range is handed
/// to exactly one caller.
#[derive(Clone)]
pub struct WorkQueue {
    receiver: Arc<Mutex<mpsc::Receiver<TimeRange>>>,
    total: usize,
}

impl WorkQueue {
    /// Load every range into a channel sized to hold all of them
    pub fn preload(ranges: Vec<TimeRange>) -> Result<Self> {
        let total = ranges.len();
        if total == 0 {
            return Err(RunnerError::configuration(
                "partitioning produced no ranges to process",
                "partitions",
                0,
            ));
        }

        let (sender, receiver) = mpsc::channel(total);
        for range in ranges {
            sender.try_send(range).map_err(|e| {
                RunnerError::configuration(
                    format!("work queue rejected range: {e}"),
                    "partitions",
                    total,
                )
            })?;
        }
        drop(sender);

        debug!("Preloaded work queue with {} ranges", total);

        Ok(Self {
            receiver: Arc::new(Mutex::new(receiver)),
            total,
        })
    }

    /// Claim the next unprocessed range
    pub async fn next(&self) -> Option<TimeRange> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await
    }

    /// Number of ranges the queue was loaded with
    pub fn total(&self) -> usize {
        self.total
    }
}

impl std::fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}
