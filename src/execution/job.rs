//! The capability set a run needs from its caller
//!
//! A [`RangeJob`] bundles the three caller operations: how to slice the
//! interval (optional), how to query one slice, and how to fold one result
//! into the accumulator. [`FnJob`] binds plain closures into a job.

use crate::time::TimeRange;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;

/// Caller-supplied operations for a range run
///
/// `query` is invoked concurrently from several workers, each time with a
/// different range. `reduce` is only ever invoked from the aggregator, one call
/// at a time, in the order results arrive.
#[async_trait]
pub trait RangeJob: Send + Sync + 'static {
    /// Value produced by querying one range
    type Output: Send + 'static;
    /// Running result folded by `reduce`
    type Accumulator: Send;

    /// Slice the run interval for custom partitioning
    ///
    /// Returns `None` when the job has no partition function of its own.
    fn partition(&self, _start: DateTime<Utc>, _end: DateTime<Utc>) -> Option<Vec<TimeRange>> {
        None
    }

    /// Fetch the value for a single range
    async fn query(&self, range: TimeRange) -> anyhow::Result<Self::Output>;

    /// Fold one query result into the accumulator
    fn reduce(
        &self,
        accumulator: Self::Accumulator,
        value: Self::Output,
    ) -> anyhow::Result<Self::Accumulator>;
}

/// Boxed query closure
pub type QueryFn<T> = Arc<dyn Fn(TimeRange) -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;

/// Boxed reduce closure
pub type ReduceFn<A, T> = Arc<dyn Fn(A, T) -> anyhow::Result<A> + Send + Sync>;

/// Boxed custom partition closure
pub type PartitionFn = Arc<dyn Fn(DateTime<Utc>, DateTime<Utc>) -> Vec<TimeRange> + Send + Sync>;

/// A job assembled from closures
pub struct FnJob<T, A> {
    query: QueryFn<T>,
    reduce: ReduceFn<A, T>,
    partition: Option<PartitionFn>,
}

impl<T, A> FnJob<T, A>
where
    T: Send + 'static,
    A: Send + 'static,
{
    pub fn new<Q, Fut, R>(query: Q, reduce: R) -> Self
    where
        Q: Fn(TimeRange) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        R: Fn(A, T) -> anyhow::Result<A> + Send + Sync + 'static,
    {
        Self {
            query: Arc::new(move |range| query(range).boxed()),
            reduce: Arc::new(reduce),
            partition: None,
        }
    }

    /// Attach a custom partition function
    pub fn with_partition<P>(mut self, partition: P) -> Self
    where
        P: Fn(DateTime<Utc>, DateTime<Utc>) -> Vec<TimeRange> + Send + Sync + 'static,
    {
        self.partition = Some(Arc::new(partition));
        self
    }

    pub fn has_partition(&self) -> bool {
        self.partition.is_some()
    }
}

impl<T, A> Clone for FnJob<T, A> {
    fn clone(&self) -> Self {
        Self {
            query: Arc::clone(&self.query),
            reduce: Arc::clone(&self.reduce),
            partition: self.partition.clone(),
        }
    }
}

impl<T, A> std::fmt::Debug for FnJob<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnJob")
            .field("query", &"<function>")
            .field("reduce", &"<function>")
            .field("partition", &self.partition.as_ref().map(|_| "<function>"))
            .finish()
    }
}

#[async_trait]
impl<T, A> RangeJob for FnJob<T, A>
where
    T: Send + 'static,
    A: Send + 'static,
{
    type Output = T;
    type Accumulator = A;

    fn partition(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Vec<TimeRange>> {
        self.partition.as_ref().map(|partition| partition(start, end))
    }

    async fn query(&self, range: TimeRange) -> anyhow::Result<T> {
        (self.query)(range).await
    }

    fn reduce(&self, accumulator: A, value: T) -> anyhow::Result<A> {
        (self.reduce)(accumulator, value)
    }
}
