//! Common test utilities and helpers

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use range_runner::TimeRange;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn bounds(ranges: &[TimeRange]) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    ranges.iter().map(|r| (r.start(), r.end())).collect()
}

/// Tracks how many queries were started and how many are still running
#[derive(Clone, Default)]
pub struct QueryProbe {
    started: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
}

impl QueryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a query start, returning its zero-based invocation number
    pub fn enter(&self) -> usize {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.started.fetch_add(1, Ordering::SeqCst)
    }

    pub fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}
