//! Structured error types for range runs
//!
//! Every failure a run can observe is funnelled into [`RunnerError`]. Errors
//! raised by caller-supplied query and reduce operations are kept verbatim as
//! the `source` so callers can downcast back to their own types.

use crate::time::TimeRange;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Invalid runner configuration: {reason}")]
    Configuration {
        reason: String,
        field: String,
        value: String,
    },

    #[error("Query failed for range {range}: {source}")]
    Query {
        range: TimeRange,
        #[source]
        source: anyhow::Error,
    },

    #[error("Reduction failed for range {range}: {source}")]
    Reduction {
        range: TimeRange,
        #[source]
        source: anyhow::Error,
    },

    #[error("Worker terminated without reporting: {reason}")]
    WorkerLost { reason: String },

    #[error("Failed to load configuration from {path}: {reason}")]
    ConfigLoad {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl RunnerError {
    /// Build a configuration error for the named field
    pub fn configuration(
        reason: impl Into<String>,
        field: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self::Configuration {
            reason: reason.into(),
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// The range whose query or reduction failed, if any
    pub fn range(&self) -> Option<&TimeRange> {
        match self {
            Self::Query { range, .. } | Self::Reduction { range, .. } => Some(range),
            _ => None,
        }
    }

    /// The caller's original error for query and reduction failures
    pub fn caller_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Query { source, .. } | Self::Reduction { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[derive(Debug, thiserror::Error)]
    #[error("upstream unavailable")]
    struct UpstreamError;

    fn sample_range() -> TimeRange {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2020, 1, 1, 1, 0, 0).unwrap();
        TimeRange::new(start, end).unwrap()
    }

    #[test]
    fn test_query_error_keeps_caller_error() {
        let err = RunnerError::Query {
            range: sample_range(),
            source: UpstreamError.into(),
        };

        let source = err.caller_error().unwrap();
        assert!(source.downcast_ref::<UpstreamError>().is_some());
        assert_eq!(err.range(), Some(&sample_range()));
        assert!(err.to_string().contains("upstream unavailable"));
    }

    #[test]
    fn test_configuration_error_fields() {
        let err = RunnerError::configuration("pool size must be positive", "pool_size", 0);

        match &err {
            RunnerError::Configuration { field, value, .. } => {
                assert_eq!(field, "pool_size");
                assert_eq!(value, "0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_configuration());
        assert!(err.caller_error().is_none());
        assert!(err.range().is_none());
    }
}
