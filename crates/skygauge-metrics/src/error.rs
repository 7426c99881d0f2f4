//! Metrics error types.

use thiserror::Error;

pub type MetricsResult<T> = Result<T, MetricsError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    #[error("metric {metric}: expected {expected} label values, got {got}")]
    LabelMismatch {
        metric: String,
        expected: usize,
        got: usize,
    },

    #[error("metric sink closed")]
    SinkClosed,

    #[error("descriptor already registered: {0}")]
    DuplicateDescriptor(String),

    #[error("encode {metric}: {reason}")]
    Encode { metric: String, reason: String },
}
