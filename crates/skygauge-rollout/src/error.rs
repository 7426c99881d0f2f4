//! Rollout policy errors.

use thiserror::Error;

pub type PolicyResult<T> = Result<T, PolicyError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("tried to find one cluster resource with ID {cluster_id:?}, found {found}")]
    ClusterNotFound { cluster_id: String, found: usize },

    #[error("invalid max batch size {value:?}: neither an integer nor a number")]
    Batch { value: String },

    #[error("invalid pause time {value:?}: {reason}")]
    Pause { value: String, reason: &'static str },
}
