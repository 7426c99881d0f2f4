//! Collector error types.

use skygauge_metrics::MetricsError;
use skygauge_rollout::PolicyError;
use thiserror::Error;

pub type CollectorResult<T> = Result<T, CollectorError>;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("invalid collector config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("malformed subnet snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("account {account}")]
    Account {
        account: String,
        source: Box<CollectorError>,
    },

    #[error("node pool {node_pool}")]
    NodePool {
        node_pool: String,
        source: Box<CollectorError>,
    },

    #[error("collection task panicked: {0}")]
    TaskPanicked(String),
}

impl CollectorError {
    /// The innermost error, past any account or node pool context.
    pub fn root(&self) -> &CollectorError {
        match self {
            CollectorError::Account { source, .. } | CollectorError::NodePool { source, .. } => {
                source.root()
            }
            other => other,
        }
    }
}
