//! Per-account fan-out.

use std::future::Future;

use tokio::task::JoinSet;
use tracing::debug;

use crate::error::{CollectorError, CollectorResult};

/// Run `task` once per item, all concurrently, and wait for every task.
///
/// Returns the first failure in completion order. Later failures are only
/// logged. Work done by tasks that succeeded is kept either way. A task
/// that panics counts as a failure.
pub async fn fan_out<T, F, Fut>(items: impl IntoIterator<Item = T>, task: F) -> CollectorResult<()>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = CollectorResult<()>> + Send + 'static,
{
    let mut join_set = JoinSet::new();
    for item in items {
        join_set.spawn(task(item));
    }

    let mut first_error = None;
    while let Some(joined) = join_set.join_next().await {
        let result = joined.unwrap_or_else(|e| Err(CollectorError::TaskPanicked(e.to_string())));
        if let Err(err) = result {
            if first_error.is_none() {
                first_error = Some(err);
            } else {
                debug!(error = %format!("{:#}", anyhow::Error::from(err)), "additional fan-out failure");
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
