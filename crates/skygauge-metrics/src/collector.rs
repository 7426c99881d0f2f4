//! The describe/collect contract.

use async_trait::async_trait;

use crate::desc::Desc;
use crate::sink::MetricSink;

/// A source of gauge samples, driven by the exposition server.
///
/// `collect` may write samples before failing; whatever was emitted stays
/// on the sink, but the scrape as a whole is reported failed.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Short name used in logs and failure reports.
    fn name(&self) -> &'static str;

    /// Every descriptor this collector may emit samples for.
    fn describe(&self) -> Vec<&'static Desc>;

    async fn collect(&self, sink: &MetricSink) -> anyhow::Result<()>;
}
