//! Update collector: rollout policy gauges per node pool.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use skygauge_core::{ClusterResource, LABEL_CLUSTER, LabelSelector, NodePoolResource};
use skygauge_metrics::{Collector, Desc, MetricSink};
use skygauge_rollout::{NodePoolPolicy, resolve, select_owning_cluster};

use crate::NAMESPACE;
use crate::api::ClusterApi;
use crate::error::{CollectorError, CollectorResult};

const SUBSYSTEM: &str = "update";
const LABELS: &[&str] = &["cluster_id", "node_pool_id"];

static MAX_BATCH_PERCENTAGE_DESC: LazyLock<Desc> = LazyLock::new(|| {
    Desc::new(
        NAMESPACE,
        SUBSYSTEM,
        "max_batch_percentage",
        "Max percentage of worker nodes that can be rolled at once during an upgrade for a given node pool.",
        LABELS,
    )
});

static MAX_BATCH_NUMBER_DESC: LazyLock<Desc> = LazyLock::new(|| {
    Desc::new(
        NAMESPACE,
        SUBSYSTEM,
        "max_batch_number",
        "Max number of worker nodes that can be rolled at once during an upgrade for a given node pool.",
        LABELS,
    )
});

static PAUSE_TIME_SECONDS_DESC: LazyLock<Desc> = LazyLock::new(|| {
    Desc::new(
        NAMESPACE,
        SUBSYSTEM,
        "pause_time_seconds",
        "The pause time in seconds between rolling batches of worker nodes during an upgrade for a given node pool.",
        LABELS,
    )
});

#[derive(Clone, Default)]
pub struct UpdateConfig {
    pub cluster_api: Option<Arc<dyn ClusterApi>>,
}

pub struct UpdateCollector {
    cluster_api: Arc<dyn ClusterApi>,
}

impl UpdateCollector {
    pub fn new(config: UpdateConfig) -> CollectorResult<Self> {
        let cluster_api = config.cluster_api.ok_or_else(|| {
            CollectorError::InvalidConfig("UpdateConfig.cluster_api must not be empty".to_string())
        })?;
        Ok(Self { cluster_api })
    }

    /// Resolve every node pool, then emit. Nothing is emitted if any node
    /// pool fails to resolve.
    pub async fn scrape(&self, sink: &MetricSink) -> CollectorResult<()> {
        let policies = self.policies().await?;

        for policy in &policies {
            let labels = [policy.cluster_id.as_str(), policy.node_pool_id.as_str()];
            sink.gauge(&MAX_BATCH_PERCENTAGE_DESC, policy.values.batch_percentage, labels)?;
            sink.gauge(&MAX_BATCH_NUMBER_DESC, policy.values.batch_number, labels)?;
            sink.gauge(&PAUSE_TIME_SECONDS_DESC, policy.values.pause_seconds, labels)?;
        }
        Ok(())
    }

    async fn policies(&self) -> CollectorResult<Vec<NodePoolPolicy>> {
        let node_pools = self.cluster_api.list_node_pools().await?;
        let now = Utc::now();
        debug!(node_pools = node_pools.len(), "resolving rollout policies");

        let mut policies = Vec::with_capacity(node_pools.len());
        for node_pool in &node_pools {
            let policy = resolve(node_pool, || self.owning_cluster(node_pool), now)
                .await
                .map_err(|source| CollectorError::NodePool {
                    node_pool: node_pool.metadata.name.clone(),
                    source: Box::new(source),
                })?;
            policies.push(policy);
        }
        Ok(policies)
    }

    async fn owning_cluster(&self, node_pool: &NodePoolResource) -> CollectorResult<ClusterResource> {
        let cluster_id = node_pool.cluster_id();
        let selector = LabelSelector::new().with(LABEL_CLUSTER, cluster_id);
        let candidates = self.cluster_api.list_clusters(&selector).await?;
        Ok(select_owning_cluster(cluster_id, candidates)?)
    }
}

#[async_trait]
impl Collector for UpdateCollector {
    fn name(&self) -> &'static str {
        "update"
    }

    fn describe(&self) -> Vec<&'static Desc> {
        vec![
            &*MAX_BATCH_PERCENTAGE_DESC,
            &*MAX_BATCH_NUMBER_DESC,
            &*PAUSE_TIME_SECONDS_DESC,
        ]
    }

    async fn collect(&self, sink: &MetricSink) -> anyhow::Result<()> {
        Ok(self.scrape(sink).await?)
    }
}
