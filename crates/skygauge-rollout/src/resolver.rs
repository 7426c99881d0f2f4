//! Annotation fallback chain.
//!
//! Batch size and pause time are resolved independently. For each, the
//! first source in [`ANNOTATION_SOURCES`] that sets a non-empty value wins.
//! The owning cluster is only looked up when the node pool leaves at least
//! one of the two unset.

use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::debug;

use skygauge_core::{
    ANNOTATION_UPDATE_MAX_BATCH_SIZE, ANNOTATION_UPDATE_PAUSE_TIME, ClusterResource,
    NodePoolResource, ObjectMeta,
};

use crate::error::{PolicyError, PolicyResult};
use crate::policy::{NodePoolPolicy, policy_values};

pub const DEFAULT_BATCH_SIZE: &str = "0.3";
pub const DEFAULT_PAUSE_TIME: &str = "PT15M";

/// Where a rollout setting was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationSource {
    NodePool,
    Cluster,
    Default,
}

/// Lookup precedence, highest first.
pub const ANNOTATION_SOURCES: [AnnotationSource; 3] = [
    AnnotationSource::NodePool,
    AnnotationSource::Cluster,
    AnnotationSource::Default,
];

/// Raw batch and pause strings with the source each came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutSettings {
    pub batch: String,
    pub batch_source: AnnotationSource,
    pub pause: String,
    pub pause_source: AnnotationSource,
}

#[derive(Default)]
struct Partial {
    batch: Option<(String, AnnotationSource)>,
    pause: Option<(String, AnnotationSource)>,
}

impl Partial {
    fn is_complete(&self) -> bool {
        self.batch.is_some() && self.pause.is_some()
    }

    fn fill(&mut self, batch: Option<&str>, pause: Option<&str>, source: AnnotationSource) {
        if self.batch.is_none() {
            self.batch = batch.map(|v| (v.to_string(), source));
        }
        if self.pause.is_none() {
            self.pause = pause.map(|v| (v.to_string(), source));
        }
    }

    fn fill_from(&mut self, meta: &ObjectMeta, source: AnnotationSource) {
        self.fill(
            meta.annotation(ANNOTATION_UPDATE_MAX_BATCH_SIZE),
            meta.annotation(ANNOTATION_UPDATE_PAUSE_TIME),
            source,
        );
    }
}

/// Walk the fallback chain for `node_pool`.
///
/// `owning_cluster` is awaited at most once, and only when the node pool
/// does not set both values itself. Its error aborts resolution.
pub async fn resolve_settings<F, Fut, E>(
    node_pool: &NodePoolResource,
    owning_cluster: F,
) -> Result<RolloutSettings, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<ClusterResource, E>>,
{
    let mut partial = Partial::default();
    let mut owning_cluster = Some(owning_cluster);

    for source in ANNOTATION_SOURCES {
        if partial.is_complete() {
            break;
        }
        match source {
            AnnotationSource::NodePool => partial.fill_from(&node_pool.metadata, source),
            AnnotationSource::Cluster => {
                if let Some(lookup) = owning_cluster.take() {
                    let cluster = lookup().await?;
                    partial.fill_from(&cluster.metadata, source);
                }
            }
            AnnotationSource::Default => {
                partial.fill(Some(DEFAULT_BATCH_SIZE), Some(DEFAULT_PAUSE_TIME), source)
            }
        }
    }

    let (batch, batch_source) = partial
        .batch
        .unwrap_or_else(|| (DEFAULT_BATCH_SIZE.to_string(), AnnotationSource::Default));
    let (pause, pause_source) = partial
        .pause
        .unwrap_or_else(|| (DEFAULT_PAUSE_TIME.to_string(), AnnotationSource::Default));

    Ok(RolloutSettings {
        batch,
        batch_source,
        pause,
        pause_source,
    })
}

/// Pick the single cluster resource owning a node pool.
pub fn select_owning_cluster(
    cluster_id: &str,
    mut candidates: Vec<ClusterResource>,
) -> PolicyResult<ClusterResource> {
    if candidates.len() != 1 {
        return Err(PolicyError::ClusterNotFound {
            cluster_id: cluster_id.to_string(),
            found: candidates.len(),
        });
    }
    Ok(candidates.remove(0))
}

/// Resolve the full policy of `node_pool` at `now`.
pub async fn resolve<F, Fut, E>(
    node_pool: &NodePoolResource,
    owning_cluster: F,
    now: DateTime<Utc>,
) -> Result<NodePoolPolicy, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<ClusterResource, E>>,
    E: From<PolicyError>,
{
    let settings = resolve_settings(node_pool, owning_cluster).await?;
    let values = policy_values(&settings.batch, &settings.pause, node_pool.scaling, now)?;

    debug!(
        node_pool = node_pool.node_pool_id(),
        cluster_id = node_pool.cluster_id(),
        batch = %settings.batch,
        batch_source = ?settings.batch_source,
        pause = %settings.pause,
        pause_source = ?settings.pause_source,
        "resolved rollout policy"
    );

    Ok(NodePoolPolicy {
        node_pool_id: node_pool.node_pool_id().to_string(),
        cluster_id: node_pool.cluster_id().to_string(),
        values,
    })
}
