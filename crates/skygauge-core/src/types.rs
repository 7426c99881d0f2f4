//! Shared types used across skygauge crates.
//!
//! Mirrors the shapes returned by the cloud API (`RawSubnet`) and the
//! cluster API (`NodePoolResource`, `ClusterResource`) closely enough that
//! real clients can be adapted with a field-by-field copy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// Cloud resource tags.
pub const TAG_CLUSTER: &str = "giantswarm.io/cluster";
pub const TAG_INSTALLATION: &str = "giantswarm.io/installation";
pub const TAG_ORGANIZATION: &str = "giantswarm.io/organization";
pub const TAG_STACK: &str = "giantswarm.io/stack";

// Cluster API labels.
pub const LABEL_CLUSTER: &str = "giantswarm.io/cluster";
pub const LABEL_MACHINE_DEPLOYMENT: &str = "giantswarm.io/machine-deployment";

// Cluster API annotations controlling node pool rollouts.
pub const ANNOTATION_UPDATE_MAX_BATCH_SIZE: &str = "alpha.aws.giantswarm.io/update-max-batch-size";
pub const ANNOTATION_UPDATE_PAUSE_TIME: &str = "alpha.aws.giantswarm.io/update-pause-time";

/// A key/value tag attached to a cloud resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// A subnet as described by the cloud API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSubnet {
    pub subnet_id: String,
    pub available_ip_address_count: i64,
    pub cidr_block: String,
    pub availability_zone: String,
    pub owner_id: String,
    pub vpc_id: String,
    pub state: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Name, labels and annotations of a cluster API resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Label value, or `""` when unset.
    pub fn label(&self, key: &str) -> &str {
        self.labels.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Annotation value. Empty values count as unset.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Autoscaling bounds of a node pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scaling {
    pub min: i32,
    pub max: i32,
}

/// Node pool custom resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePoolResource {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub scaling: Scaling,
}

impl NodePoolResource {
    pub fn cluster_id(&self) -> &str {
        self.metadata.label(LABEL_CLUSTER)
    }

    pub fn node_pool_id(&self) -> &str {
        self.metadata.label(LABEL_MACHINE_DEPLOYMENT)
    }
}

/// Cluster custom resource owning node pools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterResource {
    pub metadata: ObjectMeta,
}

/// Equality-based label selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    pub match_labels: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.match_labels.insert(key.to_string(), value.to_string());
        self
    }

    /// An empty selector matches everything.
    pub fn matches(&self, meta: &ObjectMeta) -> bool {
        self.match_labels
            .iter()
            .all(|(k, v)| meta.labels.get(k) == Some(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(labels: &[(&str, &str)], annotations: &[(&str, &str)]) -> ObjectMeta {
        ObjectMeta {
            name: "np-1".to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn empty_annotation_counts_as_unset() {
        let m = meta(&[], &[(ANNOTATION_UPDATE_PAUSE_TIME, "")]);
        assert_eq!(m.annotation(ANNOTATION_UPDATE_PAUSE_TIME), None);
        assert_eq!(m.annotation(ANNOTATION_UPDATE_MAX_BATCH_SIZE), None);
    }

    #[test]
    fn missing_label_is_empty() {
        let m = meta(&[(LABEL_CLUSTER, "a1b2c")], &[]);
        assert_eq!(m.label(LABEL_CLUSTER), "a1b2c");
        assert_eq!(m.label(LABEL_MACHINE_DEPLOYMENT), "");
    }

    #[test]
    fn selector_matching() {
        let m = meta(&[(LABEL_CLUSTER, "a1b2c"), ("team", "x")], &[]);
        assert!(LabelSelector::new().matches(&m));
        assert!(LabelSelector::new().with(LABEL_CLUSTER, "a1b2c").matches(&m));
        assert!(!LabelSelector::new().with(LABEL_CLUSTER, "zzz").matches(&m));
        assert!(!LabelSelector::new().with("missing", "x").matches(&m));
    }
}
