//! Collaborator interfaces.
//!
//! Cloud and cluster API clients are injected through these traits so the
//! collectors never depend on a concrete provider SDK. Failures are carried
//! as `anyhow::Error` and surface as [`CollectorError::Upstream`].
//!
//! [`CollectorError::Upstream`]: crate::CollectorError::Upstream

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use skygauge_core::{ClusterResource, LabelSelector, NodePoolResource, RawSubnet};

/// Cloud API calls made on behalf of one account.
#[async_trait]
pub trait CloudApi: Send + Sync {
    async fn describe_subnets(&self) -> anyhow::Result<Vec<RawSubnet>>;
}

/// API clients bound to one set of account credentials.
#[derive(Clone)]
pub struct AccountClients {
    /// Identifies the credentials the clients were built from.
    pub credential: String,
    pub cloud: Arc<dyn CloudApi>,
}

impl fmt::Debug for AccountClients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountClients")
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

/// Finds the clusters under management and the accounts they live in.
#[async_trait]
pub trait AccountDiscovery: Send + Sync {
    async fn list_managed_clusters(&self) -> anyhow::Result<Vec<String>>;

    /// One entry per distinct account backing `clusters`.
    async fn resolve_api_clients(&self, clusters: &[String]) -> anyhow::Result<Vec<AccountClients>>;

    async fn account_id(&self, clients: &AccountClients) -> anyhow::Result<String>;
}

/// Read access to node pool and cluster resources.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_node_pools(&self) -> anyhow::Result<Vec<NodePoolResource>>;

    async fn list_clusters(&self, selector: &LabelSelector) -> anyhow::Result<Vec<ClusterResource>>;
}
