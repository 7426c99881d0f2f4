//! Collaborators backed by a static [`Inventory`] document.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use async_trait::async_trait;

use skygauge_core::{
    AccountInventory, ClusterResource, Inventory, InventoryError, LabelSelector, NodePoolResource,
    RawSubnet,
};

use crate::api::{AccountClients, AccountDiscovery, CloudApi, ClusterApi};

/// Serves discovery, cloud and cluster API calls from one inventory.
#[derive(Debug, Clone)]
pub struct StaticInventory {
    inventory: Arc<Inventory>,
}

impl StaticInventory {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory: Arc::new(inventory),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, InventoryError> {
        Ok(Self::new(Inventory::from_file(path)?))
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }
}

struct StaticCloud {
    account: AccountInventory,
}

#[async_trait]
impl CloudApi for StaticCloud {
    async fn describe_subnets(&self) -> anyhow::Result<Vec<RawSubnet>> {
        if let Some(reason) = &self.account.fail {
            bail!("describe subnets in account {}: {reason}", self.account.id);
        }
        Ok(self.account.subnets.clone())
    }
}

#[async_trait]
impl AccountDiscovery for StaticInventory {
    async fn list_managed_clusters(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.inventory.managed_clusters())
    }

    async fn resolve_api_clients(&self, clusters: &[String]) -> anyhow::Result<Vec<AccountClients>> {
        let mut clients: Vec<AccountClients> = Vec::new();
        for cluster in clusters {
            let account = self
                .inventory
                .accounts
                .iter()
                .find(|a| a.clusters.contains(cluster))
                .ok_or_else(|| anyhow!("no account credentials for cluster {cluster}"))?;

            if clients.iter().any(|c| c.credential == account.id) {
                continue;
            }
            clients.push(AccountClients {
                credential: account.id.clone(),
                cloud: Arc::new(StaticCloud {
                    account: account.clone(),
                }),
            });
        }
        Ok(clients)
    }

    async fn account_id(&self, clients: &AccountClients) -> anyhow::Result<String> {
        self.inventory
            .account(&clients.credential)
            .map(|a| a.id.clone())
            .ok_or_else(|| anyhow!("unknown credential {}", clients.credential))
    }
}

#[async_trait]
impl ClusterApi for StaticInventory {
    async fn list_node_pools(&self) -> anyhow::Result<Vec<NodePoolResource>> {
        Ok(self.inventory.node_pools.clone())
    }

    async fn list_clusters(&self, selector: &LabelSelector) -> anyhow::Result<Vec<ClusterResource>> {
        Ok(self
            .inventory
            .clusters
            .iter()
            .filter(|c| selector.matches(&c.metadata))
            .cloned()
            .collect())
    }
}
