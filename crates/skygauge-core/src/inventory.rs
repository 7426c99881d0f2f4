//! Static inventory document.
//!
//! A JSON snapshot of what the cloud and cluster APIs would return:
//! accounts with their managed clusters and subnets, plus node pool and
//! cluster resources. Used to run the collectors without live clients.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;
use crate::types::{ClusterResource, NodePoolResource, RawSubnet};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub accounts: Vec<AccountInventory>,
    #[serde(default)]
    pub node_pools: Vec<NodePoolResource>,
    #[serde(default)]
    pub clusters: Vec<ClusterResource>,
}

/// One cloud account and everything reachable with its credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountInventory {
    pub id: String,
    /// Cluster IDs whose credentials resolve to this account.
    #[serde(default)]
    pub clusters: Vec<String>,
    #[serde(default)]
    pub subnets: Vec<RawSubnet>,
    /// When set, every cloud API call for this account fails with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
}

impl Inventory {
    pub fn from_file(path: &Path) -> Result<Self, InventoryError> {
        let content = std::fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, InventoryError> {
        let inventory: Inventory = serde_json::from_str(content)?;

        let mut seen = HashSet::new();
        for account in &inventory.accounts {
            if !seen.insert(account.id.as_str()) {
                return Err(InventoryError::DuplicateAccount(account.id.clone()));
            }
        }

        Ok(inventory)
    }

    /// All cluster IDs across accounts, in document order.
    pub fn managed_clusters(&self) -> Vec<String> {
        self.accounts
            .iter()
            .flat_map(|a| a.clusters.iter().cloned())
            .collect()
    }

    pub fn account(&self, id: &str) -> Option<&AccountInventory> {
        self.accounts.iter().find(|a| a.id == id)
    }
}
