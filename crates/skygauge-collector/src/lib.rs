//! skygauge-collector — the subnet and update collectors.
//!
//! # Architecture
//!
//! ```text
//! SubnetCollector::collect
//!   ├── AccountDiscovery  → managed clusters → per-account API clients
//!   └── fan_out (one task per account)
//!         ├── SubnetCache hit  → emit
//!         └── miss → CloudApi::describe_subnets → filter → cache → emit
//!
//! UpdateCollector::collect
//!   ├── ClusterApi::list_node_pools
//!   ├── resolve policy per node pool (owning cluster looked up on demand)
//!   └── emit three gauges per node pool once every policy resolved
//! ```

pub mod api;
pub mod error;
pub mod fanout;
pub mod inventory;
pub mod subnet;
pub mod update;

pub use api::{AccountClients, AccountDiscovery, CloudApi, ClusterApi};
pub use error::{CollectorError, CollectorResult};
pub use fanout::fan_out;
pub use inventory::StaticInventory;
pub use subnet::{DEFAULT_SUBNET_CACHE_TTL, SubnetCollector, SubnetConfig};
pub use update::{UpdateCollector, UpdateConfig};

/// Metric namespace shared by every collector.
pub const NAMESPACE: &str = "aws_operator";
