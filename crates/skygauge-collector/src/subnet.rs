//! Subnet collector.
//!
//! Emits one `aws_operator_subnet_available_ips` gauge per subnet tagged
//! with this installation. Each account's subnet list is cached as a JSON
//! snapshot, so a scrape only calls the cloud API for accounts whose
//! snapshot expired or was empty.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use skygauge_cache::{CacheStats, ExpiringCache};
use skygauge_core::{
    RawSubnet, TAG_CLUSTER, TAG_INSTALLATION, TAG_ORGANIZATION, TAG_STACK, available_percentage,
};
use skygauge_metrics::{Collector, Desc, MetricSink};

use crate::NAMESPACE;
use crate::api::{AccountClients, AccountDiscovery};
use crate::error::{CollectorError, CollectorResult};
use crate::fanout::fan_out;

pub const DEFAULT_SUBNET_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

const CACHE_KEY_PREFIX: &str = "__SubnetCache__";

// Tag keys under which the subnet's own attributes are stored in a snapshot.
const TAG_CIDR_BLOCK: &str = "CidrBlock";
const TAG_AVAILABILITY_ZONE: &str = "AvailabilityZone";
const TAG_OWNER_ID: &str = "OwnerId";
const TAG_VPC_ID: &str = "VpcId";
const TAG_STATE: &str = "State";

static SUBNETS_DESC: LazyLock<Desc> = LazyLock::new(|| {
    Desc::new(
        NAMESPACE,
        "subnet",
        "available_ips",
        "Subnet information.",
        &[
            "account_id",
            "cidr",
            "cluster_id",
            "id",
            "installation",
            "organization",
            "stack",
            "state",
            "availability_zone",
            "account",
            "vpc",
        ],
    )
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SubnetSnapshot {
    subnets: Vec<SubnetRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SubnetRecord {
    name: String,
    available_ips: i64,
    tags: BTreeMap<String, String>,
}

impl SubnetRecord {
    /// Flatten a raw subnet. Resource tags override the built-in attribute
    /// keys when they collide.
    fn from_raw(raw: RawSubnet) -> Self {
        let mut tags = BTreeMap::from([
            (TAG_CIDR_BLOCK.to_string(), raw.cidr_block),
            (TAG_AVAILABILITY_ZONE.to_string(), raw.availability_zone),
            (TAG_OWNER_ID.to_string(), raw.owner_id),
            (TAG_VPC_ID.to_string(), raw.vpc_id),
            (TAG_STATE.to_string(), raw.state),
        ]);
        tags.extend(raw.tags.into_iter().map(|t| (t.key, t.value)));

        Self {
            name: raw.subnet_id,
            available_ips: raw.available_ip_address_count,
            tags,
        }
    }

    fn tag(&self, key: &str) -> &str {
        self.tags.get(key).map(String::as_str).unwrap_or_default()
    }

    fn label_values<'a>(&'a self, account: &'a str, installation: &'a str) -> [&'a str; 11] {
        [
            account,
            self.tag(TAG_CIDR_BLOCK),
            self.tag(TAG_CLUSTER),
            &self.name,
            installation,
            self.tag(TAG_ORGANIZATION),
            self.tag(TAG_STACK),
            self.tag(TAG_STATE),
            self.tag(TAG_AVAILABILITY_ZONE),
            self.tag(TAG_OWNER_ID),
            self.tag(TAG_VPC_ID),
        ]
    }
}

impl SubnetSnapshot {
    fn for_installation(raw: Vec<RawSubnet>, installation: &str) -> Self {
        let subnets = raw
            .into_iter()
            .map(SubnetRecord::from_raw)
            .filter(|s| s.tag(TAG_INSTALLATION) == installation)
            .collect();
        Self { subnets }
    }
}

/// JSON snapshots in an [`ExpiringCache`], keyed per account.
struct SubnetCache {
    cache: ExpiringCache,
}

impl SubnetCache {
    fn new(ttl: Duration) -> Self {
        Self {
            cache: ExpiringCache::with_default_ttl(ttl),
        }
    }

    fn key(account: &str) -> String {
        format!("{CACHE_KEY_PREFIX}{account}")
    }

    /// A stored payload that does not decode is an error, not a miss.
    fn get(&self, account: &str) -> CollectorResult<Option<SubnetSnapshot>> {
        match self.cache.get(&Self::key(account)) {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    fn set(&self, account: &str, snapshot: &SubnetSnapshot) -> CollectorResult<()> {
        let raw = serde_json::to_vec(snapshot)?;
        self.cache.insert(Self::key(account), raw);
        Ok(())
    }
}

/// Settings for [`SubnetCollector::new`].
#[derive(Clone, Default)]
pub struct SubnetConfig {
    pub discovery: Option<Arc<dyn AccountDiscovery>>,
    pub installation_name: String,
    /// Defaults to [`DEFAULT_SUBNET_CACHE_TTL`].
    pub cache_ttl: Option<Duration>,
}

struct Shared {
    cache: SubnetCache,
    discovery: Arc<dyn AccountDiscovery>,
    installation_name: String,
}

pub struct SubnetCollector {
    shared: Arc<Shared>,
}

impl SubnetCollector {
    pub fn new(config: SubnetConfig) -> CollectorResult<Self> {
        let discovery = config.discovery.ok_or_else(|| {
            CollectorError::InvalidConfig("SubnetConfig.discovery must not be empty".to_string())
        })?;
        if config.installation_name.is_empty() {
            return Err(CollectorError::InvalidConfig(
                "SubnetConfig.installation_name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            shared: Arc::new(Shared {
                cache: SubnetCache::new(config.cache_ttl.unwrap_or(DEFAULT_SUBNET_CACHE_TTL)),
                discovery,
                installation_name: config.installation_name,
            }),
        })
    }

    /// Collect every account concurrently. The first account failure is
    /// returned once all accounts finished; samples emitted by the other
    /// accounts stay on the sink.
    pub async fn scrape(&self, sink: &MetricSink) -> CollectorResult<()> {
        let discovery = &self.shared.discovery;
        let clusters = discovery.list_managed_clusters().await?;
        let clients = discovery.resolve_api_clients(&clusters).await?;
        debug!(
            clusters = clusters.len(),
            accounts = clients.len(),
            "collecting subnets"
        );

        fan_out(clients, |clients| {
            let shared = Arc::clone(&self.shared);
            let sink = sink.clone();
            async move { shared.collect_account(&clients, &sink).await }
        })
        .await
    }

    /// Drop expired account snapshots. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.shared.cache.cache.purge_expired()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.shared.cache.cache.stats()
    }
}

impl Shared {
    async fn collect_account(&self, clients: &AccountClients, sink: &MetricSink) -> CollectorResult<()> {
        let account = self.discovery.account_id(clients).await?;
        let result = self.collect_for(&account, clients, sink).await;
        result.map_err(|source| CollectorError::Account {
            account,
            source: Box::new(source),
        })
    }

    async fn collect_for(
        &self,
        account: &str,
        clients: &AccountClients,
        sink: &MetricSink,
    ) -> CollectorResult<()> {
        let snapshot = match self.cache.get(account)? {
            Some(snapshot) if !snapshot.subnets.is_empty() => {
                debug!(account, cache = "hit", subnets = snapshot.subnets.len(), "subnet snapshot");
                snapshot
            }
            _ => {
                let raw = clients.cloud.describe_subnets().await?;
                let fetched = raw.len();
                let snapshot = SubnetSnapshot::for_installation(raw, &self.installation_name);
                self.cache.set(account, &snapshot)?;
                debug!(
                    account,
                    cache = "miss",
                    fetched,
                    subnets = snapshot.subnets.len(),
                    "subnet snapshot"
                );
                snapshot
            }
        };

        for subnet in &snapshot.subnets {
            trace!(
                account,
                subnet = %subnet.name,
                utilization = available_percentage(subnet.tag(TAG_CIDR_BLOCK), subnet.available_ips).ok(),
                "subnet capacity"
            );
            sink.gauge(
                &SUBNETS_DESC,
                subnet.available_ips as f64,
                subnet.label_values(account, &self.installation_name),
            )?;
        }
        Ok(())
    }
}

#[async_trait]
impl Collector for SubnetCollector {
    fn name(&self) -> &'static str {
        "subnet"
    }

    fn describe(&self) -> Vec<&'static Desc> {
        vec![&*SUBNETS_DESC]
    }

    async fn collect(&self, sink: &MetricSink) -> anyhow::Result<()> {
        Ok(self.scrape(sink).await?)
    }
}
