//! skygauge.toml configuration parser.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkygaugeConfig {
    pub installation: InstallationConfig,
    #[serde(default)]
    pub exposition: ExpositionConfig,
    #[serde(default)]
    pub collectors: CollectorsConfig,
    pub inventory: InventoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationConfig {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpositionConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    pub scrape_timeout: Option<String>,
}

impl Default for ExpositionConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            scrape_timeout: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorsConfig {
    #[serde(default = "enabled")]
    pub subnet: bool,
    #[serde(default = "enabled")]
    pub update: bool,
    #[serde(default = "default_subnet_cache_ttl")]
    pub subnet_cache_ttl: String,
}

impl Default for CollectorsConfig {
    fn default() -> Self {
        Self {
            subnet: true,
            update: true,
            subnet_cache_ttl: default_subnet_cache_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    pub path: PathBuf,
}

fn default_listen() -> String {
    "0.0.0.0:9090".to_string()
}

fn default_subnet_cache_ttl() -> String {
    "5m".to_string()
}

fn enabled() -> bool {
    true
}

impl SkygaugeConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: SkygaugeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.installation.name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "installation.name must not be empty".to_string(),
            ));
        }
        self.listen_addr()?;
        self.scrape_timeout()?;
        self.subnet_cache_ttl()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> ConfigResult<SocketAddr> {
        self.exposition.listen.parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "exposition.listen is not a socket address: {}",
                self.exposition.listen
            ))
        })
    }

    pub fn scrape_timeout(&self) -> ConfigResult<Option<Duration>> {
        self.exposition
            .scrape_timeout
            .as_deref()
            .map(|s| {
                parse_duration(s).ok_or_else(|| {
                    ConfigError::Invalid(format!("exposition.scrape_timeout is not a duration: {s}"))
                })
            })
            .transpose()
    }

    pub fn subnet_cache_ttl(&self) -> ConfigResult<Duration> {
        let raw = &self.collectors.subnet_cache_ttl;
        parse_duration(raw)
            .filter(|ttl| !ttl.is_zero())
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "collectors.subnet_cache_ttl must be a positive duration: {raw}"
                ))
            })
    }
}

/// Parse a config duration: `"500ms"`, `"30s"`, `"5m"`, `"1h"`, or bare seconds.
///
/// `None` for anything else, including minute or hour counts whose
/// second total overflows `u64`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (digits, unit_secs) = if let Some(ms) = s.strip_suffix("ms") {
        return ms.parse::<u64>().ok().map(Duration::from_millis);
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, 1)
    } else if let Some(mins) = s.strip_suffix('m') {
        (mins, 60)
    } else if let Some(hours) = s.strip_suffix('h') {
        (hours, 3600)
    } else {
        (s, 1)
    };
    let count = digits.parse::<u64>().ok()?;
    count.checked_mul(unit_secs).map(Duration::from_secs)
}
