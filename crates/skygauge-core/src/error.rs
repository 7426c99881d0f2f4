//! Error types for skygauge-core.

use std::path::PathBuf;

use thiserror::Error;

pub type CapacityResult<T> = Result<T, CapacityError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from CIDR capacity calculation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CapacityError {
    #[error("invalid CIDR {cidr:?}: {reason}")]
    Parse { cidr: String, reason: &'static str },

    #[error("CIDR {cidr:?} has no usable addresses (prefix /{prefix})")]
    NoUsableAddresses { cidr: String, prefix: u8 },
}

/// Errors from loading or validating `skygauge.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors from loading the static inventory document.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("failed to read inventory {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse inventory: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate account in inventory: {0}")]
    DuplicateAccount(String),
}
