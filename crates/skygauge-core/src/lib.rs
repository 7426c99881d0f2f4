//! skygauge-core — shared types for the skygauge collectors.
//!
//! - **`types`** — raw cloud subnets, cluster resources, well-known tag,
//!   label and annotation keys
//! - **`capacity`** — usable-address percentage for a CIDR block
//! - **`config`** — `skygauge.toml` parsing and validation
//! - **`inventory`** — static JSON inventory of accounts and resources

pub mod capacity;
pub mod config;
pub mod error;
pub mod inventory;
pub mod types;

pub use capacity::available_percentage;
pub use config::SkygaugeConfig;
pub use error::{CapacityError, CapacityResult, ConfigError, ConfigResult, InventoryError};
pub use inventory::{AccountInventory, Inventory};
pub use types::*;
