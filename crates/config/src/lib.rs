//! Configuration for OpenAuction
//!
//! The configuration file is YAML. Every field has a default, so an empty
//! document is a valid configuration.

use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod validator;

pub use parser::{generate_default_config, load_config, save_config};
pub use validator::{validate_config, ValidationError, ValidationReport};

use defaults::*;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuctionHouseConfig {
    #[serde(default)]
    pub house: HouseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub bids: BidConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Identity of this auction house deployment
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HouseConfig {
    #[serde(default = "default_house_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Default for HouseConfig {
    fn default() -> Self {
        Self {
            name: default_house_name(),
            description: String::new(),
        }
    }
}

/// Cached-view settings
///
/// The two cached views carry deliberately different TTLs: the full
/// projection changes rarely outside of closure, the recent-bid list
/// changes with every accepted bid.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(rename = "full_projection_ttl_seconds")]
    #[serde(default = "default_full_projection_ttl_seconds")]
    pub full_projection_ttl_seconds: u64,
    #[serde(rename = "recent_bids_ttl_seconds")]
    #[serde(default = "default_recent_bids_ttl_seconds")]
    pub recent_bids_ttl_seconds: u64,
    #[serde(rename = "max_entries")]
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            full_projection_ttl_seconds: default_full_projection_ttl_seconds(),
            recent_bids_ttl_seconds: default_recent_bids_ttl_seconds(),
            max_entries: default_max_entries(),
        }
    }
}

/// Bid handling settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BidConfig {
    /// How many ledger entries the recent-bids view returns
    #[serde(rename = "recent_limit")]
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for BidConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Connection string, required for the postgres backend
    #[serde(default)]
    pub postgres_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            postgres_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Postgres => write!(f, "postgres"),
        }
    }
}

/// Logging and metrics settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Prometheus exporter port; metrics are disabled when absent
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            metrics_port: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_valid() {
        let config: AuctionHouseConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.cache.full_projection_ttl_seconds, 600);
        assert_eq!(config.cache.recent_bids_ttl_seconds, 10);
        assert_eq!(config.bids.recent_limit, 20);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_partial_override() {
        let yaml = r#"
cache:
  recent_bids_ttl_seconds: 5
storage:
  backend: postgres
  postgres_url: "postgres://localhost/auctions"
"#;
        let config: AuctionHouseConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cache.recent_bids_ttl_seconds, 5);
        // untouched fields keep their defaults
        assert_eq!(config.cache.full_projection_ttl_seconds, 600);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert!(config.storage.postgres_url.is_some());
    }
}
