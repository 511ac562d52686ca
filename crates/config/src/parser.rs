//! Configuration file loading and saving

use crate::AuctionHouseConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Load a configuration file from disk
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AuctionHouseConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    let config: AuctionHouseConfig =
        serde_yaml::from_str(&content).with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Produce a configuration populated entirely with defaults
pub fn generate_default_config() -> AuctionHouseConfig {
    AuctionHouseConfig::default()
}

/// Write a configuration file to disk
pub fn save_config<P: AsRef<Path>>(config: &AuctionHouseConfig, path: P) -> Result<()> {
    let path = path.as_ref();

    let yaml = serde_yaml::to_string(config).with_context(|| "Failed to serialize configuration")?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
    }

    fs::write(path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration written to: {:?}", path);
    Ok(())
}
