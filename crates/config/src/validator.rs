//! Configuration validation
//!
//! Validation distinguishes hard errors (the process must not start) from
//! warnings (suspicious but workable values).

use crate::{AuctionHouseConfig, StorageBackend};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("House name is required")]
    MissingHouseName,

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("Postgres backend selected but postgres_url is not set")]
    MissingPostgresUrl,

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),
}

/// A non-fatal validation finding
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

/// Outcome of validating a configuration
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a configuration, collecting all findings rather than stopping
/// at the first.
pub fn validate_config(config: &AuctionHouseConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.house.name.trim().is_empty() {
        report.errors.push(ValidationError::MissingHouseName);
    }

    if config.cache.full_projection_ttl_seconds == 0 {
        report.errors.push(ValidationError::InvalidPositiveInteger {
            field: "cache.full_projection_ttl_seconds".to_string(),
        });
    }

    if config.cache.recent_bids_ttl_seconds == 0 {
        report.errors.push(ValidationError::InvalidPositiveInteger {
            field: "cache.recent_bids_ttl_seconds".to_string(),
        });
    }

    if config.cache.max_entries == 0 {
        report.errors.push(ValidationError::InvalidPositiveInteger {
            field: "cache.max_entries".to_string(),
        });
    }

    if config.bids.recent_limit == 0 {
        report.errors.push(ValidationError::InvalidPositiveInteger {
            field: "bids.recent_limit".to_string(),
        });
    }

    if config.storage.backend == StorageBackend::Postgres && config.storage.postgres_url.is_none() {
        report.errors.push(ValidationError::MissingPostgresUrl);
    }

    if config.observability.log_format.parse::<LogFormatCheck>().is_err() {
        report.errors.push(ValidationError::InvalidLogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if config.cache.recent_bids_ttl_seconds > config.cache.full_projection_ttl_seconds {
        report.warnings.push(ValidationWarning {
            field: "cache.recent_bids_ttl_seconds".to_string(),
            message: "recent-bids TTL exceeds the full-projection TTL; the bid list will go stale slower than the view embedding it".to_string(),
        });
    }

    if config.bids.recent_limit > 100 {
        report.warnings.push(ValidationWarning {
            field: "bids.recent_limit".to_string(),
            message: format!(
                "recent_limit of {} is large for a hot read path",
                config.bids.recent_limit
            ),
        });
    }

    report
}

// Mirrors observability::LogFormat without taking the dependency; the
// validator only needs to know which names are legal.
struct LogFormatCheck;

impl std::str::FromStr for LogFormatCheck {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "json" | "compact" => Ok(LogFormatCheck),
            _ => Err(()),
        }
    }
}
