//! Observability infrastructure for OpenAuction
//!
//! Logging initialization built on `tracing`, and the Prometheus metrics
//! exporter. Domain-specific metric sets live next to the code they
//! measure (see `auction::metrics`).

pub mod logging;
pub mod metrics;

pub use self::logging::{init_default_logging, init_logging, LogFormat};
pub use self::metrics::init_metrics;
