//! Prometheus metrics exporter
//!
//! Installs the global `metrics` recorder backed by a Prometheus HTTP
//! endpoint. Metric sets themselves are defined by the crates that emit
//! them; without an installed recorder those emissions are no-ops, so the
//! exporter is strictly optional.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter
///
/// Starts an HTTP listener on the given port exposing metrics at
/// `/metrics`.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}
