//! Prometheus metrics HTTP server.
//!
//! Uses the built-in HTTP listener from `metrics-exporter-prometheus`.
//! Cycle durations are exported as a histogram with explicit buckets
//! rather than a summary.

use std::net::SocketAddr;

use anyhow::Result;
use logiq_core::config::MetricsConfig;
use logiq_core::metrics as m;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

/// Parse `listen_addr:port` into a socket address.
pub fn listen_socket(config: &MetricsConfig) -> Result<SocketAddr> {
    format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics listen address: {e}"))
}

/// Install the global metrics recorder and start the HTTP listener.
///
/// Call at most once per process.
///
/// # Errors
///
/// - unsupported endpoint path
/// - unparsable listen address
/// - socket binding fails or a recorder is already installed
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    if config.endpoint != "/metrics" {
        return Err(anyhow::anyhow!(
            "unsupported metrics endpoint '{}': only '/metrics' is currently supported",
            config.endpoint
        ));
    }

    let addr = listen_socket(config)?;
    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full(m::CYCLE_DURATION_SECONDS.to_owned()),
            &m::CYCLE_DURATION_BUCKETS,
        )
        .map_err(|e| anyhow::anyhow!("invalid histogram buckets: {e}"))?
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {e}"))?;

    m::describe_all();

    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint active");
    Ok(())
}
