use std::net::SocketAddr;

// ── Conflict checks ─────────────────────────────────────────────

/// Counter: conflict checks. Labels: outcome (ok, invalid, store_error).
pub const CONFLICT_CHECKS_TOTAL: &str = "rentwatch_conflict_checks_total";

/// Histogram: conflict check latency in seconds.
pub const CONFLICT_CHECK_DURATION_SECONDS: &str = "rentwatch_conflict_check_duration_seconds";

/// Counter: conflict records emitted. Labels: severity.
pub const CONFLICTS_DETECTED_TOTAL: &str = "rentwatch_conflicts_detected_total";

/// Counter: product metadata lookups that failed and fell back to defaults.
pub const ENRICHMENT_FAILURES_TOTAL: &str = "rentwatch_enrichment_failures_total";

// ── Equipment in the field ──────────────────────────────────────

/// Gauge: reserved lines currently out. Labels: bucket.
pub const EQUIPMENT_IN_FIELD: &str = "rentwatch_equipment_in_field";

/// Counter: availability sweeps. Labels: status (ok, error).
pub const SWEEPS_TOTAL: &str = "rentwatch_sweeps_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
