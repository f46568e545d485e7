use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Result<(), AppError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })?;

    if METRICS_HANDLE.set(handle).is_err() {
        tracing::warn!("Metrics handle already initialized");
    }

    metrics::describe_counter!(
        "provider_requests_total",
        "Data provider calls by provider, operation and outcome"
    );

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record one data provider call.
pub fn record_provider_call(provider: &str, operation: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(
        "provider_requests_total",
        "provider" => provider.to_string(),
        "operation" => operation,
        "outcome" => outcome,
    )
    .increment(1);
}
