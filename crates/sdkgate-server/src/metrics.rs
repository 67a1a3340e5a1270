//! Prometheus metrics recorder and `/metrics` rendering.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the global Prometheus recorder.
///
/// Call once at startup, before anything records a metric.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// Dispatches started (counter, labels: operation).
pub const DISPATCH_REQUESTS_TOTAL: &str = "dispatch_requests_total";
/// Dispatches failed (counter, labels: operation, `error_type`).
pub const DISPATCH_ERRORS_TOTAL: &str = "dispatch_errors_total";
/// Operation panics contained (counter, labels: operation).
pub const DISPATCH_PANICS_TOTAL: &str = "dispatch_panics_total";
/// Dispatch duration seconds (histogram, labels: operation).
pub const DISPATCH_DURATION_SECONDS: &str = "dispatch_duration_seconds";
/// `WebSocket` connections opened (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// `WebSocket` disconnections (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Connections refused at the limit (counter).
pub const WS_CONNECTIONS_REFUSED_TOTAL: &str = "ws_connections_refused_total";
/// Frames naming an unregistered method (counter).
pub const WS_UNKNOWN_METHOD_TOTAL: &str = "ws_unknown_method_total";
/// Open connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Connection lifetime seconds (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_without_global_install() {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let output = render(&handle);
        assert!(output.is_empty() || output.contains('#') || output.contains('\n'));
    }

    #[test]
    fn metric_names_are_snake_case() {
        let names = [
            DISPATCH_REQUESTS_TOTAL,
            DISPATCH_ERRORS_TOTAL,
            DISPATCH_PANICS_TOTAL,
            DISPATCH_DURATION_SECONDS,
            WS_CONNECTIONS_TOTAL,
            WS_DISCONNECTIONS_TOTAL,
            WS_CONNECTIONS_REFUSED_TOTAL,
            WS_UNKNOWN_METHOD_TOTAL,
            WS_CONNECTIONS_ACTIVE,
            WS_CONNECTION_DURATION_SECONDS,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
