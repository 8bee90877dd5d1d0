use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize structured logging.
///
/// `RUST_LOG` wins over `level` when set. Logs go to stderr so command
/// output on stdout stays machine-readable.
pub fn init_telemetry(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }

    tracing::debug!("GeoTNB telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking related operations
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span around one backend request
pub fn create_request_span(method: &str, endpoint: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "api_request",
        http.method = method,
        http.endpoint = endpoint,
        correlation.id = correlation_id,
    )
}

/// Span around a parcel workflow operation
pub fn create_workflow_span(operation: &str, reference: &str, actor: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "parcel_workflow",
        operation = operation,
        parcel.reference = reference,
        actor = actor,
    )
}

/// Shutdown telemetry gracefully
pub fn shutdown_telemetry() {
    tracing::debug!("GeoTNB telemetry shutdown complete");
}
