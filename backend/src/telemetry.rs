//! Tracing subscriber setup with optional OpenTelemetry export.
//!
//! Without `OTEL_EXPORTER_OTLP_ENDPOINT` only the stdout fmt layer is
//! installed. With it, spans are also batched to the OTLP collector.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, Result};

const DEFAULT_FILTER: &str = "download_tracker_backend=debug,tower_http=debug,sqlx::query=info";

/// Initialize the global tracing subscriber.
///
/// The returned guard must be held until shutdown so buffered spans are
/// flushed.
pub fn init_tracing(otel_endpoint: Option<&str>, service_name: &str) -> Result<Option<OtelGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match otel_endpoint {
        Some(endpoint) => {
            let guard = init_with_otel(endpoint, service_name, env_filter)?;
            tracing::info!(otel_endpoint = endpoint, service_name, "OpenTelemetry tracing enabled");
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init()
                .map_err(|e| AppError::Telemetry(e.to_string()))?;
            Ok(None)
        }
    }
}

/// Shuts the tracer provider down on drop.
pub struct OtelGuard {
    provider: opentelemetry_sdk::trace::SdkTracerProvider,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Err(e) = self.provider.shutdown() {
            eprintln!("Failed to shutdown OTel tracer provider: {e:?}");
        }
    }
}

fn init_with_otel(endpoint: &str, service_name: &str, env_filter: EnvFilter) -> Result<OtelGuard> {
    use opentelemetry::trace::TracerProvider;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};
    use opentelemetry_sdk::trace::{BatchSpanProcessor, SdkTracerProvider};
    use opentelemetry_sdk::Resource;

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| AppError::Telemetry(format!("OTLP exporter: {e}")))?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_owned())
        .with_attribute(KeyValue::new(
            "service.version",
            env!("CARGO_PKG_VERSION").to_owned(),
        ))
        .build();

    let provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_span_processor(BatchSpanProcessor::builder(exporter).build())
        .build();

    let tracer = provider.tracer("download-tracker");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .try_init()
        .map_err(|e| AppError::Telemetry(e.to_string()))?;

    Ok(OtelGuard { provider })
}
