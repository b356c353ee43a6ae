use anyhow::{Context as _, Result};
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::{LogExporter, MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    Resource, logs::SdkLoggerProvider, metrics::SdkMeterProvider, trace::SdkTracerProvider,
};

/// OTLP (gRPC) exporters for traces, metrics and logs of one service.
/// Providers are kept so [`Telemetry::shutdown`] can flush them.
pub struct Telemetry {
    resource: Resource,
    otel_endpoint: String,
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

impl Telemetry {
    pub fn new(service_name: impl Into<String>, otel_endpoint: String) -> Self {
        let resource = Resource::builder()
            .with_service_name(service_name.into())
            .with_attribute(KeyValue::new(
                "service.version",
                env!("CARGO_PKG_VERSION"),
            ))
            .build();

        Self {
            resource,
            otel_endpoint,
            tracer_provider: None,
            meter_provider: None,
            logger_provider: None,
        }
    }

    pub fn init_tracer(&mut self) -> Result<SdkTracerProvider> {
        let exporter = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&self.otel_endpoint)
            .build()
            .context("Failed to create span exporter")?;

        let provider = SdkTracerProvider::builder()
            .with_resource(self.resource.clone())
            .with_batch_exporter(exporter)
            .build();

        global::set_tracer_provider(provider.clone());
        Ok(self.tracer_provider.insert(provider).clone())
    }

    pub fn init_meter(&mut self) -> Result<SdkMeterProvider> {
        let exporter = MetricExporter::builder()
            .with_tonic()
            .with_endpoint(&self.otel_endpoint)
            .build()
            .context("Failed to create metric exporter")?;

        let provider = SdkMeterProvider::builder()
            .with_resource(self.resource.clone())
            .with_periodic_exporter(exporter)
            .build();

        global::set_meter_provider(provider.clone());
        Ok(self.meter_provider.insert(provider).clone())
    }

    /// The returned provider feeds the tracing bridge in `init_logger`.
    pub fn init_logger(&mut self) -> Result<SdkLoggerProvider> {
        let exporter = LogExporter::builder()
            .with_tonic()
            .with_endpoint(&self.otel_endpoint)
            .build()
            .context("Failed to create log exporter")?;

        let provider = SdkLoggerProvider::builder()
            .with_resource(self.resource.clone())
            .with_batch_exporter(exporter)
            .build();

        Ok(self.logger_provider.insert(provider).clone())
    }

    pub async fn shutdown(self) -> Result<()> {
        let outcomes = [
            (
                "tracer",
                self.tracer_provider.map(|p| p.shutdown().map_err(|e| e.to_string())),
            ),
            (
                "meter",
                self.meter_provider.map(|p| p.shutdown().map_err(|e| e.to_string())),
            ),
            (
                "logger",
                self.logger_provider.map(|p| p.shutdown().map_err(|e| e.to_string())),
            ),
        ];

        let failures: Vec<String> = outcomes
            .into_iter()
            .filter_map(|(name, outcome)| match outcome {
                Some(Err(e)) => Some(format!("{name} provider: {e}")),
                _ => None,
            })
            .collect();

        if !failures.is_empty() {
            anyhow::bail!("Failed to shutdown providers:\n{}", failures.join("\n"));
        }

        Ok(())
    }
}
