//! Logging initialization and shutdown.

use std::sync::OnceLock;

use opentelemetry::{
    global::{self, set_text_map_propagator},
    trace::TracerProvider,
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    propagation::TraceContextPropagator,
    runtime::Tokio,
    trace::{Config, TracerProvider as SdkTracerProvider},
};
use tracing::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    fmt::layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::{error::LoggingError, types::LoggerConfig};

/// Kept so [`finalize`] can flush pending spans.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Directives appended to the env filter to quiet chatty HTTP dependencies.
const QUIET_DIRECTIVES: &[&str] = &["hyper=warn", "reqwest=warn", "h2=warn"];

fn build_filter() -> Result<EnvFilter, LoggingError> {
    let mut filt = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    for directive in QUIET_DIRECTIVES {
        filt = filt.add_directive(directive.parse()?);
    }
    Ok(filt)
}

/// Installs the global subscriber described by `config`.
///
/// Must be called from inside a tokio runtime when OTLP export is enabled.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    set_text_map_propagator(TraceContextPropagator::new());

    let filt = build_filter()?;

    let stdout_layer = if config.stdout.json_format {
        layer()
            .json()
            .with_span_events(config.stdout.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    } else {
        layer()
            .compact()
            .with_span_events(config.stdout.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    };

    let file_layer = config.file.as_ref().map(|file| {
        let appender = RollingFileAppender::new(
            file.rotation.clone(),
            &file.directory,
            &file.file_name_prefix,
        );

        // no color codes in files
        if file.json_format {
            layer()
                .json()
                .with_writer(appender)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        } else {
            layer()
                .compact()
                .with_writer(appender)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        }
    });

    let otel_layer = match &config.otlp {
        Some(otlp) => {
            let trace_config = Config::default().with_resource(config.resource.build_resource());

            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(otlp.endpoint.clone())
                .with_timeout(otlp.timeout);

            let tp = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(trace_config)
                .install_batch(Tokio)?;

            if TRACER_PROVIDER.set(tp.clone()).is_err() {
                warn!("tracer provider already set, keeping the first one");
            }

            let tracer = tp.tracer("dalink-tracer");
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(otel_layer)
        .try_init()?;

    info!(
        service_name = %config.resource.service_name,
        service_version = ?config.resource.service_version,
        file_logging = config.file.is_some(),
        otlp = config.otlp.is_some(),
        "logging initialized"
    );

    Ok(())
}

/// Flushes pending spans and tears down the tracer provider.
pub fn finalize() {
    info!("shutting down logging");

    match TRACER_PROVIDER.get() {
        Some(provider) => {
            if let Err(e) = provider.shutdown() {
                error!(?e, "failed to shut down tracer provider");
            }
        }
        None => debug!("no tracer provider to shut down"),
    }

    global::shutdown_tracer_provider();
}
