use std::sync::Arc;
use tracing::{error, info};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram, MeterProvider};
use opentelemetry_sdk::metrics::{MetricError, SdkMeterProvider};
use prometheus::{Encoder, TextEncoder};
use std::net::SocketAddr;

pub struct Metrics {
    registry: Arc<prometheus::Registry>,
    _provider: SdkMeterProvider,
    pub chain_name: String,

    // Transaction metrics
    pub transactions_decoded: Counter<u64>,
    pub transaction_decode_time: Histogram<f64>,

    // Log routing metrics
    pub logs_routed: Counter<u64>,
    pub decoder_invocations: Counter<u64>,
    pub malformed_logs: Counter<u64>,

    // Decoder output metrics
    pub events_synthesized: Counter<u64>,
    pub action_items_created: Counter<u64>,
}

impl Metrics {
    pub fn new(chain_name: String) -> Result<Self, MetricError> {
        // Create a new prometheus registry
        let registry = prometheus::Registry::new();

        // Configure OpenTelemetry to use this registry
        let exporter = opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()?;

        // Set up a meter to create instruments
        let provider = SdkMeterProvider::builder().with_reader(exporter).build();
        let meter = provider.meter("decoder_metrics");

        let transactions_decoded = meter
            .u64_counter("decoder_transactions_decoded")
            .with_description("Total number of transactions decoded")
            .build();

        let transaction_decode_time = meter
            .f64_histogram("decoder_transaction_decode_time")
            .with_description("Time spent decoding a single transaction")
            .with_boundaries(vec![
                0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.05,
            ])
            .with_unit("s")
            .build();

        let logs_routed = meter
            .u64_counter("decoder_logs_routed")
            .with_description("Number of logs emitted by a contract with registered decoders")
            .build();

        let decoder_invocations = meter
            .u64_counter("decoder_invocations")
            .with_description("Number of decode function calls")
            .build();

        let malformed_logs = meter
            .u64_counter("decoder_malformed_logs")
            .with_description("Number of logs rejected as malformed")
            .build();

        let events_synthesized = meter
            .u64_counter("decoder_events_synthesized")
            .with_description("Number of new events returned by decoders")
            .build();

        let action_items_created = meter
            .u64_counter("decoder_action_items_created")
            .with_description("Number of action items returned by decoders")
            .build();

        Ok(Self {
            registry: Arc::new(registry),
            _provider: provider,
            chain_name,
            transactions_decoded,
            transaction_decode_time,
            logs_routed,
            decoder_invocations,
            malformed_logs,
            events_synthesized,
            action_items_created,
        })
    }

    pub fn chain_label(&self) -> KeyValue {
        KeyValue::new("chain", self.chain_name.clone())
    }

    pub fn decoder_labels(&self, decoder: &'static str) -> [KeyValue; 2] {
        [self.chain_label(), KeyValue::new("decoder", decoder)]
    }

    pub async fn start_metrics_server(&self, addr: &str, port: u16) -> Result<()> {
        let addr = format!("{addr}:{port}")
            .parse::<SocketAddr>()
            .context("invalid metrics address")?;
        let registry = self.registry.clone();

        let app = Router::new().route("/metrics", get(move || metrics_handler(registry.clone())));

        // Determine the access URL based on the binding address. Only used for logging.
        let access_url = if addr.ip().to_string() == "0.0.0.0" {
            format!("http://localhost:{port}/metrics")
        } else {
            format!("http://{}:{port}/metrics", addr.ip())
        };

        info!(
            "Starting metrics server - binding to {} (accessible at {})",
            addr, access_url
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .context("failed to bind metrics server")?;

        // Spawn the server in a separate task
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Metrics server stopped: {}", e);
            }
        });

        Ok(())
    }
}

async fn metrics_handler(registry: Arc<prometheus::Registry>) -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
