use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

use tx_decoder::assets::AssetCache;
use tx_decoder::decoding::registry::build_registry;
use tx_decoder::decoding::{TransactionDecoder, decode_batch};
use tx_decoder::metrics::Metrics;
use tx_decoder::models::common::{DecodingReport, TransactionInput};
use tx_decoder::utils::load_config;

const DEFAULT_CONFIG_PATH: &str = "config.yml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("=========================== INITIALIZING ===========================");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = match load_config(&config_path) {
        Ok(config) => {
            info!("Config loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            return Err(anyhow!(e));
        }
    };

    // Initialize optional metrics
    let metrics = if config.metrics.enabled {
        let metrics = Metrics::new(config.chain_name.clone())?;
        metrics
            .start_metrics_server(&config.metrics.address, config.metrics.port)
            .await?;
        Some(Arc::new(metrics))
    } else {
        info!("Metrics are disabled");
        None
    };

    // Seed the asset cache and build the decoder registry
    let assets = Arc::new(AssetCache::from_entries(config.assets));
    info!("Loaded {} assets", assets.len());

    let registry = build_registry()?;
    let event_settings = registry.event_settings(&config.accounting);

    let mut decoder = TransactionDecoder::new(registry, assets);
    if let Some(metrics) = metrics {
        decoder = decoder.with_metrics(metrics);
    }
    let decoder = Arc::new(decoder);

    // Read the batch of transactions produced by the generic pipeline
    let contents = fs::read_to_string(&config.input_path)
        .with_context(|| format!("failed to read input file {}", config.input_path.display()))?;
    let inputs: Vec<TransactionInput> =
        serde_json::from_str(&contents).context("failed to parse input transactions")?;

    info!(
        "========================= DECODING {} TRANSACTIONS =========================",
        inputs.len()
    );

    let start = Instant::now();
    let transactions = decode_batch(decoder, inputs).await?;

    let failures: usize = transactions.iter().map(|tx| tx.failures.len()).sum();
    if failures > 0 {
        warn!("{} malformed logs were skipped", failures);
    }

    let report = DecodingReport {
        event_settings,
        transactions,
    };
    let output = serde_json::to_string_pretty(&report).context("failed to serialize output")?;
    fs::write(&config.output_path, output)
        .with_context(|| format!("failed to write output file {}", config.output_path.display()))?;

    info!(
        "Decoded {} transactions in {:.3}s, output written to {}",
        report.transactions.len(),
        start.elapsed().as_secs_f64(),
        config.output_path.display()
    );

    Ok(())
}
