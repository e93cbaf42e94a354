pub mod amounts;
pub mod bytes;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::models::common::Config;

const ENV_PREFIX: &str = "TX_DECODER";

pub fn load_config<P: AsRef<Path>>(file_name: P) -> Result<Config> {
    let config_path = file_name.as_ref();
    info!("Config path: {}", config_path.to_string_lossy());

    // File values first, then `TX_DECODER__*` environment overrides
    let mut config: Config = config::Config::builder()
        .add_source(config::File::from(config_path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .context("failed to read config file")?
        .try_deserialize()
        .context("failed to parse config YAML")?;

    // Convert hyphens to underscores in all relevant fields
    config.chain_name = config.chain_name.replace('-', "_");

    Ok(config)
}
