pub mod accessory;
pub mod config;
pub mod engine;
pub mod fetch;
pub mod models;
pub mod quality;
mod utils;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};

pub use accessory::{AccessoryInfo, LogSubscriber, ReadingSubscriber};
pub use config::{AccessoryConfig, ConfigError, EngineConfig};
pub use engine::{EngineStatus, PollingEngine};
pub use fetch::{AirKoreaClient, FetchResult, Fetcher};
pub use models::{Grade, PollutantReading};

/// Initialize logging (reads RUST_LOG env var).
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Load the accessory config, publish one reading and, with polling on,
/// keep polling until ctrl-c.
pub async fn run(config_path: &Path) -> Result<()> {
    let raw = config::load_accessory_config(config_path)?;
    let config = EngineConfig::from_accessory(&raw).context("invalid accessory configuration")?;

    let info = AccessoryInfo::from_config(&config);
    log::info!(
        "{} {} '{}' (station {}, firmware {})",
        info.manufacturer,
        info.model,
        info.name,
        info.serial_number,
        info.firmware_revision
    );

    let client = AirKoreaClient::new(config.endpoint.clone(), config.request_timeout)
        .context("failed to build HTTP client")?;
    let engine = PollingEngine::new(config, client, Arc::new(LogSubscriber));

    engine.get_current().await;

    if !engine.config().polling {
        return Ok(());
    }

    engine.start_polling().await?;
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    log::info!("shutting down");
    engine.shutdown().await
}
