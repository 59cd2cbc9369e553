use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    airkorea_lib::init_logging();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"));

    log::info!("AirKorea poller starting up...");
    airkorea_lib::run(&config_path).await
}
