//! reanchor - repoint Algorand asset metadata via ARC-19 reserve addresses

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reanchor::algod::AlgodClient;
use reanchor::nftstorage::NftStorageClient;
use reanchor::{update_all, Args, AssetUpdater, Config, LogObserver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("reanchor={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load config: {:#}", anyhow::Error::new(e));
            std::process::exit(1);
        }
    };
    info!(
        assets = config.assets.len(),
        algod = %config.algod_url,
        "loaded config"
    );

    let publisher = NftStorageClient::new(&config.nft_storage_api_key);
    let chain = AlgodClient::new(&config.algod_url, &config.algod_token);
    let observer = LogObserver;

    let updater = AssetUpdater::new(&config, &publisher, &chain, &observer);
    if let Err(e) = update_all(&updater).await {
        error!("failed to update assets: {:#}", anyhow::Error::new(e));
        std::process::exit(1);
    }

    info!("done");
    Ok(())
}
