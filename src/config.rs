//! Configuration: CLI arguments and the JSON run manifest.
//!
//! The CLI surface is intentionally small — everything describing the run
//! (endpoints, credentials, naming, asset list) lives in a JSON file so a
//! drop can be re-run from the same manifest.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

/// reanchor - ARC-19 reserve address updater for Algorand assets
#[derive(Parser, Debug, Clone)]
#[command(name = "reanchor")]
#[command(about = "Repoint Algorand asset metadata via ARC-19 reserve addresses")]
pub struct Args {
    /// Path to the JSON run configuration
    #[arg(long, env = "CONFIG_PATH", default_value = "./config.json")]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Error types for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One asset to update: on-chain index plus the display number its trait and
/// image files are keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub index: u64,
    pub number: String,
}

/// Run configuration, loaded once and read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub algod_url: String,
    /// API token for algod; public endpoints take an empty token
    #[serde(default)]
    pub algod_token: String,
    pub mnemonic: String,
    pub name_prefix: String,
    pub description: String,
    pub image_extension: String,
    pub image_mime_type: String,
    pub nft_storage_api_key: String,
    /// Directory holding per-asset trait and image files
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    /// Skip assets whose on-chain reserve already matches the derived one
    #[serde(default)]
    pub skip_unchanged: bool,
    pub assets: Vec<Asset>,
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

impl Config {
    /// Load and validate the run configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.algod_url.is_empty() {
            return Err(ConfigError::Invalid("algodUrl must be set".to_string()));
        }
        if self.mnemonic.is_empty() {
            return Err(ConfigError::Invalid("mnemonic must be set".to_string()));
        }
        if self.nft_storage_api_key.is_empty() {
            return Err(ConfigError::Invalid(
                "nftStorageApiKey must be set".to_string(),
            ));
        }
        if self.assets.is_empty() {
            return Err(ConfigError::Invalid("assets list is empty".to_string()));
        }
        Ok(())
    }

    /// Path of the trait file for one asset.
    pub fn trait_path(&self, asset: &Asset) -> PathBuf {
        self.assets_dir.join(format!("{}.json", asset.number))
    }

    /// Path of the image file for one asset.
    pub fn image_path(&self, asset: &Asset) -> PathBuf {
        self.assets_dir
            .join(format!("{}{}", asset.number, self.image_extension))
    }
}
