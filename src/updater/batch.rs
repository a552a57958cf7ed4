//! Batch driver: every configured asset, in order, fail-fast.

use thiserror::Error;
use tracing::info;

use super::orchestrator::{AssetUpdater, UpdateError};

/// First per-asset failure, tagged with the asset's display number.
#[derive(Debug, Error)]
#[error("failed to update asset #{number}")]
pub struct BatchError {
    pub number: String,
    #[source]
    pub source: UpdateError,
}

/// Update every configured asset in order.
///
/// Stops at the first failure and never attempts the remaining assets.
/// Partial completion is acceptable: each update is independent and
/// re-runnable, so a re-run after a fix picks up where this one stopped.
pub async fn update_all(updater: &AssetUpdater<'_>) -> Result<(), BatchError> {
    let assets = &updater.config.assets;
    info!(count = assets.len(), "updating assets");

    for asset in assets {
        updater.update(asset).await.map_err(|source| BatchError {
            number: asset.number.clone(),
            source,
        })?;
    }
    Ok(())
}
