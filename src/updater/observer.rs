//! Progress observation for the update pipeline.
//!
//! Injected into the batch driver and orchestrator instead of a
//! process-wide logger, so tests can substitute a capturing implementation
//! without global state.

use tracing::{debug, info};

use crate::address::Address;
use crate::config::Asset;

use super::orchestrator::Step;

/// Observer notified as the pipeline advances. All hooks default to no-ops.
pub trait UpdateObserver: Send + Sync {
    /// An asset's update pipeline is starting.
    fn asset_started(&self, _asset: &Asset) {}

    /// One pipeline step finished for the asset.
    fn step_completed(&self, _asset: &Asset, _step: Step) {}

    /// The asset's reconfiguration was confirmed on chain.
    fn asset_confirmed(&self, _asset: &Asset, _txid: &str, _round: u64) {}

    /// The asset's reserve already matched and submission was skipped.
    fn asset_skipped(&self, _asset: &Asset, _reserve: &Address) {}
}

/// Production observer: structured tracing output.
pub struct LogObserver;

impl UpdateObserver for LogObserver {
    fn asset_started(&self, asset: &Asset) {
        info!(asset = %asset.number, index = asset.index, "updating asset");
    }

    fn step_completed(&self, asset: &Asset, step: Step) {
        debug!(asset = %asset.number, step = %step, "step completed");
    }

    fn asset_confirmed(&self, asset: &Asset, txid: &str, round: u64) {
        info!(asset = %asset.number, txid = %txid, round, "asset reconfigured");
    }

    fn asset_skipped(&self, asset: &Asset, reserve: &Address) {
        info!(asset = %asset.number, reserve = %reserve, "reserve already current, skipping");
    }
}
