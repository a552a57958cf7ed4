//! Asset update pipeline: per-asset orchestrator, batch driver, and the
//! injected progress observer.

pub mod batch;
pub mod observer;
pub mod orchestrator;

pub use batch::{update_all, BatchError};
pub use observer::{LogObserver, UpdateObserver};
pub use orchestrator::{AssetUpdater, Step, UpdateError, UpdateOutcome};
