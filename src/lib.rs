//! reanchor - ARC-19 reserve address updater for Algorand assets
//!
//! An asset's mutable metadata lives in content-addressed storage; the
//! on-chain asset's reserve address is repurposed to encode the metadata
//! document's digest, making the pointer tamper-evident and re-pointable
//! without touching ownership semantics.
//!
//! ## Components
//!
//! - **address / reserve**: content identifier decoding and the digest-to-
//!   address mapping any verifier can recompute independently
//! - **metadata**: canonical ARC-3 document rendering
//! - **mnemonic**: recovery phrase to signing account derivation
//! - **nftstorage**: content publisher boundary (IPFS via nft.storage)
//! - **algod**: chain RPC boundary and the asset-config transaction codec
//! - **updater**: the per-asset pipeline, fail-fast batch driver, and
//!   injected progress observer

pub mod address;
pub mod algod;
pub mod config;
pub mod metadata;
pub mod mnemonic;
pub mod nftstorage;
pub mod reserve;
pub mod updater;

pub use address::Address;
pub use config::{Args, Config};
pub use updater::{update_all, AssetUpdater, LogObserver};
