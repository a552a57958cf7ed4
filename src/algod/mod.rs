//! Algorand node (algod) client.
//!
//! The chain boundary the update pipeline consumes: suggested transaction
//! parameters, asset lookups, raw transaction submission, and a bounded
//! confirmation wait. [`ChainClient`] keeps the boundary mockable;
//! [`AlgodClient`] is the HTTP implementation against the v2 REST API.

pub mod client;
pub mod transactions;

pub use client::AlgodClient;
pub use transactions::{AssetConfigTxn, SignedTransaction, TransactionError};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Rounds the confirmation wait watches before giving up
pub const CONFIRMATION_ROUNDS: u64 = 4;

/// Error types for chain operations
#[derive(Debug, Error)]
pub enum ChainError {
    /// Request never produced a usable HTTP response
    #[error("request to algod failed")]
    Transport(#[from] reqwest::Error),

    /// Node answered with a non-success status
    #[error("algod returned http {status}: {message}")]
    Api { status: u16, message: String },

    /// Transaction was dropped from the pending pool
    #[error("transaction {txid} rejected by the pool: {message}")]
    PoolRejected { txid: String, message: String },

    /// Transaction was not confirmed within the watched rounds
    #[error("transaction {txid} not confirmed within {rounds} rounds")]
    ConfirmationTimeout { txid: String, rounds: u64 },
}

/// Transaction parameters suggested by the node.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestedParams {
    /// Fee per encoded byte; zero means the flat minimum fee applies
    #[serde(rename = "fee")]
    pub fee_per_byte: u64,
    #[serde(rename = "min-fee")]
    pub min_fee: u64,
    #[serde(rename = "last-round")]
    pub last_round: u64,
    #[serde(rename = "genesis-id")]
    pub genesis_id: String,
    /// Base64 of the 32-byte genesis hash
    #[serde(rename = "genesis-hash")]
    pub genesis_hash: String,
}

/// Current mutable configuration of an asset, role fields as address strings.
///
/// A role the chain reports as unset stays `None` and is passed through
/// unchanged by the update pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetParams {
    pub manager: Option<String>,
    pub reserve: Option<String>,
    pub freeze: Option<String>,
    pub clawback: Option<String>,
}

/// Chain RPC boundary consumed by the update pipeline.
///
/// Kept as a trait so tests can observe call ordering without a node.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetch suggested transaction parameters.
    async fn suggested_params(&self) -> Result<SuggestedParams, ChainError>;

    /// Fetch the asset's current mutable configuration.
    async fn asset_params(&self, asset_id: u64) -> Result<AssetParams, ChainError>;

    /// Submit a signed transaction, returning the node-reported id.
    async fn send_raw_transaction(&self, signed: Vec<u8>) -> Result<String, ChainError>;

    /// Block until the transaction is confirmed or `rounds` rounds elapse,
    /// returning the confirmation round.
    async fn wait_for_confirmation(&self, txid: &str, rounds: u64) -> Result<u64, ChainError>;
}
