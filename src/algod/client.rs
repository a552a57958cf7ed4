//! HTTP implementation of the chain boundary over the algod v2 REST API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{AssetParams, ChainClient, ChainError, SuggestedParams};

const TOKEN_HEADER: &str = "X-Algo-API-Token";

/// REST client for a single algod node.
pub struct AlgodClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl AlgodClient {
    /// Public endpoints take an empty token.
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ChainError> {
        let response = self
            .http
            .get(self.url(path))
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ChainError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|error| error.message)
                .unwrap_or(body);
            return Err(ChainError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ChainClient for AlgodClient {
    async fn suggested_params(&self) -> Result<SuggestedParams, ChainError> {
        self.get("/v2/transactions/params").await
    }

    async fn asset_params(&self, asset_id: u64) -> Result<AssetParams, ChainError> {
        let asset: AssetResponse = self.get(&format!("/v2/assets/{}", asset_id)).await?;
        Ok(asset.params)
    }

    async fn send_raw_transaction(&self, signed: Vec<u8>) -> Result<String, ChainError> {
        let response = self
            .http
            .post(self.url("/v2/transactions"))
            .header(TOKEN_HEADER, &self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/x-binary")
            .body(signed)
            .send()
            .await?;
        let submitted: SubmitResponse = Self::parse(response).await?;
        debug!(txid = %submitted.tx_id, "transaction submitted");
        Ok(submitted.tx_id)
    }

    async fn wait_for_confirmation(&self, txid: &str, rounds: u64) -> Result<u64, ChainError> {
        let status: NodeStatus = self.get("/v2/status").await?;
        let mut round = status.last_round + 1;

        while round <= status.last_round + rounds {
            let pending: PendingInfo = self
                .get(&format!("/v2/transactions/pending/{}?format=json", txid))
                .await?;
            if pending.confirmed_round > 0 {
                debug!(txid = %txid, round = pending.confirmed_round, "transaction confirmed");
                return Ok(pending.confirmed_round);
            }
            if !pending.pool_error.is_empty() {
                return Err(ChainError::PoolRejected {
                    txid: txid.to_string(),
                    message: pending.pool_error,
                });
            }

            // Block until the node advances past the current round.
            let _: NodeStatus = self
                .get(&format!("/v2/status/wait-for-block-after/{}", round))
                .await?;
            round += 1;
        }

        Err(ChainError::ConfirmationTimeout {
            txid: txid.to_string(),
            rounds,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    params: AssetParams,
}

#[derive(Debug, Deserialize)]
struct NodeStatus {
    #[serde(rename = "last-round")]
    last_round: u64,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct PendingInfo {
    #[serde(rename = "confirmed-round", default)]
    confirmed_round: u64,
    #[serde(rename = "pool-error", default)]
    pool_error: String,
}
