//! nft.storage content publisher.
//!
//! One atomic POST of raw bytes per publish; the service replies with a JSON
//! envelope carrying the CID of the stored content. No chunking, no resumable
//! uploads, no retries beyond what the transport does on its own.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Default nft.storage API endpoint
pub const DEFAULT_API_URL: &str = "https://api.nft.storage";

/// Error types for content publishing
#[derive(Debug, Error)]
pub enum PublishError {
    /// Request never produced a usable HTTP response
    #[error("upload request failed")]
    Transport(#[from] reqwest::Error),

    /// Service answered with a non-success status or an ok=false envelope
    #[error("upload rejected (http {status}): {name}: {message}")]
    Rejected {
        status: u16,
        name: String,
        message: String,
    },

    /// Success envelope with no usable cid in it
    #[error("upload response carries no cid")]
    MissingCid,
}

/// Content publisher boundary: raw bytes + media type in, CID out.
///
/// Kept as a trait so the update pipeline can run against a capturing fake.
#[async_trait]
pub trait ContentPublisher: Send + Sync {
    async fn publish(&self, data: Vec<u8>, media_type: &str) -> Result<String, PublishError>;
}

/// HTTP client for the nft.storage upload API.
pub struct NftStorageClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl NftStorageClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_api_url(api_key, DEFAULT_API_URL)
    }

    /// Point the client at a different endpoint (staging, local stub).
    pub fn with_api_url(api_key: &str, api_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl ContentPublisher for NftStorageClient {
    async fn publish(&self, data: Vec<u8>, media_type: &str) -> Result<String, PublishError> {
        let response = self
            .http
            .post(format!("{}/upload", self.api_url))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, media_type)
            .header(reqwest::header::ACCEPT, "application/json")
            .body(data)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body: UploadResponse = response.json().await?;
        parse_upload(status, body)
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    ok: bool,
    value: Option<UploadValue>,
    error: Option<UploadError>,
}

#[derive(Debug, Deserialize)]
struct UploadValue {
    #[serde(default)]
    cid: String,
}

#[derive(Debug, Default, Deserialize)]
struct UploadError {
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

// Envelope handling is split from the transport so it can be tested offline.
fn parse_upload(status: u16, body: UploadResponse) -> Result<String, PublishError> {
    if status != 200 || !body.ok {
        let error = body.error.unwrap_or_default();
        return Err(PublishError::Rejected {
            status,
            name: error.name,
            message: error.message,
        });
    }
    match body.value {
        Some(value) if !value.cid.is_empty() => Ok(value.cid),
        _ => Err(PublishError::MissingCid),
    }
}
