//! Per-asset update pipeline.
//!
//! Strictly sequential: publish the image, render and publish the metadata
//! document, derive the reserve address from the metadata CID, then
//! reconfigure the asset on chain and wait for confirmation. The first
//! failing step is terminal for the asset; nothing is rolled back because
//! the only mutating action is the final submission.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::address::{Address, AddressError};
use crate::algod::{
    AssetConfigTxn, ChainClient, ChainError, TransactionError, CONFIRMATION_ROUNDS,
};
use crate::config::{Asset, Config};
use crate::metadata;
use crate::mnemonic::{self, MnemonicError};
use crate::nftstorage::{ContentPublisher, PublishError};
use crate::reserve::{self, ReserveError};

use super::observer::UpdateObserver;

/// Pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    LoadImage,
    PublishImage,
    LoadTraits,
    RenderMetadata,
    PublishMetadata,
    DeriveReserve,
    DeriveSigningKey,
    FetchAssetConfig,
    BuildTransaction,
    Submit,
    AwaitConfirmation,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::LoadImage => "load-image",
            Step::PublishImage => "publish-image",
            Step::LoadTraits => "load-traits",
            Step::RenderMetadata => "render-metadata",
            Step::PublishMetadata => "publish-metadata",
            Step::DeriveReserve => "derive-reserve",
            Step::DeriveSigningKey => "derive-signing-key",
            Step::FetchAssetConfig => "fetch-asset-config",
            Step::BuildTransaction => "build-transaction",
            Step::Submit => "submit",
            Step::AwaitConfirmation => "await-confirmation",
        };
        f.write_str(name)
    }
}

/// Why one asset's update stopped.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("failed to read image file {path}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to publish image")]
    ImagePublish(#[source] PublishError),

    #[error("failed to read trait file {path}")]
    TraitsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode trait file {path}")]
    TraitsDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render metadata document")]
    Render(#[source] serde_json::Error),

    #[error("failed to publish metadata document")]
    MetadataPublish(#[source] PublishError),

    #[error("failed to derive reserve address from metadata cid")]
    Reserve(#[from] ReserveError),

    #[error("failed to derive signing account from mnemonic")]
    Mnemonic(#[from] MnemonicError),

    #[error("failed to fetch current asset config")]
    AssetLookup(#[source] ChainError),

    #[error("asset's current {role} address is malformed")]
    MalformedRole {
        role: &'static str,
        #[source]
        source: AddressError,
    },

    #[error("failed to fetch suggested params")]
    SuggestedParams(#[source] ChainError),

    #[error("failed to build asset config transaction")]
    Build(#[from] TransactionError),

    #[error("failed to submit asset config transaction")]
    Submit(#[source] ChainError),

    #[error("asset config transaction was not confirmed")]
    Confirm(#[source] ChainError),
}

/// Outcome of one asset's pipeline run.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Reconfiguration submitted and confirmed.
    Confirmed {
        txid: String,
        round: u64,
        reserve: Address,
    },
    /// The on-chain reserve already matched the derived address.
    AlreadyCurrent { reserve: Address },
}

// Current role addresses, fetched from the chain and passed through
// unchanged so the reconfiguration never clears a role it did not mean to
// touch.
struct CurrentRoles {
    manager: Option<Address>,
    reserve: Option<Address>,
    freeze: Option<Address>,
    clawback: Option<Address>,
}

/// Sequences the update pipeline for single assets.
pub struct AssetUpdater<'a> {
    pub config: &'a Config,
    publisher: &'a dyn ContentPublisher,
    chain: &'a dyn ChainClient,
    observer: &'a dyn UpdateObserver,
}

impl<'a> AssetUpdater<'a> {
    pub fn new(
        config: &'a Config,
        publisher: &'a dyn ContentPublisher,
        chain: &'a dyn ChainClient,
        observer: &'a dyn UpdateObserver,
    ) -> Self {
        Self {
            config,
            publisher,
            chain,
            observer,
        }
    }

    /// Run the full pipeline for one asset.
    pub async fn update(&self, asset: &Asset) -> Result<UpdateOutcome, UpdateError> {
        self.observer.asset_started(asset);

        let image_cid = self.publish_image(asset).await?;
        let metadata_cid = self.publish_metadata(asset, &image_cid).await?;

        let reserve = reserve::reserve_address(&metadata_cid)?;
        self.step(asset, Step::DeriveReserve);
        debug!(asset = %asset.number, cid = %metadata_cid, reserve = %reserve, "derived reserve address");

        let account = mnemonic::derive_account(&self.config.mnemonic)?;
        self.step(asset, Step::DeriveSigningKey);

        let roles = self.current_roles(asset).await?;
        self.step(asset, Step::FetchAssetConfig);

        if self.config.skip_unchanged && roles.reserve == Some(reserve) {
            self.observer.asset_skipped(asset, &reserve);
            return Ok(UpdateOutcome::AlreadyCurrent { reserve });
        }

        let params = self
            .chain
            .suggested_params()
            .await
            .map_err(UpdateError::SuggestedParams)?;
        let txn = AssetConfigTxn::new(
            account.address,
            &params,
            asset.index,
            roles.manager,
            Some(reserve),
            roles.freeze,
            roles.clawback,
        )?;
        let signed = txn.sign(&account.signing_key)?;
        self.step(asset, Step::BuildTransaction);

        self.chain
            .send_raw_transaction(signed.bytes)
            .await
            .map_err(UpdateError::Submit)?;
        self.step(asset, Step::Submit);

        let round = self
            .chain
            .wait_for_confirmation(&signed.txid, CONFIRMATION_ROUNDS)
            .await
            .map_err(UpdateError::Confirm)?;
        self.step(asset, Step::AwaitConfirmation);

        self.observer.asset_confirmed(asset, &signed.txid, round);
        Ok(UpdateOutcome::Confirmed {
            txid: signed.txid,
            round,
            reserve,
        })
    }

    async fn publish_image(&self, asset: &Asset) -> Result<String, UpdateError> {
        let path = self.config.image_path(asset);
        let image = std::fs::read(&path).map_err(|source| UpdateError::ImageRead {
            path: path.clone(),
            source,
        })?;
        self.step(asset, Step::LoadImage);

        let cid = self
            .publisher
            .publish(image, &self.config.image_mime_type)
            .await
            .map_err(UpdateError::ImagePublish)?;
        self.step(asset, Step::PublishImage);
        Ok(cid)
    }

    async fn publish_metadata(
        &self,
        asset: &Asset,
        image_cid: &str,
    ) -> Result<String, UpdateError> {
        let traits = self.load_traits(asset)?;
        self.step(asset, Step::LoadTraits);

        let document = metadata::render(
            &self.config.name_prefix,
            &self.config.description,
            &asset.number,
            traits,
            image_cid,
        )
        .map_err(UpdateError::Render)?;
        self.step(asset, Step::RenderMetadata);

        let cid = self
            .publisher
            .publish(document, "application/json")
            .await
            .map_err(UpdateError::MetadataPublish)?;
        self.step(asset, Step::PublishMetadata);
        Ok(cid)
    }

    fn load_traits(&self, asset: &Asset) -> Result<BTreeMap<String, String>, UpdateError> {
        let path = self.config.trait_path(asset);
        let raw = std::fs::read(&path).map_err(|source| UpdateError::TraitsRead {
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| UpdateError::TraitsDecode { path, source })
    }

    async fn current_roles(&self, asset: &Asset) -> Result<CurrentRoles, UpdateError> {
        let params = self
            .chain
            .asset_params(asset.index)
            .await
            .map_err(UpdateError::AssetLookup)?;
        Ok(CurrentRoles {
            manager: parse_role("manager", params.manager)?,
            reserve: parse_role("reserve", params.reserve)?,
            freeze: parse_role("freeze", params.freeze)?,
            clawback: parse_role("clawback", params.clawback)?,
        })
    }

    fn step(&self, asset: &Asset, step: Step) {
        self.observer.step_completed(asset, step);
    }
}

fn parse_role(
    role: &'static str,
    value: Option<String>,
) -> Result<Option<Address>, UpdateError> {
    match value {
        Some(address) if !address.is_empty() => Ok(Some(
            address
                .parse()
                .map_err(|source| UpdateError::MalformedRole { role, source })?,
        )),
        _ => Ok(None),
    }
}
