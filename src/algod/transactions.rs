//! Asset configuration transactions.
//!
//! Algorand signs and identifies transactions over a canonical MessagePack
//! form: string-keyed maps with keys in lexicographic order, zero values
//! omitted entirely, and addresses/hashes as bin-typed byte strings. The node
//! verifies signatures against its own re-encoding, so the bytes built here
//! must match that form exactly. The encoder states the map layout directly
//! as rmpv values instead of going through serde.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use data_encoding::BASE32_NOPAD;
use ed25519_dalek::{Signer, SigningKey};
use rmpv::Value;
use sha2::{Digest, Sha512_256};
use thiserror::Error;

use super::SuggestedParams;
use crate::address::Address;

/// Domain separation prefix hashed and signed with the transaction body
const TXID_PREFIX: &[u8] = b"TX";

/// Bytes the signature envelope adds on top of the bare transaction,
/// used when estimating the fee-relevant size
const SIG_OVERHEAD: u64 = 75;

/// Rounds a transaction stays valid past its first round
const VALIDITY_WINDOW: u64 = 1000;

/// Error types for transaction assembly
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Suggested params carry a genesis hash that is not base64
    #[error("suggested params carry a malformed genesis hash")]
    MalformedGenesisHash(#[source] base64::DecodeError),

    /// Genesis hash decodes to the wrong width
    #[error("genesis hash must be 32 bytes, got {0}")]
    GenesisHashLength(usize),

    /// MessagePack serialization failed
    #[error("failed to encode transaction")]
    Encode(#[source] rmpv::encode::Error),
}

/// An asset reconfiguration with every role field passed explicitly.
///
/// Omitted roles are cleared by the chain, not left alone, so callers must
/// supply the asset's current addresses for the roles they intend to keep.
#[derive(Debug, Clone)]
pub struct AssetConfigTxn {
    pub sender: Address,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    pub asset_id: u64,
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
}

/// A signed transaction ready for submission.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// Base32 transaction id, derived from the unsigned body
    pub txid: String,
    /// Canonical MessagePack of the signature envelope
    pub bytes: Vec<u8>,
}

impl AssetConfigTxn {
    /// Assemble a reconfiguration of `asset_id` and assign its fee from the
    /// suggested params.
    pub fn new(
        sender: Address,
        params: &SuggestedParams,
        asset_id: u64,
        manager: Option<Address>,
        reserve: Option<Address>,
        freeze: Option<Address>,
        clawback: Option<Address>,
    ) -> Result<Self, TransactionError> {
        let raw = BASE64
            .decode(&params.genesis_hash)
            .map_err(TransactionError::MalformedGenesisHash)?;
        let genesis_hash: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| TransactionError::GenesisHashLength(raw.len()))?;

        let mut txn = Self {
            sender,
            fee: 0,
            first_valid: params.last_round,
            last_valid: params.last_round + VALIDITY_WINDOW,
            genesis_id: params.genesis_id.clone(),
            genesis_hash,
            asset_id,
            manager,
            reserve,
            freeze,
            clawback,
        };
        txn.fee = txn.suggested_fee(params)?;
        Ok(txn)
    }

    // Per-byte fee over the estimated signed size, floored at the minimum.
    // The size estimate encodes the transaction before the fee is set, the
    // same way the reference SDKs do it.
    fn suggested_fee(&self, params: &SuggestedParams) -> Result<u64, TransactionError> {
        if params.fee_per_byte == 0 {
            return Ok(params.min_fee);
        }
        let estimated_size = self.encode()?.len() as u64 + SIG_OVERHEAD;
        Ok((params.fee_per_byte * estimated_size).max(params.min_fee))
    }

    /// Canonical MessagePack encoding of the unsigned transaction.
    pub fn encode(&self) -> Result<Vec<u8>, TransactionError> {
        let mut out = Vec::new();
        rmpv::encode::write_value(&mut out, &self.to_value()).map_err(TransactionError::Encode)?;
        Ok(out)
    }

    /// Sign with the sender's key, returning the transaction id and the
    /// submission-ready envelope.
    pub fn sign(&self, key: &SigningKey) -> Result<SignedTransaction, TransactionError> {
        let body = self.encode()?;
        let mut message = Vec::with_capacity(TXID_PREFIX.len() + body.len());
        message.extend_from_slice(TXID_PREFIX);
        message.extend_from_slice(&body);

        let signature = key.sign(&message);
        let txid = BASE32_NOPAD.encode(&Sha512_256::digest(&message));

        let envelope = Value::Map(vec![
            entry("sig", Value::Binary(signature.to_bytes().to_vec())),
            entry("txn", self.to_value()),
        ]);
        let mut bytes = Vec::new();
        rmpv::encode::write_value(&mut bytes, &envelope).map_err(TransactionError::Encode)?;

        Ok(SignedTransaction { txid, bytes })
    }

    // Map keys must stay lexicographically ordered and zero values omitted.
    fn to_value(&self) -> Value {
        let mut params = Vec::new();
        if let Some(clawback) = self.clawback {
            params.push(entry("c", bin(&clawback)));
        }
        if let Some(freeze) = self.freeze {
            params.push(entry("f", bin(&freeze)));
        }
        if let Some(manager) = self.manager {
            params.push(entry("m", bin(&manager)));
        }
        if let Some(reserve) = self.reserve {
            params.push(entry("r", bin(&reserve)));
        }

        let mut fields = Vec::new();
        if !params.is_empty() {
            fields.push(entry("apar", Value::Map(params)));
        }
        if self.asset_id > 0 {
            fields.push(entry("caid", Value::from(self.asset_id)));
        }
        if self.fee > 0 {
            fields.push(entry("fee", Value::from(self.fee)));
        }
        if self.first_valid > 0 {
            fields.push(entry("fv", Value::from(self.first_valid)));
        }
        if !self.genesis_id.is_empty() {
            fields.push(entry("gen", Value::from(self.genesis_id.as_str())));
        }
        fields.push(entry("gh", Value::Binary(self.genesis_hash.to_vec())));
        if self.last_valid > 0 {
            fields.push(entry("lv", Value::from(self.last_valid)));
        }
        fields.push(entry("snd", bin(&self.sender)));
        fields.push(entry("type", Value::from("acfg")));
        Value::Map(fields)
    }
}

fn entry(key: &str, value: Value) -> (Value, Value) {
    (Value::from(key), value)
}

fn bin(address: &Address) -> Value {
    Value::Binary(address.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Verifier, VerifyingKey};

    fn params() -> SuggestedParams {
        SuggestedParams {
            fee_per_byte: 0,
            min_fee: 1000,
            last_round: 41_000_000,
            genesis_id: "testnet-v1.0".to_string(),
            genesis_hash: "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=".to_string(),
        }
    }

    fn sender() -> Address {
        Address([7u8; 32])
    }

    fn reserve() -> Address {
        Address([9u8; 32])
    }

    fn txn() -> AssetConfigTxn {
        AssetConfigTxn::new(
            sender(),
            &params(),
            77,
            Some(sender()),
            Some(reserve()),
            None,
            None,
        )
        .unwrap()
    }

    fn map_keys(value: &Value) -> Vec<String> {
        value
            .as_map()
            .unwrap()
            .iter()
            .map(|(key, _)| key.as_str().unwrap().to_string())
            .collect()
    }

    fn decode(bytes: &[u8]) -> Value {
        rmpv::decode::read_value(&mut &bytes[..]).unwrap()
    }

    #[test]
    fn test_canonical_key_order() {
        let encoded = txn().encode().unwrap();
        let value = decode(&encoded);
        assert_eq!(
            map_keys(&value),
            ["apar", "caid", "fee", "fv", "gen", "gh", "lv", "snd", "type"]
        );

        let apar = &value.as_map().unwrap()[0].1;
        assert_eq!(map_keys(apar), ["m", "r"]);
    }

    #[test]
    fn test_unset_roles_are_omitted() {
        let encoded = txn().encode().unwrap();
        let value = decode(&encoded);
        let apar = &value.as_map().unwrap()[0].1;
        let keys = map_keys(apar);
        assert!(!keys.contains(&"c".to_string()));
        assert!(!keys.contains(&"f".to_string()));
    }

    #[test]
    fn test_addresses_encode_as_binary() {
        let encoded = txn().encode().unwrap();
        let value = decode(&encoded);
        let map = value.as_map().unwrap();
        let snd = &map.iter().find(|(k, _)| k.as_str() == Some("snd")).unwrap().1;
        assert_eq!(snd.as_slice().unwrap(), sender().as_bytes());
    }

    #[test]
    fn test_zero_per_byte_fee_falls_back_to_min_fee() {
        assert_eq!(txn().fee, 1000);
    }

    #[test]
    fn test_per_byte_fee_with_min_floor() {
        let mut suggested = params();
        suggested.fee_per_byte = 10;
        let txn = AssetConfigTxn::new(
            sender(),
            &suggested,
            77,
            Some(sender()),
            Some(reserve()),
            None,
            None,
        )
        .unwrap();

        // Fee covers the estimated signed size of the zero-fee encoding.
        let mut zero_fee = txn.clone();
        zero_fee.fee = 0;
        let expected = 10 * (zero_fee.encode().unwrap().len() as u64 + 75);
        assert_eq!(txn.fee, expected.max(1000));
        assert!(txn.fee >= 1000);
    }

    #[test]
    fn test_signature_verifies_over_prefixed_body() {
        let key = SigningKey::from_bytes(&[3u8; 32]);
        let txn = txn();
        let signed = txn.sign(&key).unwrap();

        let envelope = decode(&signed.bytes);
        assert_eq!(map_keys(&envelope), ["sig", "txn"]);
        let sig_bytes = envelope.as_map().unwrap()[0].1.as_slice().unwrap().to_vec();

        let mut message = b"TX".to_vec();
        message.extend_from_slice(&txn.encode().unwrap());

        let verifying: VerifyingKey = key.verifying_key();
        let signature = ed25519_dalek::Signature::from_slice(&sig_bytes).unwrap();
        verifying.verify(&message, &signature).unwrap();
    }

    #[test]
    fn test_txid_shape_and_sensitivity() {
        let key = SigningKey::from_bytes(&[3u8; 32]);
        let signed = txn().sign(&key).unwrap();
        assert_eq!(signed.txid.len(), 52);

        let mut other = txn();
        other.reserve = Some(Address([10u8; 32]));
        let other_signed = other.sign(&key).unwrap();
        assert_ne!(signed.txid, other_signed.txid);
    }

    #[test]
    fn test_rejects_malformed_genesis_hash() {
        let mut suggested = params();
        suggested.genesis_hash = "not base64!!".to_string();
        let err = AssetConfigTxn::new(sender(), &suggested, 77, None, None, None, None)
            .unwrap_err();
        assert!(matches!(err, TransactionError::MalformedGenesisHash(_)));
    }

    #[test]
    fn test_rejects_genesis_hash_of_wrong_width() {
        let mut suggested = params();
        // 16 bytes instead of 32
        suggested.genesis_hash = "AAAAAAAAAAAAAAAAAAAAAA==".to_string();
        let err = AssetConfigTxn::new(sender(), &suggested, 77, None, None, None, None)
            .unwrap_err();
        assert!(matches!(err, TransactionError::GenesisHashLength(16)));
    }
}
