//! Reserve address derivation from content identifiers.
//!
//! ARC-19 repurposes an asset's reserve address field to carry the digest of
//! the asset's current metadata document: decode the metadata CID, pull the
//! raw digest out of its multihash, and re-encode those 32 bytes as an
//! ordinary checksummed address. The mapping is deterministic and public, so
//! any verifier can recompute it from the published document alone and check
//! it against the on-chain pointer.

use std::str::FromStr;

use cid::Cid;
use thiserror::Error;

use crate::address::{Address, AddressError};

/// Error types for content identifier decoding
#[derive(Debug, Error)]
pub enum ReserveError {
    /// The string is not a valid content identifier
    #[error("malformed content identifier {identifier:?}")]
    MalformedIdentifier {
        identifier: String,
        #[source]
        source: cid::Error,
    },

    /// The identifier parsed, but its multihash carries no digest payload
    #[error("content identifier {identifier:?} carries a malformed multihash")]
    MalformedMultihash { identifier: String },

    /// The digest does not fit the chain's address width
    #[error("cannot encode digest as a reserve address")]
    AddressEncoding(#[from] AddressError),
}

/// Decode a content identifier into its hash function code and raw digest.
pub fn decode(identifier: &str) -> Result<(u64, Vec<u8>), ReserveError> {
    let cid = Cid::from_str(identifier).map_err(|source| ReserveError::MalformedIdentifier {
        identifier: identifier.to_string(),
        source,
    })?;
    let hash = cid.hash();
    if hash.digest().is_empty() {
        return Err(ReserveError::MalformedMultihash {
            identifier: identifier.to_string(),
        });
    }
    Ok((hash.code(), hash.digest().to_vec()))
}

/// Derive the reserve address encoding a metadata document's digest.
pub fn reserve_address(identifier: &str) -> Result<Address, ReserveError> {
    let (_, digest) = decode(identifier)?;
    Ok(Address::from_bytes(&digest)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // CIDv1 (raw codec, sha2-256) whose digest is sha256("hello world"),
    // and the same digest wrapped as a CIDv0.
    const CID_V1: &str = "bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5e";
    const CID_V0: &str = "QmaozNR7DZHQK1ZcU9p7QdrshMvXqWK6gpu5rmrkPdT3L4";
    const DIGEST: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
    const RESERVE: &str = "XFGSPOMTJU7ARJJOKLL5U7NL7LCIJ37DPJJYB3UQRD32ZYXPZXU2WOMKPA";

    const SHA2_256_CODE: u64 = 0x12;

    #[test]
    fn test_decode_recovers_digest() {
        let (code, digest) = decode(CID_V1).unwrap();
        assert_eq!(code, SHA2_256_CODE);
        assert_eq!(digest, hex::decode(DIGEST).unwrap());
    }

    #[test]
    fn test_decode_handles_v0_identifiers() {
        let (code, digest) = decode(CID_V0).unwrap();
        assert_eq!(code, SHA2_256_CODE);
        assert_eq!(digest, hex::decode(DIGEST).unwrap());
    }

    #[test]
    fn test_reserve_address_known_vector() {
        let address = reserve_address(CID_V1).unwrap();
        assert_eq!(address.to_string(), RESERVE);
    }

    #[test]
    fn test_reserve_address_is_deterministic() {
        assert_eq!(
            reserve_address(CID_V1).unwrap(),
            reserve_address(CID_V1).unwrap()
        );
    }

    #[test]
    fn test_rejects_non_identifier() {
        let err = decode("not-a-cid").unwrap_err();
        assert!(matches!(err, ReserveError::MalformedIdentifier { .. }));
    }

    #[test]
    fn test_rejects_empty_digest() {
        // Identity-hash CID with a zero-length digest
        let err = decode("bafkqaaa").unwrap_err();
        assert!(matches!(err, ReserveError::MalformedMultihash { .. }));
    }

    #[test]
    fn test_rejects_digest_of_wrong_width() {
        // Identity-hash CID carrying the 4-byte digest "abcd"
        let err = reserve_address("bafkqabdbmjrwi").unwrap_err();
        assert!(matches!(
            err,
            ReserveError::AddressEncoding(AddressError::WrongLength(4))
        ));
    }
}
