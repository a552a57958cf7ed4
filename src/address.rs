//! Algorand address codec.
//!
//! An address is 32 bytes of payload followed by a 4-byte SHA-512/256
//! checksum, base32-encoded without padding (58 characters). The payload is
//! usually an ed25519 public key, but ARC-19 reserve addresses carry a raw
//! content digest in the same slot, so this type makes no assumption about
//! what the 32 bytes mean.

use std::fmt;
use std::str::FromStr;

use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha512_256};
use thiserror::Error;

/// Address payload width in bytes
pub const ADDRESS_LEN: usize = 32;

/// Checksum width in bytes
pub const CHECKSUM_LEN: usize = 4;

/// Error types for address encoding and decoding
#[derive(Debug, Error)]
pub enum AddressError {
    /// Payload does not match the chain's address width
    #[error("address payload must be {ADDRESS_LEN} bytes, got {0}")]
    WrongLength(usize),

    /// String form is not base32 of the expected length
    #[error("malformed address string {0:?}")]
    MalformedString(String),

    /// Trailing checksum does not match the payload
    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

/// A 32-byte Algorand address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Wrap raw payload bytes, rejecting anything that is not exactly
    /// [`ADDRESS_LEN`] bytes wide.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let payload: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressError::WrongLength(bytes.len()))?;
        Ok(Self(payload))
    }

    /// Raw payload bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    fn checksum(payload: &[u8; ADDRESS_LEN]) -> [u8; CHECKSUM_LEN] {
        let digest = Sha512_256::digest(payload);
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
        checksum
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = [0u8; ADDRESS_LEN + CHECKSUM_LEN];
        raw[..ADDRESS_LEN].copy_from_slice(&self.0);
        raw[ADDRESS_LEN..].copy_from_slice(&Self::checksum(&self.0));
        f.write_str(&BASE32_NOPAD.encode(&raw))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|_| AddressError::MalformedString(s.to_string()))?;
        if raw.len() != ADDRESS_LEN + CHECKSUM_LEN {
            return Err(AddressError::MalformedString(s.to_string()));
        }
        let address = Address::from_bytes(&raw[..ADDRESS_LEN])?;
        if raw[ADDRESS_LEN..] != Self::checksum(&address.0) {
            return Err(AddressError::ChecksumMismatch);
        }
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ed25519 public key of the all-zero seed and its address encoding
    const ZERO_SEED_PK: &str = "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29";
    const ZERO_SEED_ADDR: &str = "HNVCPPGOW2SC2YVDVDICU3YNONSTEFLXDXREHJR2YBEKDC2Z3IUZSC6YGI";

    fn zero_seed_address() -> Address {
        Address::from_bytes(&hex::decode(ZERO_SEED_PK).unwrap()).unwrap()
    }

    #[test]
    fn test_encode_known_vector() {
        let address = zero_seed_address();
        assert_eq!(address.to_string(), ZERO_SEED_ADDR);
        assert_eq!(address.to_string().len(), 58);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let address = zero_seed_address();
        assert_eq!(address.to_string(), address.to_string());
    }

    #[test]
    fn test_round_trip() {
        let parsed: Address = ZERO_SEED_ADDR.parse().unwrap();
        assert_eq!(parsed, zero_seed_address());
        assert_eq!(parsed.to_string(), ZERO_SEED_ADDR);
    }

    #[test]
    fn test_rejects_wrong_payload_width() {
        let err = Address::from_bytes(&[0u8; 20]).unwrap_err();
        assert!(matches!(err, AddressError::WrongLength(20)));
    }

    #[test]
    fn test_rejects_tampered_checksum() {
        // Flip the first character so the payload no longer matches the
        // trailing checksum.
        let tampered = format!("A{}", &ZERO_SEED_ADDR[1..]);
        let err = tampered.parse::<Address>().unwrap_err();
        assert!(matches!(err, AddressError::ChecksumMismatch));
    }

    #[test]
    fn test_rejects_malformed_string() {
        let err = "not an address".parse::<Address>().unwrap_err();
        assert!(matches!(err, AddressError::MalformedString(_)));

        // Valid base32 but too short to hold payload + checksum
        let err = "AAAA".parse::<Address>().unwrap_err();
        assert!(matches!(err, AddressError::MalformedString(_)));
    }
}
