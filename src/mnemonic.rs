//! Recovery phrase key derivation.
//!
//! Algorand accounts are backed by a 25-word recovery phrase: 24 words carry
//! the 32-byte ed25519 seed as little-endian 11-bit indexes into the BIP-39
//! English word list, and the 25th word is a checksum (the first 11 bits of
//! the SHA-512/256 digest of the seed). Only the word list is shared with
//! BIP-39; the packing and checksum are Algorand's own.

use bip39::Language;
use ed25519_dalek::SigningKey;
use sha2::{Digest, Sha512_256};
use thiserror::Error;

use crate::address::Address;

/// Words in a recovery phrase, checksum word included
pub const PHRASE_WORDS: usize = 25;

/// Seed width carried by the phrase
pub const KEY_LEN: usize = 32;

const BITS_PER_WORD: u32 = 11;
const WORD_MASK: u32 = (1 << BITS_PER_WORD) - 1;

/// Error types for recovery phrase validation
#[derive(Debug, Error)]
pub enum MnemonicError {
    /// Phrase is not exactly 25 words
    #[error("recovery phrase must contain {PHRASE_WORDS} words, got {0}")]
    WrongWordCount(usize),

    /// A word is not in the word list
    #[error("word {0:?} is not in the word list")]
    UnknownWord(String),

    /// Spill bits or checksum word do not match the decoded seed
    #[error("recovery phrase checksum mismatch")]
    ChecksumMismatch,
}

/// A signing key paired with the public address it controls.
pub struct Account {
    pub signing_key: SigningKey,
    pub address: Address,
}

/// Derive the signing account a recovery phrase encodes.
pub fn derive_account(phrase: &str) -> Result<Account, MnemonicError> {
    let seed = to_key(phrase)?;
    let signing_key = SigningKey::from_bytes(&seed);
    let address = Address(signing_key.verifying_key().to_bytes());
    Ok(Account {
        signing_key,
        address,
    })
}

/// Recover the 32-byte seed from a 25-word recovery phrase.
pub fn to_key(phrase: &str) -> Result<[u8; KEY_LEN], MnemonicError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() != PHRASE_WORDS {
        return Err(MnemonicError::WrongWordCount(words.len()));
    }

    let list = Language::English.word_list();
    let mut indexes = Vec::with_capacity(PHRASE_WORDS - 1);
    for word in &words[..PHRASE_WORDS - 1] {
        let index = list
            .iter()
            .position(|candidate| candidate == word)
            .ok_or_else(|| MnemonicError::UnknownWord(word.to_string()))?;
        indexes.push(index as u32);
    }

    // 24 words * 11 bits = 33 bytes; the last byte holds only spill bits and
    // must be zero for a seed that fits 32 bytes.
    let bytes = to_byte_array(&indexes);
    if bytes.len() != KEY_LEN + 1 || bytes[KEY_LEN] != 0 {
        return Err(MnemonicError::ChecksumMismatch);
    }

    let mut seed = [0u8; KEY_LEN];
    seed.copy_from_slice(&bytes[..KEY_LEN]);
    if checksum_word(&seed) != words[PHRASE_WORDS - 1] {
        return Err(MnemonicError::ChecksumMismatch);
    }
    Ok(seed)
}

/// Render a 32-byte seed as its 25-word recovery phrase.
pub fn from_key(seed: &[u8; KEY_LEN]) -> String {
    let list = Language::English.word_list();
    let mut words: Vec<&str> = to_u11_array(seed)
        .iter()
        .map(|&index| list[index as usize])
        .collect();
    words.push(checksum_word(seed));
    words.join(" ")
}

fn checksum_word(seed: &[u8; KEY_LEN]) -> &'static str {
    let digest = Sha512_256::digest(seed);
    let index = to_u11_array(&digest[..2])[0];
    Language::English.word_list()[index as usize]
}

fn to_u11_array(bytes: &[u8]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    for &byte in bytes {
        buffer |= u32::from(byte) << bits;
        bits += 8;
        if bits >= BITS_PER_WORD {
            out.push(buffer & WORD_MASK);
            buffer >>= BITS_PER_WORD;
            bits -= BITS_PER_WORD;
        }
    }
    if bits > 0 {
        out.push(buffer & WORD_MASK);
    }
    out
}

fn to_byte_array(indexes: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    for &index in indexes {
        buffer |= index << bits;
        bits += BITS_PER_WORD;
        while bits >= 8 {
            out.push((buffer & 0xff) as u8);
            buffer >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push((buffer & 0xff) as u8);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Phrase of the all-zero seed and the address of its ed25519 keypair
    const ZERO_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon invest";
    const ZERO_ADDR: &str = "HNVCPPGOW2SC2YVDVDICU3YNONSTEFLXDXREHJR2YBEKDC2Z3IUZSC6YGI";

    #[test]
    fn test_zero_seed_vector() {
        assert_eq!(to_key(ZERO_PHRASE).unwrap(), [0u8; KEY_LEN]);
        assert_eq!(from_key(&[0u8; KEY_LEN]), ZERO_PHRASE);
    }

    #[test]
    fn test_derived_address_is_stable() {
        let account = derive_account(ZERO_PHRASE).unwrap();
        assert_eq!(account.address.to_string(), ZERO_ADDR);

        let again = derive_account(ZERO_PHRASE).unwrap();
        assert_eq!(account.address, again.address);
    }

    #[test]
    fn test_round_trip_arbitrary_seed() {
        let mut seed = [0u8; KEY_LEN];
        for (i, byte) in seed.iter_mut().enumerate() {
            *byte = i as u8;
        }
        assert_eq!(to_key(&from_key(&seed)).unwrap(), seed);
    }

    #[test]
    fn test_rejects_wrong_word_count() {
        let err = to_key("abandon abandon abandon").unwrap_err();
        assert!(matches!(err, MnemonicError::WrongWordCount(3)));
    }

    #[test]
    fn test_rejects_unknown_word() {
        let phrase = ZERO_PHRASE.replacen("abandon", "xylophone", 1);
        let err = to_key(&phrase).unwrap_err();
        assert!(matches!(err, MnemonicError::UnknownWord(word) if word == "xylophone"));
    }

    #[test]
    fn test_rejects_corrupted_checksum_word() {
        let mut words: Vec<&str> = ZERO_PHRASE.split(' ').collect();
        words[PHRASE_WORDS - 1] = "abandon";
        let err = to_key(&words.join(" ")).unwrap_err();
        assert!(matches!(err, MnemonicError::ChecksumMismatch));
    }

    #[test]
    fn test_rejects_corrupted_data_word() {
        let mut words: Vec<&str> = ZERO_PHRASE.split(' ').collect();
        words[0] = "zoo";
        let err = to_key(&words.join(" ")).unwrap_err();
        assert!(matches!(err, MnemonicError::ChecksumMismatch));
    }
}
