//! BIP-39 mnemonic encoding of entropy, and mnemonic-to-seed derivation.

use lazy_static::lazy_static;
use pbkdf2::pbkdf2;
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

use crate::parameters::Language;

const ENGLISH_WORDLIST_RAW: &str = include_str!("../assets/english.txt");

lazy_static! {
    static ref ENGLISH_WORDLIST: Vec<&'static str> = ENGLISH_WORDLIST_RAW.lines().collect();
}

fn wordlist(language: Language) -> &'static [&'static str] {
    match language {
        Language::English => &ENGLISH_WORDLIST,
    }
}

#[derive(Error, Debug)]
pub enum MnemonicError {
    #[error("entropy length {0} bits is not one of {{128, 160, 192, 224, 256}}")]
    InvalidEntropyLength(usize),
    #[error("word {0:?} is not in the wordlist")]
    UnknownWord(String),
    #[error("mnemonic has an invalid word count")]
    InvalidWordCount,
    #[error("checksum mismatch")]
    BadChecksum,
}

/// A BIP-39 mnemonic phrase, backed by between 128 and 256 bits of entropy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mnemonic {
    language: Language,
    entropy: Vec<u8>,
}

impl Mnemonic {
    /// Wraps `entropy` (16..32 bytes, multiple of 4) as a mnemonic.
    pub fn from_entropy(entropy: Vec<u8>, language: Language) -> Result<Self, MnemonicError> {
        let bits = entropy.len() * 8;
        if !matches!(bits, 128 | 160 | 192 | 224 | 256) {
            return Err(MnemonicError::InvalidEntropyLength(bits));
        }
        Ok(Mnemonic { language, entropy })
    }

    pub fn entropy(&self) -> &[u8] {
        &self.entropy
    }

    /// Generates a new mnemonic from `bits` of OS randomness.
    pub fn generate(bits: usize, language: Language) -> Result<Self, MnemonicError> {
        if !matches!(bits, 128 | 160 | 192 | 224 | 256) {
            return Err(MnemonicError::InvalidEntropyLength(bits));
        }
        use rand::RngCore;
        let mut entropy = vec![0u8; bits / 8];
        rand::thread_rng().fill_bytes(&mut entropy);
        Ok(Mnemonic { language, entropy })
    }

    /// Renders the mnemonic phrase: entropy bits plus a checksum suffix of
    /// `entropy_bits / 32` bits, split into 11-bit word indices.
    pub fn phrase(&self) -> String {
        let words = wordlist(self.language);
        let checksum_bit_count = self.entropy.len() * 8 / 32;
        let checksum_byte = Sha256::digest(&self.entropy)[0];

        let mut bits: Vec<bool> = Vec::with_capacity(self.entropy.len() * 8 + checksum_bit_count);
        for byte in &self.entropy {
            for i in (0..8).rev() {
                bits.push((byte >> i) & 1 == 1);
            }
        }
        for i in 0..checksum_bit_count {
            bits.push((checksum_byte >> (7 - i)) & 1 == 1);
        }

        bits.chunks(11)
            .map(|chunk| {
                let index = chunk.iter().fold(0u16, |acc, &b| (acc << 1) | (b as u16));
                words[index as usize]
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parses a phrase, verifying its embedded checksum.
    pub fn from_phrase(phrase: &str, language: Language) -> Result<Self, MnemonicError> {
        let words = wordlist(language);
        let tokens: Vec<&str> = phrase.split_whitespace().collect();
        if tokens.is_empty() || tokens.len() % 3 != 0 {
            return Err(MnemonicError::InvalidWordCount);
        }

        let mut bits: Vec<bool> = Vec::with_capacity(tokens.len() * 11);
        for token in &tokens {
            let index = words
                .iter()
                .position(|w| w == token)
                .ok_or_else(|| MnemonicError::UnknownWord((*token).to_owned()))?;
            for i in (0..11).rev() {
                bits.push((index >> i) & 1 == 1);
            }
        }

        let total_bits = bits.len();
        let entropy_bits = total_bits * 32 / 33;
        let checksum_bits = total_bits - entropy_bits;

        let mut entropy = vec![0u8; entropy_bits / 8];
        for (i, byte) in entropy.iter_mut().enumerate() {
            let mut value = 0u8;
            for b in 0..8 {
                value = (value << 1) | (bits[i * 8 + b] as u8);
            }
            *byte = value;
        }

        let expected_checksum_byte = Sha256::digest(&entropy)[0];
        for i in 0..checksum_bits {
            let expected_bit = (expected_checksum_byte >> (7 - i)) & 1 == 1;
            if bits[entropy_bits + i] != expected_bit {
                return Err(MnemonicError::BadChecksum);
            }
        }

        Ok(Mnemonic { language, entropy })
    }

    /// `PBKDF2-HMAC-SHA512(password=mnemonic, salt="mnemonic" ‖ passphrase, iterations=2048, dkLen=64)`.
    pub fn to_seed(&self, passphrase: &str) -> [u8; 64] {
        let phrase = self.phrase();
        let salt = format!("mnemonic{}", passphrase);
        let mut seed = [0u8; 64];
        pbkdf2::<hmac::Hmac<Sha512>>(phrase.as_bytes(), salt.as_bytes(), 2048, &mut seed);
        seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_entropy_length() {
        assert!(Mnemonic::from_entropy(vec![0u8; 15], Language::English).is_err());
    }

    #[test]
    fn all_zero_entropy_has_known_first_and_last_word() {
        let mnemonic = Mnemonic::from_entropy(vec![0u8; 16], Language::English).unwrap();
        let phrase = mnemonic.phrase();
        let words: Vec<&str> = phrase.split_whitespace().collect();
        assert_eq!(words.len(), 12);
        assert_eq!(words[0], "abandon");
        assert_eq!(words[11], "about");
    }

    #[test]
    fn phrase_round_trips_through_parsing() {
        let mnemonic = Mnemonic::from_entropy(vec![0xAB; 32], Language::English).unwrap();
        let phrase = mnemonic.phrase();
        assert_eq!(phrase.split_whitespace().count(), 24);
        let parsed = Mnemonic::from_phrase(&phrase, Language::English).unwrap();
        assert_eq!(parsed, mnemonic);
    }

    #[test]
    fn corrupted_checksum_word_is_rejected() {
        let mnemonic = Mnemonic::from_entropy(vec![0u8; 16], Language::English).unwrap();
        let mut words: Vec<&str> = mnemonic.phrase().split_whitespace().collect();
        let last = words.len() - 1;
        words[last] = if words[last] == "abandon" { "zoo" } else { "abandon" };
        let phrase = words.join(" ");
        assert!(Mnemonic::from_phrase(&phrase, Language::English).is_err());
    }

    #[test]
    fn seed_is_64_bytes_and_deterministic() {
        let mnemonic = Mnemonic::from_entropy(vec![0u8; 16], Language::English).unwrap();
        let a = mnemonic.to_seed("");
        let b = mnemonic.to_seed("");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, mnemonic.to_seed("TREZOR"));
    }
}
