use ripemd160::{Digest, Ripemd160};
use sha2::Sha256;

use super::{KeyError, PubKey};
use crate::parameters::Network;

/// A P2PKH address: `Base58Check(version_byte ‖ RIPEMD160(SHA256(pubkey)))`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Address {
    network: Network,
    version_byte: u8,
    hash: [u8; 20],
}

impl Address {
    pub fn new(network: Network, hash: [u8; 20]) -> Self {
        Address {
            network,
            version_byte: network.address_version_byte(),
            hash,
        }
    }

    pub fn from_pubkey(network: Network, pubkey: &PubKey) -> Self {
        Address::new(network, hash_pubkey(&pubkey.to_bytes()))
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn version_byte(&self) -> u8 {
        self.version_byte
    }

    pub fn hash(&self) -> &[u8; 20] {
        &self.hash
    }
}

impl std::str::FromStr for Address {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .with_check(None)
            .into_vec()
            .map_err(|_| KeyError::Base58Check)?;
        if bytes.len() != 21 {
            return Err(KeyError::Malformed("address payload has wrong length"));
        }
        let network = match bytes[0] {
            0x00 => Network::Main,
            0x6F => Network::Test,
            _ => return Err(KeyError::Malformed("unknown address version byte")),
        };
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&bytes[1..21]);
        Ok(Address::new(network, hash))
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Address").field("address", &self.to_string()).finish()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut payload = Vec::with_capacity(21);
        payload.push(self.version_byte);
        payload.extend_from_slice(&self.hash);
        write!(f, "{}", bs58::encode(payload).with_check().into_string())
    }
}

fn hash_pubkey(bytes: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(bytes);
    let ripe = Ripemd160::digest(&sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripe);
    out
}
