use secp256k1::SecretKey;

use super::KeyError;
use crate::parameters::Network;

/// A secp256k1 private key, tagged with whether it pairs with a compressed
/// or uncompressed public key (this flag only affects WIF/pubkey encoding,
/// never the scalar itself).
#[derive(Clone, Copy)]
pub struct PrivKey {
    secret: SecretKey,
    compressed: bool,
}

impl PrivKey {
    pub fn new(secret: SecretKey, compressed: bool) -> Self {
        PrivKey { secret, compressed }
    }

    pub fn from_bytes(bytes: &[u8; 32], compressed: bool) -> Result<Self, KeyError> {
        let secret = SecretKey::from_slice(bytes)?;
        Ok(PrivKey { secret, compressed })
    }

    pub fn random(compressed: bool) -> Self {
        let mut rng = rand::thread_rng();
        PrivKey {
            secret: SecretKey::new(&mut rng),
            compressed,
        }
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn compressed(&self) -> bool {
        self.compressed
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.secret[..]);
        out
    }

    /// `Base58Check(version ‖ d ‖ (0x01 if compressed))`.
    pub fn to_wif(&self, network: Network) -> String {
        let mut payload = Vec::with_capacity(34);
        payload.push(network.wif_version_byte());
        payload.extend_from_slice(&self.to_bytes());
        if self.compressed {
            payload.push(0x01);
        }
        bs58::encode(payload).with_check().into_string()
    }

    pub fn from_wif(wif: &str) -> Result<(Self, Network), KeyError> {
        let bytes = bs58::decode(wif)
            .with_check(None)
            .into_vec()
            .map_err(|_| KeyError::Base58Check)?;
        if bytes.len() != 33 && bytes.len() != 34 {
            return Err(KeyError::Malformed("wif payload has wrong length"));
        }
        let network = match bytes[0] {
            0x80 => Network::Main,
            0xEF => Network::Test,
            _ => return Err(KeyError::Malformed("unknown wif version byte")),
        };
        let compressed = bytes.len() == 34;
        if compressed && bytes[33] != 0x01 {
            return Err(KeyError::Malformed("unexpected wif compression marker"));
        }
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&bytes[1..33]);
        let privkey = PrivKey::from_bytes(&scalar, compressed)?;
        Ok((privkey, network))
    }
}

impl std::fmt::Debug for PrivKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivKey")
            .field("compressed", &self.compressed)
            .finish()
    }
}
