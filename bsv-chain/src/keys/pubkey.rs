use secp256k1::{PublicKey, Secp256k1, SecretKey};

use super::KeyError;

/// A secp256k1 public key, serialized as 33 bytes compressed or 65 bytes
/// uncompressed depending on the `compressed` flag.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PubKey {
    point: PublicKey,
    compressed: bool,
}

impl PubKey {
    pub fn from_secret(secp: &Secp256k1<impl secp256k1::Signing>, secret: &SecretKey, compressed: bool) -> Self {
        PubKey {
            point: PublicKey::from_secret_key(secp, secret),
            compressed,
        }
    }

    pub fn point(&self) -> &PublicKey {
        &self.point
    }

    pub fn compressed(&self) -> bool {
        self.compressed
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.point.serialize().to_vec()
        } else {
            self.point.serialize_uncompressed().to_vec()
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let compressed = match bytes.len() {
            33 => true,
            65 => false,
            _ => return Err(KeyError::Malformed("pubkey has wrong length")),
        };
        let point = PublicKey::from_slice(bytes)?;
        Ok(PubKey { point, compressed })
    }
}

impl std::fmt::Debug for PubKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PubKey({})", hex::encode(self.to_bytes()))
    }
}
