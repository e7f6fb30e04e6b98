use secp256k1::{Secp256k1, SecretKey};

use super::{KeyError, PrivKey, PubKey};

/// A private key paired with its corresponding public key. Both halves
/// always agree on `compressed`.
#[derive(Clone, Copy)]
pub struct KeyPair {
    privkey: PrivKey,
    pubkey: PubKey,
}

impl KeyPair {
    pub fn from_privkey(secp: &Secp256k1<impl secp256k1::Signing>, privkey: PrivKey) -> Self {
        let pubkey = PubKey::from_secret(secp, privkey.secret_key(), privkey.compressed());
        KeyPair { privkey, pubkey }
    }

    pub fn random(secp: &Secp256k1<impl secp256k1::Signing>, compressed: bool) -> Self {
        Self::from_privkey(secp, PrivKey::random(compressed))
    }

    pub fn from_bytes(
        secp: &Secp256k1<impl secp256k1::Signing>,
        bytes: &[u8; 32],
        compressed: bool,
    ) -> Result<Self, KeyError> {
        Ok(Self::from_privkey(secp, PrivKey::from_bytes(bytes, compressed)?))
    }

    pub fn privkey(&self) -> &PrivKey {
        &self.privkey
    }

    pub fn pubkey(&self) -> &PubKey {
        &self.pubkey
    }

    pub fn secret_key(&self) -> &SecretKey {
        self.privkey.secret_key()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair").field("pubkey", &self.pubkey).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_pubkey_matches_compression_flag() {
        let secp = Secp256k1::new();
        let pair = KeyPair::from_bytes(&secp, &bsv_test::vectors::TEST_PRIVKEY_SCALAR, true).unwrap();
        assert_eq!(pair.pubkey().compressed(), true);
        assert_eq!(pair.pubkey().to_bytes().len(), 33);
    }
}
