//! BIP-32 hierarchical deterministic key derivation.

use hmac::{Hmac, Mac, NewMac};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::Sha512;
use thiserror::Error;

use crate::keys::{KeyError, PrivKey, PubKey};
use crate::parameters::Network;

type HmacSha512 = Hmac<Sha512>;

const HARDENED_OFFSET: u32 = 1 << 31;

#[derive(Error, Debug)]
pub enum ExtKeyError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("base58check decoding error")]
    Base58Check,
    #[error("malformed extended key payload: {0}")]
    Malformed(&'static str),
    #[error("cannot derive a hardened child from a public-only extended key")]
    HardenedFromPublic,
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),
}

/// A BIP-32 extended key. Carries either a private key (from which the
/// public key is always derivable) or only a public key.
#[derive(Clone)]
pub struct ExtKey {
    network: Network,
    depth: u8,
    fingerprint: [u8; 4],
    child_index: u32,
    chain_code: [u8; 32],
    privkey: Option<PrivKey>,
    pubkey: PubKey,
}

impl ExtKey {
    /// Derives a master extended key from a BIP-39 seed.
    pub fn master(secp: &Secp256k1<impl secp256k1::Signing>, seed: &[u8], network: Network) -> Self {
        let mut mac = HmacSha512::new_from_slice(b"Bitcoin seed").expect("hmac key of any length");
        mac.update(seed);
        let i = mac.finalize().into_bytes();

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);

        let secret = SecretKey::from_slice(&i[..32]).expect("hmac output valid w.h.p.");
        let privkey = PrivKey::new(secret, true);
        let pubkey = PubKey::from_secret(secp, &secret, true);

        ExtKey {
            network,
            depth: 0,
            fingerprint: [0; 4],
            child_index: 0,
            chain_code,
            privkey: Some(privkey),
            pubkey,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn is_private(&self) -> bool {
        self.privkey.is_some()
    }

    pub fn privkey(&self) -> Option<&PrivKey> {
        self.privkey.as_ref()
    }

    pub fn pubkey(&self) -> &PubKey {
        &self.pubkey
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// The extended public key with the same chain code/fingerprint, stripped
    /// of its private key material.
    pub fn neuter(&self) -> Self {
        ExtKey {
            network: self.network,
            depth: self.depth,
            fingerprint: self.fingerprint,
            child_index: self.child_index,
            chain_code: self.chain_code,
            privkey: None,
            pubkey: self.pubkey,
        }
    }

    fn identifier(&self) -> [u8; 20] {
        use ripemd160::{Digest, Ripemd160};
        use sha2::{Digest as Sha2Digest, Sha256};
        let sha = Sha256::digest(&self.pubkey.to_bytes());
        let ripe = Ripemd160::digest(&sha);
        let mut out = [0u8; 20];
        out.copy_from_slice(&ripe);
        out
    }

    fn fingerprint_bytes(&self) -> [u8; 4] {
        let id = self.identifier();
        [id[0], id[1], id[2], id[3]]
    }

    /// Derives a single child at `index` (hardened if `index >= 2^31`).
    pub fn derive_child(
        &self,
        secp: &Secp256k1<secp256k1::All>,
        index: u32,
    ) -> Result<Self, ExtKeyError> {
        let hardened = index >= HARDENED_OFFSET;
        let mut mac = HmacSha512::new_from_slice(&self.chain_code).expect("hmac key of any length");

        if hardened {
            let privkey = self.privkey.ok_or(ExtKeyError::HardenedFromPublic)?;
            mac.update(&[0u8]);
            mac.update(&privkey.to_bytes());
        } else {
            mac.update(&self.pubkey.to_bytes());
        }
        mac.update(&index.to_be_bytes());

        let i = mac.finalize().into_bytes();
        let mut child_chain_code = [0u8; 32];
        child_chain_code.copy_from_slice(&i[32..]);

        let tweak = SecretKey::from_slice(&i[..32]).map_err(KeyError::from)?;

        let (privkey, pubkey) = if let Some(parent_priv) = self.privkey {
            let mut child_scalar = *parent_priv.secret_key();
            child_scalar.add_assign(&tweak[..]).map_err(KeyError::from)?;
            let pubkey = PubKey::from_secret(secp, &child_scalar, true);
            (Some(PrivKey::new(child_scalar, true)), pubkey)
        } else {
            let mut child_point: PublicKey = *self.pubkey.point();
            child_point
                .add_exp_assign(secp, &tweak[..])
                .map_err(KeyError::from)?;
            (None, PubKey::from_bytes(&child_point.serialize()).map_err(ExtKeyError::Key)?)
        };

        Ok(ExtKey {
            network: self.network,
            depth: self.depth + 1,
            fingerprint: self.fingerprint_bytes(),
            child_index: index,
            chain_code: child_chain_code,
            privkey,
            pubkey,
        })
    }

    /// Derives along a path such as `m/44'/0'/0'/0/99`.
    pub fn derive_path(
        &self,
        secp: &Secp256k1<secp256k1::All>,
        path: &DerivationPath,
    ) -> Result<Self, ExtKeyError> {
        let mut key = if path.public_only {
            self.neuter()
        } else {
            self.clone()
        };
        for index in &path.indices {
            key = key.derive_child(secp, *index)?;
        }
        Ok(key)
    }

    /// `Base58Check(version(4) ‖ depth(1) ‖ fingerprint(4) ‖ child_index(4) ‖ chain_code(32) ‖ key_material(33))`.
    pub fn to_base58(&self) -> String {
        let mut payload = Vec::with_capacity(78);
        if let Some(privkey) = &self.privkey {
            payload.extend_from_slice(&self.network.extkey_private_version());
            payload.push(self.depth);
            payload.extend_from_slice(&self.fingerprint);
            payload.extend_from_slice(&self.child_index.to_be_bytes());
            payload.extend_from_slice(&self.chain_code);
            payload.push(0x00);
            payload.extend_from_slice(&privkey.to_bytes());
        } else {
            payload.extend_from_slice(&self.network.extkey_public_version());
            payload.push(self.depth);
            payload.extend_from_slice(&self.fingerprint);
            payload.extend_from_slice(&self.child_index.to_be_bytes());
            payload.extend_from_slice(&self.chain_code);
            payload.extend_from_slice(&self.pubkey.to_bytes());
        }
        bs58::encode(payload).with_check().into_string()
    }

    pub fn from_base58(s: &str) -> Result<Self, ExtKeyError> {
        let bytes = bs58::decode(s)
            .with_check(None)
            .into_vec()
            .map_err(|_| ExtKeyError::Base58Check)?;
        if bytes.len() != 78 {
            return Err(ExtKeyError::Malformed("extended key payload has wrong length"));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[0..4]);
        let depth = bytes[4];
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&bytes[5..9]);
        let child_index = u32::from_be_bytes([bytes[9], bytes[10], bytes[11], bytes[12]]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&bytes[13..45]);

        let (network, privkey, pubkey) = if version == Network::Main.extkey_private_version()
            || version == Network::Test.extkey_private_version()
        {
            let network = if version == Network::Main.extkey_private_version() {
                Network::Main
            } else {
                Network::Test
            };
            if bytes[45] != 0x00 {
                return Err(ExtKeyError::Malformed("private key material missing leading zero"));
            }
            let mut scalar = [0u8; 32];
            scalar.copy_from_slice(&bytes[46..78]);
            let privkey = PrivKey::from_bytes(&scalar, true)?;
            let secp = Secp256k1::new();
            let pubkey = PubKey::from_secret(&secp, privkey.secret_key(), true);
            (network, Some(privkey), pubkey)
        } else if version == Network::Main.extkey_public_version()
            || version == Network::Test.extkey_public_version()
        {
            let network = if version == Network::Main.extkey_public_version() {
                Network::Main
            } else {
                Network::Test
            };
            let pubkey = PubKey::from_bytes(&bytes[45..78])?;
            (network, None, pubkey)
        } else {
            return Err(ExtKeyError::Malformed("unknown extended key version bytes"));
        };

        Ok(ExtKey {
            network,
            depth,
            fingerprint,
            child_index,
            chain_code,
            privkey,
            pubkey,
        })
    }
}

impl std::fmt::Debug for ExtKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtKey")
            .field("depth", &self.depth)
            .field("is_private", &self.is_private())
            .finish()
    }
}

/// A parsed `m/44'/0'/0'/0/99`-style derivation path. The leading `m` means
/// derive privately; a leading `M` (`public_only`) derives only public
/// children, failing on any hardened segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    public_only: bool,
    indices: Vec<u32>,
}

impl std::str::FromStr for DerivationPath {
    type Err = ExtKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('/');
        let root = segments
            .next()
            .ok_or_else(|| ExtKeyError::InvalidPath(s.to_owned()))?;
        let public_only = match root {
            "m" => false,
            "M" => true,
            _ => return Err(ExtKeyError::InvalidPath(s.to_owned())),
        };

        let mut indices = Vec::new();
        for segment in segments {
            if segment.is_empty() {
                return Err(ExtKeyError::InvalidPath(s.to_owned()));
            }
            let hardened = segment.ends_with('\'');
            let digits = if hardened { &segment[..segment.len() - 1] } else { segment };
            let number: u32 = digits
                .parse()
                .map_err(|_| ExtKeyError::InvalidPath(s.to_owned()))?;
            if hardened {
                indices.push(number.checked_add(HARDENED_OFFSET).ok_or_else(|| ExtKeyError::InvalidPath(s.to_owned()))?);
            } else {
                indices.push(number);
            }
        }

        Ok(DerivationPath { public_only, indices })
    }
}
