//! Private/public keys, key pairs, and Base58Check addresses.

mod address;
mod keypair;
mod privkey;
mod pubkey;

pub use address::Address;
pub use keypair::KeyPair;
pub use privkey::PrivKey;
pub use pubkey::PubKey;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(#[from] secp256k1::Error),
    #[error("base58check decoding error")]
    Base58Check,
    #[error("malformed key payload: {0}")]
    Malformed(&'static str),
}
