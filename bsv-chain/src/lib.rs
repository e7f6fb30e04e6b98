//! A byte-exact Bitcoin SV data model: transactions, blocks, the Script
//! language and its VM, sighash computation, key handling (including BIP-32
//! and BIP-39), and a contract/`TxBuilder` layer for assembling and signing
//! spends without hand-writing scripts.
//!
//! Every on-wire type implements [`serialization::BitcoinSerialize`] and
//! [`serialization::BitcoinDeserialize`] rather than `serde`; `serde` itself
//! is only used where consensus bytes aren't involved (e.g. [`cached::Cached`]).

pub mod block;
pub mod builder;
pub mod cached;
pub mod contract;
pub mod encoding;
pub mod extkey;
pub mod keys;
pub mod mnemonic;
pub mod parameters;
pub mod script;
pub mod serialization;
pub mod sighash;
pub mod transaction;
pub mod transparent;
pub mod varint;

pub use block::Block;
pub use parameters::Network;
pub use script::Script;
pub use transaction::Tx;
