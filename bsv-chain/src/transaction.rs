//! Transactions: version, ordered inputs, ordered outputs, and a lock time.

use std::io;

use crate::cached::Cached;
use crate::serialization::sha256d::{self, Sha256dHash};
use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use crate::transparent::{TxIn, TxOut};
use crate::varint::{self, VarInt};

/// A sanity limit on transaction size, matching a whole block's worth of
/// data, to protect deserialization against a hostile or truncated length.
pub const MAX_TX_SIZE: u64 = 1_000_000;

/// A Bitcoin transaction.
#[derive(Clone, Debug)]
pub struct Tx {
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
    hash: Cached<Sha256dHash>,
}

impl PartialEq for Tx {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.lock_time == other.lock_time
    }
}
impl Eq for Tx {}

impl Tx {
    pub fn new(version: u32, inputs: Vec<TxIn>, outputs: Vec<TxOut>, lock_time: u32) -> Self {
        Tx {
            version,
            inputs,
            outputs,
            lock_time,
            hash: Cached::new(),
        }
    }

    /// `SHA256(SHA256(serialize(tx)))`, memoized after the first call (or
    /// after deserialization, which always populates it).
    pub fn hash(&self) -> Sha256dHash {
        if let Some(h) = self.hash.value() {
            return h;
        }
        let mut writer = sha256d::Writer::default();
        self.bitcoin_serialize(&mut writer)
            .expect("writing to a hasher cannot fail");
        writer.finish()
    }

    /// The byte-reversed, hex-encoded form of [`Tx::hash`].
    pub fn txid(&self) -> String {
        self.hash().reversed_hex()
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_coinbase()
    }

    pub fn serialized_size(&self) -> usize {
        let mut size = 4;
        size += VarInt::size(self.inputs.len() as u64);
        for input in &self.inputs {
            size += input.size();
        }
        size += VarInt::size(self.outputs.len() as u64);
        for output in &self.outputs {
            size += output.size();
        }
        size + 4
    }
}

impl BitcoinSerialize for Tx {
    fn bitcoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.version.bitcoin_serialize(&mut writer)?;
        VarInt::from(self.inputs.len() as u64).bitcoin_serialize(&mut writer)?;
        for input in &self.inputs {
            input.bitcoin_serialize(&mut writer)?;
        }
        VarInt::from(self.outputs.len() as u64).bitcoin_serialize(&mut writer)?;
        for output in &self.outputs {
            output.bitcoin_serialize(&mut writer)?;
        }
        self.lock_time.bitcoin_serialize(&mut writer)
    }
}

impl BitcoinDeserialize for Tx {
    fn bitcoin_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError> {
        let mut reader = reader.take(MAX_TX_SIZE);
        let version = u32::bitcoin_deserialize(&mut reader)?;
        let inputs = varint::parse_items(&mut reader)?;
        let outputs = varint::parse_items(&mut reader)?;
        let lock_time = u32::bitcoin_deserialize(&mut reader)?;
        let mut tx = Tx {
            version,
            inputs,
            outputs,
            lock_time,
            hash: Cached::new(),
        };
        let own_hash = tx.hash();
        tx.hash = Cached::from(own_hash);
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Chunk, Opcode, Script};
    use crate::transparent::OutPoint;

    fn sample_tx() -> Tx {
        Tx::new(
            1,
            vec![TxIn::new(
                OutPoint {
                    hash: Sha256dHash::from([0x11; 32]),
                    vout: 0,
                },
                Script::new(vec![Chunk::push(vec![0xAA; 71])]),
            )],
            vec![TxOut::new(
                50_000,
                Script::new(vec![
                    Chunk::op(Opcode::Dup),
                    Chunk::op(Opcode::Hash160),
                    Chunk::push(vec![0xBB; 20]),
                    Chunk::op(Opcode::EqualVerify),
                    Chunk::op(Opcode::CheckSig),
                ]),
            )],
            0,
        )
    }

    #[test]
    fn wire_round_trip() {
        let tx = sample_tx();
        let bytes = tx.bitcoin_serialize_to_vec().unwrap();
        assert_eq!(bytes.len(), tx.serialized_size());
        let decoded = Tx::bitcoin_deserialize(&bytes[..]).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.hash(), tx.hash());
    }

    #[test]
    fn hash_is_memoized_after_deserialize() {
        let tx = sample_tx();
        let bytes = tx.bitcoin_serialize_to_vec().unwrap();
        let decoded = Tx::bitcoin_deserialize(&bytes[..]).unwrap();
        assert!(decoded.hash.has_value());
    }

    #[test]
    fn single_coinbase_input_is_coinbase() {
        let tx = Tx::new(
            1,
            vec![TxIn::new(OutPoint::null(), Script::coinbase(vec![0x04]))],
            vec![TxOut::new(5_000_000_000, Script::empty())],
            0,
        );
        assert!(tx.is_coinbase());
    }

    #[test]
    fn txid_is_hash_byte_reversed_hex() {
        let tx = sample_tx();
        assert_eq!(tx.txid(), tx.hash().reversed_hex());
    }
}
