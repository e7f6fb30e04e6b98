//! Transparent (pre-segwit-style) transaction inputs and outputs: the
//! `OutPoint`/`TxIn`/`TxOut` records that make up a [`crate::transaction::Tx`].

use std::io;

use bsv_serde_derive::{BtcDeserialize, BtcSerialize};

use crate::script::Script;
use crate::serialization::sha256d::Sha256dHash;
use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use crate::varint::VarInt;

/// A reference to a particular transaction output.
///
/// The null outpoint (`hash` all zero, `vout = 0xFFFFFFFF`) marks the single
/// input of a coinbase transaction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, BtcSerialize, BtcDeserialize)]
pub struct OutPoint {
    pub hash: Sha256dHash,
    pub vout: u32,
}

impl OutPoint {
    pub const fn len() -> usize {
        36
    }

    pub fn null() -> Self {
        OutPoint {
            hash: Sha256dHash::default(),
            vout: 0xFFFF_FFFF,
        }
    }

    pub fn is_null(&self) -> bool {
        *self == OutPoint::null()
    }
}

/// An input spending a previous transaction's output.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TxIn {
    pub prev_outpoint: OutPoint,
    pub script: Script,
    pub sequence: u32,
}

impl TxIn {
    pub const DEFAULT_SEQUENCE: u32 = 0xFFFF_FFFF;

    pub fn new(prev_outpoint: OutPoint, script: Script) -> Self {
        TxIn {
            prev_outpoint,
            script,
            sequence: TxIn::DEFAULT_SEQUENCE,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.prev_outpoint.is_null()
    }

    pub fn size(&self) -> usize {
        OutPoint::len() + self.script.serialized_size() + 4
    }
}

impl BitcoinSerialize for TxIn {
    fn bitcoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.prev_outpoint.bitcoin_serialize(&mut writer)?;
        self.script.bitcoin_serialize(&mut writer)?;
        self.sequence.bitcoin_serialize(&mut writer)
    }
}

impl BitcoinDeserialize for TxIn {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(TxIn {
            prev_outpoint: OutPoint::bitcoin_deserialize(&mut reader)?,
            script: Script::bitcoin_deserialize(&mut reader)?,
            sequence: u32::bitcoin_deserialize(&mut reader)?,
        })
    }
}

/// An output created by a transaction: an amount and the locking script
/// that gates spending it.
#[derive(Clone, Debug, Eq, PartialEq, Hash, BtcSerialize, BtcDeserialize)]
pub struct TxOut {
    pub satoshis: u64,
    pub script: Script,
}

impl TxOut {
    pub fn new(satoshis: u64, script: Script) -> Self {
        TxOut { satoshis, script }
    }

    pub fn size(&self) -> usize {
        8 + self.script.serialized_size()
    }

    /// An `OP_FALSE OP_RETURN`-prefixed script carries arbitrary data and is
    /// provably unspendable; the fee calculator and dust policy treat such
    /// outputs differently from ordinary spendable ones.
    pub fn is_data_output(&self) -> bool {
        use crate::script::{Chunk, Opcode};
        matches!(
            self.script.chunks(),
            [Chunk::Op(Opcode::False), Chunk::Op(Opcode::Return), ..]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Chunk, Opcode};

    #[test]
    fn null_outpoint_marks_coinbase_input() {
        let txin = TxIn::new(OutPoint::null(), Script::coinbase(vec![0x01, 0x02]));
        assert!(txin.is_coinbase());
    }

    #[test]
    fn non_null_outpoint_is_not_coinbase() {
        let outpoint = OutPoint {
            hash: Sha256dHash::from([0xAB; 32]),
            vout: 0,
        };
        let txin = TxIn::new(outpoint, Script::empty());
        assert!(!txin.is_coinbase());
    }

    #[test]
    fn outpoint_wire_round_trip() {
        let outpoint = OutPoint {
            hash: Sha256dHash::from([0x11; 32]),
            vout: 7,
        };
        let bytes = outpoint.bitcoin_serialize_to_vec().unwrap();
        assert_eq!(bytes.len(), OutPoint::len());
        let decoded = OutPoint::bitcoin_deserialize(&bytes[..]).unwrap();
        assert_eq!(decoded, outpoint);
    }

    #[test]
    fn txin_wire_round_trip() {
        let txin = TxIn::new(
            OutPoint {
                hash: Sha256dHash::from([0x22; 32]),
                vout: 3,
            },
            Script::new(vec![Chunk::push(vec![0xAA; 4])]),
        );
        let bytes = txin.bitcoin_serialize_to_vec().unwrap();
        assert_eq!(bytes.len(), txin.size());
        let decoded = TxIn::bitcoin_deserialize(&bytes[..]).unwrap();
        assert_eq!(decoded, txin);
    }

    #[test]
    fn txout_wire_round_trip() {
        let txout = TxOut::new(5_000, Script::new(vec![Chunk::op(Opcode::Dup)]));
        let bytes = txout.bitcoin_serialize_to_vec().unwrap();
        assert_eq!(bytes.len(), txout.size());
        let decoded = TxOut::bitcoin_deserialize(&bytes[..]).unwrap();
        assert_eq!(decoded, txout);
    }

    #[test]
    fn data_output_detection() {
        let data_out = TxOut::new(
            0,
            Script::new(vec![
                Chunk::op(Opcode::False),
                Chunk::op(Opcode::Return),
                Chunk::push(vec![1, 2, 3]),
            ]),
        );
        assert!(data_out.is_data_output());

        let standard_out = TxOut::new(1_000, Script::new(vec![Chunk::op(Opcode::Dup)]));
        assert!(!standard_out.is_data_output());
    }
}
