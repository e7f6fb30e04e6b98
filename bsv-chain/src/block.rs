//! Blocks: a fixed 80-byte header chaining to the previous block, plus the
//! list of transactions it commits to via its Merkle root.

mod merkle;

pub use merkle::{MerkleNode, MerkleProof, MerkleTarget, NodeKind, TxOrHash};

use std::io;

use crate::cached::Cached;
use crate::serialization::sha256d::{self, Sha256dHash};
use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use crate::transaction::Tx;
use crate::varint::{self, VarInt};

/// The maximum size of a Bitcoin block, in bytes.
pub const MAX_BLOCK_BYTES: u64 = 4_000_000;

/// An 80-byte block header.
#[derive(Clone, Copy, Debug)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_hash: Sha256dHash,
    pub merkle_root: Sha256dHash,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl PartialEq for BlockHeader {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.prev_hash == other.prev_hash
            && self.merkle_root == other.merkle_root
            && self.time == other.time
            && self.bits == other.bits
            && self.nonce == other.nonce
    }
}
impl Eq for BlockHeader {}

impl BlockHeader {
    pub const fn len() -> usize {
        80
    }

    pub fn hash(&self) -> Sha256dHash {
        let mut writer = sha256d::Writer::default();
        self.bitcoin_serialize(&mut writer)
            .expect("writing to a hasher cannot fail");
        writer.finish()
    }
}

impl BitcoinSerialize for BlockHeader {
    fn bitcoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.version.bitcoin_serialize(&mut writer)?;
        self.prev_hash.bitcoin_serialize(&mut writer)?;
        self.merkle_root.bitcoin_serialize(&mut writer)?;
        self.time.bitcoin_serialize(&mut writer)?;
        self.bits.bitcoin_serialize(&mut writer)?;
        self.nonce.bitcoin_serialize(&mut writer)
    }
}

impl BitcoinDeserialize for BlockHeader {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(BlockHeader {
            version: u32::bitcoin_deserialize(&mut reader)?,
            prev_hash: Sha256dHash::bitcoin_deserialize(&mut reader)?,
            merkle_root: Sha256dHash::bitcoin_deserialize(&mut reader)?,
            time: u32::bitcoin_deserialize(&mut reader)?,
            bits: u32::bitcoin_deserialize(&mut reader)?,
            nonce: u32::bitcoin_deserialize(&mut reader)?,
        })
    }
}

/// A block: a header plus the transactions it commits to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub txns: Vec<Tx>,
    hash: Cached<Sha256dHash>,
}

impl Block {
    pub fn new(header: BlockHeader, txns: Vec<Tx>) -> Self {
        Block {
            header,
            txns,
            hash: Cached::new(),
        }
    }

    pub fn hash(&self) -> Sha256dHash {
        if let Some(h) = self.hash.value() {
            return h;
        }
        self.header.hash()
    }

    /// Recomputes the Merkle root of [`Block::txns`] from scratch.
    pub fn calc_merkle_root(&self) -> Sha256dHash {
        merkle::calc_merkle_root(self.txns.iter().map(Tx::hash).collect())
    }

    /// `true` iff the header's advertised root matches the transactions.
    pub fn merkle_root_is_valid(&self) -> bool {
        self.calc_merkle_root() == self.header.merkle_root
    }
}

impl BitcoinSerialize for Block {
    fn bitcoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.header.bitcoin_serialize(&mut writer)?;
        VarInt::from(self.txns.len() as u64).bitcoin_serialize(&mut writer)?;
        for tx in &self.txns {
            tx.bitcoin_serialize(&mut writer)?;
        }
        Ok(())
    }
}

impl BitcoinDeserialize for Block {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let header = BlockHeader::bitcoin_deserialize(&mut reader)?;
        let mut reader = reader.take(MAX_BLOCK_BYTES - BlockHeader::len() as u64);
        let tx_count = VarInt::bitcoin_deserialize(&mut reader)?.value() as usize;
        // Every transaction needs at least one input (36 bytes of outpoint
        // plus a one-byte script length and sequence), so this bounds the
        // allocation below against a hostile declared count.
        if tx_count as u64 > MAX_BLOCK_BYTES / 41 {
            return Err(SerializationError::Parse(
                "block declares more transactions than could possibly fit",
            ));
        }
        let txns = varint::parse_items_of_count(&mut reader, tx_count)?;
        Ok(Block {
            header,
            txns,
            hash: Cached::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Script;
    use crate::transparent::{OutPoint, TxIn, TxOut};

    fn coinbase_only_block() -> Block {
        let coinbase_tx = Tx::new(
            1,
            vec![TxIn::new(OutPoint::null(), Script::coinbase(vec![0x04]))],
            vec![TxOut::new(5_000_000_000, Script::empty())],
            0,
        );
        let merkle_root = coinbase_tx.hash();
        let header = BlockHeader {
            version: 1,
            prev_hash: Sha256dHash::default(),
            merkle_root,
            time: 0,
            bits: 0,
            nonce: 0,
        };
        Block::new(header, vec![coinbase_tx])
    }

    #[test]
    fn single_tx_merkle_root_is_its_own_hash() {
        let block = coinbase_only_block();
        assert_eq!(block.calc_merkle_root(), block.header.merkle_root);
        assert!(block.merkle_root_is_valid());
    }

    #[test]
    fn header_wire_round_trip_is_80_bytes() {
        let block = coinbase_only_block();
        let bytes = block.header.bitcoin_serialize_to_vec().unwrap();
        assert_eq!(bytes.len(), BlockHeader::len());
        let decoded = BlockHeader::bitcoin_deserialize(&bytes[..]).unwrap();
        assert_eq!(decoded, block.header);
    }

    #[test]
    fn block_wire_round_trip() {
        let block = coinbase_only_block();
        let bytes = block.bitcoin_serialize_to_vec().unwrap();
        let decoded = Block::bitcoin_deserialize(&bytes[..]).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn odd_tx_count_duplicates_the_last_hash() {
        let mut block = coinbase_only_block();
        let second = Tx::new(
            1,
            vec![TxIn::new(
                OutPoint {
                    hash: Sha256dHash::from([0x22; 32]),
                    vout: 0,
                },
                Script::empty(),
            )],
            vec![TxOut::new(1_000, Script::empty())],
            0,
        );
        let first_hash = block.txns[0].hash();
        let second_hash = second.hash();
        block.txns.push(second);

        let expected = sha256d::hash(
            &[first_hash.as_bytes().as_slice(), second_hash.as_bytes().as_slice()].concat(),
        );
        assert_eq!(block.calc_merkle_root(), expected);
    }
}
