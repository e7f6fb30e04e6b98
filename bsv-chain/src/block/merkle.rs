//! The transaction Merkle tree: root computation, and a standalone Merkle
//! proof (a transaction's or txid's inclusion path to a target root).

use std::io;

use super::BlockHeader;
use crate::serialization::sha256d::{self, Sha256dHash};
use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use crate::transaction::Tx;
use crate::varint::VarInt;

fn hash_pair(a: &Sha256dHash, b: &Sha256dHash) -> Sha256dHash {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(a.as_bytes());
    buf.extend_from_slice(b.as_bytes());
    sha256d::hash(&buf)
}

/// Iteratively pair-hashes `leaves` up to a single root, duplicating the
/// last element of a level when its count is odd. Returns the all-zero hash
/// for an empty input (an empty block has no defined root).
pub fn calc_merkle_root(mut level: Vec<Sha256dHash>) -> Sha256dHash {
    if level.is_empty() {
        return Sha256dHash::default();
    }
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = *level.last().unwrap();
            level.push(last);
        }
        level = level
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

/// The leaf a proof attests inclusion of: either a full transaction (whose
/// hash is computed) or a bare txid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxOrHash {
    Tx(Tx),
    Hash(Sha256dHash),
}

impl TxOrHash {
    fn leaf_hash(&self) -> Sha256dHash {
        match self {
            TxOrHash::Tx(tx) => tx.hash(),
            TxOrHash::Hash(hash) => *hash,
        }
    }
}

/// What a proof's recomputed root is checked against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MerkleTarget {
    BlockHash(Sha256dHash),
    BlockHeader(BlockHeader),
    MerkleRoot(Sha256dHash),
}

/// One sibling on the path from leaf to root: either an actual hash, or a
/// marker standing in for "duplicate the node already being carried up"
/// (the odd-level-count rule in [`calc_merkle_root`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Hash(Sha256dHash),
    Duplicate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleNode {
    pub kind: NodeKind,
}

/// A standalone proof that a transaction (or txid) is included under a
/// target Merkle root, block hash, or block header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof {
    pub index: VarInt,
    pub tx_or_hash: TxOrHash,
    pub target: MerkleTarget,
    pub nodes: Vec<MerkleNode>,
}

impl MerkleProof {
    pub fn new(index: u64, tx_or_hash: TxOrHash, target: MerkleTarget, nodes: Vec<MerkleNode>) -> Self {
        MerkleProof {
            index: VarInt::from(index),
            tx_or_hash,
            target,
            nodes,
        }
    }

    /// Bit 0 selects whether `tx_or_hash` carries a full transaction; bits
    /// 1-2 select which of the three `MerkleTarget` variants `target` is.
    pub fn flags(&self) -> u8 {
        let leaf_bit = match &self.tx_or_hash {
            TxOrHash::Tx(_) => 1,
            TxOrHash::Hash(_) => 0,
        };
        let target_bits: u8 = match &self.target {
            MerkleTarget::MerkleRoot(_) => 0,
            MerkleTarget::BlockHash(_) => 1,
            MerkleTarget::BlockHeader(_) => 2,
        };
        leaf_bit | (target_bits << 1)
    }

    /// Recomputes the root along the proof's path and checks it against
    /// `target`. A `BlockHash` target cannot be checked directly (the hash
    /// doesn't expose its preimage's Merkle root) and always fails; supply
    /// a `BlockHeader` or `MerkleRoot` target to actually verify inclusion.
    pub fn verify(&self) -> bool {
        let mut acc = self.tx_or_hash.leaf_hash();
        let mut index = self.index.value();
        for node in &self.nodes {
            let sibling = match node.kind {
                NodeKind::Hash(hash) => hash,
                NodeKind::Duplicate => acc,
            };
            acc = if index % 2 == 0 {
                hash_pair(&acc, &sibling)
            } else {
                hash_pair(&sibling, &acc)
            };
            index /= 2;
        }

        match &self.target {
            MerkleTarget::MerkleRoot(root) => acc == *root,
            MerkleTarget::BlockHeader(header) => acc == header.merkle_root,
            MerkleTarget::BlockHash(_) => false,
        }
    }
}

impl BitcoinSerialize for MerkleProof {
    fn bitcoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.flags().bitcoin_serialize(&mut writer)?;
        self.index.bitcoin_serialize(&mut writer)?;
        match &self.tx_or_hash {
            TxOrHash::Tx(tx) => tx.bitcoin_serialize(&mut writer)?,
            TxOrHash::Hash(hash) => hash.bitcoin_serialize(&mut writer)?,
        }
        match &self.target {
            MerkleTarget::MerkleRoot(hash) | MerkleTarget::BlockHash(hash) => {
                hash.bitcoin_serialize(&mut writer)?
            }
            MerkleTarget::BlockHeader(header) => header.bitcoin_serialize(&mut writer)?,
        }
        VarInt::from(self.nodes.len() as u64).bitcoin_serialize(&mut writer)?;
        for node in &self.nodes {
            match node.kind {
                NodeKind::Hash(hash) => {
                    0u8.bitcoin_serialize(&mut writer)?;
                    hash.bitcoin_serialize(&mut writer)?;
                }
                NodeKind::Duplicate => 1u8.bitcoin_serialize(&mut writer)?,
            }
        }
        Ok(())
    }
}

impl BitcoinDeserialize for MerkleProof {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let flags = u8::bitcoin_deserialize(&mut reader)?;
        let index = VarInt::bitcoin_deserialize(&mut reader)?;
        let tx_or_hash = if flags & 0x01 != 0 {
            TxOrHash::Tx(Tx::bitcoin_deserialize(&mut reader)?)
        } else {
            TxOrHash::Hash(Sha256dHash::bitcoin_deserialize(&mut reader)?)
        };
        let target = match (flags >> 1) & 0x03 {
            0 => MerkleTarget::MerkleRoot(Sha256dHash::bitcoin_deserialize(&mut reader)?),
            1 => MerkleTarget::BlockHash(Sha256dHash::bitcoin_deserialize(&mut reader)?),
            2 => MerkleTarget::BlockHeader(BlockHeader::bitcoin_deserialize(&mut reader)?),
            _ => {
                return Err(SerializationError::Parse(
                    "merkle proof flags selected an undefined target variant",
                ))
            }
        };
        let node_count = VarInt::bitcoin_deserialize(&mut reader)?.value() as usize;
        let mut nodes = Vec::with_capacity(std::cmp::min(node_count, 1024));
        for _ in 0..node_count {
            let tag = u8::bitcoin_deserialize(&mut reader)?;
            let kind = if tag == 0 {
                NodeKind::Hash(Sha256dHash::bitcoin_deserialize(&mut reader)?)
            } else {
                NodeKind::Duplicate
            };
            nodes.push(MerkleNode { kind });
        }
        Ok(MerkleProof {
            index,
            tx_or_hash,
            target,
            nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> Sha256dHash {
        sha256d::hash(&[byte])
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        let h = leaf(1);
        assert_eq!(calc_merkle_root(vec![h]), h);
    }

    #[test]
    fn two_leaves_hash_once() {
        let a = leaf(1);
        let b = leaf(2);
        assert_eq!(calc_merkle_root(vec![a, b]), hash_pair(&a, &b));
    }

    /// Exercises the odd-count duplication rule together with a second
    /// reduction level, which `two_leaves_hash_once` never reaches.
    #[test]
    fn three_leaves_duplicate_the_last_before_a_second_level() {
        let a = leaf(1);
        let b = leaf(2);
        let c = leaf(3);
        let expected = hash_pair(&hash_pair(&a, &b), &hash_pair(&c, &c));
        assert_eq!(calc_merkle_root(vec![a, b, c]), expected);
    }

    #[test]
    fn four_leaves_reduce_over_two_even_levels() {
        let a = leaf(1);
        let b = leaf(2);
        let c = leaf(3);
        let d = leaf(4);
        let expected = hash_pair(&hash_pair(&a, &b), &hash_pair(&c, &d));
        assert_eq!(calc_merkle_root(vec![a, b, c, d]), expected);
    }

    #[test]
    fn empty_input_is_zero_hash() {
        assert_eq!(calc_merkle_root(vec![]), Sha256dHash::default());
    }

    #[test]
    fn proof_verifies_against_explicit_root() {
        let leaf_hash = leaf(1);
        let sibling = leaf(2);
        let root = hash_pair(&leaf_hash, &sibling);
        let proof = MerkleProof::new(
            0,
            TxOrHash::Hash(leaf_hash),
            MerkleTarget::MerkleRoot(root),
            vec![MerkleNode {
                kind: NodeKind::Hash(sibling),
            }],
        );
        assert!(proof.verify());
    }

    #[test]
    fn proof_with_wrong_sibling_fails() {
        let leaf_hash = leaf(1);
        let root = hash_pair(&leaf_hash, &leaf(2));
        let proof = MerkleProof::new(
            0,
            TxOrHash::Hash(leaf_hash),
            MerkleTarget::MerkleRoot(root),
            vec![MerkleNode {
                kind: NodeKind::Hash(leaf(3)),
            }],
        );
        assert!(!proof.verify());
    }

    #[test]
    fn proof_wire_round_trip() {
        let proof = MerkleProof::new(
            1,
            TxOrHash::Hash(leaf(9)),
            MerkleTarget::MerkleRoot(leaf(10)),
            vec![
                MerkleNode {
                    kind: NodeKind::Hash(leaf(11)),
                },
                MerkleNode {
                    kind: NodeKind::Duplicate,
                },
            ],
        );
        let bytes = proof.bitcoin_serialize_to_vec().unwrap();
        let decoded = MerkleProof::bitcoin_deserialize(&bytes[..]).unwrap();
        assert_eq!(decoded, proof);
    }

    #[test]
    fn block_hash_target_is_unverifiable() {
        let proof = MerkleProof::new(
            0,
            TxOrHash::Hash(leaf(1)),
            MerkleTarget::BlockHash(leaf(2)),
            vec![],
        );
        assert!(!proof.verify());
    }
}
