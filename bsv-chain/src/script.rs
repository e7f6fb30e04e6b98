//! The Script language: a chunk sequence, its ASM/binary codecs, and the
//! stack-based evaluator.

mod chunk;
mod num;
mod opcode;
mod vm;

pub use chunk::Chunk;
pub use opcode::Opcode;
pub use vm::{Ctx, Interpreter, Options, VmError};

use std::convert::TryFrom;
use std::io;

use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use crate::varint::VarInt;

/// An ordered sequence of chunks, or (for a coinbase input's unlocking
/// script) a raw, arbitrary byte string with no chunk structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Script {
    chunks: Vec<Chunk>,
    coinbase_bytes: Option<Vec<u8>>,
}

impl Script {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Script {
            chunks,
            coinbase_bytes: None,
        }
    }

    pub fn coinbase(bytes: Vec<u8>) -> Self {
        Script {
            chunks: Vec::new(),
            coinbase_bytes: Some(bytes),
        }
    }

    pub fn empty() -> Self {
        Script::new(Vec::new())
    }

    pub fn is_coinbase(&self) -> bool {
        self.coinbase_bytes.is_some()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn push_op(&mut self, opcode: Opcode) -> &mut Self {
        self.chunks.push(Chunk::Op(opcode));
        self
    }

    pub fn push_data(&mut self, bytes: Vec<u8>) -> &mut Self {
        self.chunks.push(Chunk::Push(bytes));
        self
    }

    /// Pushes `n` as a `ScriptNum`-encoded data chunk.
    pub fn push_int(&mut self, n: i64) -> &mut Self {
        self.chunks.push(Chunk::int(n));
        self
    }

    /// The exact bytes this script serializes to, ignoring the VarInt length
    /// prefix (used both on the wire and as the sighash subscript).
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.coinbase_bytes {
            Some(bytes) => bytes.clone(),
            None => chunk::serialize_all(&self.chunks),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SerializationError> {
        let chunks = chunk::parse_all(&bytes)?;
        Ok(Script::new(chunks))
    }

    pub fn serialized_size(&self) -> usize {
        let body = self.to_bytes();
        VarInt::size(body.len() as u64) + body.len()
    }

    /// Script minus everything before (and including) the last
    /// `OP_CODESEPARATOR`, and with every `OP_CODESEPARATOR` removed — the
    /// subscript used in legacy sighash pre-images.
    pub fn without_codeseparators(&self) -> Script {
        let filtered: Vec<Chunk> = self
            .chunks
            .iter()
            .filter(|chunk| !matches!(chunk, Chunk::Op(Opcode::CodeSeparator)))
            .cloned()
            .collect();
        Script::new(filtered)
    }

    /// Space-separated ASM rendering: opcode names, `-1` for `OP_1NEGATE`,
    /// `0` for `OP_0`, otherwise lowercase hex of the pushdata.
    pub fn to_asm(&self) -> String {
        if let Some(bytes) = &self.coinbase_bytes {
            return hex::encode(bytes);
        }
        self.chunks
            .iter()
            .map(|chunk| match chunk {
                Chunk::Op(Opcode::False) => "0".to_owned(),
                Chunk::Op(Opcode::OneNegate) => "-1".to_owned(),
                Chunk::Op(opcode) => opcode.name().to_owned(),
                Chunk::Push(bytes) => hex::encode(bytes),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn from_asm(asm: &str) -> Result<Self, SerializationError> {
        let mut chunks = Vec::new();
        for token in asm.split_whitespace() {
            let chunk = match token {
                "0" => Chunk::Op(Opcode::False),
                "-1" => Chunk::Op(Opcode::OneNegate),
                _ => {
                    if let Some(opcode) = Opcode::from_name(token) {
                        Chunk::Op(opcode)
                    } else {
                        let bytes = hex::decode(token)
                            .map_err(|_| SerializationError::Parse("invalid ASM token"))?;
                        Chunk::Push(bytes)
                    }
                }
            };
            chunks.push(chunk);
        }
        Ok(Script::new(chunks))
    }
}

impl BitcoinSerialize for Script {
    fn bitcoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        let body = self.to_bytes();
        VarInt::from(body.len() as u64).bitcoin_serialize(&mut writer)?;
        writer.write_all(&body)
    }
}

impl BitcoinDeserialize for Script {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = VarInt::bitcoin_deserialize(&mut reader)?.value() as usize;
        let blind_alloc_limit = 1024 * 1024;
        let mut bytes = vec![0u8; std::cmp::min(len, blind_alloc_limit)];
        reader.read_exact(&mut bytes)?;
        if len > blind_alloc_limit {
            let mut rest = vec![0u8; len - blind_alloc_limit];
            reader.read_exact(&mut rest)?;
            bytes.extend_from_slice(&rest);
        }
        Script::from_bytes(bytes)
    }
}

impl TryFrom<&str> for Script {
    type Error = SerializationError;

    fn try_from(asm: &str) -> Result<Self, Self::Error> {
        Script::from_asm(asm)
    }
}
