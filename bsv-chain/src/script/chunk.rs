//! A `Chunk` is one element of a parsed script: either a named opcode or an
//! opaque pushdata byte string.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::convert::TryFrom;
use std::io::{self, Read};

use super::opcode::Opcode;
use crate::serialization::SerializationError;

const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Chunk {
    Op(Opcode),
    Push(Vec<u8>),
}

impl Chunk {
    pub fn push(bytes: Vec<u8>) -> Self {
        Chunk::Push(bytes)
    }

    pub fn op(opcode: Opcode) -> Self {
        Chunk::Op(opcode)
    }

    /// A pushdata chunk holding `n` encoded as a `ScriptNum`.
    pub fn int(n: i64) -> Self {
        Chunk::Push(super::num::encode(&num_bigint::BigInt::from(n)))
    }

    pub fn serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        match self {
            Chunk::Op(opcode) => writer.write_u8(opcode.as_byte()),
            Chunk::Push(bytes) => {
                let len = bytes.len();
                if len < 76 {
                    writer.write_u8(len as u8)?;
                } else if len < 256 {
                    writer.write_u8(OP_PUSHDATA1)?;
                    writer.write_u8(len as u8)?;
                } else if len < 65536 {
                    writer.write_u8(OP_PUSHDATA2)?;
                    writer.write_u16::<LittleEndian>(len as u16)?;
                } else {
                    writer.write_u8(OP_PUSHDATA4)?;
                    writer.write_u32::<LittleEndian>(len as u32)?;
                }
                writer.write_all(bytes)
            }
        }
    }

    /// Reads a single chunk. Returns `Ok(None)` at end of input.
    pub fn parse<R: io::Read>(mut reader: R) -> Result<Option<Chunk>, SerializationError> {
        let mut tag = [0u8; 1];
        let n = reader.read(&mut tag)?;
        if n == 0 {
            return Ok(None);
        }
        let tag = tag[0];

        let len = match tag {
            0x01..=0x4b => tag as usize,
            OP_PUSHDATA1 => reader.read_u8()? as usize,
            OP_PUSHDATA2 => reader.read_u16::<LittleEndian>()? as usize,
            OP_PUSHDATA4 => reader.read_u32::<LittleEndian>()? as usize,
            0x00 => return Ok(Some(Chunk::Op(Opcode::False))),
            other => return Ok(Some(Chunk::Op(Opcode::try_from(other)?))),
        };

        let mut bytes = vec![0u8; len];
        reader.read_exact(&mut bytes)?;
        Ok(Some(Chunk::Push(bytes)))
    }
}

/// Parses an entire script body into its chunk sequence.
pub fn parse_all(bytes: &[u8]) -> Result<Vec<Chunk>, SerializationError> {
    let mut reader = io::Cursor::new(bytes);
    let mut chunks = Vec::new();
    while let Some(chunk) = Chunk::parse(&mut reader)? {
        chunks.push(chunk);
    }
    Ok(chunks)
}

pub fn serialize_all(chunks: &[Chunk]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in chunks {
        // A Vec<u8> `Write` impl never fails.
        chunk.serialize(&mut out).expect("writing to a Vec cannot fail");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_push_round_trips() {
        let chunk = Chunk::Push(vec![0xAB; 40]);
        let mut bytes = Vec::new();
        chunk.serialize(&mut bytes).unwrap();
        assert_eq!(bytes[0], 40);
        let parsed = Chunk::parse(&bytes[..]).unwrap().unwrap();
        assert_eq!(parsed, chunk);
    }

    #[test]
    fn pushdata1_boundary() {
        let chunk = Chunk::Push(vec![0x11; 76]);
        let mut bytes = Vec::new();
        chunk.serialize(&mut bytes).unwrap();
        assert_eq!(bytes[0], OP_PUSHDATA1);
        assert_eq!(bytes[1], 76);
        let parsed = Chunk::parse(&bytes[..]).unwrap().unwrap();
        assert_eq!(parsed, chunk);
    }

    #[test]
    fn pushdata2_boundary() {
        let chunk = Chunk::Push(vec![0x22; 256]);
        let mut bytes = Vec::new();
        chunk.serialize(&mut bytes).unwrap();
        assert_eq!(bytes[0], OP_PUSHDATA2);
        let parsed = Chunk::parse(&bytes[..]).unwrap().unwrap();
        assert_eq!(parsed, chunk);
    }

    #[test]
    fn opcode_chunk_round_trips() {
        let chunk = Chunk::Op(Opcode::CheckSig);
        let mut bytes = Vec::new();
        chunk.serialize(&mut bytes).unwrap();
        assert_eq!(bytes, vec![Opcode::CheckSig.as_byte()]);
        assert_eq!(Chunk::parse(&bytes[..]).unwrap().unwrap(), chunk);
    }

    #[test]
    fn unknown_opcode_byte_errors() {
        // 0x01..0x4b and 0x4c..0x4e are pushdata; 0xba.. the NOP10 ceiling
        // leaves bytes above it undefined.
        assert!(matches!(
            Chunk::parse(&[0xFFu8][..]),
            Err(SerializationError::InvalidOpcode(0xFF))
        ));
    }

    #[test]
    fn parse_all_handles_a_full_script() {
        let chunks = vec![
            Chunk::Op(Opcode::Dup),
            Chunk::Op(Opcode::Hash160),
            Chunk::Push(vec![0x42; 20]),
            Chunk::Op(Opcode::EqualVerify),
            Chunk::Op(Opcode::CheckSig),
        ];
        let bytes = serialize_all(&chunks);
        assert_eq!(parse_all(&bytes).unwrap(), chunks);
    }
}
