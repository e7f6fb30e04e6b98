//! The Bitcoin `VarInt` (a.k.a. "CompactSize") integer encoding.
//!
//! Every collection length and variable-length byte string on the wire is
//! prefixed with one of these instead of a fixed-width length field.

use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt(u64);

impl VarInt {
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Number of bytes `value` would occupy once VarInt-encoded.
    pub fn size(value: u64) -> usize {
        if value < 0xFD {
            1
        } else if value <= std::u16::MAX as u64 {
            3
        } else if value <= std::u32::MAX as u64 {
            5
        } else {
            9
        }
    }
}

impl From<u64> for VarInt {
    fn from(value: u64) -> VarInt {
        VarInt(value)
    }
}

impl From<usize> for VarInt {
    fn from(value: usize) -> VarInt {
        VarInt(value as u64)
    }
}

impl BitcoinSerialize for VarInt {
    fn bitcoin_serialize<W>(&self, mut target: W) -> Result<(), io::Error>
    where
        W: io::Write,
    {
        if self.0 < 0xFD {
            target.write_all(&[self.0 as u8])
        } else if self.0 <= std::u16::MAX as u64 {
            target.write_all(&[0xFD])?;
            target.write_u16::<LittleEndian>(self.0 as u16)
        } else if self.0 <= std::u32::MAX as u64 {
            target.write_all(&[0xFE])?;
            target.write_u32::<LittleEndian>(self.0 as u32)
        } else {
            target.write_all(&[0xFF])?;
            target.write_u64::<LittleEndian>(self.0)
        }
    }
}

impl BitcoinDeserialize for VarInt {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<VarInt, SerializationError> {
        let tag = u8::bitcoin_deserialize(&mut reader).map_err(|_| SerializationError::InvalidVarInt)?;
        let value = match tag {
            0xFD => u16::bitcoin_deserialize(&mut reader)
                .map_err(|_| SerializationError::InvalidVarInt)? as u64,
            0xFE => u32::bitcoin_deserialize(&mut reader)
                .map_err(|_| SerializationError::InvalidVarInt)? as u64,
            0xFF => u64::bitcoin_deserialize(&mut reader)
                .map_err(|_| SerializationError::InvalidVarInt)?,
            n => n as u64,
        };
        Ok(VarInt(value))
    }
}

/// Reads a `VarInt` length followed by that many raw bytes.
pub fn parse_data<R: io::Read>(mut reader: R) -> Result<Vec<u8>, SerializationError> {
    let len = VarInt::bitcoin_deserialize(&mut reader)?.value() as usize;
    let blind_alloc_limit = 1024;
    let mut data = vec![0u8; std::cmp::min(len, blind_alloc_limit)];
    reader.read_exact(&mut data)?;
    if len > blind_alloc_limit {
        let mut rest = vec![0u8; len - blind_alloc_limit];
        reader.read_exact(&mut rest)?;
        data.extend_from_slice(&rest);
    }
    Ok(data)
}

/// Reads a `VarInt` count followed by that many `T` records, each decoded by
/// `T`'s own `BitcoinDeserialize` implementation.
pub fn parse_items<R: io::Read, T: BitcoinDeserialize>(
    mut reader: R,
) -> Result<Vec<T>, SerializationError> {
    let len = VarInt::bitcoin_deserialize(&mut reader)?.value() as usize;
    parse_items_of_count(reader, len)
}

/// Reads exactly `count` `T` records, with no length prefix of their own
/// (used when the count was already read separately, e.g. a block's
/// transaction count, which is bounded before allocating).
pub fn parse_items_of_count<R: io::Read, T: BitcoinDeserialize>(
    mut reader: R,
    count: usize,
) -> Result<Vec<T>, SerializationError> {
    let blind_alloc_limit = 1024;
    let mut result = Vec::with_capacity(std::cmp::min(count, blind_alloc_limit));
    for _ in 0..count {
        result.push(T::bitcoin_deserialize(&mut reader)?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_scenario_values() {
        assert_eq!(
            VarInt::from(260u64).bitcoin_serialize_to_vec().unwrap(),
            vec![0xFD, 0x04, 0x01]
        );
        assert_eq!(
            VarInt::from(100_000_000u64).bitcoin_serialize_to_vec().unwrap(),
            vec![0xFE, 0x00, 0xE1, 0xF5, 0x05]
        );
    }

    #[test]
    fn encodes_boundaries() {
        assert_eq!(VarInt::from(0u64).bitcoin_serialize_to_vec().unwrap(), vec![0x00]);
        assert_eq!(
            VarInt::from(0xFCu64).bitcoin_serialize_to_vec().unwrap(),
            vec![0xFC]
        );
        assert_eq!(
            VarInt::from(0xFDu64).bitcoin_serialize_to_vec().unwrap(),
            vec![0xFD, 0xFD, 0x00]
        );
        assert_eq!(
            VarInt::from(0xFFFFu64).bitcoin_serialize_to_vec().unwrap(),
            vec![0xFD, 0xFF, 0xFF]
        );
        assert_eq!(
            VarInt::from(0x1_0000u64).bitcoin_serialize_to_vec().unwrap(),
            vec![0xFE, 0x00, 0x00, 0x01, 0x00]
        );
        assert_eq!(
            VarInt::from(0x1_0000_0000u64)
                .bitcoin_serialize_to_vec()
                .unwrap(),
            vec![0xFF, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn round_trips() {
        for value in [0u64, 1, 252, 253, 254, 65535, 65536, u32::MAX as u64, u64::MAX] {
            let bytes = VarInt::from(value).bitcoin_serialize_to_vec().unwrap();
            assert_eq!(bytes.len(), VarInt::size(value));
            let decoded = VarInt::bitcoin_deserialize(&bytes[..]).unwrap();
            assert_eq!(decoded.value(), value);
        }
    }

    #[test]
    fn truncated_input_is_invalid() {
        let err = VarInt::bitcoin_deserialize(&[0xFDu8, 0x01][..]);
        assert!(err.is_err());
    }
}
