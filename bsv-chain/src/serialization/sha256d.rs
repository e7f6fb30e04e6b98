//! Double-SHA256, the hash function used for txids, block hashes, and merkle
//! nodes throughout this crate.

use sha2::{Digest, Sha256};
use std::io;

use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};

/// A hash produced by two rounds of SHA256.
///
/// Bitcoin displays these hashes byte-reversed (as a big-endian number) in
/// block explorers and RPC output; this type stores them in their natural,
/// internal little-endian byte order, matching how they appear on the wire
/// and how they're fed back into further hashing (merkle trees, sighash).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Sha256dHash(pub [u8; 32]);

impl Sha256dHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Byte-reversed hex, the form used by block explorers and RPC.
    pub fn reversed_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }
}

impl std::fmt::Debug for Sha256dHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sha256dHash(\"{}\")", self.reversed_hex())
    }
}

impl std::fmt::Display for Sha256dHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reversed_hex())
    }
}

impl AsRef<[u8]> for Sha256dHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256dHash {
    fn from(bytes: [u8; 32]) -> Self {
        Sha256dHash(bytes)
    }
}

impl BitcoinSerialize for Sha256dHash {
    fn bitcoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.0)
    }
}

impl BitcoinDeserialize for Sha256dHash {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let mut bytes = [0u8; 32];
        reader.read_exact(&mut bytes)?;
        Ok(Sha256dHash(bytes))
    }
}

/// An incremental writer that double-SHA256-hashes everything written to it.
///
/// Used to hash a `Tx` or `BlockHeader` without first materializing its
/// serialized form as a `Vec<u8>`: callers `bitcoin_serialize` directly into
/// a `Writer` and call `finish()`.
pub struct Writer(Sha256);

impl Default for Writer {
    fn default() -> Self {
        Writer(Sha256::new())
    }
}

impl Writer {
    pub fn finish(self) -> Sha256dHash {
        let first = self.0.finalize();
        let second = Sha256::digest(&first);
        let mut out = [0u8; 32];
        out.copy_from_slice(&second);
        Sha256dHash(out)
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One-shot double-SHA256 over a byte slice.
pub fn hash(bytes: &[u8]) -> Sha256dHash {
    let first = Sha256::digest(bytes);
    let second = Sha256::digest(&first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    Sha256dHash(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_matches_known_constant() {
        // sha256d("") = 5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456
        let expected =
            hex::decode("5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456")
                .unwrap();
        assert_eq!(hash(b"").as_bytes().to_vec(), expected);
    }

    #[test]
    fn writer_matches_one_shot() {
        let mut w = Writer::default();
        std::io::Write::write_all(&mut w, b"hello world").unwrap();
        assert_eq!(w.finish(), hash(b"hello world"));
    }
}
