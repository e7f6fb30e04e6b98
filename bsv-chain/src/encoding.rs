//! Small encoding helpers used throughout the crate: hex, and the
//! byte-reversal convention used for displaying hashes as big-endian
//! numbers.

/// Reverses a 32-byte hash (e.g. a txid or block hash) into its
//  display/RPC byte order.
pub fn reverse32(hash: &[u8; 32]) -> [u8; 32] {
    let mut out = *hash;
    out.reverse();
    out
}

pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

pub fn from_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse32_is_involutive() {
        let mut hash = [0u8; 32];
        for (i, b) in hash.iter_mut().enumerate() {
            *b = i as u8;
        }
        assert_eq!(reverse32(&reverse32(&hash)), hash);
        assert_eq!(reverse32(&hash)[0], hash[31]);
    }

    #[test]
    fn hex_round_trips() {
        let bytes = vec![0xde, 0xad, 0xbe, 0xef];
        assert_eq!(to_hex(&bytes), "deadbeef");
        assert_eq!(from_hex("deadbeef").unwrap(), bytes);
    }
}
