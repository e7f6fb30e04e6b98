//! `ScriptNum`: the little-endian, sign-magnitude integer encoding used for
//! numeric values on the Script stack.
//!
//! Arithmetic opcodes operate on arbitrary-precision integers (witness a
//! 256-bit curve-order literal round-tripping through this encoding), so the
//! decoded value is a [`BigInt`] rather than a fixed-width integer.

use num_bigint::{BigInt, Sign};

/// Encodes `n` as Script bytes: little-endian magnitude with the sign folded
/// into the high bit of the most significant byte.
pub fn encode(n: &BigInt) -> Vec<u8> {
    if n.sign() == Sign::NoSign {
        return Vec::new();
    }

    let negative = n.sign() == Sign::Minus;
    let (_, mut magnitude) = n.to_bytes_be();

    if magnitude.is_empty() {
        magnitude.push(0);
    }
    if magnitude[0] & 0x80 != 0 {
        magnitude.insert(0, 0);
    }
    if negative {
        magnitude[0] |= 0x80;
    }
    magnitude.reverse();
    magnitude
}

/// Decodes Script bytes back into an integer. The empty string is 0.
pub fn decode(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        return BigInt::from(0);
    }

    let mut magnitude = bytes.to_vec();
    magnitude.reverse();

    let negative = magnitude[0] & 0x80 != 0;
    magnitude[0] &= 0x7f;

    let sign = if negative { Sign::Minus } else { Sign::Plus };
    let value = BigInt::from_bytes_be(Sign::Plus, &magnitude);
    if value == BigInt::from(0) {
        BigInt::from(0)
    } else {
        value * if sign == Sign::Minus { -1 } else { 1 }
    }
}

/// Script's own notion of truthiness: any encoding other than zero or
/// negative-zero (`0x80` alone, or all-zero bytes with a trailing `0x80`).
pub fn is_truthy(bytes: &[u8]) -> bool {
    for (i, &byte) in bytes.iter().enumerate() {
        if byte != 0 {
            if i == bytes.len() - 1 && byte == 0x80 {
                return false;
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_empty() {
        assert_eq!(encode(&BigInt::from(0)), Vec::<u8>::new());
        assert_eq!(decode(&[]), BigInt::from(0));
    }

    #[test]
    fn small_positive_and_negative_round_trip() {
        for n in [1i64, 127, 128, 255, 256, -1, -127, -128, -255, -256] {
            let value = BigInt::from(n);
            assert_eq!(decode(&encode(&value)), value, "n = {}", n);
        }
    }

    #[test]
    fn encodes_known_scenario_values() {
        assert_eq!(encode(&BigInt::from(0)), Vec::<u8>::new());
        assert_eq!(encode(&BigInt::from(-1)), vec![0x81]);
        assert_eq!(encode(&BigInt::from(100_000)), vec![0xA0, 0x86, 0x01]);
    }

    #[test]
    fn encodes_one_as_single_byte() {
        assert_eq!(encode(&BigInt::from(1)), vec![0x01]);
        assert_eq!(encode(&BigInt::from(-1)), vec![0x81]);
    }

    #[test]
    fn pads_when_high_bit_would_collide_with_sign() {
        // 128 = 0x80, whose top bit would be mistaken for a sign bit, so an
        // extra zero byte is prepended before reversing to little-endian.
        assert_eq!(encode(&BigInt::from(128)), vec![0x80, 0x00]);
        assert_eq!(decode(&[0x80, 0x00]), BigInt::from(128));
    }

    #[test]
    fn curve_order_round_trips() {
        let order = BigInt::parse_bytes(
            b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141",
            16,
        )
        .unwrap();
        assert_eq!(decode(&encode(&order)), order);
    }

    #[test]
    fn truthiness_treats_negative_zero_as_false() {
        assert!(!is_truthy(&[]));
        assert!(!is_truthy(&[0x00]));
        assert!(!is_truthy(&[0x80]));
        assert!(!is_truthy(&[0x00, 0x00, 0x80]));
        assert!(is_truthy(&[0x01]));
        assert!(is_truthy(&[0x00, 0x01]));
    }
}
