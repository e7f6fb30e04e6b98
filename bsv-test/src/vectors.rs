//! Fixed binary test vectors used across `bsv-chain`'s test suite.
//!
//! These are hand-assembled from the protocol's wire-format rules (not taken
//! from any particular historical block), so that their expected decoded
//! shape is known exactly rather than rediscovered by the test itself.

/// A single `TxOut`: 50 BTC-equivalent (5,000,000,000 satoshis) paid to an
/// empty (anyone-can-spend) script.
pub const DUMMY_OUTPUT1: &[u8] = &[
    0x00, 0xf2, 0x05, 0x2a, 0x01, 0x00, 0x00, 0x00, // satoshis (LE u64)
    0x00, // empty lock_script (VarInt len = 0)
];

/// A single non-coinbase `TxIn` spending output 1 of a fabricated prevout,
/// with an empty unlock script and the default sequence number.
pub const DUMMY_INPUT1: &[u8] = &[
    0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22,
    0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, // prevout hash
    0x01, 0x00, 0x00, 0x00, // vout = 1
    0x00, // empty unlock script
    0xff, 0xff, 0xff, 0xff, // sequence
];

/// A minimal one-input, one-output, non-coinbase `Tx`.
pub const DUMMY_TX1: &[u8] = &[
    0x01, 0x00, 0x00, 0x00, // version = 1
    0x01, // 1 input
    0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11,
    0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, // prevout hash
    0x00, 0x00, 0x00, 0x00, // vout = 0
    0x00, // empty unlock script
    0xff, 0xff, 0xff, 0xff, // sequence
    0x01, // 1 output
    0x00, 0xf2, 0x05, 0x2a, 0x01, 0x00, 0x00, 0x00, // satoshis
    0x00, // empty lock script
    0x00, 0x00, 0x00, 0x00, // lock_time = 0
];

/// An 80-byte `BlockHeader` with an arbitrary (non-genesis) merkle root.
pub const DUMMY_HEADER: &[u8] = &[
    0x01, 0x00, 0x00, 0x00, // version = 1
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // prev_hash
    0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb,
    0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, // merkle_root
    0x00, 0x00, 0x00, 0x00, // time
    0xff, 0xff, 0x00, 0x1d, // bits
    0x00, 0x00, 0x00, 0x00, // nonce
];

/// A 32-byte scalar in `[1, n-1]`, suitable as a `PrivKey` fixture in tests
/// that need a fixed (rather than randomly generated) key. Arbitrary, not
/// tied to any external vector.
pub const TEST_PRIVKEY_SCALAR: [u8; 32] = [0xcc; 32];
