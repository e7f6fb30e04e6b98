//! Process-wide configuration knobs.
//!
//! Both of these are plain value types passed explicitly to constructors
//! rather than globals: a process linking this crate can hold keys for both
//! networks at once, or mix mnemonic languages, without any locking.

/// Selects the Base58Check version bytes used for addresses, WIF, and
/// extended keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Main,
    Test,
}

impl Network {
    pub fn address_version_byte(self) -> u8 {
        match self {
            Network::Main => 0x00,
            Network::Test => 0x6F,
        }
    }

    pub fn wif_version_byte(self) -> u8 {
        match self {
            Network::Main => 0x80,
            Network::Test => 0xEF,
        }
    }

    pub fn extkey_private_version(self) -> [u8; 4] {
        match self {
            Network::Main => [0x04, 0x88, 0xAD, 0xE4], // xprv
            Network::Test => [0x04, 0x35, 0x83, 0x94], // tprv
        }
    }

    pub fn extkey_public_version(self) -> [u8; 4] {
        match self {
            Network::Main => [0x04, 0x88, 0xB2, 0x1E], // xpub
            Network::Test => [0x04, 0x35, 0x87, 0xCF], // tpub
        }
    }
}

/// Selects which embedded BIP-39 wordlist a `Mnemonic` is generated from or
/// checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
}
