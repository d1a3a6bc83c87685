//! Ethereum address representation.

use tiny_keccak::{Hasher, Keccak};

/// Length of the textual address: `0x` marker plus 40 hex characters.
pub const ADDRESS_STR_LEN: usize = 42;

/// The marker every textual address starts with.
pub const ADDRESS_MARKER: &str = "0x";

/// An Ethereum address (20 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Creates an address from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Lowercase hex without the marker.
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the EIP-55 mixed-case form with the `0x` marker.
    ///
    /// Letters whose matching nibble of keccak256(lowercase hex) is >= 8 are
    /// uppercased. Digits are left alone.
    pub fn to_checksum(&self) -> String {
        let hex_addr = self.to_hex();
        let mut hasher = Keccak::v256();
        hasher.update(hex_addr.as_bytes());
        let mut hash = [0u8; 32];
        hasher.finalize(&mut hash);

        let mut checksum = String::with_capacity(ADDRESS_STR_LEN);
        checksum.push_str(ADDRESS_MARKER);

        for (i, c) in hex_addr.chars().enumerate() {
            let hash_nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };

            if c.is_ascii_alphabetic() && hash_nibble >= 8 {
                checksum.push(c.to_ascii_uppercase());
            } else {
                checksum.push(c);
            }
        }

        checksum
    }
}
