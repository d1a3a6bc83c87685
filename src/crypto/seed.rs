//! Random private key seeds.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::Result;

/// 32 bytes of OS randomness used as a private key scalar.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Seed([u8; 32]);

impl Seed {
    /// Draws a fresh seed from the operating system's CSPRNG.
    ///
    /// Entropy failure is returned rather than papered over with a weaker
    /// generator.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; 32];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self(bytes))
    }

    #[inline]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the seed as 64 lowercase hex characters (no 0x prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Builds the 16 seeds that differ from this one only in the final hex
    /// character, in alphabet order.
    ///
    /// The final hex character is the low nibble of the last byte. One of the
    /// siblings is the seed itself.
    pub fn siblings(&self, alphabet: &MutationAlphabet) -> [Seed; 16] {
        let mut out = [*self; 16];
        for (sibling, nibble) in out.iter_mut().zip(alphabet.nibbles()) {
            sibling.0[31] = (self.0[31] & 0xf0) | nibble;
        }
        out
    }
}

// Keep private keys out of debug output.
impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed(..)")
    }
}

/// Order in which the final hex character of a base seed is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationAlphabet([u8; 16]);

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

impl MutationAlphabet {
    pub const DEFAULT: &'static str = "abcdef0123456789";
    const DEFAULT_NIBBLES: [u8; 16] = [0xa, 0xb, 0xc, 0xd, 0xe, 0xf, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9];

    /// Parses a string holding each hex digit exactly once.
    pub fn parse(s: &str) -> Option<Self> {
        let mut nibbles = [0u8; 16];
        let mut seen = [false; 16];
        let mut count = 0;

        for c in s.chars() {
            let n = c.to_digit(16)? as u8;
            if count == 16 || seen[n as usize] {
                return None;
            }
            seen[n as usize] = true;
            nibbles[count] = n;
            count += 1;
        }

        (count == 16).then_some(Self(nibbles))
    }

    #[inline]
    pub fn nibbles(&self) -> [u8; 16] {
        self.0
    }

    /// Returns the alphabet as lowercase hex characters.
    pub fn as_string(&self) -> String {
        self.0.iter().map(|&n| HEX_DIGITS[n as usize] as char).collect()
    }
}

impl Default for MutationAlphabet {
    fn default() -> Self {
        Self(Self::DEFAULT_NIBBLES)
    }
}
