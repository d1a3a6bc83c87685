//! Key generation and address derivation.
//!
//! - `Seed`: 32 random bytes from the OS CSPRNG, plus last-nibble siblings
//! - `Deriver`: secp256k1 public key, then keccak256 into an address
//! - `Address`: raw bytes with EIP-55 checksum rendering

mod address;
mod keypair;
mod seed;

pub use address::{Address, ADDRESS_MARKER, ADDRESS_STR_LEN};
pub use keypair::{Deriver, Keypair};
pub use seed::{MutationAlphabet, Seed};
