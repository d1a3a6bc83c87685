//! Seed-to-address derivation.

use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use tiny_keccak::{Hasher, Keccak};

use super::{Address, Seed};
use crate::error::Result;

/// Turns seeds into Ethereum addresses.
///
/// Holds a precomputed secp256k1 context so each worker builds it once
/// instead of once per key. Derivation itself has no hidden state.
pub struct Deriver {
    secp: Secp256k1<All>,
}

impl Deriver {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Derives the address for `seed`.
    ///
    /// A seed outside the valid scalar range (zero or >= the curve order) is
    /// an error, never skipped.
    #[inline]
    pub fn derive(&self, seed: &Seed) -> Result<Keypair> {
        let secret_key = SecretKey::from_slice(seed.as_bytes())?;
        let public_key = PublicKey::from_secret_key(&self.secp, &secret_key);

        Ok(Keypair {
            seed: *seed,
            address: address_of(&public_key),
        })
    }
}

impl Default for Deriver {
    fn default() -> Self {
        Self::new()
    }
}

/// keccak256 of the uncompressed public key without its 0x04 tag; the last
/// 20 bytes are the address.
#[inline]
fn address_of(public_key: &PublicKey) -> Address {
    let public_key_bytes = public_key.serialize_uncompressed();

    let mut hasher = Keccak::v256();
    hasher.update(&public_key_bytes[1..]);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);

    let mut address_bytes = [0u8; 20];
    address_bytes.copy_from_slice(&hash[12..]);
    Address::from_bytes(address_bytes)
}

/// A seed together with the address derived from it.
#[derive(Debug, Clone)]
pub struct Keypair {
    seed: Seed,
    address: Address,
}

impl Keypair {
    /// Derives a keypair with a one-off context. Prefer [`Deriver`] in loops.
    pub fn from_seed(seed: &Seed) -> Result<Self> {
        Deriver::new().derive(seed)
    }

    /// The private key as 64 hex characters (without 0x prefix).
    pub fn private_key_hex(&self) -> String {
        self.seed.to_hex()
    }

    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }
}
