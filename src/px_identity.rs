//! Network Identity Generation
//!
//! Derives opaque identity tokens from fresh secp256k1 key material using a
//! bitcoin-style address pipeline:
//!
//! 1. uncompressed SEC1 public key (65 bytes, leading `0x04` marker)
//! 2. `digest1 = SHA-256(pubkey)`
//! 3. `digest2 = RIPEMD-160(digest1)`
//! 4. prepend the network version byte (`0x00`)
//! 5. append `checksum = SHA-256(SHA-256(versioned_payload))[..4]`
//! 6. base58-encode the result
//!
//! Identities are immutable once generated. Uniqueness is not enforced;
//! collisions require a 160-bit digest collision and are cryptographically
//! negligible. The ring-distribution properties downstream only depend on
//! digest uniformity, so a different independent 160-bit digest could stand
//! in for RIPEMD-160 without affecting the simulations.
//!
//! The generator owns a seeded RNG so identity populations are reproducible
//! in tests; `new()` draws a fresh seed for representative runs.

use k256::ecdsa::SigningKey;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque identity token (base58 address string)
pub type Identity = String;

/// Network version byte prepended to the 160-bit key digest
pub const NETWORK_VERSION: u8 = 0x00;

/// Checksum length appended to the versioned payload
const CHECKSUM_LEN: usize = 4;

/// Uncompressed SEC1 point length for secp256k1 (marker + x + y)
const UNCOMPRESSED_POINT_LEN: usize = 65;

/// SEC1 marker byte for uncompressed points
const UNCOMPRESSED_MARKER: u8 = 0x04;

/// Errors from identity derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The curve backend produced a malformed public-key encoding
    CryptoUnavailable,
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::CryptoUnavailable => {
                write!(f, "curve or digest primitive unavailable")
            }
        }
    }
}

impl std::error::Error for IdentityError {}

/// Generator for pseudo-random network identities
pub struct IdentityGenerator {
    rng: StdRng,
}

impl IdentityGenerator {
    /// Create a generator with a fresh random seed.
    pub fn new() -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill(&mut seed);
        Self::from_seed(seed)
    }

    /// Create a deterministic generator for reproducible runs.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        IdentityGenerator {
            rng: StdRng::from_seed(seed),
        }
    }

    /// Generate `count` identities.
    pub fn generate(&mut self, count: usize) -> Result<Vec<Identity>, IdentityError> {
        let mut identities = Vec::with_capacity(count);
        for i in 0..count {
            identities.push(self.generate_one()?);
            if i > 0 && i % 1000 == 0 {
                log::debug!("generated identity {}/{}", i, count);
            }
        }
        Ok(identities)
    }

    /// Generate a single identity from a fresh keypair.
    pub fn generate_one(&mut self) -> Result<Identity, IdentityError> {
        let signing_key = SigningKey::random(&mut self.rng);
        let point = signing_key.verifying_key().to_encoded_point(false);
        derive_address(point.as_bytes())
    }
}

impl Default for IdentityGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive an address from an uncompressed SEC1 public key.
pub fn derive_address(public_key: &[u8]) -> Result<Identity, IdentityError> {
    if public_key.len() != UNCOMPRESSED_POINT_LEN || public_key[0] != UNCOMPRESSED_MARKER {
        return Err(IdentityError::CryptoUnavailable);
    }

    let digest1 = Sha256::digest(public_key);
    let digest2 = Ripemd160::digest(digest1);

    let mut payload = Vec::with_capacity(1 + digest2.len() + CHECKSUM_LEN);
    payload.push(NETWORK_VERSION);
    payload.extend_from_slice(&digest2);

    let checksum = checksum(&payload);
    payload.extend_from_slice(&checksum);

    Ok(bs58::encode(payload).into_string())
}

/// First four bytes of the double SHA-256 of `payload`.
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(Sha256::digest(payload));
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

/// Check that an address base58-decodes to a payload whose trailing four
/// bytes equal the double SHA-256 checksum of the preceding bytes.
pub fn verify(address: &str) -> bool {
    let decoded = match bs58::decode(address).into_vec() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    if decoded.len() <= CHECKSUM_LEN {
        return false;
    }
    let (payload, tail) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    tail == checksum(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_addresses_verify() {
        let mut generator = IdentityGenerator::from_seed([7u8; 32]);
        let identities = generator.generate(16).unwrap();

        assert_eq!(identities.len(), 16);
        for identity in &identities {
            assert!(verify(identity), "bad checksum for {}", identity);
        }
    }

    #[test]
    fn test_payload_shape() {
        let mut generator = IdentityGenerator::from_seed([1u8; 32]);
        let identity = generator.generate_one().unwrap();

        let decoded = bs58::decode(&identity).into_vec().unwrap();
        // version byte + 160-bit digest + 4-byte checksum
        assert_eq!(decoded.len(), 1 + 20 + 4);
        assert_eq!(decoded[0], NETWORK_VERSION);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let seed = [42u8; 32];
        let first = IdentityGenerator::from_seed(seed).generate(8).unwrap();
        let second = IdentityGenerator::from_seed(seed).generate(8).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_keys_yield_distinct_addresses() {
        let mut generator = IdentityGenerator::from_seed([9u8; 32]);
        let identities = generator.generate(32).unwrap();
        let mut unique = identities.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), identities.len());
    }

    #[test]
    fn test_malformed_point_rejected() {
        // Compressed-length point
        assert_eq!(
            derive_address(&[0x02; 33]),
            Err(IdentityError::CryptoUnavailable)
        );
        // Right length, wrong marker
        assert_eq!(
            derive_address(&[0x02; 65]),
            Err(IdentityError::CryptoUnavailable)
        );
    }

    #[test]
    fn test_verify_rejects_corruption() {
        let mut generator = IdentityGenerator::from_seed([3u8; 32]);
        let identity = generator.generate_one().unwrap();

        let mut decoded = bs58::decode(&identity).into_vec().unwrap();
        let last = decoded.len() - 1;
        decoded[last] ^= 0x01;
        let corrupted = bs58::encode(decoded).into_string();

        assert!(!verify(&corrupted));
        assert!(!verify("not-base58-0OIl"));
        assert!(!verify(""));
    }
}
