//! Per-Round Salt Generation
//!
//! Every simulated round gets a fresh salt that is prepended to identity
//! keys before ring lookup, rotating partition assignment without touching
//! ring topology. The salt stands in for externally supplied entropy (a
//! block hash in a real deployment): two bounded random draws joined by a
//! fixed separator, then SHA-256, rendered as lowercase hex.
//!
//! Draws are independent across calls. Seeding exists only to make test
//! runs reproducible; a reused seed replays the same salt sequence, which
//! is fine for regression tests but no longer models independent rounds.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Upper bound (inclusive) for each raw salt draw
pub const SALT_DRAW_MAX: u64 = 1000;

/// Separator between the two raw draws
const SALT_SEPARATOR: &str = "-";

/// Per-round salt source
pub struct RoundSalt {
    rng: StdRng,
}

impl RoundSalt {
    /// Create a salt source with a fresh random seed.
    pub fn new() -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill(&mut seed);
        Self::from_seed(seed)
    }

    /// Create a deterministic salt source for reproducible runs.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        RoundSalt {
            rng: StdRng::from_seed(seed),
        }
    }

    /// Draw the next round's salt (64 hex chars).
    pub fn next_salt(&mut self) -> String {
        let a = self.rng.gen_range(0..=SALT_DRAW_MAX);
        let b = self.rng.gen_range(0..=SALT_DRAW_MAX);
        let material = format!("{}{}{}", a, SALT_SEPARATOR, b);
        hex::encode(Sha256::digest(material.as_bytes()))
    }
}

impl Default for RoundSalt {
    fn default() -> Self {
        Self::new()
    }
}
