//! # pox-lab - Sharded Verification Security Experiments
//!
//! A batch analysis library for a sharded verification protocol: given a
//! population of network identities and a consistent-hash ring whose
//! assignment rotates under per-round salts, it measures partition load
//! balance and estimates how many attacker-controlled identities can end up
//! able to mutually validate inside the same validation group.
//!
//! ## Core Components
//!
//! - **IdentityGenerator**: bitcoin-style address derivation from fresh
//!   secp256k1 key material
//! - **HashRing**: ketama-style consistent hashing onto N partitions
//! - **RoundSalt**: per-round entropy rotating ring assignment
//! - **LoadAnalyzer**: per-partition occupancy and summary statistics
//! - **CollusionSimulator**: multi-round adversarial collusion analysis
//! - **TrieSpaceEstimator**: prefix-trie vs flat-list memory comparison for
//!   content-hash tracking
//!
//! ## Usage
//!
//! Everything is synchronous, single-threaded, and seedable. The library is
//! invoked by the harness programs in `simulator/` (see the scenario runner
//! for the YAML surface), but is usable directly:
//!
//! ```no_run
//! use pox_lab::{CollusionConfig, CollusionSimulator};
//!
//! let config = CollusionConfig {
//!     key_count: 1000,
//!     attacker_size: 100,
//!     buckets: 10,
//!     tx_count: 500,
//!     rounds: 50,
//!     seed: Some([42u8; 32]),
//!     ..CollusionConfig::default()
//! };
//!
//! let report = CollusionSimulator::new(config)?.run()?;
//! report.print_summary();
//! # Ok::<(), pox_lab::CollusionError>(())
//! ```

// Core analysis modules
pub mod px_collusion;
pub mod px_identity;
pub mod px_load;
pub mod px_ring;
pub mod px_salt;
pub mod px_trie;

// Re-export commonly used types
pub use px_collusion::{
    overtake_windows, CollusionConfig, CollusionError, CollusionReport, CollusionSimulator,
    OvertakeWindow,
};
pub use px_identity::{Identity, IdentityError, IdentityGenerator};
pub use px_load::{assign_and_count, bucket_members, stats, LoadStats, LoadVector};
pub use px_ring::{HashRing, RingError, DEFAULT_VIRTUAL_NODES};
pub use px_salt::RoundSalt;
pub use px_trie::{flat_size, hash_batch, TrieNode, POINTER_SIZE};
