//! Partition Load Analysis
//!
//! Assigns a batch of keys to ring partitions under a round salt and
//! reports occupancy. The analyzer is agnostic to what the keys represent:
//! public-identity populations and transaction-like populations go through
//! the same path. All randomness enters via the salt and the keys; the
//! analysis itself is deterministic.

use crate::px_ring::HashRing;

/// Per-partition occupancy counts, length `ring.partitions()`.
///
/// Invariant: the counts always sum to the number of assigned keys.
pub type LoadVector = Vec<usize>;

/// Summary statistics over a load vector
#[derive(Debug, Clone, PartialEq)]
pub struct LoadStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: usize,
    pub max: usize,
}

/// Assign every key to `ring.partition_of(salt ++ key)` and count
/// per-partition occupancy.
pub fn assign_and_count<S: AsRef<str>>(ring: &HashRing, salt: &str, keys: &[S]) -> LoadVector {
    let mut load = vec![0usize; ring.partitions()];
    for key in keys {
        let bucket = ring.partition_of(&format!("{}{}", salt, key.as_ref()));
        load[bucket] += 1;
    }
    load
}

/// Same assignment as [`assign_and_count`], but retaining full membership:
/// each bucket holds the indices (into `keys`) of the keys assigned to it.
pub fn bucket_members<S: AsRef<str>>(
    ring: &HashRing,
    salt: &str,
    keys: &[S],
) -> Vec<Vec<usize>> {
    let mut buckets = vec![Vec::new(); ring.partitions()];
    for (index, key) in keys.iter().enumerate() {
        let bucket = ring.partition_of(&format!("{}{}", salt, key.as_ref()));
        buckets[bucket].push(index);
    }
    buckets
}

/// Population statistics over a load vector.
///
/// An empty vector yields all-zero stats.
pub fn stats(load: &[usize]) -> LoadStats {
    if load.is_empty() {
        return LoadStats {
            mean: 0.0,
            std_dev: 0.0,
            min: 0,
            max: 0,
        };
    }

    let n = load.len() as f64;
    let mean = load.iter().sum::<usize>() as f64 / n;
    let variance = load
        .iter()
        .map(|&count| {
            let diff = count as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    LoadStats {
        mean,
        std_dev: variance.sqrt(),
        min: *load.iter().min().unwrap(),
        max: *load.iter().max().unwrap(),
    }
}
