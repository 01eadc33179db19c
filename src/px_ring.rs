//! Consistent Hash Ring
//!
//! Maps arbitrary string keys to a fixed number of partitions via a
//! ketama-style ring: every partition is placed on a `u64` circle at many
//! virtual-replica points, and a key lands on the first ring point at or
//! after its own hash (wrapping around at the top of the circle).
//!
//! # Contract
//!
//! - `partition_of` is pure and deterministic: the same key on a ring with
//!   the same configuration always yields the same partition, across calls
//!   and across process restarts (blake3 is unkeyed).
//! - Partition indices are always in `[0, partitions)`.
//! - The ring holds no per-key state. Changing the partition count means
//!   building a new ring; lookups on a built ring are read-only and safe to
//!   run concurrently.

use std::collections::BTreeMap;
use std::fmt;

/// Default number of virtual replicas placed per partition.
///
/// More replicas smooth the arc lengths between partitions and tighten the
/// load distribution; 150 keeps per-partition load within a few percent of
/// ideal for the partition counts this crate simulates.
pub const DEFAULT_VIRTUAL_NODES: usize = 150;

/// Errors from ring construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    /// Partition count must be positive
    InvalidPartitionCount,
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingError::InvalidPartitionCount => {
                write!(f, "ring partition count must be positive")
            }
        }
    }
}

impl std::error::Error for RingError {}

/// Consistent hash ring over `partitions` partitions
#[derive(Debug, Clone)]
pub struct HashRing {
    /// Ring points: placement hash -> partition index
    ring: BTreeMap<u64, usize>,
    partitions: usize,
    virtual_nodes: usize,
}

impl HashRing {
    /// Build a ring with the default virtual-replica count.
    pub fn new(partitions: usize) -> Result<Self, RingError> {
        Self::with_virtual_nodes(partitions, DEFAULT_VIRTUAL_NODES)
    }

    /// Build a ring with a custom virtual-replica count.
    pub fn with_virtual_nodes(
        partitions: usize,
        virtual_nodes: usize,
    ) -> Result<Self, RingError> {
        if partitions == 0 || virtual_nodes == 0 {
            return Err(RingError::InvalidPartitionCount);
        }

        let mut ring = BTreeMap::new();
        for partition in 0..partitions {
            for replica in 0..virtual_nodes {
                let point = hash_key(&format!("partition-{}-replica-{}", partition, replica));
                ring.insert(point, partition);
            }
        }

        Ok(HashRing {
            ring,
            partitions,
            virtual_nodes,
        })
    }

    /// Map a key to its partition.
    ///
    /// Binary-searches the ring (via `BTreeMap::range`) for the first
    /// placement point at or after the key's hash, wrapping to the lowest
    /// point when the hash falls past the last replica.
    pub fn partition_of(&self, key: &str) -> usize {
        let hash = hash_key(key);
        match self.ring.range(hash..).next() {
            Some((_, &partition)) => partition,
            // Wrapped past the top of the circle
            None => *self
                .ring
                .values()
                .next()
                .expect("ring is never empty after construction"),
        }
    }

    /// Number of partitions this ring maps onto.
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Virtual replicas placed per partition.
    pub fn virtual_nodes(&self) -> usize {
        self.virtual_nodes
    }
}

/// Hash a key onto the ring circle.
fn hash_key(key: &str) -> u64 {
    let digest = blake3::hash(key.as_bytes());
    let mut point = [0u8; 8];
    point.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partition_in_range() {
        for partitions in [1, 2, 5, 10, 64] {
            let ring = HashRing::new(partitions).unwrap();
            for i in 0..200 {
                let partition = ring.partition_of(&format!("key-{}", i));
                assert!(partition < partitions);
            }
        }
    }

    #[test]
    fn test_deterministic_lookup() {
        let ring_a = HashRing::new(7).unwrap();
        let ring_b = HashRing::new(7).unwrap();

        for i in 0..100 {
            let key = format!("stable-key-{}", i);
            let first = ring_a.partition_of(&key);
            // Same ring, repeated call
            assert_eq!(first, ring_a.partition_of(&key));
            // Independently built ring with the same configuration
            assert_eq!(first, ring_b.partition_of(&key));
        }
    }

    #[test]
    fn test_zero_partitions_rejected() {
        assert!(matches!(
            HashRing::new(0),
            Err(RingError::InvalidPartitionCount)
        ));
        assert!(matches!(
            HashRing::with_virtual_nodes(4, 0),
            Err(RingError::InvalidPartitionCount)
        ));
    }

    #[test]
    fn test_single_partition_takes_everything() {
        let ring = HashRing::new(1).unwrap();
        for i in 0..50 {
            assert_eq!(ring.partition_of(&format!("k{}", i)), 0);
        }
    }

    #[test]
    fn test_rough_distribution() {
        let ring = HashRing::new(6).unwrap();
        let mut counts: HashMap<usize, usize> = HashMap::new();

        for i in 0..1000 {
            let partition = ring.partition_of(&format!("key-{}", i));
            *counts.entry(partition).or_insert(0) += 1;
        }

        // Each partition should see a meaningful share (ideal is ~167)
        for partition in 0..6 {
            let count = counts.get(&partition).copied().unwrap_or(0);
            assert!(count > 50, "partition {} has only {} keys", partition, count);
        }
    }

    #[test]
    fn test_rebuild_changes_topology_only_via_count() {
        let small = HashRing::new(3).unwrap();
        let large = HashRing::new(30).unwrap();
        assert_eq!(small.partitions(), 3);
        assert_eq!(large.partitions(), 30);
        // Lookups on the larger ring still stay in range
        for i in 0..100 {
            assert!(large.partition_of(&format!("k{}", i)) < 30);
        }
    }
}
