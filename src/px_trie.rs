//! Trie Memory-Footprint Estimation
//!
//! Answers a capacity question for tracking known content hashes: is a
//! prefix trie over the hash strings cheaper than a flat list? The trie is
//! built transiently over a batch of fixed-length hash-like strings and its
//! cost summed recursively: a leaf costs a one-unit terminator charge, an
//! internal node charges one pointer per child on top of its children's
//! costs. The flat baseline is simply `n * item_size`.

use hashbrown::HashMap;
use sha2::{Digest, Sha256};

/// Assumed pointer width (units per child edge)
pub const POINTER_SIZE: usize = 8;

/// Transient prefix-trie node
#[derive(Debug, Default)]
pub struct TrieNode {
    children: HashMap<char, TrieNode>,
}

impl TrieNode {
    /// Empty root node.
    pub fn new() -> Self {
        TrieNode {
            children: HashMap::new(),
        }
    }

    /// Build a trie over a batch of keys.
    pub fn build<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = TrieNode::new();
        for key in keys {
            root.insert(key.as_ref());
        }
        root
    }

    /// Insert one key, character by character.
    pub fn insert(&mut self, key: &str) {
        let mut node = self;
        for c in key.chars() {
            node = node.children.entry(c).or_default();
        }
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Recursive memory estimate.
    ///
    /// Leaf nodes cost 1 (terminator); internal nodes cost the sum of
    /// their children plus `pointer_size` per child edge.
    pub fn estimated_size(&self, pointer_size: usize) -> usize {
        if self.children.is_empty() {
            return 1;
        }
        self.children
            .values()
            .map(|child| child.estimated_size(pointer_size))
            .sum::<usize>()
            + pointer_size * self.children.len()
    }
}

/// Flat-list baseline: `n` items of `item_size` units each.
pub fn flat_size(n: usize, item_size: usize) -> usize {
    n * item_size
}

/// Generate `count` fixed-length hash-like strings by repeated SHA-256
/// application over a seed (hex, 64 chars each).
pub fn hash_batch(count: usize, seed: [u8; 32]) -> Vec<String> {
    let mut batch = Vec::with_capacity(count);
    let mut state = seed;
    for _ in 0..count {
        state = Sha256::digest(state).into();
        batch.push(hex::encode(state));
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_size_exact() {
        assert_eq!(flat_size(0, 64), 0);
        assert_eq!(flat_size(1, 64), 64);
        assert_eq!(flat_size(1000, 64), 64_000);
        assert_eq!(flat_size(7, 0), 0);
    }

    #[test]
    fn test_empty_trie_is_one_terminator() {
        let root = TrieNode::new();
        assert_eq!(root.estimated_size(POINTER_SIZE), 1);
    }

    #[test]
    fn test_single_key_cost() {
        let root = TrieNode::build(["abc"]);
        // Three single-child internal nodes plus the leaf terminator
        assert_eq!(root.estimated_size(POINTER_SIZE), 3 * POINTER_SIZE + 1);
    }

    #[test]
    fn test_shared_prefix_cost() {
        let root = TrieNode::build(["abc", "abd"]);
        // "ab" spine: 2 edges; fork node: 2 edges; two leaf terminators
        assert_eq!(root.estimated_size(POINTER_SIZE), 4 * POINTER_SIZE + 2);
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn test_duplicate_keys_do_not_grow_the_trie() {
        let once = TrieNode::build(["cafe"]);
        let twice = TrieNode::build(["cafe", "cafe"]);
        assert_eq!(
            once.estimated_size(POINTER_SIZE),
            twice.estimated_size(POINTER_SIZE)
        );
    }

    #[test]
    fn test_hash_batch_shape() {
        let batch = hash_batch(100, [5u8; 32]);
        assert_eq!(batch.len(), 100);
        for item in &batch {
            assert_eq!(item.len(), 64);
            assert!(item.chars().all(|c| c.is_ascii_hexdigit()));
        }
        // Chained digests never repeat within a small batch
        let mut unique = batch.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn test_hash_batch_is_deterministic() {
        assert_eq!(hash_batch(10, [9u8; 32]), hash_batch(10, [9u8; 32]));
    }

    #[test]
    fn test_trie_vs_flat_on_hash_batch() {
        let batch = hash_batch(500, [1u8; 32]);
        let root = TrieNode::build(&batch);
        let trie_cost = root.estimated_size(POINTER_SIZE);
        let flat_cost = flat_size(batch.len(), 64);

        // Uniform hashes share almost no prefixes past the first
        // character or two, so the trie carries nearly a full pointer
        // per character and loses to the flat list
        assert!(trie_cost > flat_cost);
    }
}
