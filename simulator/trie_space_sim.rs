// Trie space demo - prefix trie vs flat list over a hash batch
//
// Usage: cargo run --example trie_space_sim

use log::info;
use pox_lab::{flat_size, hash_batch, TrieNode, POINTER_SIZE};
use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new().init().unwrap();

    let item_size = 64;

    for batch_size in [100, 1000, 10_000] {
        let batch = hash_batch(batch_size, [3u8; 32]);
        let root = TrieNode::build(&batch);

        let trie_cost = root.estimated_size(POINTER_SIZE);
        let flat_cost = flat_size(batch_size, item_size);

        info!(
            "{} hashes: trie={} flat={} ({})",
            batch_size,
            trie_cost,
            flat_cost,
            if trie_cost < flat_cost { "trie wins" } else { "flat set wins" }
        );
    }
}
