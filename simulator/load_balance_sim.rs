// Load balance demo - identity and transaction populations on one ring
//
// Usage: cargo run --example load_balance_sim

use log::info;
use pox_lab::{assign_and_count, bucket_members, hash_batch, stats, HashRing, IdentityGenerator, RoundSalt};
use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new().init().unwrap();

    let seed = [101u8; 32];
    let buckets = 10;
    let key_count = 2000;

    let ring = HashRing::new(buckets).unwrap();
    let mut generator = IdentityGenerator::from_seed(seed);
    let identities = generator.generate(key_count).unwrap();

    let mut salts = RoundSalt::from_seed(seed);

    // Three rounds: same population, rotating assignment
    for round in 0..3 {
        let salt = salts.next_salt();
        let load = assign_and_count(&ring, &salt, &identities);
        let summary = stats(&load);
        info!(
            "round {}: load {:?} (mean={:.1} std_dev={:.1})",
            round, load, summary.mean, summary.std_dev
        );

        let members = bucket_members(&ring, &salt, &identities);
        let occupied = members.iter().filter(|m| !m.is_empty()).count();
        info!("round {}: {}/{} buckets occupied", round, occupied, buckets);
    }

    // Transaction-like keys go through the identical path
    let transactions = hash_batch(key_count, seed);
    let salt = salts.next_salt();
    let tx_load = assign_and_count(&ring, &salt, &transactions);
    let tx_summary = stats(&tx_load);
    info!(
        "transactions: load {:?} (mean={:.1} std_dev={:.1})",
        tx_load, tx_summary.mean, tx_summary.std_dev
    );
}
