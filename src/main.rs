//! Default harness: public-key bucket-distribution experiment.
//!
//! Generates a population of addresses, hashes them onto a ring of
//! `key_count / 1000` buckets, and reports the load vector and summary
//! statistics. With a well-behaved ring the per-bucket load lands in the
//! low hundreds around the ideal (roughly 900-1100 for 10 000 keys in 10
//! buckets).

use log::info;
use rand::Rng;
use simple_logger::SimpleLogger;

use pox_lab::{assign_and_count, stats, HashRing, IdentityGenerator};

const KEY_COUNT: usize = 10_000;

fn main() {
    SimpleLogger::new().init().unwrap();

    let mut seed = [0u8; 32];
    rand::thread_rng().fill(&mut seed);
    info!("key distribution experiment, seed {}", hex::encode(seed));

    let buckets = KEY_COUNT / 1000;
    let ring = HashRing::new(buckets).expect("positive bucket count");

    let mut generator = IdentityGenerator::from_seed(seed);
    let mut identities = Vec::with_capacity(KEY_COUNT);
    for i in 0..KEY_COUNT {
        identities.push(generator.generate_one().expect("crypto primitives present"));
        if i % 1000 == 0 {
            info!("generated address {}/{}", i, KEY_COUNT);
        }
    }

    // No salt: this measures raw address dispersion on a static ring
    let load = assign_and_count(&ring, "", &identities);
    let summary = stats(&load);

    info!("computed bucket load: {:?}", load);
    info!(
        "load over {} buckets: mean={:.1} std_dev={:.1} min={} max={}",
        buckets, summary.mean, summary.std_dev, summary.min, summary.max
    );
}
