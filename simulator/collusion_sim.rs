// Collusion demo - fixed-seed adversarial run with a printed report
//
// Usage: cargo run --example collusion_sim

use pox_lab::{CollusionConfig, CollusionSimulator};
use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new().init().unwrap();

    let config = CollusionConfig {
        key_count: 1000,
        attacker_size: 250,
        buckets: 10,
        exercise_pool: 1000,
        tx_count: 600,
        rounds: 100,
        overtake_threshold: 20,
        seed: Some([7u8; 32]),
        ..CollusionConfig::default()
    };

    let report = CollusionSimulator::new(config)
        .and_then(|sim| sim.run())
        .unwrap_or_else(|e| {
            eprintln!("simulation failed: {}", e);
            std::process::exit(1);
        });

    report.print_summary();
}
