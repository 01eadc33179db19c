// Scenario Runner - Load and execute scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner scenarios/baseline.yaml
//   cargo run --bin scenario_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner scenarios/baseline.yaml --seed 0x1234...

use pox_lab::{
    assign_and_count, flat_size, hash_batch, stats, CollusionConfig, CollusionSimulator,
    HashRing, IdentityGenerator, RoundSalt, TrieNode, POINTER_SIZE,
};
use rand::Rng;
use simple_logger::SimpleLogger;
use std::env;
use std::fs;
use std::path::Path;

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
struct ScenarioFile {
    /// Scenario metadata
    #[serde(default)]
    meta: ScenarioMeta,

    /// Load-balance experiment (optional)
    #[serde(default)]
    load: Option<LoadScenario>,

    /// Collusion experiment (optional)
    #[serde(default)]
    collusion: Option<CollusionConfig>,

    /// Trie space experiment (optional)
    #[serde(default)]
    trie: Option<TrieScenario>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ScenarioMeta {
    name: Option<String>,
    description: Option<String>,
    hypothesis: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct LoadScenario {
    /// Generated identity population
    key_count: usize,

    /// Ring partition count
    buckets: usize,

    /// Transaction-like key population run through the same analysis
    #[serde(default)]
    tx_count: usize,
}

#[derive(Debug, serde::Deserialize)]
struct TrieScenario {
    /// Number of content hashes in the batch
    batch_size: usize,

    /// Flat-list bytes per item
    #[serde(default = "default_item_size")]
    item_size: usize,

    /// Pointer charge per trie child edge
    #[serde(default = "default_pointer_size")]
    pointer_size: usize,
}

fn default_item_size() -> usize {
    64
}

fn default_pointer_size() -> usize {
    POINTER_SIZE
}

fn main() {
    SimpleLogger::new().init().unwrap();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/baseline.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/baseline.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);

    // Parse optional seed
    let seed: Option<[u8; 32]> = if args.len() >= 4 && args[2] == "--seed" {
        Some(parse_seed_hex(&args[3]))
    } else {
        None
    };

    if path.is_file() {
        run_scenario_file(path, seed);
    } else if path.is_dir() {
        run_scenario_directory(path, seed);
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }
}

fn run_scenario_directory(dir: &Path, seed: Option<[u8; 32]>) {
    let mut scenarios = Vec::new();

    // Find all .yaml files
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("yaml")
                || path.extension().and_then(|s| s.to_str()) == Some("yml")
            {
                scenarios.push(path);
            }
        }
    }

    scenarios.sort();

    if scenarios.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("Found {} scenario(s) to run\n", scenarios.len());

    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        run_scenario_file(scenario_path, seed);
    }
}

fn run_scenario_file(path: &Path, seed: Option<[u8; 32]>) {
    println!("Loading scenario from: {}", path.display());

    let yaml_content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let scenario: ScenarioFile = serde_yaml::from_str(&yaml_content).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", path.display(), e);
        std::process::exit(1);
    });

    println!("\n╔════════════════════════════════════════════════════════╗");
    if let Some(ref name) = scenario.meta.name {
        println!("║  {}  {}", name, " ".repeat(54_usize.saturating_sub(name.len())));
    } else {
        println!("║  Scenario: {}  ", path.file_stem().unwrap().to_str().unwrap());
    }
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    if let Some(ref hypothesis) = scenario.meta.hypothesis {
        println!("Hypothesis:");
        println!("  {}\n", hypothesis);
    }

    // One seed drives every experiment in the file
    let seed = seed.unwrap_or_else(|| {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill(&mut seed);
        seed
    });
    println!("Seed: {}\n", hex::encode(seed));

    if let Some(ref load) = scenario.load {
        run_load_block(load, seed);
    }

    if let Some(ref collusion) = scenario.collusion {
        let mut config = collusion.clone();
        config.seed = Some(config.seed.unwrap_or(seed));
        match CollusionSimulator::new(config).and_then(|sim| sim.run()) {
            Ok(report) => report.print_summary(),
            Err(e) => {
                eprintln!("Collusion run failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Some(ref trie) = scenario.trie {
        run_trie_block(trie, seed);
    }

    println!("\n✓ Scenario complete!\n");
}

fn run_load_block(scenario: &LoadScenario, seed: [u8; 32]) {
    let ring = match HashRing::new(scenario.buckets) {
        Ok(ring) => ring,
        Err(e) => {
            eprintln!("Load run failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut salts = RoundSalt::from_seed(seed);
    let salt = salts.next_salt();

    let mut generator = IdentityGenerator::from_seed(seed);
    let identities = generator.generate(scenario.key_count).unwrap_or_else(|e| {
        eprintln!("Identity generation failed: {}", e);
        std::process::exit(1);
    });

    let load = assign_and_count(&ring, &salt, &identities);
    let summary = stats(&load);

    println!("Identity load over {} buckets:", scenario.buckets);
    println!("  {:?}", load);
    println!(
        "  mean={:.1} std_dev={:.1} min={} max={}\n",
        summary.mean, summary.std_dev, summary.min, summary.max
    );

    if scenario.tx_count > 0 {
        // Transaction-like population: arbitrary distinct string keys
        // through the identical analysis path
        let transactions = hash_batch(scenario.tx_count, seed);
        let tx_load = assign_and_count(&ring, &salt, &transactions);
        let tx_summary = stats(&tx_load);

        println!("Transaction load over {} buckets:", scenario.buckets);
        println!("  {:?}", tx_load);
        println!(
            "  mean={:.1} std_dev={:.1} min={} max={}\n",
            tx_summary.mean, tx_summary.std_dev, tx_summary.min, tx_summary.max
        );
    }
}

fn run_trie_block(scenario: &TrieScenario, seed: [u8; 32]) {
    let batch = hash_batch(scenario.batch_size, seed);
    let root = TrieNode::build(&batch);

    let trie_cost = root.estimated_size(scenario.pointer_size);
    let flat_cost = flat_size(scenario.batch_size, scenario.item_size);

    println!("Trie space estimate over {} hashes:", scenario.batch_size);
    println!("  trie: {} units (pointer_size={})", trie_cost, scenario.pointer_size);
    println!("  flat: {} units (item_size={})", flat_cost, scenario.item_size);
    println!(
        "  verdict: {}\n",
        if trie_cost < flat_cost { "trie wins" } else { "flat set wins" }
    );
}

fn parse_seed_hex(hex: &str) -> [u8; 32] {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let mut seed = [0u8; 32];

    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        if i >= 32 {
            break;
        }
        let byte_str = std::str::from_utf8(chunk).unwrap();
        seed[i] = u8::from_str_radix(byte_str, 16).unwrap_or_else(|e| {
            eprintln!("Invalid hex seed: {}", e);
            std::process::exit(1);
        });
    }

    seed
}
