//! Adversarial Collusion Simulation
//!
//! Estimates the security margin of sharded verification: with a fixed
//! prefix of the identity population under attacker control, how many
//! colluding identities can end up able to mutually validate within the
//! same validation group in any one round?
//!
//! # Per-round pipeline
//!
//! 1. Draw a fresh round salt.
//! 2. Rebuild the primary ring (`buckets` partitions) and assign every
//!    identity via `salt ++ identity`, keeping full bucket membership.
//! 3. Restrict each bucket to its attacker members.
//! 4. Assign each sampled exercise key to a bucket the same way; for each
//!    key, synthesize a solution string (`bucket ++ key ++ tiebreak`),
//!    hash it, and map the digest through the validation ring to a
//!    validation-group id. The set of ids reachable from a bucket's
//!    exercises is that bucket's exercise-group set.
//! 5. An attacker identity is *reachable* when its own validation-group id
//!    (`validation_ring.partition_of(salt ++ identity)`) is in its bucket's
//!    set. Each attacker identity's collusion reach is the number of other
//!    reachable attackers in the same bucket; the round records the maximum
//!    reach.
//!
//! The primary ring is rebuilt from scratch every round. That is the
//! simplest correct strategy; an incremental virtual-node update would only
//! matter if profiling ever shows ring construction dominating, and it has
//! not.
//!
//! The grouping ring (`exercise_groups`) tags exercise keys at setup time
//! and the validation ring (`validation_groups`) maps solution hashes and
//! identities per round. Both are small fixed-size rings, configured
//! separately from `buckets`, and must not be conflated.

use crate::px_identity::{Identity, IdentityError, IdentityGenerator};
use crate::px_load::bucket_members;
use crate::px_ring::{HashRing, RingError};
use crate::px_salt::{RoundSalt, SALT_DRAW_MAX};
use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::{seq::index::sample, Rng, RngCore, SeedableRng};
use sha2::{Digest, Sha256};
use std::fmt;

/// Configuration for one collusion simulation run
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CollusionConfig {
    /// Total identity population
    pub key_count: usize,

    /// Attacker-controlled prefix of the population
    pub attacker_size: usize,

    /// Primary ring partition count
    pub buckets: usize,

    /// Exercise keys generated at setup
    #[serde(default = "default_exercise_pool")]
    pub exercise_pool: usize,

    /// Exercise keys sampled (without replacement) from the pool
    pub tx_count: usize,

    /// Simulated rounds
    pub rounds: usize,

    /// Grouping ring size (setup-time exercise tagging only)
    #[serde(default = "default_small_ring")]
    pub exercise_groups: usize,

    /// Validation ring size (solution hashes and identity group ids)
    #[serde(default = "default_small_ring")]
    pub validation_groups: usize,

    /// Collusion size above which consecutive rounds flag an overtake
    /// window. Empirically chosen report constant, not load-bearing for
    /// correctness.
    #[serde(default = "default_overtake_threshold")]
    pub overtake_threshold: usize,

    /// Random seed for reproducibility
    #[serde(default)]
    pub seed: Option<[u8; 32]>,
}

fn default_small_ring() -> usize {
    5
}

fn default_exercise_pool() -> usize {
    1000
}

fn default_overtake_threshold() -> usize {
    70
}

impl Default for CollusionConfig {
    fn default() -> Self {
        Self {
            key_count: 1000,
            attacker_size: 100,
            buckets: 10,
            exercise_pool: 1000,
            tx_count: 500,
            rounds: 50,
            exercise_groups: default_small_ring(),
            validation_groups: default_small_ring(),
            overtake_threshold: default_overtake_threshold(),
            seed: None,
        }
    }
}

/// Errors from collusion simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollusionError {
    /// Requested sample exceeds the generated exercise pool
    InsufficientSamples { requested: usize, available: usize },

    /// Attacker set cannot exceed the identity population
    AttackerSetTooLarge {
        attacker_size: usize,
        key_count: usize,
    },

    /// Ring construction failed
    Ring(RingError),

    /// Identity generation failed
    Identity(IdentityError),
}

impl fmt::Display for CollusionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollusionError::InsufficientSamples {
                requested,
                available,
            } => write!(
                f,
                "cannot sample {} exercise keys from a pool of {}",
                requested, available
            ),
            CollusionError::AttackerSetTooLarge {
                attacker_size,
                key_count,
            } => write!(
                f,
                "attacker set of {} exceeds population of {}",
                attacker_size, key_count
            ),
            CollusionError::Ring(e) => write!(f, "ring error: {}", e),
            CollusionError::Identity(e) => write!(f, "identity error: {}", e),
        }
    }
}

impl std::error::Error for CollusionError {}

impl From<RingError> for CollusionError {
    fn from(e: RingError) -> Self {
        CollusionError::Ring(e)
    }
}

impl From<IdentityError> for CollusionError {
    fn from(e: IdentityError) -> Self {
        CollusionError::Identity(e)
    }
}

/// A contiguous stretch of rounds whose collusion maxima all exceed the
/// overtake threshold (inclusive bounds, length >= 2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OvertakeWindow {
    pub start: usize,
    pub end: usize,
}

/// Result of a collusion simulation run
#[derive(Debug, Clone)]
pub struct CollusionReport {
    /// Seed used for the run
    pub seed_used: [u8; 32],

    /// Configuration the run executed with
    pub config: CollusionConfig,

    /// Maximum collusion reach observed in each round
    pub round_maxima: Vec<usize>,

    /// Overtake windows derived from the maxima and the threshold
    pub overtake_windows: Vec<OvertakeWindow>,
}

impl CollusionReport {
    /// Print a summary of the simulation results
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        Collusion Simulation Results                   ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Configuration:");
        println!("  Seed: {}", hex::encode(self.seed_used));
        println!(
            "  Population: {} identities ({} attacker-controlled)",
            self.config.key_count, self.config.attacker_size
        );
        println!(
            "  Buckets: {}  Validation groups: {}",
            self.config.buckets, self.config.validation_groups
        );
        println!(
            "  Exercises: {} sampled from {}",
            self.config.tx_count, self.config.exercise_pool
        );
        println!("  Rounds: {}\n", self.round_maxima.len());

        let peak = self.round_maxima.iter().max().copied().unwrap_or(0);
        let floor = self.round_maxima.iter().min().copied().unwrap_or(0);
        let avg = if self.round_maxima.is_empty() {
            0.0
        } else {
            self.round_maxima.iter().sum::<usize>() as f64 / self.round_maxima.len() as f64
        };

        println!("Collusion reach per round:");
        println!("  max={}, min={}, avg={:.1}", peak, floor, avg);
        println!(
            "  Threshold: {} (overtake = two consecutive rounds above)",
            self.config.overtake_threshold
        );

        if self.overtake_windows.is_empty() {
            println!("  No overtake windows flagged");
        } else {
            for window in &self.overtake_windows {
                println!(
                    "  Overtake window: rounds {}..={}",
                    window.start, window.end
                );
            }
        }
        println!();
    }
}

/// Derive maximal runs of >= 2 consecutive rounds whose maxima exceed the
/// threshold. A single round above the threshold never flags a window.
pub fn overtake_windows(maxima: &[usize], threshold: usize) -> Vec<OvertakeWindow> {
    let mut windows = Vec::new();
    let mut run_start: Option<usize> = None;

    for (round, &reach) in maxima.iter().enumerate() {
        if reach > threshold {
            run_start.get_or_insert(round);
        } else if let Some(start) = run_start.take() {
            if round - start >= 2 {
                windows.push(OvertakeWindow {
                    start,
                    end: round - 1,
                });
            }
        }
    }
    if let Some(start) = run_start {
        if maxima.len() - start >= 2 {
            windows.push(OvertakeWindow {
                start,
                end: maxima.len() - 1,
            });
        }
    }

    windows
}

/// An exercise key tagged with its setup-time group
#[derive(Debug, Clone)]
struct ExerciseKey {
    key: String,
    group: usize,
}

/// Collusion simulator
///
/// Owns the configuration and a seeded RNG; `run` consumes the simulator
/// and produces the per-round maxima plus the derived overtake windows.
pub struct CollusionSimulator {
    config: CollusionConfig,
    rng: StdRng,
    seed_used: [u8; 32],
}

impl CollusionSimulator {
    /// Create a simulator, validating the configuration.
    pub fn new(config: CollusionConfig) -> Result<Self, CollusionError> {
        if config.attacker_size > config.key_count {
            return Err(CollusionError::AttackerSetTooLarge {
                attacker_size: config.attacker_size,
                key_count: config.key_count,
            });
        }
        if config.tx_count > config.exercise_pool {
            return Err(CollusionError::InsufficientSamples {
                requested: config.tx_count,
                available: config.exercise_pool,
            });
        }

        let seed = config.seed.unwrap_or_else(|| {
            let mut seed = [0u8; 32];
            rand::thread_rng().fill(&mut seed);
            seed
        });

        Ok(CollusionSimulator {
            config,
            rng: StdRng::from_seed(seed),
            seed_used: seed,
        })
    }

    /// Run the simulation.
    pub fn run(mut self) -> Result<CollusionReport, CollusionError> {
        // Setup: identity population with the attacker prefix
        let mut id_seed = [0u8; 32];
        self.rng.fill_bytes(&mut id_seed);
        let mut generator = IdentityGenerator::from_seed(id_seed);
        let identities = generator.generate(self.config.key_count)?;

        // Exercise pool, sampled without replacement
        let exercises = self.build_exercise_set()?;

        let validation_ring = HashRing::new(self.config.validation_groups)?;

        let mut salt_seed = [0u8; 32];
        self.rng.fill_bytes(&mut salt_seed);
        let mut salts = RoundSalt::from_seed(salt_seed);

        log::info!(
            "collusion run: {} identities ({} attackers), {} buckets, {} rounds",
            self.config.key_count,
            self.config.attacker_size,
            self.config.buckets,
            self.config.rounds
        );

        let mut round_maxima = Vec::with_capacity(self.config.rounds);
        for round in 0..self.config.rounds {
            let salt = salts.next_salt();
            let max_reach = self.run_round(&salt, &identities, &exercises, &validation_ring)?;
            round_maxima.push(max_reach);

            log::debug!("round {}: max collusion reach {}", round, max_reach);
        }

        let windows = overtake_windows(&round_maxima, self.config.overtake_threshold);
        if !windows.is_empty() {
            log::warn!("{} overtake window(s) flagged", windows.len());
        }

        Ok(CollusionReport {
            seed_used: self.seed_used,
            config: self.config,
            round_maxima,
            overtake_windows: windows,
        })
    }

    /// Generate the exercise pool and sample `tx_count` keys without
    /// replacement, tagging each with its grouping-ring group.
    fn build_exercise_set(&mut self) -> Result<Vec<ExerciseKey>, CollusionError> {
        let pool: Vec<String> = (0..self.config.exercise_pool)
            .map(|_| {
                let mut material = [0u8; 32];
                self.rng.fill_bytes(&mut material);
                hex::encode(Sha256::digest(material))
            })
            .collect();

        if self.config.tx_count > pool.len() {
            return Err(CollusionError::InsufficientSamples {
                requested: self.config.tx_count,
                available: pool.len(),
            });
        }

        let grouping_ring = HashRing::new(self.config.exercise_groups)?;
        let sampled = sample(&mut self.rng, pool.len(), self.config.tx_count);

        let exercises: Vec<ExerciseKey> = sampled
            .iter()
            .map(|i| {
                let key = pool[i].clone();
                let group = grouping_ring.partition_of(&key);
                ExerciseKey { key, group }
            })
            .collect();

        let mut group_counts = vec![0usize; self.config.exercise_groups];
        for exercise in &exercises {
            group_counts[exercise.group] += 1;
        }
        log::debug!(
            "sampled {} exercises, group distribution {:?}",
            exercises.len(),
            group_counts
        );

        Ok(exercises)
    }

    /// One simulated round; returns the maximum collusion reach.
    fn run_round(
        &mut self,
        salt: &str,
        identities: &[Identity],
        exercises: &[ExerciseKey],
        validation_ring: &HashRing,
    ) -> Result<usize, CollusionError> {
        // Rebuild-per-round: topology is a pure function of the count
        let ring = HashRing::new(self.config.buckets)?;

        let buckets = bucket_members(&ring, salt, identities);

        // Reachable validation groups per bucket, from the exercises
        // assigned there
        let mut exercise_groups: Vec<IndexSet<usize>> =
            vec![IndexSet::new(); self.config.buckets];
        for exercise in exercises {
            let bucket = ring.partition_of(&format!("{}{}", salt, exercise.key));
            let tiebreak = self.rng.gen_range(0..=SALT_DRAW_MAX);
            let solution = format!("{}{}{}", bucket, exercise.key, tiebreak);
            let digest = hex::encode(Sha256::digest(solution.as_bytes()));
            exercise_groups[bucket].insert(validation_ring.partition_of(&digest));
        }

        // Maximum collusion reach across all attacker identities
        let mut max_reach = 0usize;
        for (bucket, members) in buckets.iter().enumerate() {
            let attackers: Vec<usize> = members
                .iter()
                .copied()
                .filter(|&index| index < self.config.attacker_size)
                .collect();
            if attackers.is_empty() {
                continue;
            }

            let reachable: Vec<bool> = attackers
                .iter()
                .map(|&index| {
                    let group =
                        validation_ring.partition_of(&format!("{}{}", salt, identities[index]));
                    exercise_groups[bucket].contains(&group)
                })
                .collect();
            let reachable_count = reachable.iter().filter(|&&r| r).count();

            // Each identity counts the *other* reachable attackers in its
            // bucket
            for &is_reachable in &reachable {
                let reach = reachable_count - usize::from(is_reachable);
                max_reach = max_reach.max(reach);
            }
        }

        Ok(max_reach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> CollusionConfig {
        CollusionConfig {
            key_count: 40,
            attacker_size: 10,
            buckets: 4,
            exercise_pool: 50,
            tx_count: 30,
            rounds: 5,
            seed: Some([17u8; 32]),
            ..CollusionConfig::default()
        }
    }

    #[test]
    fn test_no_attackers_means_no_collusion() {
        let config = CollusionConfig {
            attacker_size: 0,
            ..small_config()
        };
        let report = CollusionSimulator::new(config).unwrap().run().unwrap();
        assert_eq!(report.round_maxima, vec![0, 0, 0, 0, 0]);
        assert!(report.overtake_windows.is_empty());
    }

    #[test]
    fn test_full_attacker_population_is_bounded() {
        let config = CollusionConfig {
            key_count: 40,
            attacker_size: 40,
            ..small_config()
        };
        let report = CollusionSimulator::new(config).unwrap().run().unwrap();
        assert_eq!(report.round_maxima.len(), 5);
        for &reach in &report.round_maxima {
            // Reach counts *other* identities in one bucket, so it can
            // never meet or exceed the whole population
            assert!(reach < 40);
        }
    }

    #[test]
    fn test_attacker_set_cannot_exceed_population() {
        let config = CollusionConfig {
            key_count: 10,
            attacker_size: 11,
            ..small_config()
        };
        assert_eq!(
            CollusionSimulator::new(config).err(),
            Some(CollusionError::AttackerSetTooLarge {
                attacker_size: 11,
                key_count: 10
            })
        );
    }

    #[test]
    fn test_sampling_never_truncates_silently() {
        let config = CollusionConfig {
            exercise_pool: 20,
            tx_count: 21,
            ..small_config()
        };
        assert_eq!(
            CollusionSimulator::new(config).err(),
            Some(CollusionError::InsufficientSamples {
                requested: 21,
                available: 20
            })
        );
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let first = CollusionSimulator::new(small_config())
            .unwrap()
            .run()
            .unwrap();
        let second = CollusionSimulator::new(small_config())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(first.round_maxima, second.round_maxima);
        assert_eq!(first.seed_used, second.seed_used);
    }

    #[test]
    fn test_overtake_windows_need_two_consecutive_rounds() {
        // Isolated spike never flags
        assert!(overtake_windows(&[0, 80, 0, 80, 0], 70).is_empty());

        // Two consecutive rounds above the threshold flag one window
        assert_eq!(
            overtake_windows(&[0, 80, 90, 0], 70),
            vec![OvertakeWindow { start: 1, end: 2 }]
        );

        // Runs are maximal and can end at the last round
        assert_eq!(
            overtake_windows(&[75, 75, 75, 0, 71, 99], 70),
            vec![
                OvertakeWindow { start: 0, end: 2 },
                OvertakeWindow { start: 4, end: 5 }
            ]
        );

        // Threshold is exclusive
        assert!(overtake_windows(&[70, 70, 70], 70).is_empty());
    }

    #[test]
    fn test_report_round_count_matches_config() {
        let config = CollusionConfig {
            rounds: 3,
            ..small_config()
        };
        let report = CollusionSimulator::new(config).unwrap().run().unwrap();
        assert_eq!(report.round_maxima.len(), 3);
    }
}
