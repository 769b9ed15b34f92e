//! Benchmark profiles for Skirmish environments.
//!
//! - [`target_profile`]: one gunboat shooting at the practice target.
//! - [`duel_profile`]: two fighters on the king-of-the-hill map.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use skirmish_engine::{EnvConfig, EnvError, Environment, Scenario};
use skirmish_test_utils::{gunboat, two_fighters};

/// A single gunboat in the target arena.
pub fn target_profile(seed: u64) -> Result<Environment, EnvError> {
    let config = EnvConfig {
        seed,
        ..EnvConfig::default()
    };
    Environment::new(config, Scenario::Target, vec![gunboat("bench")])
}

/// Two stock fighters on the hill map, with episodes long enough that a
/// benchmark iteration rarely hits a reset.
pub fn duel_profile(seed: u64) -> Result<Environment, EnvError> {
    let config = EnvConfig {
        seed,
        max_steps: 100_000,
        ..EnvConfig::default()
    };
    Environment::new(config, Scenario::KingOfTheHill, two_fighters())
}
