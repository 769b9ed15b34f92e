//! Environment configuration and validation.
//!
//! [`EnvConfig`] is plain data with a `Default` for every field, so a TOML
//! file only needs the values it changes:
//!
//! ```toml
//! max_steps = 900
//! seed = 7
//!
//! [rewards]
//! victory = 50.0
//!
//! [bullets]
//! speed = 25.0
//! ```
//!
//! [`validate()`](EnvConfig::validate) is called by every environment
//! constructor.

use serde::{Deserialize, Serialize};
use skirmish_modules::kind::MAX_LASER_COUNT;

use crate::error::ConfigError;

// ── RewardConfig ───────────────────────────────────────────────────

/// Reward and punishment magnitudes.
///
/// Punishments are stored as the signed value added to the reward, so they
/// are normally negative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Granted to the winner of an episode. Default: 100.
    pub victory: f32,
    /// Granted to the loser of an episode. Default: -100.
    pub loss: f32,
    /// Granted to a bullet's owner when it hits another body. Default: 1.
    pub hit_enemy: f32,
    /// Granted to a body hit by an enemy bullet. Default: -1.
    pub hit_self: f32,
    /// Granted each step to the sole occupant of the hill. Default: 0.1.
    pub hill_tick: f32,
    /// Granted each step to every body not holding the hill while someone
    /// else does. Default: -0.1.
    pub enemy_hill_tick: f32,
    /// Granted to a bullet's owner when it hits the target. Default: 1.
    pub target_hit: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            victory: 100.0,
            loss: -100.0,
            hit_enemy: 1.0,
            hit_self: -1.0,
            hill_tick: 0.1,
            enemy_hill_tick: -0.1,
            target_hit: 1.0,
        }
    }
}

impl RewardConfig {
    fn fields(&self) -> [(&'static str, f32); 7] {
        [
            ("victory", self.victory),
            ("loss", self.loss),
            ("hit_enemy", self.hit_enemy),
            ("hit_self", self.hit_self),
            ("hill_tick", self.hill_tick),
            ("enemy_hill_tick", self.enemy_hill_tick),
            ("target_hit", self.target_hit),
        ]
    }
}

// ── BulletConfig ───────────────────────────────────────────────────

/// Projectile parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    /// Muzzle speed in world units per second. Default: 20.
    pub speed: f32,
    /// Steps a bullet survives without hitting anything. Default: 10.
    pub life: u32,
    /// Collider radius. Default: 0.1.
    pub radius: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 20.0,
            life: 10,
            radius: 0.1,
        }
    }
}

// ── EnvConfig ──────────────────────────────────────────────────────

/// Everything an environment needs besides its ships.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Steps before an episode is cut off. Default: 600.
    pub max_steps: u32,
    /// Control timestep in seconds for drivers that do not pick their own.
    /// [`Environment::step`](crate::Environment::step) takes `dt`
    /// explicitly. Default: 1/60.
    pub dt: f32,
    /// Velocity solver iterations per physics step. Default: 4.
    pub solver_iterations: usize,
    /// Hit points each body starts an episode with. Default: 10.
    pub initial_hp: f32,
    /// Seed for target placement. Default: 0.
    pub seed: u64,
    /// Laser count for sensors a ship description leaves unspecified.
    /// Default: 20.
    pub laser_count: u32,
    /// Reward magnitudes.
    pub rewards: RewardConfig,
    /// Projectile parameters.
    pub bullets: BulletConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            max_steps: 600,
            dt: 1.0 / 60.0,
            solver_iterations: 4,
            initial_hp: 10.0,
            seed: 0,
            laser_count: skirmish_modules::kind::DEFAULT_LASER_COUNT,
            rewards: RewardConfig::default(),
            bullets: BulletConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EnvConfig = toml::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == 0 {
            return Err(ConfigError::ZeroMaxSteps);
        }
        if self.solver_iterations == 0 {
            return Err(ConfigError::ZeroSolverIterations);
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidTimestep { value: self.dt });
        }
        if !self.initial_hp.is_finite() || self.initial_hp <= 0.0 {
            return Err(ConfigError::InvalidHp {
                value: self.initial_hp,
            });
        }
        if let Some((name, value)) = self.rewards.fields().into_iter().find(|(_, v)| !v.is_finite())
        {
            return Err(ConfigError::NonFiniteReward { name, value });
        }
        if self.bullets.life == 0 {
            return Err(ConfigError::InvalidBullet {
                reason: "life must be at least 1 step".into(),
            });
        }
        if !self.bullets.speed.is_finite() || self.bullets.speed < 0.0 {
            return Err(ConfigError::InvalidBullet {
                reason: format!("speed must be finite and non-negative, got {}", self.bullets.speed),
            });
        }
        if !self.bullets.radius.is_finite() || self.bullets.radius <= 0.0 {
            return Err(ConfigError::InvalidBullet {
                reason: format!("radius must be finite and positive, got {}", self.bullets.radius),
            });
        }
        if !(1..=MAX_LASER_COUNT).contains(&self.laser_count) {
            return Err(ConfigError::LaserCountOutOfRange {
                value: self.laser_count,
                max: MAX_LASER_COUNT,
            });
        }
        Ok(())
    }
}
