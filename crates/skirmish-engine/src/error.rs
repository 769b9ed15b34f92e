//! Error types for bodies, environments, and the simulation actor.

use skirmish_core::BodyIndex;
use skirmish_modules::{CompositionError, SerializationError};
use skirmish_physics::PhysicsError;
use thiserror::Error;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`EnvConfig::validate()`](crate::EnvConfig::validate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed into a config.
    #[error("config parse error: {reason}")]
    Parse {
        /// Parser message.
        reason: String,
    },
    /// `max_steps` is zero.
    #[error("max_steps must be at least 1")]
    ZeroMaxSteps,
    /// `solver_iterations` is zero.
    #[error("solver_iterations must be at least 1")]
    ZeroSolverIterations,
    /// `dt` is NaN, infinite, zero, or negative.
    #[error("dt must be finite and positive, got {value}")]
    InvalidTimestep {
        /// The invalid value.
        value: f32,
    },
    /// `initial_hp` is NaN, infinite, zero, or negative.
    #[error("initial_hp must be finite and positive, got {value}")]
    InvalidHp {
        /// The invalid value.
        value: f32,
    },
    /// A reward magnitude is NaN or infinite.
    #[error("reward {name} must be finite, got {value}")]
    NonFiniteReward {
        /// Field name.
        name: &'static str,
        /// The invalid value.
        value: f32,
    },
    /// Bullet parameters violate an invariant.
    #[error("invalid bullet config: {reason}")]
    InvalidBullet {
        /// Which invariant was violated.
        reason: String,
    },
    /// `laser_count` is outside `1..=max`.
    #[error("laser_count {value} outside 1..={max}")]
    LaserCountOutOfRange {
        /// The configured value.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },
}

// ── BodyError ──────────────────────────────────────────────────────

/// Errors from composing, driving, or loading a [`Body`](crate::Body).
#[derive(Debug, Error)]
pub enum BodyError {
    /// A graph operation was rejected.
    #[error("composition: {0}")]
    Composition(#[from] CompositionError),
    /// The physics body is gone or a shape is degenerate.
    #[error("physics: {0}")]
    Physics(#[from] PhysicsError),
    /// A ship description could not be read.
    #[error("serialization: {0}")]
    Serialization(#[from] SerializationError),
    /// The action vector has the wrong length.
    #[error("expected {expected} action flags, got {got}")]
    ActionLength {
        /// `input_count()` of the body.
        expected: usize,
        /// Length supplied.
        got: usize,
    },
}

// ── EnvError ───────────────────────────────────────────────────────

/// Errors from an [`Environment`](crate::Environment) operation.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The configuration failed validation.
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    /// An operation on one body failed.
    #[error("body {index}: {source}")]
    Body {
        /// Which body.
        index: BodyIndex,
        /// What went wrong.
        #[source]
        source: BodyError,
    },
    /// A physics call on static geometry or a bullet failed.
    #[error("physics: {0}")]
    Physics(#[from] PhysicsError),
    /// The outer action batch does not have one entry per body.
    #[error("expected actions for {expected} bodies, got {got}")]
    ActionBatch {
        /// Number of bodies.
        expected: usize,
        /// Number of action vectors supplied.
        got: usize,
    },
    /// The scenario needs a different number of ships.
    #[error("{scenario} needs {expected} ships, got {got}")]
    ShipCount {
        /// Scenario name.
        scenario: &'static str,
        /// Ships required.
        expected: usize,
        /// Ships supplied.
        got: usize,
    },
    /// A body index is out of range.
    #[error("no body {0}")]
    UnknownBody(BodyIndex),
    /// A step length was not a positive finite number of seconds.
    #[error("timestep must be positive and finite, got {value}")]
    InvalidTimestep {
        /// The rejected value.
        value: f32,
    },
    /// A state snapshot does not match this environment.
    #[error("state does not fit environment: {reason}")]
    StateMismatch {
        /// Which part did not fit.
        reason: String,
    },
}

impl EnvError {
    pub(crate) fn body(index: BodyIndex, source: impl Into<BodyError>) -> Self {
        EnvError::Body {
            index,
            source: source.into(),
        }
    }
}

// ── ActorError ─────────────────────────────────────────────────────

/// Errors delivered through a [`Pending`](crate::Pending).
#[derive(Debug, Error)]
pub enum ActorError {
    /// The command reached the environment and failed there.
    #[error(transparent)]
    Env(#[from] EnvError),
    /// The actor has stopped; the command was never run.
    #[error("environment actor has stopped")]
    Stopped,
    /// The command panicked on the actor thread. The actor keeps serving.
    #[error("command panicked: {message}")]
    Panicked {
        /// Panic payload, if it was a string.
        message: String,
    },
    /// No reply within the caller's timeout. The command may still run.
    #[error("timed out waiting for reply")]
    Timeout,
    /// The actor thread could not be spawned.
    #[error("thread spawn failed: {reason}")]
    Spawn {
        /// OS error text.
        reason: String,
    },
}
