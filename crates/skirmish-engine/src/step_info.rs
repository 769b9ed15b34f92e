//! Values returned to the policy side.

use serde::{Deserialize, Serialize};
use skirmish_core::{BodyIndex, Transform, Vec2};

use crate::entities::BulletState;
use crate::events::SimEvent;

/// What the policy sees after a reset or a step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// One observation vector per body.
    pub observations: Vec<Vec<f32>>,
    /// Reward earned by each body during the step.
    pub rewards: Vec<f32>,
    /// True if this step ended the episode.
    pub done: bool,
    /// The winner, for scenarios that have one and episodes that ended
    /// with a clear winner.
    pub victor: Option<BodyIndex>,
    /// Events raised while advancing, oldest first.
    #[serde(default)]
    pub events: Vec<SimEvent>,
}

/// Kinematic state and hit points of one body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    /// World placement.
    pub transform: Transform,
    /// Linear velocity.
    pub linear_velocity: Vec2,
    /// Angular velocity.
    pub angular_velocity: f32,
    /// Hit points.
    pub hp: f32,
}

/// A restorable snapshot of an environment's dynamic state.
///
/// Static geometry and ship layouts are not included; a snapshot only fits
/// an environment built from the same scenario and ships.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvState {
    /// One entry per body.
    pub bodies: Vec<BodySnapshot>,
    /// Live bullets.
    pub bullets: Vec<BulletState>,
    /// Episode scores.
    pub scores: Vec<f32>,
}
