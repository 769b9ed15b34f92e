//! Per-step simulation events for playback clients.
//!
//! The environment buffers events while it advances and hands them out
//! with the next [`StepInfo`](crate::StepInfo). A viewer replaying the
//! episode schedules each one at its `time`.

use serde::{Deserialize, Serialize};
use skirmish_core::{EntityId, Transform};

/// Visual effects a client can spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Exhaust behind a firing thruster.
    ThrusterParticles,
}

/// Something that happened during a step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    /// An entity left the world at `transform`.
    EntityDestroyed {
        /// The entity.
        entity: EntityId,
        /// Episode time, in simulated seconds.
        time: f32,
        /// Last placement.
        transform: Transform,
    },
    /// An effect started at `transform`.
    EffectTriggered {
        /// Which effect.
        effect: EffectKind,
        /// Episode time, in simulated seconds.
        time: f32,
        /// Where it starts.
        transform: Transform,
    },
}

impl SimEvent {
    /// Episode time the event is scheduled for.
    pub fn time(&self) -> f32 {
        match self {
            SimEvent::EntityDestroyed { time, .. } | SimEvent::EffectTriggered { time, .. } => *time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::Vec2;

    #[test]
    fn events_serialize_with_a_type_tag() {
        let event = SimEvent::EffectTriggered {
            effect: EffectKind::ThrusterParticles,
            time: 0.5,
            transform: Transform {
                position: Vec2::new(1.0, 2.0),
                rotation: 0.0,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "effect_triggered");
        assert_eq!(json["effect"], "thruster_particles");
        assert_eq!(event.time(), 0.5);
    }
}
