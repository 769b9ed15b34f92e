//! The closed set of arenas.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};
use skirmish_core::{Transform, Vec2};

/// A wall as `[x, y, width, height]`, with `(x, y)` the bottom-left corner.
pub type WallSpec = [f32; 4];

const TARGET_WALLS: &[WallSpec] = &[
    [-10.0, -10.0, 20.0, 0.1],
    [-10.0, -10.0, 0.1, 20.0],
    [-10.0, 9.9, 20.0, 0.1],
    [9.9, -10.0, 0.1, 20.0],
];
const KOTH_WALLS: &[WallSpec] = &[
    [-10.0, -20.0, 20.0, 0.1],
    [-10.0, -20.0, 0.1, 40.0],
    [-10.0, 19.9, 20.0, 0.1],
    [9.9, -20.0, 0.1, 40.0],
    [-2.5, -9.9, 5.0, 0.2],
    [-2.5, 10.1, 5.0, 0.2],
];

const TARGET_SPAWNS: &[Transform] = &[Transform::new(0.0, 0.0, 0.0)];
const KOTH_SPAWNS: &[Transform] = &[Transform::new(0.0, -15.0, 0.0), Transform::new(0.0, 15.0, PI)];

/// Where the target starts before the first reset.
pub const TARGET_START: Vec2 = Vec2::new(4.0, 4.0);
/// Half extent of the square the target is re-placed in on reset.
pub const TARGET_RANGE: f32 = 9.0;
/// Centre of the hill.
pub const HILL_POSITION: Vec2 = Vec2::ZERO;

/// Which arena an environment runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// One ship shooting a target that moves every episode.
    Target,
    /// Two ships contesting a hill between two barriers.
    KingOfTheHill,
}

impl Scenario {
    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Scenario::Target => "target",
            Scenario::KingOfTheHill => "king_of_the_hill",
        }
    }

    /// Number of ships the scenario needs.
    pub fn ship_count(self) -> usize {
        self.spawns().len()
    }

    /// Spawn placement per ship.
    pub fn spawns(self) -> &'static [Transform] {
        match self {
            Scenario::Target => TARGET_SPAWNS,
            Scenario::KingOfTheHill => KOTH_SPAWNS,
        }
    }

    /// Static walls.
    pub fn walls(self) -> &'static [WallSpec] {
        match self {
            Scenario::Target => TARGET_WALLS,
            Scenario::KingOfTheHill => KOTH_WALLS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ship_counts() {
        assert_eq!(Scenario::Target.ship_count(), 1);
        assert_eq!(Scenario::KingOfTheHill.ship_count(), 2);
    }

    #[test]
    fn koth_spawns_face_each_other() {
        let [a, b] = [KOTH_SPAWNS[0], KOTH_SPAWNS[1]];
        assert_eq!(a.position.y, -b.position.y);
        assert_eq!(b.rotation - a.rotation, PI);
    }

    #[test]
    fn spawns_are_inside_the_walls() {
        for scenario in [Scenario::Target, Scenario::KingOfTheHill] {
            let (min_y, max_y) = scenario
                .walls()
                .iter()
                .fold((f32::MAX, f32::MIN), |(lo, hi), w| (lo.min(w[1]), hi.max(w[1] + w[3])));
            for spawn in scenario.spawns() {
                assert!(spawn.position.y > min_y && spawn.position.y < max_y, "{scenario:?}");
            }
        }
    }
}
