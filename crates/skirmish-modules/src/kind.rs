//! The closed set of module kinds and their capability table.
//!
//! Geometry (shapes and link points) is static per [`ModuleType`]; the
//! mutable per-instance state lives in the [`ModuleKind`] variants.

use std::f32::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};
use skirmish_core::{Transform, Vec2};

use crate::action::{Action, ActionEffect};

/// Steps a gun must wait after firing before it can fire again.
pub const GUN_COOLDOWN: u32 = 3;
/// Distance from the gun origin to the muzzle along its local +y axis.
pub const GUN_MUZZLE_OFFSET: f32 = 0.7;
/// Force a thruster applies along its local +y axis while active.
pub const THRUSTER_FORCE: f32 = 50.0;
/// Default number of rays a laser sensor casts.
pub const DEFAULT_LASER_COUNT: u32 = 20;
/// Default laser fan width in degrees.
pub const DEFAULT_LASER_FOV_DEGREES: f32 = 180.0;
/// Default laser range in world units.
pub const DEFAULT_LASER_LENGTH: f32 = 20.0;
/// Upper bound accepted for `laser_count`.
pub const MAX_LASER_COUNT: u32 = 256;

const THREE_HALF_PI: f32 = 3.0 * FRAC_PI_2;

const SQUARE: &[Vec2] = &[
    Vec2::new(-0.5, -0.5),
    Vec2::new(0.5, -0.5),
    Vec2::new(0.5, 0.5),
    Vec2::new(-0.5, 0.5),
];
const GUN_BODY: &[Vec2] = &[
    Vec2::new(-0.5, -0.166),
    Vec2::new(0.5, -0.166),
    Vec2::new(0.5, 0.5),
    Vec2::new(-0.5, 0.5),
];
const GUN_BARREL: &[Vec2] = &[
    Vec2::new(-0.167, -0.334),
    Vec2::new(0.167, -0.334),
    Vec2::new(0.167, 0.0),
    Vec2::new(-0.167, 0.0),
];
const THRUSTER_NOZZLE: &[Vec2] = &[
    Vec2::new(-0.333, -0.125),
    Vec2::new(-0.5, 0.125),
    Vec2::new(0.5, 0.125),
    Vec2::new(0.333, -0.125),
];
const LASER_HOUSING: &[Vec2] = &[
    Vec2::new(-0.5, -0.125),
    Vec2::new(0.5, -0.125),
    Vec2::new(0.5, 0.375),
    Vec2::new(-0.5, 0.375),
];

const SQUARE_LINKS: &[Transform] = &[
    Transform::new(0.0, 0.5, 0.0),
    Transform::new(-0.5, 0.0, FRAC_PI_2),
    Transform::new(0.0, -0.5, PI),
    Transform::new(0.5, 0.0, THREE_HALF_PI),
];
const GUN_LINKS: &[Transform] = &[
    Transform::new(-0.5, -0.167, FRAC_PI_2),
    Transform::new(0.0, -0.5, PI),
    Transform::new(0.5, -0.167, THREE_HALF_PI),
];
const THRUSTER_LINKS: &[Transform] = &[Transform::new(0.0, 0.125, 0.0)];
const LASER_LINKS: &[Transform] = &[Transform::new(0.0, 0.0, PI)];

/// Type tag of a module, as written in ship descriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    /// The core hull every ship starts from.
    Base,
    /// A forward-firing gun.
    Gun,
    /// A thruster pushing along its local +y axis.
    Thruster,
    /// A fan of distance-measuring rays.
    LaserSensor,
    /// A passive hull block with four links.
    SquareHull,
}

/// What a module kind can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Responds to `Activate`/`Shoot` actions.
    pub activatable: bool,
    /// Contributes readings to the body's observation.
    pub sensor: bool,
}

impl ModuleType {
    /// Every module type, in declaration order.
    pub const ALL: [ModuleType; 5] = [
        ModuleType::Base,
        ModuleType::Gun,
        ModuleType::Thruster,
        ModuleType::LaserSensor,
        ModuleType::SquareHull,
    ];

    /// The capability table.
    pub const fn capabilities(self) -> Capabilities {
        match self {
            ModuleType::Base => Capabilities {
                activatable: false,
                sensor: true,
            },
            ModuleType::Gun | ModuleType::Thruster => Capabilities {
                activatable: true,
                sensor: false,
            },
            ModuleType::LaserSensor => Capabilities {
                activatable: false,
                sensor: true,
            },
            ModuleType::SquareHull => Capabilities {
                activatable: false,
                sensor: false,
            },
        }
    }

    /// Convex polygons in module-local coordinates.
    pub fn shapes(self) -> &'static [&'static [Vec2]] {
        match self {
            ModuleType::Base | ModuleType::SquareHull => &[SQUARE],
            ModuleType::Gun => &[GUN_BODY, GUN_BARREL],
            ModuleType::Thruster => &[THRUSTER_NOZZLE],
            ModuleType::LaserSensor => &[LASER_HOUSING],
        }
    }

    /// Link points in module-local coordinates.
    pub fn link_points(self) -> &'static [Transform] {
        match self {
            ModuleType::Base | ModuleType::SquareHull => SQUARE_LINKS,
            ModuleType::Gun => GUN_LINKS,
            ModuleType::Thruster => THRUSTER_LINKS,
            ModuleType::LaserSensor => LASER_LINKS,
        }
    }

    /// Actions exposed to the policy, in order.
    pub fn actions(self) -> &'static [Action] {
        match self {
            ModuleType::Gun => &[Action::Shoot],
            ModuleType::Thruster => &[Action::Activate],
            ModuleType::Base | ModuleType::LaserSensor | ModuleType::SquareHull => &[],
        }
    }

    /// The JSON tag.
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleType::Base => "base",
            ModuleType::Gun => "gun",
            ModuleType::Thruster => "thruster",
            ModuleType::LaserSensor => "laser_sensor",
            ModuleType::SquareHull => "square_hull",
        }
    }
}

/// Per-instance gun state.
#[derive(Clone, Debug, PartialEq)]
pub struct GunState {
    /// Steps that must pass between shots.
    pub cooldown: u32,
    /// Steps since the last shot, advanced by `update()`.
    pub steps_since_last_shot: u32,
}

impl Default for GunState {
    fn default() -> Self {
        Self {
            cooldown: GUN_COOLDOWN,
            steps_since_last_shot: 0,
        }
    }
}

/// Per-instance thruster state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThrusterState {
    /// Fired this step. Cleared by `update()`.
    pub active: bool,
}

/// Per-instance laser sensor configuration and last readings.
#[derive(Clone, Debug, PartialEq)]
pub struct LaserSensorState {
    /// Number of rays.
    pub laser_count: u32,
    /// Fan width in radians.
    pub fov: f32,
    /// Ray length in world units.
    pub length: f32,
    /// Hit fractions from the most recent cast, in `[0, 1]`.
    pub readings: Vec<f32>,
}

impl LaserSensorState {
    /// A sensor with `laser_count` rays and the default fan and range.
    pub fn new(laser_count: u32) -> Self {
        Self {
            laser_count,
            fov: DEFAULT_LASER_FOV_DEGREES.to_radians(),
            length: DEFAULT_LASER_LENGTH,
            readings: vec![1.0; laser_count as usize],
        }
    }

    /// Ray vectors in module-local coordinates, full length, left to right.
    ///
    /// A single laser points straight along +y.
    pub fn rays(&self) -> impl Iterator<Item = Vec2> + '_ {
        let n = self.laser_count;
        let segment = if n > 1 {
            self.fov / (n - 1) as f32
        } else {
            0.0
        };
        let start = if n > 1 { -self.fov / 2.0 } else { 0.0 };
        (0..n).map(move |i| Vec2::new(0.0, self.length).rotated(start + segment * i as f32))
    }
}

impl Default for LaserSensorState {
    fn default() -> Self {
        Self::new(DEFAULT_LASER_COUNT)
    }
}

/// A module's kind together with its mutable state.
#[derive(Clone, Debug, PartialEq)]
pub enum ModuleKind {
    /// Ship core. Reads body velocity.
    Base,
    /// Gun with cooldown state.
    Gun(GunState),
    /// Thruster with its per-step active flag.
    Thruster(ThrusterState),
    /// Laser fan with its last readings.
    LaserSensor(LaserSensorState),
    /// Passive hull block.
    SquareHull,
}

impl ModuleKind {
    /// A fresh gun.
    pub fn gun() -> Self {
        ModuleKind::Gun(GunState::default())
    }

    /// A fresh thruster.
    pub fn thruster() -> Self {
        ModuleKind::Thruster(ThrusterState::default())
    }

    /// A laser sensor with `laser_count` rays.
    pub fn laser_sensor(laser_count: u32) -> Self {
        ModuleKind::LaserSensor(LaserSensorState::new(laser_count))
    }

    /// Fresh state for a type tag. `laser_count` only applies to sensors.
    pub fn from_type(module_type: ModuleType, laser_count: Option<u32>) -> Self {
        match module_type {
            ModuleType::Base => ModuleKind::Base,
            ModuleType::Gun => ModuleKind::gun(),
            ModuleType::Thruster => ModuleKind::thruster(),
            ModuleType::LaserSensor => {
                ModuleKind::laser_sensor(laser_count.unwrap_or(DEFAULT_LASER_COUNT))
            }
            ModuleType::SquareHull => ModuleKind::SquareHull,
        }
    }

    /// The type tag.
    pub fn module_type(&self) -> ModuleType {
        match self {
            ModuleKind::Base => ModuleType::Base,
            ModuleKind::Gun(_) => ModuleType::Gun,
            ModuleKind::Thruster(_) => ModuleType::Thruster,
            ModuleKind::LaserSensor(_) => ModuleType::LaserSensor,
            ModuleKind::SquareHull => ModuleType::SquareHull,
        }
    }

    /// Number of observation entries this module contributes.
    pub fn observation_count(&self) -> usize {
        match self {
            ModuleKind::Base => 3,
            ModuleKind::LaserSensor(s) => s.laser_count as usize,
            ModuleKind::Gun(_) | ModuleKind::Thruster(_) | ModuleKind::SquareHull => 0,
        }
    }

    /// Per-step housekeeping, run before any action.
    pub fn update(&mut self) {
        match self {
            ModuleKind::Gun(gun) => {
                gun.steps_since_last_shot = gun.steps_since_last_shot.saturating_add(1);
            }
            ModuleKind::Thruster(thruster) => thruster.active = false,
            ModuleKind::Base | ModuleKind::LaserSensor(_) | ModuleKind::SquareHull => {}
        }
    }

    /// Run `action` with its slice of the action vector.
    ///
    /// A flag is on when non-zero. Actions the kind does not expose are
    /// ignored.
    pub fn act(&mut self, action: Action, flags: &[i32]) -> ActionEffect {
        let on = flags.first().is_some_and(|&f| f != 0);
        if !on {
            return ActionEffect::None;
        }
        match (self, action) {
            (ModuleKind::Gun(gun), Action::Shoot) => {
                if gun.steps_since_last_shot > gun.cooldown {
                    gun.steps_since_last_shot = 0;
                    ActionEffect::Fire {
                        muzzle: Vec2::new(0.0, GUN_MUZZLE_OFFSET),
                        direction: Vec2::new(0.0, 1.0),
                    }
                } else {
                    ActionEffect::None
                }
            }
            (ModuleKind::Thruster(thruster), Action::Activate) => {
                thruster.active = true;
                ActionEffect::Thrust {
                    force: Vec2::new(0.0, THRUSTER_FORCE),
                    point: Vec2::ZERO,
                }
            }
            _ => ActionEffect::None,
        }
    }
}
