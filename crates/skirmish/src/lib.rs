//! Skirmish: a 2D physics arena for training ship-controlling agents.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Skirmish sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use skirmish::prelude::*;
//!
//! let ship = ShipDescription {
//!     schema: SCHEMA_VERSION.into(),
//!     name: "gunboat".into(),
//!     base_module: skirmish::modules::presets::gunboat().unwrap().to_node(),
//!     num_observations: None,
//!     num_actions: None,
//! };
//! let env = Environment::new(EnvConfig::default(), Scenario::Target, vec![ship]).unwrap();
//! let actor = EnvironmentActor::spawn(env).unwrap();
//!
//! let first = actor.reset().wait().unwrap();
//! assert!(!first.done);
//! let info = actor.step(vec![vec![0]], 1.0 / 60.0).wait().unwrap();
//! assert_eq!(info.rewards.len(), 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `skirmish-core` | Vectors, transforms, IDs, render data |
//! | [`modules`] | `skirmish-modules` | Ship modules, link graph, JSON schema |
//! | [`physics`] | `skirmish-physics` | rapier2d wrapper, entity keys, ray casts |
//! | [`engine`] | `skirmish-engine` | Bodies, entities, environments, actor |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Geometry, IDs, and render data (`skirmish-core`).
pub use skirmish_core as types;

/// Ship composition (`skirmish-modules`).
///
/// [`modules::ModuleGraph`] holds a ship's modules;
/// [`modules::ShipDescription`] is its persisted form.
pub use skirmish_modules as modules;

/// Physics (`skirmish-physics`).
///
/// [`physics::PhysicsWorld`] wraps rapier2d and reports contacts as
/// [`physics::EntityKey`]s.
pub use skirmish_physics as physics;

/// Environments and the simulation actor (`skirmish-engine`).
///
/// [`engine::Environment`] for direct stepping,
/// [`engine::EnvironmentActor`] for a threaded environment, and
/// [`engine::VecEnv`] for several at once.
pub use skirmish_engine as engine;

/// Common imports for typical Skirmish usage.
///
/// ```rust
/// use skirmish::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use skirmish_core::{BodyIndex, RenderData, Transform, Vec2};

    // Ship composition
    pub use skirmish_modules::{ModuleGraph, ModuleKind, ShipDescription, SCHEMA_VERSION};

    // Errors
    pub use skirmish_engine::{ActorError, BodyError, ConfigError, EnvError};
    pub use skirmish_modules::{CompositionError, SerializationError};
    pub use skirmish_physics::PhysicsError;

    // Engine
    pub use skirmish_engine::{
        Body, EnvConfig, Environment, EnvironmentActor, Pending, Policy, RandomPolicy,
        RewardConfig, Scenario, SimEvent, StepInfo, StepMetrics, VecEnv,
    };
}
