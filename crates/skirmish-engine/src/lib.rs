//! Environments, scenarios, and the simulation actor for Skirmish.
//!
//! An [`Environment`] runs one arena: ships built as [`Body`]s, bullets,
//! walls, and a scenario objective, all inside a
//! [`PhysicsWorld`](skirmish_physics::PhysicsWorld). It is driven either
//! directly (tests, benches) or through an [`EnvironmentActor`], which moves
//! it onto a dedicated thread and answers each command with a [`Pending`]
//! reply. [`VecEnv`] runs several actors side by side.
//!
//! Contacts reach entities through the [`Collidable`] trait, matched
//! exhaustively on [`ParentType`](skirmish_physics::ParentType).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod actor;
mod actor_thread;
pub mod batched;
pub mod body;
pub mod config;
pub mod contact;
pub mod entities;
pub mod environment;
pub mod error;
pub mod events;
pub mod metrics;
pub mod pending;
pub mod policy;
pub mod reward;
pub mod scenario;
pub mod step_info;

pub use actor::{ActorHandle, ActorState, EnvironmentActor, ShutdownReport};
pub use batched::VecEnv;
pub use body::{Body, ShotRequest};
pub use config::{BulletConfig, EnvConfig, RewardConfig};
pub use contact::{Collidable, ContactContext, ContactPartner};
pub use entities::{Bullet, BulletState, Hill, Target, Wall};
pub use environment::Environment;
pub use error::{ActorError, BodyError, ConfigError, EnvError};
pub use events::{EffectKind, SimEvent};
pub use metrics::StepMetrics;
pub use pending::Pending;
pub use policy::{Policy, RandomPolicy};
pub use reward::RewardLedger;
pub use scenario::Scenario;
pub use step_info::{BodySnapshot, EnvState, StepInfo};
