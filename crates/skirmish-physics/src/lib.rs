//! Physics for Skirmish.
//!
//! [`PhysicsWorld`] wraps a rapier2d pipeline behind a small API expressed
//! in [`skirmish_core`] types. Every rigid body and collider carries an
//! [`EntityKey`] in its `user_data` slot; contact events and ray hits are
//! reported as keys, never as raw physics handles, so the engine can
//! dispatch them by [`ParentType`] without touching rapier types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod key;
pub mod rigid_body;
pub mod world;

pub use error::PhysicsError;
pub use key::{EntityKey, ParentType};
pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};
pub use rigid_body::{BodyKind, BodyState, RigidBody, RigidBodyDesc};
pub use world::{ColliderDesc, ColliderShape, ContactEvent, ContactPhase, PhysicsWorld};
