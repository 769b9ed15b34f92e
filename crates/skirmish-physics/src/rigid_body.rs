//! Single-owner wrapper around a physics body handle.

use skirmish_core::{Transform, Vec2};

use crate::error::PhysicsError;
use crate::key::EntityKey;
use crate::world::PhysicsWorld;
use rapier2d::prelude::RigidBodyHandle;

/// How a body moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Driven by forces and contacts.
    Dynamic,
    /// Never moves.
    Fixed,
}

/// Creation parameters for a rigid body.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBodyDesc {
    /// Dynamic or fixed.
    pub kind: BodyKind,
    /// Initial placement.
    pub transform: Transform,
    /// Continuous collision detection, for fast projectiles.
    pub ccd: bool,
    /// Linear velocity damping.
    pub linear_damping: f32,
    /// Angular velocity damping.
    pub angular_damping: f32,
}

impl RigidBodyDesc {
    /// A dynamic body at `transform` with no damping.
    pub fn dynamic(transform: Transform) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            transform,
            ccd: false,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    /// A fixed body at `transform`.
    pub fn fixed(transform: Transform) -> Self {
        Self {
            kind: BodyKind::Fixed,
            ..Self::dynamic(transform)
        }
    }
}

/// Kinematic state read back from the physics engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    /// World placement.
    pub transform: Transform,
    /// Linear velocity, world frame.
    pub linear_velocity: Vec2,
    /// Angular velocity, radians per second.
    pub angular_velocity: f32,
}

/// The one owner of a physics body.
///
/// Created when an entity is placed in a world and tagged with that
/// entity's [`EntityKey`]. Not `Clone`: dropping the wrapper without
/// calling [`destroy`](RigidBody::destroy) leaks the physics body until the
/// world itself is dropped.
#[derive(Debug, PartialEq, Eq)]
pub struct RigidBody {
    handle: RigidBodyHandle,
    key: EntityKey,
}

impl RigidBody {
    /// Create the physics body and tag it with `key`.
    pub fn spawn(world: &mut PhysicsWorld, desc: &RigidBodyDesc, key: EntityKey) -> Self {
        let handle = world.create_body(desc, key);
        Self { handle, key }
    }

    /// The underlying physics handle.
    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }

    /// The owning entity's key.
    pub fn key(&self) -> EntityKey {
        self.key
    }

    /// Current placement and velocity.
    pub fn state(&self, world: &PhysicsWorld) -> Result<BodyState, PhysicsError> {
        world.body_state(self.handle)
    }

    /// Current placement.
    pub fn transform(&self, world: &PhysicsWorld) -> Result<Transform, PhysicsError> {
        Ok(world.body_state(self.handle)?.transform)
    }

    /// Remove the physics body and all its colliders.
    pub fn destroy(self, world: &mut PhysicsWorld) -> Result<(), PhysicsError> {
        world.remove_body(self.handle)
    }
}
