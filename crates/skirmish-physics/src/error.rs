//! Physics error type.

use rapier2d::prelude::RigidBodyHandle;
use thiserror::Error;

/// A physics operation hit a broken invariant.
///
/// These indicate programming errors (an entity outliving its body, a
/// module with a degenerate outline) rather than simulation events.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// The rigid body was removed or never existed.
    #[error("no rigid body for handle {0:?}")]
    MissingBody(RigidBodyHandle),
    /// A polygon had no convex hull with positive area.
    #[error("degenerate collider shape with {vertices} vertices")]
    DegenerateShape {
        /// Number of input vertices.
        vertices: usize,
    },
}
