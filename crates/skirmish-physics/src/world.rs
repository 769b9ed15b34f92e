//! The rapier2d world and the entity-keyed API over it.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use crossbeam_channel::Receiver;
use rapier2d::geometry::DefaultBroadPhase;
use rapier2d::parry::query::{Ray, RayCast};
use rapier2d::prelude::*;
use skirmish_core::{Transform, Vec2};

use crate::error::PhysicsError;
use crate::key::EntityKey;
use crate::rigid_body::{BodyKind, BodyState, RigidBodyDesc};

// ── Collider descriptions ───────────────────────────────────────

/// Collider geometry in the owning body's frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ColliderShape {
    /// Convex hull of the given vertices.
    Polygon(Vec<Vec2>),
    /// Circle centred on the body origin.
    Ball(f32),
    /// Axis-aligned box centred on the body origin.
    Cuboid {
        /// Half width.
        hx: f32,
        /// Half height.
        hy: f32,
    },
}

/// A collider to attach to an existing body.
#[derive(Clone, Debug, PartialEq)]
pub struct ColliderDesc {
    /// Geometry.
    pub shape: ColliderShape,
    /// Mass density.
    pub density: f32,
    /// Friction coefficient.
    pub friction: f32,
    /// Sensors report overlaps but never push.
    pub sensor: bool,
}

impl ColliderDesc {
    /// A solid collider with unit density and friction.
    pub fn solid(shape: ColliderShape) -> Self {
        Self {
            shape,
            density: 1.0,
            friction: 1.0,
            sensor: false,
        }
    }

    /// An overlap-only collider.
    pub fn sensor(shape: ColliderShape) -> Self {
        Self {
            sensor: true,
            ..Self::solid(shape)
        }
    }
}

// ── Contact events ──────────────────────────────────────────────

/// Whether a pair started or stopped touching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactPhase {
    /// The pair began overlapping this step.
    Begin,
    /// The pair stopped overlapping this step, or one side was removed.
    End,
}

/// A contact between two keyed entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactEvent {
    /// Begin or end.
    pub phase: ContactPhase,
    /// First participant.
    pub a: EntityKey,
    /// Second participant.
    pub b: EntityKey,
}

// ── World ───────────────────────────────────────────────────────

/// A zero-gravity rapier2d world.
///
/// Owns every physics set plus the event channels. Bodies are addressed by
/// [`RigidBodyHandle`]; everything the world reports back is an
/// [`EntityKey`].
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    collision_rx: Receiver<CollisionEvent>,
    force_rx: Receiver<ContactForceEvent>,
    events: ChannelEventCollector,
    /// Keys of colliders removed since the last step, so the end events
    /// rapier emits for them still resolve.
    retired: HashMap<ColliderHandle, EntityKey>,
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bodies", &self.bodies.len())
            .field("colliders", &self.colliders.len())
            .field("dt", &self.params.dt)
            .finish()
    }
}

impl PhysicsWorld {
    /// Create an empty world.
    pub fn new(solver_iterations: usize) -> Self {
        let (collision_tx, collision_rx) = crossbeam_channel::unbounded();
        let (force_tx, force_rx) = crossbeam_channel::unbounded();
        let mut params = IntegrationParameters::default();
        params.num_solver_iterations =
            NonZeroUsize::new(solver_iterations).unwrap_or(NonZeroUsize::MIN);
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, 0.0],
            params,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            collision_rx,
            force_rx,
            events: ChannelEventCollector::new(collision_tx, force_tx),
            retired: HashMap::new(),
        }
    }

    /// Number of live rigid bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of live colliders.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    // ── Bodies ──────────────────────────────────────────────────

    /// Insert a body tagged with `key`. Prefer
    /// [`RigidBody::spawn`](crate::RigidBody::spawn), which keeps the handle
    /// in a single owner.
    pub fn create_body(&mut self, desc: &RigidBodyDesc, key: EntityKey) -> RigidBodyHandle {
        let builder = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
        };
        let body = builder
            .translation(vector![desc.transform.position.x, desc.transform.position.y])
            .rotation(desc.transform.rotation)
            .ccd_enabled(desc.ccd)
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .user_data(key.encode())
            .build();
        self.bodies.insert(body)
    }

    /// Remove a body and its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> Result<(), PhysicsError> {
        let attached: Vec<ColliderHandle> = self.body(handle)?.colliders().to_vec();
        self.retire(&attached);
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .map(|_| ())
            .ok_or(PhysicsError::MissingBody(handle))
    }

    /// Attach a collider to `body`. The collider inherits the body's key.
    pub fn add_collider(
        &mut self,
        body: RigidBodyHandle,
        desc: &ColliderDesc,
    ) -> Result<ColliderHandle, PhysicsError> {
        let user_data = self.body(body)?.user_data;
        let builder = match &desc.shape {
            ColliderShape::Polygon(vertices) => {
                if polygon_area(vertices) <= f32::EPSILON {
                    return Err(PhysicsError::DegenerateShape {
                        vertices: vertices.len(),
                    });
                }
                let points: Vec<Point<Real>> =
                    vertices.iter().map(|v| point![v.x, v.y]).collect();
                ColliderBuilder::convex_hull(&points).ok_or(PhysicsError::DegenerateShape {
                    vertices: vertices.len(),
                })?
            }
            ColliderShape::Ball(radius) => ColliderBuilder::ball(*radius),
            ColliderShape::Cuboid { hx, hy } => ColliderBuilder::cuboid(*hx, *hy),
        };
        let collider = builder
            .density(desc.density)
            .friction(desc.friction)
            .sensor(desc.sensor)
            .user_data(user_data)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        Ok(self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies))
    }

    /// Remove every collider from `body`, returning how many were removed.
    pub fn clear_colliders(&mut self, body: RigidBodyHandle) -> Result<usize, PhysicsError> {
        let attached: Vec<ColliderHandle> = self.body(body)?.colliders().to_vec();
        self.retire(&attached);
        for handle in &attached {
            self.colliders
                .remove(*handle, &mut self.islands, &mut self.bodies, true);
        }
        Ok(attached.len())
    }

    /// Collider handles attached to `body`.
    pub fn colliders_of(&self, body: RigidBodyHandle) -> Result<Vec<ColliderHandle>, PhysicsError> {
        Ok(self.body(body)?.colliders().to_vec())
    }

    /// Vertices of a polygon collider in its body's frame.
    pub fn collider_polygon(&self, handle: ColliderHandle) -> Option<Vec<Vec2>> {
        let collider = self.colliders.get(handle)?;
        let relative = collider
            .position_wrt_parent()
            .copied()
            .unwrap_or_else(Isometry::identity);
        let polygon = collider.shape().as_convex_polygon()?;
        Some(
            polygon
                .points()
                .iter()
                .map(|p| {
                    let q = relative * p;
                    Vec2::new(q.x, q.y)
                })
                .collect(),
        )
    }

    // ── Body access ─────────────────────────────────────────────

    /// Placement and velocity of a body.
    pub fn body_state(&self, handle: RigidBodyHandle) -> Result<BodyState, PhysicsError> {
        let body = self.body(handle)?;
        let t = body.translation();
        let v = body.linvel();
        Ok(BodyState {
            transform: Transform::new(t.x, t.y, body.rotation().angle()),
            linear_velocity: Vec2::new(v.x, v.y),
            angular_velocity: body.angvel(),
        })
    }

    /// Teleport a body.
    pub fn set_transform(
        &mut self,
        handle: RigidBodyHandle,
        transform: Transform,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        body.set_position(
            Isometry::new(
                vector![transform.position.x, transform.position.y],
                transform.rotation,
            ),
            true,
        );
        Ok(())
    }

    /// Overwrite a body's velocity.
    pub fn set_velocity(
        &mut self,
        handle: RigidBodyHandle,
        linear: Vec2,
        angular: f32,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        body.set_linvel(vector![linear.x, linear.y], true);
        body.set_angvel(angular, true);
        Ok(())
    }

    /// Clear accumulated forces and torques.
    pub fn reset_forces(&mut self, handle: RigidBodyHandle) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        body.reset_forces(true);
        body.reset_torques(true);
        Ok(())
    }

    /// Apply a world-frame force at a world-frame point until the next
    /// [`reset_forces`](Self::reset_forces).
    pub fn apply_force_at_point(
        &mut self,
        handle: RigidBodyHandle,
        force: Vec2,
        point: Vec2,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        body.add_force_at_point(vector![force.x, force.y], point![point.x, point.y], true);
        Ok(())
    }

    /// The key stored on a body.
    pub fn body_key(&self, handle: RigidBodyHandle) -> Option<EntityKey> {
        EntityKey::decode(self.bodies.get(handle)?.user_data)
    }

    // ── Stepping ────────────────────────────────────────────────

    /// Advance by `dt` seconds and return the contact transitions that
    /// happened during the step.
    ///
    /// Events whose colliders cannot be traced back to a key are dropped.
    pub fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        self.params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &self.events,
        );

        let mut out = Vec::new();
        while let Ok(event) = self.collision_rx.try_recv() {
            let a = self.resolve(event.collider1());
            let b = self.resolve(event.collider2());
            let (Some(a), Some(b)) = (a, b) else {
                tracing::warn!(?event, "dropping contact with unkeyed collider");
                continue;
            };
            let phase = if event.started() {
                ContactPhase::Begin
            } else {
                ContactPhase::End
            };
            out.push(ContactEvent { phase, a, b });
        }
        // Force events are not requested; drain in case rapier emits any.
        while self.force_rx.try_recv().is_ok() {}
        self.retired.clear();
        out
    }

    /// The key of a live or just-removed collider.
    pub fn resolve(&self, handle: ColliderHandle) -> Option<EntityKey> {
        match self.colliders.get(handle) {
            Some(c) => EntityKey::decode(c.user_data),
            None => self.retired.get(&handle).copied(),
        }
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Cast a segment from `origin` along `direction` (its full length).
    ///
    /// Returns the nearest hit as a fraction of `direction` in `[0, 1]`.
    /// Colliders on `exclude` and colliders whose key fails `filter` are
    /// skipped. Poses come from the bodies, so results are current even
    /// right after a teleport.
    pub fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        exclude: Option<RigidBodyHandle>,
        filter: impl Fn(EntityKey) -> bool,
    ) -> Option<f32> {
        let ray = Ray::new(point![origin.x, origin.y], vector![direction.x, direction.y]);
        let mut best: Option<f32> = None;
        for (_, collider) in self.colliders.iter() {
            let Some(parent) = collider.parent() else {
                continue;
            };
            if Some(parent) == exclude {
                continue;
            }
            match EntityKey::decode(collider.user_data) {
                Some(key) if filter(key) => {}
                _ => continue,
            }
            let Some(body) = self.bodies.get(parent) else {
                continue;
            };
            let relative = collider
                .position_wrt_parent()
                .copied()
                .unwrap_or_else(Isometry::identity);
            let pose = *body.position() * relative;
            if let Some(toi) = collider.shape().cast_ray(&pose, &ray, 1.0, true) {
                if best.map_or(true, |b| toi < b) {
                    best = Some(toi);
                }
            }
        }
        best
    }

    // ── Internals ───────────────────────────────────────────────

    fn body(&self, handle: RigidBodyHandle) -> Result<&rapier2d::dynamics::RigidBody, PhysicsError> {
        self.bodies
            .get(handle)
            .ok_or(PhysicsError::MissingBody(handle))
    }

    fn body_mut(
        &mut self,
        handle: RigidBodyHandle,
    ) -> Result<&mut rapier2d::dynamics::RigidBody, PhysicsError> {
        self.bodies
            .get_mut(handle)
            .ok_or(PhysicsError::MissingBody(handle))
    }

    fn retire(&mut self, handles: &[ColliderHandle]) {
        for handle in handles {
            if let Some(key) = self
                .colliders
                .get(*handle)
                .and_then(|c| EntityKey::decode(c.user_data))
            {
                self.retired.insert(*handle, key);
            }
        }
    }
}

/// Absolute shoelace area.
fn polygon_area(vertices: &[Vec2]) -> f32 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    (twice * 0.5).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ParentType;
    use crate::rigid_body::RigidBody;

    fn ball(world: &mut PhysicsWorld, key: EntityKey, x: f32, y: f32) -> RigidBody {
        let body = RigidBody::spawn(
            world,
            &RigidBodyDesc::dynamic(Transform::new(x, y, 0.0)),
            key,
        );
        world
            .add_collider(body.handle(), &ColliderDesc::solid(ColliderShape::Ball(0.5)))
            .unwrap();
        body
    }

    fn wall(world: &mut PhysicsWorld, x: f32, y: f32) -> RigidBody {
        let body = RigidBody::spawn(
            world,
            &RigidBodyDesc::fixed(Transform::new(x, y, 0.0)),
            EntityKey::new(ParentType::Wall, 0),
        );
        world
            .add_collider(
                body.handle(),
                &ColliderDesc::solid(ColliderShape::Cuboid { hx: 1.0, hy: 1.0 }),
            )
            .unwrap();
        body
    }

    #[test]
    fn moving_ball_reports_wall_contact() {
        let mut world = PhysicsWorld::new(4);
        let b = ball(&mut world, EntityKey::new(ParentType::Bullet, 7), 0.0, 0.0);
        wall(&mut world, 4.0, 0.0);
        world
            .set_velocity(b.handle(), Vec2::new(10.0, 0.0), 0.0)
            .unwrap();

        let mut begins = Vec::new();
        for _ in 0..60 {
            begins.extend(
                world
                    .step(1.0 / 60.0)
                    .into_iter()
                    .filter(|e| e.phase == ContactPhase::Begin),
            );
        }
        assert!(!begins.is_empty());
        let e = begins[0];
        let keys = [e.a.parent_type, e.b.parent_type];
        assert!(keys.contains(&ParentType::Bullet));
        assert!(keys.contains(&ParentType::Wall));
    }

    #[test]
    fn ray_hits_box_at_expected_fraction() {
        let mut world = PhysicsWorld::new(4);
        wall(&mut world, 5.0, 0.0);
        let toi = world
            .cast_ray(Vec2::ZERO, Vec2::new(10.0, 0.0), None, |_| true)
            .unwrap();
        assert!((toi - 0.4).abs() < 1e-4, "toi = {toi}");
    }

    #[test]
    fn ray_respects_filter_and_exclusion() {
        let mut world = PhysicsWorld::new(4);
        let w = wall(&mut world, 5.0, 0.0);
        assert!(world
            .cast_ray(Vec2::ZERO, Vec2::new(10.0, 0.0), None, |k| k.parent_type
                != ParentType::Wall)
            .is_none());
        assert!(world
            .cast_ray(Vec2::ZERO, Vec2::new(10.0, 0.0), Some(w.handle()), |_| true)
            .is_none());
        assert!(world
            .cast_ray(Vec2::ZERO, Vec2::new(3.0, 0.0), None, |_| true)
            .is_none());
    }

    #[test]
    fn ray_sees_teleported_body() {
        let mut world = PhysicsWorld::new(4);
        let w = wall(&mut world, 5.0, 0.0);
        world
            .set_transform(w.handle(), Transform::new(0.0, 5.0, 0.0))
            .unwrap();
        assert!(world
            .cast_ray(Vec2::ZERO, Vec2::new(10.0, 0.0), None, |_| true)
            .is_none());
        assert!(world
            .cast_ray(Vec2::ZERO, Vec2::new(0.0, 10.0), None, |_| true)
            .is_some());
    }

    #[test]
    fn degenerate_polygon_is_rejected() {
        let mut world = PhysicsWorld::new(4);
        let b = ball(&mut world, EntityKey::new(ParentType::Body, 0), 0.0, 0.0);
        let line = ColliderShape::Polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
        ]);
        assert_eq!(
            world.add_collider(b.handle(), &ColliderDesc::solid(line)),
            Err(PhysicsError::DegenerateShape { vertices: 3 })
        );
    }

    #[test]
    fn polygon_readback_is_body_local() {
        let mut world = PhysicsWorld::new(4);
        let body = RigidBody::spawn(
            &mut world,
            &RigidBodyDesc::dynamic(Transform::new(3.0, 3.0, 1.0)),
            EntityKey::new(ParentType::Body, 0),
        );
        let square = vec![
            Vec2::new(-0.5, -0.5),
            Vec2::new(0.5, -0.5),
            Vec2::new(0.5, 0.5),
            Vec2::new(-0.5, 0.5),
        ];
        let h = world
            .add_collider(body.handle(), &ColliderDesc::solid(ColliderShape::Polygon(square)))
            .unwrap();
        let points = world.collider_polygon(h).unwrap();
        assert_eq!(points.len(), 4);
        assert!(points
            .iter()
            .all(|p| (p.x.abs() - 0.5).abs() < 1e-4 && (p.y.abs() - 0.5).abs() < 1e-4));
    }

    #[test]
    fn removal_clears_body_and_colliders() {
        let mut world = PhysicsWorld::new(4);
        let b = ball(&mut world, EntityKey::new(ParentType::Bullet, 1), 0.0, 0.0);
        let handle = b.handle();
        assert_eq!(world.collider_count(), 1);
        b.destroy(&mut world).unwrap();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert_eq!(
            world.body_state(handle),
            Err(PhysicsError::MissingBody(handle))
        );
        // Any end events for the removed collider must still resolve.
        for event in world.step(1.0 / 60.0) {
            assert_eq!(event.phase, ContactPhase::End);
        }
    }

    #[test]
    fn clear_colliders_counts() {
        let mut world = PhysicsWorld::new(4);
        let b = ball(&mut world, EntityKey::new(ParentType::Body, 2), 0.0, 0.0);
        world
            .add_collider(b.handle(), &ColliderDesc::solid(ColliderShape::Ball(0.2)))
            .unwrap();
        assert_eq!(world.clear_colliders(b.handle()).unwrap(), 2);
        assert!(world.colliders_of(b.handle()).unwrap().is_empty());
        assert_eq!(world.body_key(b.handle()), Some(EntityKey::new(ParentType::Body, 2)));
    }
}
