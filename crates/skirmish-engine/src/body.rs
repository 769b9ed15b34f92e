//! Ships: a module graph welded onto one rigid body.
//!
//! A [`Body`] owns its [`ModuleGraph`], the physics body the modules'
//! shapes are attached to, the flattened action list, and its hit points.
//! Every topology change rebuilds both the colliders
//! ([`update_body`](Body::update_body)) and the action list
//! ([`register_actions`](Body::register_actions)), so the two can never
//! drift from the graph.

use smallvec::SmallVec;
use skirmish_core::{
    BodyIndex, Color, Line, ModuleId, Particle, RenderData, Sprite, Text, Transform, Vec2,
};
use skirmish_modules::{
    ActionEffect, ActionRef, ModuleGraph, ModuleKind, ShipDescription, SCHEMA_VERSION,
};
use skirmish_physics::{
    ColliderDesc, ColliderShape, EntityKey, ParentType, PhysicsWorld, RigidBody, RigidBodyDesc,
};

use crate::contact::{Collidable, ContactContext, ContactPartner};
use crate::error::BodyError;

/// A projectile a gun asked to spawn this step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotRequest {
    /// Body that fired.
    pub owner: BodyIndex,
    /// Muzzle placement in world space.
    pub transform: Transform,
    /// Unit firing direction in world space.
    pub direction: Vec2,
}

/// A ship.
#[derive(Debug)]
pub struct Body {
    index: BodyIndex,
    name: String,
    graph: ModuleGraph,
    actions: Vec<ActionRef>,
    rigid_body: RigidBody,
    hp: f32,
    initial_hp: f32,
    default_laser_count: u32,
}

impl Body {
    /// An empty ship at `spawn`.
    pub fn new(
        world: &mut PhysicsWorld,
        index: BodyIndex,
        name: impl Into<String>,
        spawn: Transform,
        initial_hp: f32,
    ) -> Self {
        let rigid_body = RigidBody::spawn(
            world,
            &RigidBodyDesc::dynamic(spawn),
            EntityKey::new(ParentType::Body, index.0),
        );
        Self {
            index,
            name: name.into(),
            graph: ModuleGraph::new(),
            actions: Vec::new(),
            rigid_body,
            hp: initial_hp,
            initial_hp,
            default_laser_count: skirmish_modules::kind::DEFAULT_LASER_COUNT,
        }
    }

    /// A ship built from an existing graph.
    pub fn with_graph(
        world: &mut PhysicsWorld,
        index: BodyIndex,
        name: impl Into<String>,
        graph: ModuleGraph,
        spawn: Transform,
        initial_hp: f32,
    ) -> Result<Self, BodyError> {
        let mut body = Self::new(world, index, name, spawn, initial_hp);
        body.graph = graph;
        body.update_body(world)?;
        body.register_actions();
        Ok(body)
    }

    /// Ray count for sensors a loaded description leaves unspecified.
    pub fn set_default_laser_count(&mut self, count: u32) {
        self.default_laser_count = count;
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Position in the environment's body list.
    pub fn index(&self) -> BodyIndex {
        self.index
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module graph.
    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    /// Flattened actions, in module order.
    pub fn actions(&self) -> &[ActionRef] {
        &self.actions
    }

    /// The physics body.
    pub fn rigid_body(&self) -> &RigidBody {
        &self.rigid_body
    }

    /// Remaining hit points.
    pub fn hp(&self) -> f32 {
        self.hp
    }

    /// Hit points restored by [`reset`](Self::reset).
    pub fn initial_hp(&self) -> f32 {
        self.initial_hp
    }

    /// Length of the action vector [`act`](Self::act) expects.
    pub fn input_count(&self) -> usize {
        self.actions.iter().map(ActionRef::flag_count).sum()
    }

    /// Length of the vector [`observation`](Self::observation) returns.
    pub fn observation_count(&self) -> usize {
        self.graph.observation_count()
    }

    // ── Composition ────────────────────────────────────────────────

    /// Add an unlinked module.
    pub fn add_module(
        &mut self,
        world: &mut PhysicsWorld,
        kind: ModuleKind,
    ) -> Result<ModuleId, BodyError> {
        let id = self.graph.add(kind);
        self.rebuild(world)?;
        Ok(id)
    }

    /// Add a module and link it under `parent`.
    pub fn attach(
        &mut self,
        world: &mut PhysicsWorld,
        parent: ModuleId,
        parent_link: usize,
        kind: ModuleKind,
        child_link: usize,
    ) -> Result<ModuleId, BodyError> {
        let id = self.graph.attach(parent, parent_link, kind, child_link)?;
        self.rebuild(world)?;
        Ok(id)
    }

    /// Link two modules already in the body.
    pub fn link_modules(
        &mut self,
        world: &mut PhysicsWorld,
        parent: ModuleId,
        parent_link: usize,
        child: ModuleId,
        child_link: usize,
    ) -> Result<(), BodyError> {
        self.graph.link(parent, parent_link, child, child_link)?;
        self.rebuild(world)
    }

    /// Detach a leaf module from its parent and drop it from the body.
    pub fn unlink_module(
        &mut self,
        world: &mut PhysicsWorld,
        id: ModuleId,
    ) -> Result<(), BodyError> {
        self.graph.unlink(id)?;
        self.graph.remove(id)?;
        self.rebuild(world)
    }

    /// Replace every collider with one per module shape.
    pub fn update_body(&mut self, world: &mut PhysicsWorld) -> Result<(), BodyError> {
        let handle = self.rigid_body.handle();
        world.clear_colliders(handle)?;
        for (_, module) in self.graph.iter() {
            for shape in module.body_shapes() {
                world.add_collider(handle, &ColliderDesc::solid(ColliderShape::Polygon(shape)))?;
            }
        }
        Ok(())
    }

    /// Rebuild the flattened action list from the graph.
    pub fn register_actions(&mut self) {
        self.actions = self.graph.action_refs();
    }

    fn rebuild(&mut self, world: &mut PhysicsWorld) -> Result<(), BodyError> {
        self.register_actions();
        self.update_body(world)
    }

    // ── Control ────────────────────────────────────────────────────

    /// Run one control step.
    ///
    /// Updates every module, clears accumulated forces, then feeds each
    /// action its slice of `flags`. Thrust is applied immediately; shots
    /// are returned for the environment to spawn.
    pub fn act(
        &mut self,
        world: &mut PhysicsWorld,
        flags: &[i32],
    ) -> Result<SmallVec<[ShotRequest; 2]>, BodyError> {
        let expected = self.input_count();
        if flags.len() != expected {
            return Err(BodyError::ActionLength {
                expected,
                got: flags.len(),
            });
        }
        let handle = self.rigid_body.handle();
        let body_transform = self.rigid_body.transform(world)?;

        for (_, module) in self.graph.iter_mut() {
            module.update();
        }
        world.reset_forces(handle)?;

        let mut shots = SmallVec::new();
        let mut offset = 0;
        for action in &self.actions {
            let chunk = &flags[offset..offset + action.flag_count()];
            offset += action.flag_count();
            let Some(module) = self.graph.get_mut(action.module) else {
                continue;
            };
            let module_world = body_transform.compose(module.transform());
            match module.act(action.action, chunk) {
                ActionEffect::None => {}
                ActionEffect::Thrust { force, point } => {
                    world.apply_force_at_point(
                        handle,
                        module_world.apply_vector(force),
                        module_world.apply(point),
                    )?;
                }
                ActionEffect::Fire { muzzle, direction } => {
                    shots.push(ShotRequest {
                        owner: self.index,
                        transform: Transform {
                            position: module_world.apply(muzzle),
                            rotation: module_world.rotation,
                        },
                        direction: module_world.apply_vector(direction),
                    });
                }
            }
        }
        Ok(shots)
    }

    /// Concatenated sensor readings, in ship order.
    ///
    /// Laser sensors cast their rays now and keep the readings for
    /// rendering.
    pub fn observation(&mut self, world: &PhysicsWorld) -> Result<Vec<f32>, BodyError> {
        let handle = self.rigid_body.handle();
        let state = self.rigid_body.state(world)?;
        let mut out = Vec::with_capacity(self.observation_count());
        for id in self.graph.ship_order() {
            let Some(module) = self.graph.get_mut(id) else {
                continue;
            };
            let module_world = state.transform.compose(module.transform());
            match module.kind_mut() {
                ModuleKind::Base => {
                    let local = state.linear_velocity.rotated(-state.transform.rotation);
                    out.extend([local.x, local.y, state.angular_velocity]);
                }
                ModuleKind::LaserSensor(sensor) => {
                    let readings: Vec<f32> = sensor
                        .rays()
                        .map(|ray| {
                            world
                                .cast_ray(
                                    module_world.position,
                                    module_world.apply_vector(ray),
                                    Some(handle),
                                    |key| {
                                        !matches!(
                                            key.parent_type,
                                            ParentType::Bullet | ParentType::Hill
                                        )
                                    },
                                )
                                .unwrap_or(1.0)
                        })
                        .collect();
                    out.extend_from_slice(&readings);
                    sensor.readings = readings;
                }
                ModuleKind::Gun(_) | ModuleKind::Thruster(_) | ModuleKind::SquareHull => {}
            }
        }
        Ok(out)
    }

    /// World placement of every thruster that fired this step.
    pub fn firing_thrusters(
        &self,
        world: &PhysicsWorld,
    ) -> Result<SmallVec<[Transform; 4]>, BodyError> {
        let body_transform = self.rigid_body.transform(world)?;
        Ok(self
            .graph
            .iter()
            .filter(|(_, m)| matches!(m.kind(), ModuleKind::Thruster(t) if t.active))
            .map(|(_, m)| body_transform.compose(m.transform()))
            .collect())
    }

    // ── State ──────────────────────────────────────────────────────

    /// Take `damage` hit points.
    pub fn hit(&mut self, damage: f32) {
        self.hp -= damage;
    }

    /// Overwrite hit points.
    pub fn set_hp(&mut self, hp: f32) {
        self.hp = hp;
    }

    /// Move to `spawn` at rest with full hit points.
    pub fn reset(&mut self, world: &mut PhysicsWorld, spawn: Transform) -> Result<(), BodyError> {
        let handle = self.rigid_body.handle();
        world.set_transform(handle, spawn)?;
        world.set_velocity(handle, Vec2::ZERO, 0.0)?;
        world.reset_forces(handle)?;
        self.hp = self.initial_hp;
        Ok(())
    }

    // ── Serialization ──────────────────────────────────────────────

    /// Describe the ship.
    pub fn to_description(&self) -> ShipDescription {
        ShipDescription {
            schema: SCHEMA_VERSION.to_owned(),
            name: self.name.clone(),
            base_module: self.graph.to_node(),
            num_observations: Some(self.observation_count()),
            num_actions: Some(self.input_count()),
        }
    }

    /// Describe the ship as pretty JSON.
    pub fn to_json(&self) -> Result<String, BodyError> {
        Ok(self.to_description().to_json_string()?)
    }

    /// Replace the ship's modules with those in a JSON description.
    ///
    /// On error the body is left as it was.
    pub fn load_json(&mut self, world: &mut PhysicsWorld, text: &str) -> Result<(), BodyError> {
        let description = ShipDescription::from_json_str(text)?;
        self.load_description(world, description)
    }

    /// Replace the ship's modules with those in `description`.
    ///
    /// The graph is fully built before anything is swapped in; colliders
    /// and actions are rebuilt once at the end.
    pub fn load_description(
        &mut self,
        world: &mut PhysicsWorld,
        mut description: ShipDescription,
    ) -> Result<(), BodyError> {
        let graph = match description.base_module.as_mut() {
            Some(node) => {
                node.fill_laser_count(self.default_laser_count);
                ModuleGraph::from_node(node)?
            }
            None => ModuleGraph::new(),
        };
        let old_graph = std::mem::replace(&mut self.graph, graph);
        if let Err(e) = self.update_body(world) {
            self.graph = old_graph;
            if let Err(restore) = self.update_body(world) {
                tracing::warn!(body = %self.index, error = %restore, "could not restore colliders");
            }
            return Err(e);
        }
        self.name = description.name;
        self.register_actions();
        tracing::debug!(
            body = %self.index,
            name = %self.name,
            modules = self.graph.len(),
            inputs = self.input_count(),
            "ship loaded"
        );
        Ok(())
    }

    // ── Rendering ──────────────────────────────────────────────────

    /// Module sprites, plus exhaust, laser lines, and an hp label unless
    /// `lightweight`.
    pub fn get_render_data(
        &self,
        world: &PhysicsWorld,
        lightweight: bool,
    ) -> Result<RenderData, BodyError> {
        let body_transform = self.rigid_body.transform(world)?;
        let mut data = RenderData::new();
        for (_, module) in self.graph.iter() {
            let module_world = body_transform.compose(module.transform());
            data.sprites.push(Sprite {
                texture: module.module_type().as_str().to_owned(),
                transform: module_world,
                scale: Vec2::new(1.0, 1.0),
                color: Color::WHITE,
            });
            if lightweight {
                continue;
            }
            match module.kind() {
                ModuleKind::Thruster(t) if t.active => {
                    data.particles.push(Particle {
                        position: module_world.position,
                        velocity: module_world.apply_vector(Vec2::new(0.0, -5.0)),
                        size: 0.05,
                        lifetime: 0.5,
                        color: Color::YELLOW,
                    });
                }
                ModuleKind::LaserSensor(sensor) => {
                    for (ray, reading) in sensor.rays().zip(&sensor.readings) {
                        let end = module_world.position + module_world.apply_vector(ray) * *reading;
                        data.lines.push(Line {
                            points: vec![module_world.position, end],
                            widths: vec![0.02, 0.02],
                            colors: vec![Color::RED.with_alpha(0.3), Color::RED.with_alpha(0.0)],
                        });
                    }
                }
                _ => {}
            }
        }
        if !lightweight {
            data.texts.push(Text {
                text: format!("{}", self.hp),
                font: "roboto-16".into(),
                position: body_transform.position,
                scale: 0.1,
                color: Color::WHITE,
            });
        }
        Ok(data)
    }
}

impl Collidable for Body {
    fn begin_contact(&mut self, _other: ContactPartner, _ctx: &mut ContactContext<'_>) {}
    fn end_contact(&mut self, _other: ContactPartner, _ctx: &mut ContactContext<'_>) {}
}
