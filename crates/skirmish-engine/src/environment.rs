//! The synchronous environment.
//!
//! [`Environment`] owns a physics world, its ships, and the scenario's
//! static geometry, and advances them one control step at a time. It is
//! `Send` but not shared: the [`EnvironmentActor`](crate::EnvironmentActor)
//! moves it onto a dedicated thread, and tests and benches drive it
//! directly.
//!
//! # Step order
//!
//! 1. Every body acts; guns' shots become bullets.
//! 2. Bullets age; the hill scores its occupant.
//! 3. Physics advances by `dt`; contacts are dispatched and hits applied.
//! 4. Destroyed bullets are removed; removals and thruster exhaust are
//!    recorded as [`SimEvent`]s.
//! 5. Termination is checked and end-of-episode rewards granted.
//! 6. Observations and rewards are captured; rewards are zeroed.
//! 7. If the step was terminal, the episode resets before returning.

use std::time::Instant;

use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;
use skirmish_core::{BodyIndex, Color, EntityId, RenderData, Text, Vec2};
use skirmish_modules::ShipDescription;
use skirmish_physics::{ContactEvent, ContactPhase, EntityKey, ParentType, PhysicsWorld};

use crate::body::{Body, ShotRequest};
use crate::config::EnvConfig;
use crate::contact::{Collidable, ContactContext, ContactPartner};
use crate::entities::{Bullet, Hill, Target, Wall};
use crate::error::EnvError;
use crate::events::{EffectKind, SimEvent};
use crate::metrics::StepMetrics;
use crate::reward::RewardLedger;
use crate::scenario::{Scenario, HILL_POSITION, TARGET_RANGE, TARGET_START};
use crate::step_info::{BodySnapshot, EnvState, StepInfo};

/// Score bonus for destroying the opponent.
const KILL_SCORE: f32 = 100.0;

fn check_timestep(dt: f32) -> Result<(), EnvError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(EnvError::InvalidTimestep { value: dt })
    }
}

/// The scenario's scoring entity.
#[derive(Debug)]
enum Objective {
    Target(Target),
    Hill(Hill),
}

/// One arena, its ships, and the episode bookkeeping.
#[derive(Debug)]
pub struct Environment {
    config: EnvConfig,
    scenario: Scenario,
    world: PhysicsWorld,
    bodies: Vec<Body>,
    walls: Vec<Wall>,
    objective: Objective,
    bullets: IndexMap<EntityId, Bullet>,
    next_bullet: u32,
    ledger: RewardLedger,
    step_counter: u32,
    done: bool,
    victor: Option<BodyIndex>,
    elapsed_time: f32,
    rng: ChaCha8Rng,
    metrics: StepMetrics,
    events: Vec<SimEvent>,
}

// Compile-time assertion: Environment is Send so the actor can own it.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Environment>();
    }
};

impl Environment {
    /// Build an environment from validated config and one description per
    /// ship.
    pub fn new(
        config: EnvConfig,
        scenario: Scenario,
        ships: Vec<ShipDescription>,
    ) -> Result<Self, EnvError> {
        config.validate()?;
        if ships.len() != scenario.ship_count() {
            return Err(EnvError::ShipCount {
                scenario: scenario.name(),
                expected: scenario.ship_count(),
                got: ships.len(),
            });
        }

        let mut world = PhysicsWorld::new(config.solver_iterations);

        let mut bodies = Vec::with_capacity(ships.len());
        for (i, (ship, spawn)) in ships.into_iter().zip(scenario.spawns()).enumerate() {
            let index = BodyIndex(i as u32);
            let mut body = Body::new(&mut world, index, ship.name.clone(), *spawn, config.initial_hp);
            body.set_default_laser_count(config.laser_count);
            body.load_description(&mut world, ship)
                .map_err(|e| EnvError::body(index, e))?;
            bodies.push(body);
        }

        let walls = scenario
            .walls()
            .iter()
            .enumerate()
            .map(|(i, [x, y, w, h])| Wall::new(&mut world, i as u32, *x, *y, *w, *h))
            .collect::<Result<Vec<_>, _>>()?;

        let objective = match scenario {
            Scenario::Target => Objective::Target(Target::new(&mut world, TARGET_START)?),
            Scenario::KingOfTheHill => {
                Objective::Hill(Hill::new(&mut world, HILL_POSITION, bodies.len())?)
            }
        };

        tracing::debug!(
            scenario = scenario.name(),
            bodies = bodies.len(),
            seed = config.seed,
            "environment created"
        );

        Ok(Self {
            ledger: RewardLedger::new(bodies.len()),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            scenario,
            world,
            bodies,
            walls,
            objective,
            bullets: IndexMap::new(),
            next_bullet: 0,
            step_counter: 0,
            done: false,
            victor: None,
            elapsed_time: 0.0,
            metrics: StepMetrics::default(),
            events: Vec::new(),
        })
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// The configuration this environment was built with.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Which arena this is.
    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// The physics world.
    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// All ships, indexed by [`BodyIndex`].
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// One ship.
    pub fn body(&self, index: BodyIndex) -> Result<&Body, EnvError> {
        self.bodies
            .get(index.get())
            .ok_or(EnvError::UnknownBody(index))
    }

    /// One ship, mutably.
    pub fn body_mut(&mut self, index: BodyIndex) -> Result<&mut Body, EnvError> {
        self.bodies
            .get_mut(index.get())
            .ok_or(EnvError::UnknownBody(index))
    }

    /// Steps taken this episode.
    pub fn step_counter(&self) -> u32 {
        self.step_counter
    }

    /// True once the episode is over and before the next reset.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Simulated seconds since the last reset.
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    /// Episode scores.
    pub fn scores(&self) -> &[f32] {
        self.ledger.scores()
    }

    /// Rewards accumulated since the last step.
    pub fn pending_rewards(&self) -> &[f32] {
        self.ledger.rewards()
    }

    /// Number of live bullets.
    pub fn bullet_count(&self) -> usize {
        self.bullets.len()
    }

    /// Metrics from the most recent step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// Events from the latest [`forward`](Self::forward), or from a step
    /// still being assembled.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Current target position, for the target scenario.
    pub fn target_position(&self) -> Option<Vec2> {
        match &self.objective {
            Objective::Target(t) => t.position(&self.world).ok(),
            Objective::Hill(_) => None,
        }
    }

    /// The hill, for the king-of-the-hill scenario.
    pub fn hill(&self) -> Option<&Hill> {
        match &self.objective {
            Objective::Hill(h) => Some(h),
            Objective::Target(_) => None,
        }
    }

    // ── Episode control ────────────────────────────────────────────

    /// Start a new episode and return its first observations.
    pub fn reset(&mut self) -> Result<StepInfo, EnvError> {
        self.reset_episode()?;
        self.capture()
    }

    /// Advance one control step with one action vector per body.
    ///
    /// On a terminal step the returned info describes the finished
    /// episode and the environment has already been reset.
    pub fn step(&mut self, actions: &[Vec<i32>], dt: f32) -> Result<StepInfo, EnvError> {
        let started = Instant::now();
        check_timestep(dt)?;
        if actions.len() != self.bodies.len() {
            return Err(EnvError::ActionBatch {
                expected: self.bodies.len(),
                got: actions.len(),
            });
        }
        for (body, flags) in self.bodies.iter().zip(actions) {
            if flags.len() != body.input_count() {
                return Err(EnvError::body(
                    body.index(),
                    crate::error::BodyError::ActionLength {
                        expected: body.input_count(),
                        got: flags.len(),
                    },
                ));
            }
        }

        self.events.clear();
        let mut shots: SmallVec<[ShotRequest; 4]> = SmallVec::new();
        for (body, flags) in self.bodies.iter_mut().zip(actions) {
            let fired = body
                .act(&mut self.world, flags)
                .map_err(|e| EnvError::body(body.index(), e))?;
            shots.extend(fired);
        }
        let spawned = shots.len() as u32;
        for shot in shots {
            self.spawn_bullet(shot)?;
        }

        for bullet in self.bullets.values_mut() {
            bullet.update(&self.world);
        }
        if let Objective::Hill(hill) = &self.objective {
            hill.update(&mut self.ledger, &self.config.rewards);
        }

        let (physics_us, contacts) = self.advance(dt)?;

        let decided = self.check_hp();
        self.step_counter += 1;
        if self.step_counter >= self.config.max_steps {
            self.done = true;
        }
        if self.done && !decided {
            self.award_by_score();
        }

        let info = self.capture()?;
        self.ledger.clear_rewards();

        self.metrics = StepMetrics {
            total_us: started.elapsed().as_micros() as u64,
            physics_us,
            contacts_dispatched: contacts,
            bullets_live: self.bullets.len() as u32,
            bullets_spawned: spawned,
        };

        if info.done {
            tracing::debug!(
                steps = self.step_counter,
                victor = ?info.victor,
                scores = ?self.ledger.scores(),
                "episode finished"
            );
            self.reset_episode()?;
        }
        Ok(info)
    }

    /// Advance physics by `dt` without acting, scoring, or ending the
    /// episode. Used for playback frames.
    ///
    /// The frame's events replace the previous ones in
    /// [`events`](Self::events).
    pub fn forward(&mut self, dt: f32) -> Result<(), EnvError> {
        check_timestep(dt)?;
        self.events.clear();
        self.advance(dt)?;
        Ok(())
    }

    /// Add `delta` to a body's reward for the current step.
    pub fn change_reward(&mut self, body: BodyIndex, delta: f32) -> Result<(), EnvError> {
        self.body(body)?;
        self.ledger.change_reward(body, delta);
        Ok(())
    }

    /// End the episode at the next step.
    pub fn set_done(&mut self) {
        self.done = true;
    }

    // ── Snapshots ──────────────────────────────────────────────────

    /// Snapshot body poses, hit points, bullets, and scores.
    pub fn state(&self) -> Result<EnvState, EnvError> {
        let bodies = self
            .bodies
            .iter()
            .map(|body| {
                let s = body
                    .rigid_body()
                    .state(&self.world)
                    .map_err(|e| EnvError::body(body.index(), e))?;
                Ok(BodySnapshot {
                    transform: s.transform,
                    linear_velocity: s.linear_velocity,
                    angular_velocity: s.angular_velocity,
                    hp: body.hp(),
                })
            })
            .collect::<Result<Vec<_>, EnvError>>()?;
        let bullets = self
            .bullets
            .values()
            .map(|b| b.state(&self.world))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EnvState {
            bodies,
            bullets,
            scores: self.ledger.scores().to_vec(),
        })
    }

    /// Restore a snapshot taken from an environment with the same scenario
    /// and ships. Existing bullets are replaced.
    pub fn set_state(&mut self, state: &EnvState) -> Result<(), EnvError> {
        if state.bodies.len() != self.bodies.len() {
            return Err(EnvError::StateMismatch {
                reason: format!(
                    "{} bodies in state, {} in environment",
                    state.bodies.len(),
                    self.bodies.len()
                ),
            });
        }
        if let Some(b) = state
            .bullets
            .iter()
            .find(|b| b.owner.get() >= self.bodies.len())
        {
            return Err(EnvError::StateMismatch {
                reason: format!("bullet owner {} does not exist", b.owner),
            });
        }

        for (body, snapshot) in self.bodies.iter_mut().zip(&state.bodies) {
            let handle = body.rigid_body().handle();
            let index = body.index();
            self.world
                .set_transform(handle, snapshot.transform)
                .map_err(|e| EnvError::body(index, e))?;
            self.world
                .set_velocity(handle, snapshot.linear_velocity, snapshot.angular_velocity)
                .map_err(|e| EnvError::body(index, e))?;
            body.set_hp(snapshot.hp);
        }
        self.clear_bullets()?;
        for bullet in &state.bullets {
            let id = self.allocate_bullet_id();
            let restored = Bullet::restore(&mut self.world, id, bullet, &self.config.bullets)?;
            self.bullets.insert(id, restored);
        }
        self.ledger.set_scores(&state.scores);
        Ok(())
    }

    /// Everything drawable this frame.
    pub fn render_data(&self, lightweight: bool) -> Result<RenderData, EnvError> {
        let mut data = RenderData::new();
        for wall in &self.walls {
            data.append(wall.get_render_data(lightweight));
        }
        match &self.objective {
            Objective::Target(t) => data.append(t.get_render_data(&self.world, lightweight)),
            Objective::Hill(h) => data.append(h.get_render_data(&self.world, lightweight)),
        }
        for bullet in self.bullets.values() {
            data.append(bullet.get_render_data(&self.world, lightweight));
        }
        for body in &self.bodies {
            let rendered = body
                .get_render_data(&self.world, lightweight)
                .map_err(|e| EnvError::body(body.index(), e))?;
            data.append(rendered);
        }
        if !lightweight {
            data.texts.push(Text {
                text: format!("{:.1}", self.elapsed_time),
                font: "roboto-16".into(),
                position: Vec2::new(0.0, 0.0),
                scale: 0.2,
                color: Color::WHITE,
            });
        }
        Ok(data)
    }

    // ── Internals ──────────────────────────────────────────────────

    fn reset_episode(&mut self) -> Result<(), EnvError> {
        self.done = false;
        self.victor = None;
        self.elapsed_time = 0.0;
        self.step_counter = 0;
        self.ledger.reset();
        self.events.clear();
        self.clear_bullets()?;

        for (body, spawn) in self.bodies.iter_mut().zip(self.scenario.spawns()) {
            body.reset(&mut self.world, *spawn)
                .map_err(|e| EnvError::body(body.index(), e))?;
        }
        match &mut self.objective {
            Objective::Target(target) => {
                let position = Vec2::new(
                    self.rng.gen_range(-TARGET_RANGE..TARGET_RANGE),
                    self.rng.gen_range(-TARGET_RANGE..TARGET_RANGE),
                );
                target.place(&mut self.world, position)?;
            }
            Objective::Hill(hill) => hill.reset(),
        }
        tracing::trace!(scenario = self.scenario.name(), "episode reset");
        Ok(())
    }

    fn capture(&mut self) -> Result<StepInfo, EnvError> {
        let observations = self
            .bodies
            .iter_mut()
            .map(|body| {
                body.observation(&self.world)
                    .map_err(|e| EnvError::body(body.index(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StepInfo {
            observations,
            rewards: self.ledger.rewards().to_vec(),
            done: self.done,
            victor: self.victor,
            events: std::mem::take(&mut self.events),
        })
    }

    /// Step physics, dispatch contacts, apply hits, and sweep destroyed
    /// bullets. Returns physics time and the number of events dispatched.
    fn advance(&mut self, dt: f32) -> Result<(u64, u32), EnvError> {
        let started = Instant::now();
        let events = self.world.step(dt);
        let physics_us = started.elapsed().as_micros() as u64;
        self.elapsed_time += dt;

        for body in &self.bodies {
            self.world
                .reset_forces(body.rigid_body().handle())
                .map_err(|e| EnvError::body(body.index(), e))?;
        }

        let hits = self.dispatch(&events);
        for (index, damage) in hits {
            if let Some(body) = self.bodies.get_mut(index.get()) {
                body.hit(damage);
            }
        }

        let dead: SmallVec<[EntityId; 8]> = self
            .bullets
            .values()
            .filter(|b| b.is_destroyed())
            .map(Bullet::id)
            .collect();
        for id in dead {
            if let Some(bullet) = self.bullets.shift_remove(&id) {
                let transform = bullet.state(&self.world)?.transform;
                bullet.destroy(&mut self.world)?;
                self.events.push(SimEvent::EntityDestroyed {
                    entity: id,
                    time: self.elapsed_time,
                    transform,
                });
            }
        }

        let time = self.elapsed_time;
        for body in &self.bodies {
            let exhausts = body
                .firing_thrusters(&self.world)
                .map_err(|e| EnvError::body(body.index(), e))?;
            self.events.extend(exhausts.into_iter().map(|transform| {
                SimEvent::EffectTriggered {
                    effect: EffectKind::ThrusterParticles,
                    time,
                    transform,
                }
            }));
        }
        Ok((physics_us, events.len() as u32))
    }

    /// Deliver each event to both participants and return the damage to
    /// apply.
    fn dispatch(&mut self, events: &[ContactEvent]) -> Vec<(BodyIndex, f32)> {
        let Self {
            bodies,
            walls,
            objective,
            bullets,
            ledger,
            config,
            ..
        } = self;
        let mut ctx = ContactContext::new(ledger, &config.rewards);
        for event in events {
            let a = partner(bullets, event.a);
            let b = partner(bullets, event.b);
            for (receiver, other) in [(event.a, b), (event.b, a)] {
                let Some(entity) = collidable(bodies, walls, objective, bullets, receiver) else {
                    continue;
                };
                match event.phase {
                    ContactPhase::Begin => entity.begin_contact(other, &mut ctx),
                    ContactPhase::End => entity.end_contact(other, &mut ctx),
                }
            }
        }
        ctx.hits
    }

    /// Returns true if hit points decided the episode.
    fn check_hp(&mut self) -> bool {
        let dead: SmallVec<[BodyIndex; 2]> = self
            .bodies
            .iter()
            .filter(|b| b.hp() <= 0.0)
            .map(Body::index)
            .collect();
        if dead.is_empty() {
            return false;
        }
        self.done = true;
        if self.scenario != Scenario::KingOfTheHill {
            return true;
        }
        let rewards = &self.config.rewards;
        let survivors: SmallVec<[BodyIndex; 2]> = self
            .bodies
            .iter()
            .map(Body::index)
            .filter(|i| !dead.contains(i))
            .collect();
        for loser in &dead {
            self.ledger.change_reward(*loser, rewards.loss);
        }
        if let [winner] = survivors.as_slice() {
            self.ledger.change_reward(*winner, rewards.victory);
            self.ledger.add_score(*winner, KILL_SCORE);
            self.victor = Some(*winner);
        }
        true
    }

    fn award_by_score(&mut self) {
        if self.scenario != Scenario::KingOfTheHill {
            return;
        }
        let scores = self.ledger.scores().to_vec();
        let Some(best) = scores.iter().copied().reduce(f32::max) else {
            return;
        };
        let leaders = scores.iter().filter(|s| **s == best).count();
        if leaders != 1 {
            return;
        }
        let rewards = &self.config.rewards;
        for (i, score) in scores.iter().enumerate() {
            let index = BodyIndex(i as u32);
            if *score == best {
                self.ledger.change_reward(index, rewards.victory);
                self.victor = Some(index);
            } else {
                self.ledger.change_reward(index, rewards.loss);
            }
        }
    }

    fn spawn_bullet(&mut self, shot: ShotRequest) -> Result<(), EnvError> {
        let id = self.allocate_bullet_id();
        let velocity = shot.direction * self.config.bullets.speed;
        let bullet = Bullet::spawn(
            &mut self.world,
            id,
            shot.owner,
            shot.transform,
            velocity,
            &self.config.bullets,
        )?;
        tracing::trace!(id = %id, owner = %shot.owner, "bullet fired");
        self.bullets.insert(id, bullet);
        Ok(())
    }

    fn allocate_bullet_id(&mut self) -> EntityId {
        let id = EntityId(self.next_bullet);
        self.next_bullet = self.next_bullet.wrapping_add(1);
        id
    }

    fn clear_bullets(&mut self) -> Result<(), EnvError> {
        for (_, bullet) in self.bullets.drain(..) {
            bullet.destroy(&mut self.world)?;
        }
        Ok(())
    }
}

fn partner(bullets: &IndexMap<EntityId, Bullet>, key: EntityKey) -> ContactPartner {
    let owner = match key.parent_type {
        ParentType::Bullet => bullets.get(&EntityId(key.index)).map(Bullet::owner),
        _ => None,
    };
    ContactPartner { key, owner }
}

fn collidable<'a>(
    bodies: &'a mut [Body],
    walls: &'a mut [Wall],
    objective: &'a mut Objective,
    bullets: &'a mut IndexMap<EntityId, Bullet>,
    key: EntityKey,
) -> Option<&'a mut dyn Collidable> {
    let index = key.index as usize;
    match key.parent_type {
        ParentType::Body => bodies.get_mut(index).map(|b| b as &mut dyn Collidable),
        ParentType::Wall => walls.get_mut(index).map(|w| w as &mut dyn Collidable),
        ParentType::Target => match objective {
            Objective::Target(t) => Some(t),
            Objective::Hill(_) => None,
        },
        ParentType::Bullet => bullets
            .get_mut(&EntityId(key.index))
            .map(|b| b as &mut dyn Collidable),
        ParentType::Hill => match objective {
            Objective::Hill(h) => Some(h),
            Objective::Target(_) => None,
        },
    }
}
