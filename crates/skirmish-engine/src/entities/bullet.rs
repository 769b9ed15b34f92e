//! Projectiles.

use serde::{Deserialize, Serialize};
use skirmish_core::{BodyIndex, Color, EntityId, Line, RenderData, Sprite, Transform, Vec2};
use skirmish_physics::{
    ColliderDesc, ColliderShape, EntityKey, ParentType, PhysicsError, PhysicsWorld, RigidBody,
    RigidBodyDesc,
};

use crate::config::BulletConfig;
use crate::contact::{Collidable, ContactContext, ContactPartner};

/// Serializable bullet snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulletState {
    /// Body that fired it.
    pub owner: BodyIndex,
    /// World placement.
    pub transform: Transform,
    /// World velocity.
    pub velocity: Vec2,
    /// Steps left.
    pub life: u32,
}

/// A fast ball fired by a gun.
///
/// Lives for a fixed number of steps or until it touches anything other
/// than the hill. Destruction is deferred: contacts only set a flag and the
/// environment removes flagged bullets after dispatch.
#[derive(Debug)]
pub struct Bullet {
    id: EntityId,
    owner: BodyIndex,
    rigid_body: RigidBody,
    life: u32,
    destroyed: bool,
    last_position: Option<Vec2>,
}

impl Bullet {
    /// Create a bullet at `transform` moving with `velocity`.
    pub fn spawn(
        world: &mut PhysicsWorld,
        id: EntityId,
        owner: BodyIndex,
        transform: Transform,
        velocity: Vec2,
        config: &BulletConfig,
    ) -> Result<Self, PhysicsError> {
        let desc = RigidBodyDesc {
            ccd: true,
            ..RigidBodyDesc::dynamic(transform)
        };
        let rigid_body = RigidBody::spawn(world, &desc, EntityKey::new(ParentType::Bullet, id.0));
        world.add_collider(
            rigid_body.handle(),
            &ColliderDesc::solid(ColliderShape::Ball(config.radius)),
        )?;
        world.set_velocity(rigid_body.handle(), velocity, 0.0)?;
        Ok(Self {
            id,
            owner,
            rigid_body,
            life: config.life,
            destroyed: false,
            last_position: None,
        })
    }

    /// Recreate a bullet from a snapshot.
    pub fn restore(
        world: &mut PhysicsWorld,
        id: EntityId,
        state: &BulletState,
        config: &BulletConfig,
    ) -> Result<Self, PhysicsError> {
        let mut bullet = Self::spawn(world, id, state.owner, state.transform, state.velocity, config)?;
        bullet.life = state.life;
        Ok(bullet)
    }

    /// Entity id, also the key index.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Body that fired it.
    pub fn owner(&self) -> BodyIndex {
        self.owner
    }

    /// Steps left.
    pub fn life(&self) -> u32 {
        self.life
    }

    /// True once the bullet hit something or ran out of life.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Age by one step.
    pub fn update(&mut self, world: &PhysicsWorld) {
        self.last_position = self.rigid_body.transform(world).ok().map(|t| t.position);
        self.life = self.life.saturating_sub(1);
        self.destroyed |= self.life == 0;
    }

    /// Snapshot for [`EnvState`](crate::EnvState).
    pub fn state(&self, world: &PhysicsWorld) -> Result<BulletState, PhysicsError> {
        let s = self.rigid_body.state(world)?;
        Ok(BulletState {
            owner: self.owner,
            transform: s.transform,
            velocity: s.linear_velocity,
            life: self.life,
        })
    }

    /// Remove from the physics world.
    pub fn destroy(self, world: &mut PhysicsWorld) -> Result<(), PhysicsError> {
        tracing::trace!(id = %self.id, owner = %self.owner, "bullet removed");
        self.rigid_body.destroy(world)
    }

    /// Sprite plus a short trail.
    pub fn get_render_data(&self, world: &PhysicsWorld, lightweight: bool) -> RenderData {
        let mut data = RenderData::new();
        let Ok(transform) = self.rigid_body.transform(world) else {
            return data;
        };
        data.sprites.push(Sprite {
            texture: "bullet".into(),
            transform,
            scale: Vec2::new(0.2, 0.2),
            color: Color::WHITE,
        });
        if let (false, Some(last)) = (lightweight, self.last_position) {
            data.lines.push(Line {
                points: vec![transform.position, last],
                widths: vec![0.1, 0.0],
                colors: vec![Color::WHITE, Color::WHITE.with_alpha(0.0)],
            });
        }
        data
    }
}

impl Collidable for Bullet {
    fn begin_contact(&mut self, other: ContactPartner, ctx: &mut ContactContext<'_>) {
        if other.parent_type() == ParentType::Hill || self.destroyed {
            return;
        }
        if let Some(target) = other.as_body().filter(|b| *b != self.owner) {
            ctx.ledger.change_reward(self.owner, ctx.rewards.hit_enemy);
            ctx.ledger.change_reward(target, ctx.rewards.hit_self);
            ctx.hits.push((target, 1.0));
        }
        self.destroyed = true;
    }

    fn end_contact(&mut self, _other: ContactPartner, _ctx: &mut ContactContext<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewardConfig;
    use crate::reward::RewardLedger;

    fn bullet(world: &mut PhysicsWorld) -> Bullet {
        Bullet::spawn(
            world,
            EntityId(3),
            BodyIndex(0),
            Transform::IDENTITY,
            Vec2::new(0.0, 20.0),
            &BulletConfig::default(),
        )
        .unwrap()
    }

    fn partner(parent_type: ParentType, index: u32) -> ContactPartner {
        ContactPartner {
            key: EntityKey::new(parent_type, index),
            owner: None,
        }
    }

    #[test]
    fn hitting_enemy_rewards_owner_and_damages_target() {
        let mut world = PhysicsWorld::new(4);
        let mut b = bullet(&mut world);
        let rewards = RewardConfig::default();
        let mut ledger = RewardLedger::new(2);
        let mut ctx = ContactContext::new(&mut ledger, &rewards);

        b.begin_contact(partner(ParentType::Body, 1), &mut ctx);
        // A second collider of the same ship in the same step changes nothing.
        b.begin_contact(partner(ParentType::Body, 1), &mut ctx);
        assert!(b.is_destroyed());
        assert_eq!(ctx.hits, vec![(BodyIndex(1), 1.0)]);
        assert_eq!(ledger.rewards(), &[1.0, -1.0]);
    }

    #[test]
    fn hill_is_ignored_and_walls_destroy() {
        let mut world = PhysicsWorld::new(4);
        let mut b = bullet(&mut world);
        let rewards = RewardConfig::default();
        let mut ledger = RewardLedger::new(1);
        let mut ctx = ContactContext::new(&mut ledger, &rewards);

        b.begin_contact(partner(ParentType::Hill, 0), &mut ctx);
        assert!(!b.is_destroyed());
        b.begin_contact(partner(ParentType::Wall, 2), &mut ctx);
        assert!(b.is_destroyed());
        assert!(ctx.hits.is_empty());
    }

    #[test]
    fn own_body_gives_no_reward() {
        let mut world = PhysicsWorld::new(4);
        let mut b = bullet(&mut world);
        let rewards = RewardConfig::default();
        let mut ledger = RewardLedger::new(1);
        let mut ctx = ContactContext::new(&mut ledger, &rewards);
        b.begin_contact(partner(ParentType::Body, 0), &mut ctx);
        assert!(b.is_destroyed());
        assert!(ctx.hits.is_empty());
        assert_eq!(ledger.rewards(), &[0.0]);
    }

    #[test]
    fn life_runs_out() {
        let mut world = PhysicsWorld::new(4);
        let mut b = bullet(&mut world);
        for _ in 0..9 {
            b.update(&world);
        }
        assert!(!b.is_destroyed());
        b.update(&world);
        assert!(b.is_destroyed());
        b.destroy(&mut world).unwrap();
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn spawned_with_velocity() {
        let mut world = PhysicsWorld::new(4);
        let b = bullet(&mut world);
        let state = b.state(&world).unwrap();
        assert_eq!(state.velocity, Vec2::new(0.0, 20.0));
        assert_eq!(state.life, 10);
    }
}
