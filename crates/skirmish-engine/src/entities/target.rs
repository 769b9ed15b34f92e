//! Practice target.

use skirmish_core::{Color, RenderData, Sprite, Transform, Vec2};
use skirmish_physics::{
    ColliderDesc, ColliderShape, EntityKey, ParentType, PhysicsError, PhysicsWorld, RigidBody,
    RigidBodyDesc,
};

use crate::contact::{Collidable, ContactContext, ContactPartner};

/// Radius of the target ball.
pub const TARGET_RADIUS: f32 = 0.5;

/// A fixed ball that rewards whoever shoots it.
#[derive(Debug)]
pub struct Target {
    rigid_body: RigidBody,
}

impl Target {
    /// A target at `position`.
    pub fn new(world: &mut PhysicsWorld, position: Vec2) -> Result<Self, PhysicsError> {
        let rigid_body = RigidBody::spawn(
            world,
            &RigidBodyDesc::fixed(Transform::new(position.x, position.y, 0.0)),
            EntityKey::new(ParentType::Target, 0),
        );
        world.add_collider(
            rigid_body.handle(),
            &ColliderDesc::solid(ColliderShape::Ball(TARGET_RADIUS)),
        )?;
        Ok(Self { rigid_body })
    }

    /// Current position.
    pub fn position(&self, world: &PhysicsWorld) -> Result<Vec2, PhysicsError> {
        Ok(self.rigid_body.transform(world)?.position)
    }

    /// Move to `position`.
    pub fn place(&self, world: &mut PhysicsWorld, position: Vec2) -> Result<(), PhysicsError> {
        world.set_transform(
            self.rigid_body.handle(),
            Transform::new(position.x, position.y, 0.0),
        )
    }

    /// One sprite.
    pub fn get_render_data(&self, world: &PhysicsWorld, _lightweight: bool) -> RenderData {
        let mut data = RenderData::new();
        if let Ok(transform) = self.rigid_body.transform(world) {
            data.sprites.push(Sprite {
                texture: "target".into(),
                transform,
                scale: Vec2::new(1.0, 1.0),
                color: Color::RED,
            });
        }
        data
    }
}

impl Collidable for Target {
    fn begin_contact(&mut self, other: ContactPartner, ctx: &mut ContactContext<'_>) {
        if other.parent_type() == ParentType::Bullet {
            if let Some(owner) = other.owner {
                ctx.ledger.change_reward(owner, ctx.rewards.target_hit);
            }
        }
    }

    fn end_contact(&mut self, _other: ContactPartner, _ctx: &mut ContactContext<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewardConfig;
    use crate::reward::RewardLedger;
    use skirmish_core::BodyIndex;

    #[test]
    fn bullet_owner_is_rewarded() {
        let mut world = PhysicsWorld::new(4);
        let mut target = Target::new(&mut world, Vec2::new(4.0, 4.0)).unwrap();
        let rewards = RewardConfig::default();
        let mut ledger = RewardLedger::new(2);
        let mut ctx = ContactContext::new(&mut ledger, &rewards);
        target.begin_contact(
            ContactPartner {
                key: EntityKey::new(ParentType::Bullet, 9),
                owner: Some(BodyIndex(1)),
            },
            &mut ctx,
        );
        target.begin_contact(
            ContactPartner {
                key: EntityKey::new(ParentType::Body, 0),
                owner: None,
            },
            &mut ctx,
        );
        assert_eq!(ledger.rewards(), &[0.0, 1.0]);
    }

    #[test]
    fn place_moves_the_body() {
        let mut world = PhysicsWorld::new(4);
        let target = Target::new(&mut world, Vec2::new(4.0, 4.0)).unwrap();
        target.place(&mut world, Vec2::new(-3.0, 2.0)).unwrap();
        assert_eq!(target.position(&world).unwrap(), Vec2::new(-3.0, 2.0));
    }
}
