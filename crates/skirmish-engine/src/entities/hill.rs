//! King-of-the-hill capture zone.

use skirmish_core::{BodyIndex, Color, RenderData, Sprite, Transform, Vec2};
use skirmish_physics::{
    ColliderDesc, ColliderShape, EntityKey, ParentType, PhysicsError, PhysicsWorld, RigidBody,
    RigidBodyDesc,
};

use crate::config::RewardConfig;
use crate::contact::{Collidable, ContactContext, ContactPartner};
use crate::reward::RewardLedger;

/// Radius of the capture zone.
pub const HILL_RADIUS: f32 = 3.0;

/// A fixed sensor disc that tracks which bodies are inside it.
///
/// Ships are made of many colliders, so occupancy is a per-body count of
/// overlapping colliders rather than a flag.
#[derive(Debug)]
pub struct Hill {
    rigid_body: RigidBody,
    occupants: Vec<u32>,
}

impl Hill {
    /// A hill at `position` that tracks `bodies` bodies.
    pub fn new(
        world: &mut PhysicsWorld,
        position: Vec2,
        bodies: usize,
    ) -> Result<Self, PhysicsError> {
        let rigid_body = RigidBody::spawn(
            world,
            &RigidBodyDesc::fixed(Transform::new(position.x, position.y, 0.0)),
            EntityKey::new(ParentType::Hill, 0),
        );
        world.add_collider(
            rigid_body.handle(),
            &ColliderDesc::sensor(ColliderShape::Ball(HILL_RADIUS)),
        )?;
        Ok(Self {
            rigid_body,
            occupants: vec![0; bodies],
        })
    }

    /// Number of colliders `body` has inside the hill.
    pub fn occupancy(&self, body: BodyIndex) -> u32 {
        self.occupants.get(body.get()).copied().unwrap_or(0)
    }

    /// The sole occupant, if exactly one body is inside.
    pub fn holder(&self) -> Option<BodyIndex> {
        let mut inside = self
            .occupants
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(i, _)| BodyIndex(i as u32));
        match (inside.next(), inside.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Per-step scoring. The sole occupant gains the hill reward and a
    /// point; everyone else takes the enemy-hill punishment.
    pub fn update(&self, ledger: &mut RewardLedger, rewards: &RewardConfig) -> Option<BodyIndex> {
        let holder = self.holder()?;
        for i in 0..self.occupants.len() {
            let body = BodyIndex(i as u32);
            if body == holder {
                ledger.change_reward(body, rewards.hill_tick);
                ledger.add_score(body, 1.0);
            } else {
                ledger.change_reward(body, rewards.enemy_hill_tick);
            }
        }
        Some(holder)
    }

    /// Forget all occupants.
    pub fn reset(&mut self) {
        self.occupants.iter_mut().for_each(|c| *c = 0);
    }

    /// One large translucent sprite.
    pub fn get_render_data(&self, world: &PhysicsWorld, _lightweight: bool) -> RenderData {
        let mut data = RenderData::new();
        if let Ok(transform) = self.rigid_body.transform(world) {
            data.sprites.push(Sprite {
                texture: "target".into(),
                transform,
                scale: Vec2::new(HILL_RADIUS * 2.0, HILL_RADIUS * 2.0),
                color: Color::GREEN.with_alpha(0.5),
            });
        }
        data
    }
}

impl Collidable for Hill {
    fn begin_contact(&mut self, other: ContactPartner, _ctx: &mut ContactContext<'_>) {
        if let Some(count) = other.as_body().and_then(|b| self.occupants.get_mut(b.get())) {
            *count += 1;
        }
    }

    fn end_contact(&mut self, other: ContactPartner, _ctx: &mut ContactContext<'_>) {
        if let Some(count) = other.as_body().and_then(|b| self.occupants.get_mut(b.get())) {
            *count = count.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(i: u32) -> ContactPartner {
        ContactPartner {
            key: EntityKey::new(ParentType::Body, i),
            owner: None,
        }
    }

    #[test]
    fn sole_occupant_scores() {
        let mut world = PhysicsWorld::new(4);
        let mut hill = Hill::new(&mut world, Vec2::ZERO, 2).unwrap();
        let rewards = RewardConfig::default();
        let mut ledger = RewardLedger::new(2);
        {
            let mut ctx = ContactContext::new(&mut ledger, &rewards);
            hill.begin_contact(body(0), &mut ctx);
            hill.begin_contact(body(0), &mut ctx);
        }
        assert_eq!(hill.occupancy(BodyIndex(0)), 2);
        assert_eq!(hill.update(&mut ledger, &rewards), Some(BodyIndex(0)));
        assert_eq!(ledger.rewards(), &[0.1, -0.1]);
        assert_eq!(ledger.scores(), &[1.0, 0.0]);
    }

    #[test]
    fn contested_hill_scores_nobody() {
        let mut world = PhysicsWorld::new(4);
        let mut hill = Hill::new(&mut world, Vec2::ZERO, 2).unwrap();
        let rewards = RewardConfig::default();
        let mut ledger = RewardLedger::new(2);
        {
            let mut ctx = ContactContext::new(&mut ledger, &rewards);
            hill.begin_contact(body(0), &mut ctx);
            hill.begin_contact(body(1), &mut ctx);
        }
        assert_eq!(hill.update(&mut ledger, &rewards), None);
        assert_eq!(ledger.rewards(), &[0.0, 0.0]);
    }

    #[test]
    fn end_contact_saturates_and_reset_clears() {
        let mut world = PhysicsWorld::new(4);
        let mut hill = Hill::new(&mut world, Vec2::ZERO, 1).unwrap();
        let rewards = RewardConfig::default();
        let mut ledger = RewardLedger::new(1);
        let mut ctx = ContactContext::new(&mut ledger, &rewards);
        hill.end_contact(body(0), &mut ctx);
        assert_eq!(hill.occupancy(BodyIndex(0)), 0);
        hill.begin_contact(body(0), &mut ctx);
        // Bullets and unknown bodies do not count.
        hill.begin_contact(
            ContactPartner {
                key: EntityKey::new(ParentType::Bullet, 0),
                owner: Some(BodyIndex(0)),
            },
            &mut ctx,
        );
        hill.begin_contact(body(7), &mut ctx);
        assert_eq!(hill.occupancy(BodyIndex(0)), 1);
        hill.reset();
        assert_eq!(hill.holder(), None);
    }
}
