//! Static arena walls.

use skirmish_core::{Color, RenderData, Sprite, Transform, Vec2};
use skirmish_physics::{
    ColliderDesc, ColliderShape, EntityKey, ParentType, PhysicsError, PhysicsWorld, RigidBody,
    RigidBodyDesc,
};

use crate::contact::{Collidable, ContactContext, ContactPartner};

/// An axis-aligned fixed box.
#[derive(Debug)]
pub struct Wall {
    rigid_body: RigidBody,
    center: Vec2,
    size: Vec2,
}

impl Wall {
    /// A wall whose bottom-left corner is `(x, y)`.
    pub fn new(
        world: &mut PhysicsWorld,
        index: u32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<Self, PhysicsError> {
        let center = Vec2::new(x + width / 2.0, y + height / 2.0);
        let rigid_body = RigidBody::spawn(
            world,
            &RigidBodyDesc::fixed(Transform::new(center.x, center.y, 0.0)),
            EntityKey::new(ParentType::Wall, index),
        );
        world.add_collider(
            rigid_body.handle(),
            &ColliderDesc::solid(ColliderShape::Cuboid {
                hx: width / 2.0,
                hy: height / 2.0,
            }),
        )?;
        Ok(Self {
            rigid_body,
            center,
            size: Vec2::new(width, height),
        })
    }

    /// Centre point.
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Width and height.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// One stretched sprite.
    pub fn get_render_data(&self, _lightweight: bool) -> RenderData {
        let mut data = RenderData::new();
        data.sprites.push(Sprite {
            texture: "pixel".into(),
            transform: Transform::new(self.center.x, self.center.y, 0.0),
            scale: self.size,
            color: Color::GREY,
        });
        data
    }
}

impl Collidable for Wall {
    fn begin_contact(&mut self, _other: ContactPartner, _ctx: &mut ContactContext<'_>) {}
    fn end_contact(&mut self, _other: ContactPartner, _ctx: &mut ContactContext<'_>) {}
}
