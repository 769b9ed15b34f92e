//! Entity keys stored in physics `user_data` slots.
//!
//! An [`EntityKey`] packs a [`ParentType`] tag and an index into the
//! `u128` user-data field rapier gives every body and collider:
//!
//! ```text
//! bits 64..72   parent type tag (1..=5)
//! bits  0..32   index (body slot, wall slot, or bullet id)
//! ```
//!
//! Zero is never a valid key, so bodies created without a key decode to
//! `None`.

use std::fmt;

/// Which kind of entity owns a physics body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParentType {
    /// A ship.
    Body = 1,
    /// Static arena wall.
    Wall = 2,
    /// Practice target.
    Target = 3,
    /// Projectile.
    Bullet = 4,
    /// Capture zone.
    Hill = 5,
}

impl ParentType {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(ParentType::Body),
            2 => Some(ParentType::Wall),
            3 => Some(ParentType::Target),
            4 => Some(ParentType::Bullet),
            5 => Some(ParentType::Hill),
            _ => None,
        }
    }
}

/// Identifies the entity behind a physics body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityKey {
    /// Entity kind.
    pub parent_type: ParentType,
    /// Slot or id within that kind.
    pub index: u32,
}

impl EntityKey {
    /// Construct a key.
    pub const fn new(parent_type: ParentType, index: u32) -> Self {
        Self { parent_type, index }
    }

    /// Pack into a `user_data` value.
    pub const fn encode(self) -> u128 {
        ((self.parent_type as u128) << 64) | self.index as u128
    }

    /// Unpack a `user_data` value. Returns `None` for untagged or corrupt
    /// values.
    pub fn decode(raw: u128) -> Option<Self> {
        if raw >> 72 != 0 || (raw >> 32) & 0xFFFF_FFFF != 0 {
            return None;
        }
        let parent_type = ParentType::from_tag((raw >> 64) as u8)?;
        Some(Self {
            parent_type,
            index: raw as u32,
        })
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.parent_type, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        for pt in [
            ParentType::Body,
            ParentType::Wall,
            ParentType::Target,
            ParentType::Bullet,
            ParentType::Hill,
        ] {
            let key = EntityKey::new(pt, 0xDEAD_BEEF);
            assert_eq!(EntityKey::decode(key.encode()), Some(key));
        }
    }

    #[test]
    fn zero_and_garbage_do_not_decode() {
        assert_eq!(EntityKey::decode(0), None);
        assert_eq!(EntityKey::decode(7u128 << 64), None);
        assert_eq!(EntityKey::decode((1u128 << 64) | (1u128 << 40)), None);
    }
}
