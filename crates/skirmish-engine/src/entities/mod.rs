//! Non-ship entities: projectiles and arena geometry.

pub mod bullet;
pub mod hill;
pub mod target;
pub mod wall;

pub use bullet::{Bullet, BulletState};
pub use hill::Hill;
pub use target::Target;
pub use wall::Wall;
