//! Actions a module exposes to the policy.

use skirmish_core::{ModuleId, Vec2};

/// A control input exposed by a module.
///
/// Each action consumes `flag_count()` consecutive entries of a body's
/// action vector per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Turn the module on for this step (thrusters).
    Activate,
    /// Fire if the cooldown allows it (guns).
    Shoot,
}

impl Action {
    /// Number of action-vector entries this action reads.
    pub const fn flag_count(self) -> usize {
        match self {
            Action::Activate => 1,
            Action::Shoot => 1,
        }
    }
}

/// Non-owning reference to one action of one module in a body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionRef {
    /// The module that owns the action.
    pub module: ModuleId,
    /// Which action.
    pub action: Action,
}

impl ActionRef {
    /// Shorthand for `self.action.flag_count()`.
    pub fn flag_count(&self) -> usize {
        self.action.flag_count()
    }
}

/// Physical consequence of running an action, in the module's local frame.
///
/// Modules know nothing about physics; the body owning them turns these
/// into forces and spawned projectiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActionEffect {
    /// Nothing happened (flag off, or cooldown not elapsed).
    None,
    /// Push the body with `force` applied at `point`.
    Thrust {
        /// Force in module-local coordinates.
        force: Vec2,
        /// Application point in module-local coordinates.
        point: Vec2,
    },
    /// Spawn a projectile.
    Fire {
        /// Muzzle position in module-local coordinates.
        muzzle: Vec2,
        /// Unit firing direction in module-local coordinates.
        direction: Vec2,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_reads_one_flag() {
        assert_eq!(Action::Activate.flag_count(), 1);
        assert_eq!(Action::Shoot.flag_count(), 1);
    }
}
