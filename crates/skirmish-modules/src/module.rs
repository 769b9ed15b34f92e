//! A single module instance.

use smallvec::SmallVec;
use skirmish_core::{Transform, Vec2};

use crate::action::{Action, ActionEffect};
use crate::kind::{ModuleKind, ModuleType};
use crate::link::ModuleLink;

/// One placed part of a ship.
///
/// `transform` is relative to the body origin. It is written only by the
/// composition graph when the module is linked.
#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    kind: ModuleKind,
    transform: Transform,
    links: SmallVec<[ModuleLink; 4]>,
}

impl Module {
    /// An unplaced module with free links.
    pub fn new(kind: ModuleKind) -> Self {
        let links = kind
            .module_type()
            .link_points()
            .iter()
            .map(|t| ModuleLink::new(*t))
            .collect();
        Self {
            kind,
            transform: Transform::IDENTITY,
            links,
        }
    }

    /// The kind and its state.
    pub fn kind(&self) -> &ModuleKind {
        &self.kind
    }

    /// Mutable access to the kind state (sensor readings, cooldowns).
    pub fn kind_mut(&mut self) -> &mut ModuleKind {
        &mut self.kind
    }

    /// Shorthand for `self.kind().module_type()`.
    pub fn module_type(&self) -> ModuleType {
        self.kind.module_type()
    }

    /// Placement relative to the body origin.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub(crate) fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// All links.
    pub fn links(&self) -> &[ModuleLink] {
        &self.links
    }

    pub(crate) fn link_mut(&mut self, index: usize) -> Option<&mut ModuleLink> {
        self.links.get_mut(index)
    }

    /// Collision shapes in module-local coordinates.
    pub fn shapes(&self) -> &'static [&'static [Vec2]] {
        self.module_type().shapes()
    }

    /// Actions this module exposes.
    pub fn actions(&self) -> &'static [Action] {
        self.module_type().actions()
    }

    /// Number of observation entries.
    pub fn observation_count(&self) -> usize {
        self.kind.observation_count()
    }

    /// Per-step housekeeping.
    pub fn update(&mut self) {
        self.kind.update();
    }

    /// Run one of this module's actions.
    pub fn act(&mut self, action: Action, flags: &[i32]) -> ActionEffect {
        if !self.module_type().capabilities().activatable {
            return ActionEffect::None;
        }
        self.kind.act(action, flags)
    }

    /// Index of the link connecting this module to its parent, if any.
    pub fn parent_link(&self) -> Option<usize> {
        self.links
            .iter()
            .position(|l| l.linked() && !l.is_parent())
    }

    /// True if any module hangs off this one.
    pub fn has_children(&self) -> bool {
        self.links.iter().any(|l| l.linked() && l.is_parent())
    }

    /// Shapes transformed into the body frame.
    pub fn body_shapes(&self) -> impl Iterator<Item = Vec<Vec2>> + '_ {
        self.shapes()
            .iter()
            .map(|shape| shape.iter().map(|v| self.transform.apply(*v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_module_has_free_links_from_table() {
        let m = Module::new(ModuleKind::Base);
        assert_eq!(m.links().len(), 4);
        assert!(m.links().iter().all(|l| !l.linked()));
        assert_eq!(m.parent_link(), None);
        assert!(!m.has_children());
    }

    #[test]
    fn passive_module_ignores_actions() {
        let mut m = Module::new(ModuleKind::SquareHull);
        assert_eq!(m.act(Action::Activate, &[1]), ActionEffect::None);
    }
}
