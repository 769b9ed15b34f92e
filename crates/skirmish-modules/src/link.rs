//! Link points and the placement rule for attaching modules.

use std::f32::consts::PI;

use skirmish_core::{ModuleId, Transform};

/// Address of one link: which module, which of its links.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LinkRef {
    /// Owning module.
    pub module: ModuleId,
    /// Index into that module's links.
    pub link: usize,
}

/// An attachment point on a module.
///
/// A link is either free or paired with exactly one link on another module.
/// The graph keeps pairs symmetric: if `a.pair() == Some(b)` then
/// `b.pair() == Some(a)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleLink {
    local: Transform,
    pair: Option<LinkRef>,
    is_parent: bool,
}

impl ModuleLink {
    /// A free link at `local` in its module's frame.
    pub fn new(local: Transform) -> Self {
        Self {
            local,
            pair: None,
            is_parent: false,
        }
    }

    /// Position and facing in the owning module's frame.
    pub fn local(&self) -> &Transform {
        &self.local
    }

    /// Whether this link is paired.
    pub fn linked(&self) -> bool {
        self.pair.is_some()
    }

    /// The opposite link, if paired.
    pub fn pair(&self) -> Option<LinkRef> {
        self.pair
    }

    /// True on the parent side of a pair. Only serialization and the
    /// unlink rules read this.
    pub fn is_parent(&self) -> bool {
        self.is_parent
    }

    pub(crate) fn connect(&mut self, pair: LinkRef, is_parent: bool) {
        self.pair = Some(pair);
        self.is_parent = is_parent;
    }

    pub(crate) fn disconnect(&mut self) {
        self.pair = None;
        self.is_parent = false;
    }
}

/// Where a module must sit so its link `child_link` meets `parent_link`.
///
/// `parent` is the placed module's transform. The returned transform puts
/// the child's link point on the parent's link point, facing it:
///
/// ```text
/// own_world      = parent ∘ parent_link
/// child.rotation = own_world.rotation + π − child_link.rotation
/// child.position = own_world.position − rotate(child.rotation, child_link.position)
/// ```
pub fn place_child(
    parent: &Transform,
    parent_link: &Transform,
    child_link: &Transform,
) -> Transform {
    let own_world = parent.compose(parent_link);
    let rotation = own_world.rotation + PI - child_link.rotation;
    let position = own_world.position - child_link.position.rotated(rotation);
    Transform { position, rotation }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::transform::angle_delta;

    #[test]
    fn gun_on_top_of_base() {
        // Base link 0 is the top edge; gun link 1 is its bottom.
        let base = Transform::IDENTITY;
        let top = Transform::new(0.0, 0.5, 0.0);
        let gun_bottom = Transform::new(0.0, -0.5, PI);
        let gun = place_child(&base, &top, &gun_bottom);
        assert!(gun.approx_eq(&Transform::new(0.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn placed_links_coincide_and_face_each_other() {
        let parent = Transform::new(1.0, -2.0, 0.3);
        let a = Transform::new(-0.5, 0.0, PI / 2.0);
        let b = Transform::new(0.0, 0.125, 0.0);
        let child = place_child(&parent, &a, &b);

        let a_world = parent.compose(&a);
        let b_world = child.compose(&b);
        assert!(a_world.position.distance(b_world.position) < 1e-5);
        assert!(angle_delta(a_world.rotation + PI, b_world.rotation).abs() < 1e-5);
    }
}
