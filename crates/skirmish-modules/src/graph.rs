//! Arena-backed composition graph.
//!
//! Modules are stored in insertion order under never-reused [`ModuleId`]s;
//! actions and observations follow [`ModuleGraph::ship_order`] instead.
//! Links point at each other by [`LinkRef`], so ownership is flat: the
//! graph owns every module, and no module owns another.
//!
//! Every mutating operation validates completely before touching state, so
//! an `Err` always leaves the graph unchanged.

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use skirmish_core::{ModuleId, Transform};

use crate::action::ActionRef;
use crate::error::CompositionError;
use crate::kind::ModuleKind;
use crate::link::{place_child, LinkRef};
use crate::module::Module;

/// A ship's modules and the links between them.
#[derive(Clone, Debug, Default)]
pub struct ModuleGraph {
    modules: IndexMap<ModuleId, Module>,
    next_id: u32,
}

impl ModuleGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of modules, linked or not.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True if the graph has no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Look up a module.
    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(&id)
    }

    /// Look up a module mutably.
    pub fn get_mut(&mut self, id: ModuleId) -> Option<&mut Module> {
        self.modules.get_mut(&id)
    }

    /// Modules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules.iter().map(|(id, m)| (*id, m))
    }

    /// Modules in insertion order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ModuleId, &mut Module)> {
        self.modules.iter_mut().map(|(id, m)| (*id, m))
    }

    /// Insert an unlinked module and return its id.
    pub fn add(&mut self, kind: ModuleKind) -> ModuleId {
        let id = ModuleId(self.next_id);
        self.next_id += 1;
        self.modules.insert(id, Module::new(kind));
        id
    }

    /// The root of the tree containing the first inserted module.
    pub fn root(&self) -> Option<ModuleId> {
        let (&first, _) = self.modules.first()?;
        let mut current = first;
        // Bounded walk: a tree of n modules has depth < n.
        for _ in 0..self.modules.len() {
            match self.parent(current) {
                Some(parent) => current = parent.module,
                None => return Some(current),
            }
        }
        Some(current)
    }

    /// The parent's side of `id`'s parent link.
    pub fn parent(&self, id: ModuleId) -> Option<LinkRef> {
        let module = self.modules.get(&id)?;
        let index = module.parent_link()?;
        module.links()[index].pair()
    }

    /// `(own link index, child side)` for every child of `id`.
    pub fn children(&self, id: ModuleId) -> SmallVec<[(usize, LinkRef); 4]> {
        let Some(module) = self.modules.get(&id) else {
            return SmallVec::new();
        };
        module
            .links()
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_parent())
            .filter_map(|(i, l)| l.pair().map(|p| (i, p)))
            .collect()
    }

    /// True if `ancestor` is `id` or lies on the path from `id` to its root.
    pub fn is_ancestor(&self, ancestor: ModuleId, id: ModuleId) -> bool {
        let mut current = id;
        for _ in 0..=self.modules.len() {
            if current == ancestor {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent.module,
                None => return false,
            }
        }
        false
    }

    /// World-from-body transform of one link.
    pub fn link_transform(&self, link: LinkRef) -> Option<Transform> {
        let module = self.modules.get(&link.module)?;
        let local = module.links().get(link.link)?.local();
        Some(module.transform().compose(local))
    }

    fn check_link(&self, module: ModuleId, link: usize) -> Result<&Module, CompositionError> {
        let m = self
            .modules
            .get(&module)
            .ok_or(CompositionError::UnknownModule(module))?;
        let count = m.links().len();
        let l = m
            .links()
            .get(link)
            .ok_or(CompositionError::NoSuchLink {
                module,
                link,
                count,
            })?;
        if l.linked() {
            return Err(CompositionError::AlreadyLinked { module, link });
        }
        Ok(m)
    }

    /// Attach `child` under `parent`, joining `parent_link` to `child_link`.
    ///
    /// `child` is moved so the two link points coincide and face each
    /// other; any modules already hanging off `child` move with it.
    pub fn link(
        &mut self,
        parent: ModuleId,
        parent_link: usize,
        child: ModuleId,
        child_link: usize,
    ) -> Result<(), CompositionError> {
        if parent == child {
            return Err(CompositionError::SelfLink(child));
        }
        let parent_module = self.check_link(parent, parent_link)?;
        let parent_transform = *parent_module.transform();
        let parent_local = *parent_module.links()[parent_link].local();

        let child_module = self.check_link(child, child_link)?;
        if child_module.parent_link().is_some() {
            return Err(CompositionError::AlreadyAttached(child));
        }
        let child_local = *child_module.links()[child_link].local();
        if self.is_ancestor(child, parent) {
            return Err(CompositionError::Cycle { parent, child });
        }

        let placed = place_child(&parent_transform, &parent_local, &child_local);
        if let Some(m) = self.modules.get_mut(&parent) {
            if let Some(l) = m.link_mut(parent_link) {
                l.connect(
                    LinkRef {
                        module: child,
                        link: child_link,
                    },
                    true,
                );
            }
        }
        if let Some(m) = self.modules.get_mut(&child) {
            m.set_transform(placed);
            if let Some(l) = m.link_mut(child_link) {
                l.connect(
                    LinkRef {
                        module: parent,
                        link: parent_link,
                    },
                    false,
                );
            }
        }
        self.reposition_subtree(child);
        Ok(())
    }

    /// Add a module and link it under `parent` in one step.
    ///
    /// On error nothing is added.
    pub fn attach(
        &mut self,
        parent: ModuleId,
        parent_link: usize,
        kind: ModuleKind,
        child_link: usize,
    ) -> Result<ModuleId, CompositionError> {
        let child = self.add(kind);
        if let Err(e) = self.link(parent, parent_link, child, child_link) {
            self.modules.shift_remove(&child);
            return Err(e);
        }
        Ok(child)
    }

    /// Detach a leaf module from its parent. The module stays in the graph.
    pub fn unlink(&mut self, id: ModuleId) -> Result<(), CompositionError> {
        let module = self
            .modules
            .get(&id)
            .ok_or(CompositionError::UnknownModule(id))?;
        if module.has_children() {
            return Err(CompositionError::HasChildren(id));
        }
        let own_link = module.parent_link().ok_or(CompositionError::NotLinked(id))?;
        let pair = module.links()[own_link]
            .pair()
            .ok_or(CompositionError::NotLinked(id))?;

        if let Some(l) = self
            .modules
            .get_mut(&pair.module)
            .and_then(|m| m.link_mut(pair.link))
        {
            l.disconnect();
        }
        if let Some(l) = self.modules.get_mut(&id).and_then(|m| m.link_mut(own_link)) {
            l.disconnect();
        }
        Ok(())
    }

    /// Remove a leaf module from the graph, unlinking it first if needed.
    pub fn remove(&mut self, id: ModuleId) -> Result<Module, CompositionError> {
        let module = self
            .modules
            .get(&id)
            .ok_or(CompositionError::UnknownModule(id))?;
        if module.has_children() {
            return Err(CompositionError::HasChildren(id));
        }
        if module.parent_link().is_some() {
            self.unlink(id)?;
        }
        self.modules
            .shift_remove(&id)
            .ok_or(CompositionError::UnknownModule(id))
    }

    /// Module ids in ship order: depth-first from [`root()`](Self::root),
    /// children by ascending link index, then any modules outside the tree
    /// in insertion order.
    ///
    /// This is the order a description tree is rebuilt in, so it survives a
    /// [`to_node`](Self::to_node) / [`from_node`](Self::from_node) round trip.
    pub fn ship_order(&self) -> Vec<ModuleId> {
        let mut order: IndexSet<ModuleId> = IndexSet::with_capacity(self.modules.len());
        let mut stack: Vec<ModuleId> = self.root().into_iter().collect();
        while let Some(id) = stack.pop() {
            if !order.insert(id) {
                continue;
            }
            stack.extend(self.children(id).iter().rev().map(|(_, child)| child.module));
        }
        order.extend(self.modules.keys().copied());
        order.into_iter().collect()
    }

    /// Every module's actions, concatenated in [ship order](Self::ship_order).
    pub fn action_refs(&self) -> Vec<ActionRef> {
        self.ship_order()
            .into_iter()
            .filter_map(|id| self.modules.get(&id).map(|m| (id, m)))
            .flat_map(|(id, m)| {
                m.actions()
                    .iter()
                    .map(move |a| ActionRef { module: id, action: *a })
            })
            .collect()
    }

    /// Length of the action vector this graph expects.
    pub fn input_count(&self) -> usize {
        self.action_refs().iter().map(ActionRef::flag_count).sum()
    }

    /// Length of the observation vector this graph produces.
    pub fn observation_count(&self) -> usize {
        self.modules.values().map(Module::observation_count).sum()
    }

    fn reposition_subtree(&mut self, id: ModuleId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(module) = self.modules.get(&current) else {
                continue;
            };
            let transform = *module.transform();
            let mut placements: SmallVec<[(ModuleId, Transform); 4]> = SmallVec::new();
            for link in module.links().iter().filter(|l| l.is_parent()) {
                let Some(pair) = link.pair() else { continue };
                let Some(child_local) = self
                    .modules
                    .get(&pair.module)
                    .and_then(|c| c.links().get(pair.link))
                    .map(|l| *l.local())
                else {
                    continue;
                };
                placements.push((
                    pair.module,
                    place_child(&transform, link.local(), &child_local),
                ));
            }
            for (child, placed) in placements {
                if let Some(m) = self.modules.get_mut(&child) {
                    m.set_transform(placed);
                }
                stack.push(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ModuleType;
    use proptest::prelude::*;

    fn base_with_gun() -> (ModuleGraph, ModuleId, ModuleId) {
        let mut g = ModuleGraph::new();
        let base = g.add(ModuleKind::Base);
        let gun = g.attach(base, 0, ModuleKind::gun(), 1).unwrap();
        (g, base, gun)
    }

    #[test]
    fn link_pairs_both_sides() {
        let (g, base, gun) = base_with_gun();
        let base_link = &g.get(base).unwrap().links()[0];
        let gun_link = &g.get(gun).unwrap().links()[1];
        assert!(base_link.linked() && gun_link.linked());
        assert_eq!(base_link.pair(), Some(LinkRef { module: gun, link: 1 }));
        assert_eq!(gun_link.pair(), Some(LinkRef { module: base, link: 0 }));
        assert!(base_link.is_parent());
        assert!(!gun_link.is_parent());
    }

    #[test]
    fn relinking_a_linked_link_is_rejected() {
        let (mut g, base, _) = base_with_gun();
        let other = g.add(ModuleKind::thruster());
        let err = g.link(base, 0, other, 0).unwrap_err();
        assert_eq!(err, CompositionError::AlreadyLinked { module: base, link: 0 });
        assert!(!g.get(other).unwrap().links()[0].linked());
    }

    #[test]
    fn attaching_twice_is_rejected() {
        let (mut g, base, gun) = base_with_gun();
        let err = g.link(base, 1, gun, 0).unwrap_err();
        assert_eq!(err, CompositionError::AlreadyAttached(gun));
    }

    #[test]
    fn cycles_are_rejected() {
        let (mut g, base, gun) = base_with_gun();
        let err = g.link(gun, 0, base, 1).unwrap_err();
        assert_eq!(err, CompositionError::Cycle { parent: gun, child: base });
    }

    #[test]
    fn bad_link_index_is_rejected() {
        let mut g = ModuleGraph::new();
        let base = g.add(ModuleKind::Base);
        let err = g.attach(base, 9, ModuleKind::gun(), 0).unwrap_err();
        assert_eq!(
            err,
            CompositionError::NoSuchLink { module: base, link: 9, count: 4 }
        );
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn self_link_is_rejected() {
        let mut g = ModuleGraph::new();
        let base = g.add(ModuleKind::Base);
        assert_eq!(g.link(base, 0, base, 2), Err(CompositionError::SelfLink(base)));
    }

    #[test]
    fn unlinking_a_module_with_children_fails_and_changes_nothing() {
        let (mut g, _, gun) = base_with_gun();
        let thruster = g.attach(gun, 0, ModuleKind::thruster(), 0).unwrap();
        let before = g.len();

        assert_eq!(g.unlink(gun), Err(CompositionError::HasChildren(gun)));
        assert_eq!(g.remove(gun).unwrap_err(), CompositionError::HasChildren(gun));
        assert_eq!(g.len(), before);
        assert!(g.get(gun).unwrap().links()[1].linked());
        assert_eq!(g.parent(thruster).map(|p| p.module), Some(gun));
    }

    #[test]
    fn unlinking_a_leaf_frees_both_links() {
        let (mut g, base, gun) = base_with_gun();
        g.unlink(gun).unwrap();
        assert!(!g.get(base).unwrap().links()[0].linked());
        assert!(!g.get(gun).unwrap().links()[1].linked());
        assert_eq!(g.unlink(gun), Err(CompositionError::NotLinked(gun)));
    }

    #[test]
    fn remove_drops_leaf_and_keeps_order() {
        let mut g = ModuleGraph::new();
        let base = g.add(ModuleKind::Base);
        let a = g.attach(base, 0, ModuleKind::gun(), 1).unwrap();
        let b = g.attach(base, 2, ModuleKind::thruster(), 0).unwrap();
        g.remove(a).unwrap();
        let ids: Vec<_> = g.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![base, b]);
        assert!(!g.get(base).unwrap().links()[0].linked());
    }

    #[test]
    fn input_count_sums_flags() {
        let (mut g, base, _) = base_with_gun();
        assert_eq!(g.input_count(), 1);
        g.attach(base, 2, ModuleKind::gun(), 1).unwrap();
        assert_eq!(g.input_count(), 2);
        g.attach(base, 1, ModuleKind::thruster(), 0).unwrap();
        assert_eq!(g.input_count(), 3);
        assert_eq!(g.action_refs().len(), 3);
    }

    #[test]
    fn observation_count_sums_sensors() {
        let mut g = ModuleGraph::new();
        let base = g.add(ModuleKind::Base);
        g.attach(base, 0, ModuleKind::laser_sensor(7), 0).unwrap();
        assert_eq!(g.observation_count(), 3 + 7);
    }

    #[test]
    fn root_follows_parent_links() {
        let mut g = ModuleGraph::new();
        let gun = g.add(ModuleKind::gun());
        let base = g.add(ModuleKind::Base);
        g.link(base, 0, gun, 1).unwrap();
        assert_eq!(g.root(), Some(base));
    }

    #[test]
    fn linking_a_subtree_moves_its_descendants() {
        let mut g = ModuleGraph::new();
        let gun = g.add(ModuleKind::gun());
        let thruster = g.attach(gun, 0, ModuleKind::thruster(), 0).unwrap();
        let base = g.add(ModuleKind::Base);
        g.link(base, 0, gun, 1).unwrap();

        let a = g.link_transform(LinkRef { module: gun, link: 0 }).unwrap();
        let b = g.link_transform(LinkRef { module: thruster, link: 0 }).unwrap();
        assert!(a.position.distance(b.position) < 1e-4);
    }

    #[test]
    fn ship_order_is_depth_first_by_link_index() {
        let mut g = ModuleGraph::new();
        let base = g.add(ModuleKind::Base);
        let right = g.attach(base, 1, ModuleKind::gun(), 2).unwrap();
        let left = g.attach(base, 3, ModuleKind::gun(), 0).unwrap();
        let under_left = g.attach(left, 1, ModuleKind::thruster(), 0).unwrap();
        let under_right = g.attach(right, 1, ModuleKind::thruster(), 0).unwrap();
        let top = g.attach(base, 0, ModuleKind::laser_sensor(4), 0).unwrap();
        let loose = g.add(ModuleKind::gun());

        assert_eq!(
            g.ship_order(),
            vec![base, top, right, under_right, left, under_left, loose]
        );
        let driven: Vec<ModuleId> = g.action_refs().iter().map(|a| a.module).collect();
        assert_eq!(driven, vec![right, under_right, left, under_left, loose]);
    }

    fn kind_strategy() -> impl Strategy<Value = ModuleType> {
        prop::sample::select(ModuleType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn linked_points_coincide(
            parent_type in kind_strategy(),
            child_type in kind_strategy(),
            parent_link in 0usize..4,
            child_link in 0usize..4,
            grand_link in 0usize..4,
        ) {
            let mut g = ModuleGraph::new();
            // Place the parent somewhere non-trivial first.
            let base = g.add(ModuleKind::Base);
            let parent = g.add(ModuleKind::from_type(parent_type, Some(4)));
            let parent_links = g.get(parent).unwrap().links().len();
            prop_assume!(g.link(base, grand_link, parent, parent_links - 1).is_ok());

            let child = g.add(ModuleKind::from_type(child_type, Some(4)));
            let pl = parent_link % parent_links;
            let cl = child_link % g.get(child).unwrap().links().len();
            prop_assume!(!g.get(parent).unwrap().links()[pl].linked());
            g.link(parent, pl, child, cl).unwrap();

            let a = LinkRef { module: parent, link: pl };
            let b = LinkRef { module: child, link: cl };
            prop_assert!(g.get(parent).unwrap().links()[pl].linked());
            prop_assert!(g.get(child).unwrap().links()[cl].linked());
            prop_assert_eq!(g.get(parent).unwrap().links()[pl].pair(), Some(b));
            prop_assert_eq!(g.get(child).unwrap().links()[cl].pair(), Some(a));

            let pa = g.link_transform(a).unwrap().position;
            let pb = g.link_transform(b).unwrap().position;
            prop_assert!(pa.distance(pb) < 1e-4, "{:?} vs {:?}", pa, pb);
        }
    }
}
