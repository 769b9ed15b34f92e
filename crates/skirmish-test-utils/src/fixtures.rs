//! Reusable ship descriptions.
//!
//! - [`fighter`]: the stock two-gun, two-thruster, one-sensor ship.
//! - [`gunboat`]: a base with one gun; fires every fourth step.
//! - [`scout`]: a base with a laser sensor and a thruster, unarmed.
//! - [`base_only`]: a bare base module.

use skirmish_modules::{
    presets, CompositionError, ModuleGraph, ModuleKind, ShipDescription, SCHEMA_VERSION,
};

/// Wrap a graph in a description named `name`.
pub fn describe(name: &str, graph: &ModuleGraph) -> ShipDescription {
    ShipDescription {
        schema: SCHEMA_VERSION.to_owned(),
        name: name.to_owned(),
        base_module: graph.to_node(),
        num_observations: Some(graph.observation_count()),
        num_actions: Some(graph.input_count()),
    }
}

fn build(
    name: &str,
    graph: impl FnOnce() -> Result<ModuleGraph, CompositionError>,
) -> ShipDescription {
    let graph = graph().unwrap_or_else(|e| panic!("fixture {name} failed to build: {e}"));
    describe(name, &graph)
}

pub fn fighter(name: &str) -> ShipDescription {
    build(name, presets::fighter)
}

pub fn gunboat(name: &str) -> ShipDescription {
    build(name, presets::gunboat)
}

/// Laser sensor on top, thruster underneath. Sensor ray count is left
/// unset so the environment's default applies.
pub fn scout(name: &str) -> ShipDescription {
    let mut description = build(name, || {
        let mut g = ModuleGraph::new();
        let base = g.add(ModuleKind::Base);
        g.attach(base, 0, ModuleKind::laser_sensor(4), 0)?;
        g.attach(base, 2, ModuleKind::thruster(), 0)?;
        Ok(g)
    });
    if let Some(root) = description.base_module.as_mut() {
        clear_laser_counts(root);
    }
    description.num_observations = None;
    description
}

pub fn base_only(name: &str) -> ShipDescription {
    build(name, || {
        let mut g = ModuleGraph::new();
        g.add(ModuleKind::Base);
        Ok(g)
    })
}

/// The king-of-the-hill pair.
pub fn two_fighters() -> Vec<ShipDescription> {
    vec![fighter("red"), fighter("blue")]
}

fn clear_laser_counts(node: &mut skirmish_modules::ModuleNode) {
    node.laser_count = None;
    for link in node.links.iter_mut().flatten() {
        clear_laser_counts(&mut link.child);
    }
}
