//! Stock ship layouts.

use crate::error::CompositionError;
use crate::graph::ModuleGraph;
use crate::kind::{ModuleKind, DEFAULT_LASER_COUNT};

/// The standard training ship.
///
/// A base with a gun on each side, a thruster under each gun, and a laser
/// sensor on top. Four actions (two shoots, two thrusts) and
/// `3 + DEFAULT_LASER_COUNT` observations.
pub fn fighter() -> Result<ModuleGraph, CompositionError> {
    let mut g = ModuleGraph::new();
    let base = g.add(ModuleKind::Base);
    let gun_right = g.attach(base, 1, ModuleKind::gun(), 2)?;
    let gun_left = g.attach(base, 3, ModuleKind::gun(), 0)?;
    g.attach(gun_left, 1, ModuleKind::thruster(), 0)?;
    g.attach(gun_right, 1, ModuleKind::thruster(), 0)?;
    g.attach(base, 0, ModuleKind::laser_sensor(DEFAULT_LASER_COUNT), 0)?;
    Ok(g)
}

/// A base with one gun on top: the smallest ship that can fight.
pub fn gunboat() -> Result<ModuleGraph, CompositionError> {
    let mut g = ModuleGraph::new();
    let base = g.add(ModuleKind::Base);
    g.attach(base, 0, ModuleKind::gun(), 1)?;
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    #[test]
    fn fighter_layout() {
        let g = fighter().unwrap();
        assert_eq!(g.len(), 6);
        assert_eq!(g.input_count(), 4);
        assert_eq!(g.observation_count(), 3 + DEFAULT_LASER_COUNT as usize);
        let actions: Vec<Action> = g.action_refs().iter().map(|a| a.action).collect();
        assert_eq!(
            actions,
            vec![Action::Shoot, Action::Activate, Action::Shoot, Action::Activate]
        );
    }

    fn driven_positions(g: &ModuleGraph) -> Vec<(Action, f32, f32)> {
        g.action_refs()
            .iter()
            .map(|a| {
                let p = g.get(a.module).unwrap().transform().position;
                (a.action, p.x, p.y)
            })
            .collect()
    }

    #[test]
    fn presets_keep_action_slots_through_a_description() {
        for (name, build) in [
            ("fighter", fighter as fn() -> Result<ModuleGraph, CompositionError>),
            ("gunboat", gunboat),
        ] {
            let g = build().unwrap();
            let rebuilt = ModuleGraph::from_node(&g.to_node().unwrap()).unwrap();
            let before = driven_positions(&g);
            let after = driven_positions(&rebuilt);
            assert_eq!(before.len(), after.len(), "{name}");
            for (b, a) in before.iter().zip(&after) {
                assert_eq!(b.0, a.0, "{name}");
                assert!((b.1 - a.1).abs() < 1e-4 && (b.2 - a.2).abs() < 1e-4, "{name}: {b:?} vs {a:?}");
            }
        }
    }

    #[test]
    fn gunboat_has_one_input() {
        assert_eq!(gunboat().unwrap().input_count(), 1);
    }
}
