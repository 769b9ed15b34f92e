//! Ship descriptions through bodies and environments.

use skirmish_core::{BodyIndex, Transform};
use skirmish_engine::{Body, BodyError, EnvConfig, EnvError, Environment, Scenario};
use skirmish_modules::{CompositionError, ModuleKind, SerializationError, ShipDescription};
use skirmish_physics::PhysicsWorld;
use skirmish_test_utils::{fighter, scout};

fn shape(desc: &ShipDescription) -> serde_json::Value {
    // Compare topology and kinds only.
    let mut value = serde_json::to_value(&desc.base_module).unwrap();
    strip_counts(&mut value);
    value
}

fn strip_counts(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.remove("laser_count");
            map.values_mut().for_each(strip_counts);
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(strip_counts),
        _ => {}
    }
}

#[test]
fn json_round_trip_preserves_tree() {
    let mut world = PhysicsWorld::new(4);
    let mut body = Body::new(&mut world, BodyIndex(0), "x", Transform::IDENTITY, 10.0);
    body.load_description(&mut world, fighter("ace")).unwrap();
    let json = body.to_json().unwrap();

    let mut copy = Body::new(&mut world, BodyIndex(1), "y", Transform::IDENTITY, 10.0);
    copy.load_json(&mut world, &json).unwrap();
    assert_eq!(copy.name(), "ace");
    assert_eq!(copy.graph().len(), body.graph().len());
    assert_eq!(copy.input_count(), body.input_count());
    assert_eq!(shape(&copy.to_description()), shape(&body.to_description()));
}

#[test]
fn schema_mismatch_fails_before_structure() {
    let mut world = PhysicsWorld::new(4);
    let mut body = Body::new(&mut world, BodyIndex(0), "x", Transform::IDENTITY, 10.0);
    let err = body
        .load_json(&mut world, r#"{"schema": "v0", "base_module": 12}"#)
        .unwrap_err();
    assert!(matches!(
        err,
        BodyError::Serialization(SerializationError::SchemaMismatch { .. })
    ));
    assert!(body.graph().is_empty());
}

#[test]
fn environment_rejects_bad_ship() {
    let mut bad = fighter("bad");
    bad.schema = "v1alpha3".into();
    let err = Environment::new(EnvConfig::default(), Scenario::Target, vec![bad]).unwrap_err();
    assert!(matches!(err, EnvError::Body { index: BodyIndex(0), .. }));
}

#[test]
fn default_laser_count_fills_unset_sensors() {
    let cfg = EnvConfig {
        laser_count: 5,
        ..EnvConfig::default()
    };
    let env = Environment::new(cfg, Scenario::Target, vec![scout("s")]).unwrap();
    // Base velocity (3) + five rays.
    assert_eq!(env.bodies()[0].observation_count(), 8);
}

#[test]
fn unlinking_a_module_with_children_fails_and_keeps_tree() {
    let mut world = PhysicsWorld::new(4);
    let mut body = Body::new(&mut world, BodyIndex(0), "x", Transform::IDENTITY, 10.0);
    let base = body.add_module(&mut world, ModuleKind::Base).unwrap();
    let gun = body.attach(&mut world, base, 0, ModuleKind::gun(), 1).unwrap();
    body.attach(&mut world, gun, 0, ModuleKind::thruster(), 0)
        .unwrap();
    let before = body.to_description();
    let err = body.unlink_module(&mut world, gun).unwrap_err();
    assert!(matches!(
        err,
        BodyError::Composition(CompositionError::HasChildren(_))
    ));
    assert_eq!(body.to_description(), before);
    assert_eq!(body.input_count(), 2);
}
