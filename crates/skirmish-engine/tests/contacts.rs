//! Contact dispatch between bullets, ships, walls, and the hill.

use skirmish_core::{BodyIndex, Transform, Vec2};
use skirmish_engine::{BulletState, EnvConfig, Environment, Scenario};
use skirmish_test_utils::{two_fighters, ScriptedActions};

const DT: f32 = 1.0 / 60.0;

fn koth() -> Environment {
    let mut env =
        Environment::new(EnvConfig::default(), Scenario::KingOfTheHill, two_fighters()).unwrap();
    env.reset().unwrap();
    env
}

#[test]
fn bullet_hit_rewards_both_sides_once() {
    let mut env = koth();
    let mut state = env.state().unwrap();
    state.bullets.push(BulletState {
        owner: BodyIndex(0),
        transform: Transform::new(0.0, 11.0, 0.0),
        velocity: Vec2::new(0.0, 20.0),
        life: 30,
    });
    env.set_state(&state).unwrap();
    assert_eq!(env.bullet_count(), 1);

    let idle = ScriptedActions::idle(&[4, 4]);
    let mut totals = [0.0f32; 2];
    for _ in 0..20 {
        let info = env.step(&idle, DT).unwrap();
        totals[0] += info.rewards[0];
        totals[1] += info.rewards[1];
    }
    assert_eq!(env.bullet_count(), 0);
    assert_eq!(env.body(BodyIndex(1)).unwrap().hp(), 9.0);
    assert_eq!(env.body(BodyIndex(0)).unwrap().hp(), 10.0);
    assert!((totals[0] - 1.0).abs() < 1e-6, "owner reward {}", totals[0]);
    assert!((totals[1] + 1.0).abs() < 1e-6, "target reward {}", totals[1]);
}

#[test]
fn walls_absorb_bullets_without_rewards() {
    let mut env = koth();
    let mut state = env.state().unwrap();
    state.bullets.push(BulletState {
        owner: BodyIndex(0),
        transform: Transform::new(5.0, 0.0, 0.0),
        velocity: Vec2::new(20.0, 0.0),
        life: 30,
    });
    env.set_state(&state).unwrap();
    let idle = ScriptedActions::idle(&[4, 4]);
    let mut total = 0.0;
    for _ in 0..20 {
        let info = env.step(&idle, DT).unwrap();
        total += info.rewards.iter().sum::<f32>();
    }
    assert_eq!(env.bullet_count(), 0);
    assert_eq!(total, 0.0);
}

#[test]
fn bullets_pass_through_the_hill() {
    let mut env = koth();
    let mut state = env.state().unwrap();
    state.bullets.push(BulletState {
        owner: BodyIndex(0),
        transform: Transform::new(-2.0, 0.0, 0.0),
        velocity: Vec2::new(20.0, 0.0),
        life: 9,
    });
    env.set_state(&state).unwrap();
    let idle = ScriptedActions::idle(&[4, 4]);
    for _ in 0..8 {
        env.step(&idle, DT).unwrap();
    }
    // Still alive inside or past the hill, well short of the east wall.
    assert_eq!(env.bullet_count(), 1);
}

#[test]
fn contested_hill_scores_nobody() {
    let mut env = koth();
    let mut state = env.state().unwrap();
    state.bodies[0].transform = Transform::new(-2.0, 0.0, 0.0);
    state.bodies[1].transform = Transform::new(2.0, 0.0, 0.0);
    env.set_state(&state).unwrap();
    let idle = ScriptedActions::idle(&[4, 4]);
    env.step(&idle, DT).unwrap();
    let hill = env.hill().unwrap();
    assert!(hill.occupancy(BodyIndex(0)) > 0);
    assert!(hill.occupancy(BodyIndex(1)) > 0);
    let info = env.step(&idle, DT).unwrap();
    assert_eq!(info.rewards, vec![0.0, 0.0]);
    assert_eq!(env.scores(), &[0.0, 0.0]);
}

#[test]
fn leaving_the_hill_clears_occupancy() {
    let mut env = koth();
    let mut state = env.state().unwrap();
    state.bodies[0].transform = Transform::new(0.0, 0.0, 0.0);
    env.set_state(&state).unwrap();
    let idle = ScriptedActions::idle(&[4, 4]);
    env.step(&idle, DT).unwrap();
    assert_eq!(env.hill().unwrap().holder(), Some(BodyIndex(0)));

    let mut state = env.state().unwrap();
    state.bodies[0].transform = Transform::new(0.0, -15.0, 0.0);
    env.set_state(&state).unwrap();
    env.step(&idle, DT).unwrap();
    assert_eq!(env.hill().unwrap().occupancy(BodyIndex(0)), 0);
    assert_eq!(env.hill().unwrap().holder(), None);
}
