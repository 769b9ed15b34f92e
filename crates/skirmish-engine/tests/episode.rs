//! Episode lifecycle through the synchronous environment.

use skirmish_core::{BodyIndex, Transform, Vec2};
use skirmish_engine::{BulletState, EffectKind, EnvConfig, Environment, Scenario, SimEvent};
use skirmish_test_utils::{fighter, gunboat, two_fighters, ScriptedActions};

const DT: f32 = 1.0 / 60.0;

fn actions(env: &Environment) -> Vec<usize> {
    env.bodies().iter().map(|b| b.input_count()).collect()
}

#[test]
fn first_reset_is_a_clean_start() {
    let mut env =
        Environment::new(EnvConfig::default(), Scenario::Target, vec![fighter("f")]).unwrap();
    let info = env.reset().unwrap();
    assert!(!info.done);
    assert_eq!(info.rewards, vec![0.0]);
    assert_eq!(info.victor, None);
    assert_eq!(info.observations.len(), 1);
    assert_eq!(
        info.observations[0].len(),
        env.bodies()[0].observation_count()
    );
}

#[test]
fn eleven_damage_ends_the_episode_and_reset_restores() {
    let mut env =
        Environment::new(EnvConfig::default(), Scenario::Target, vec![gunboat("g")]).unwrap();
    env.reset().unwrap();
    let idle = ScriptedActions::idle(&actions(&env));
    env.step(&idle, DT).unwrap();
    env.step(&idle, DT).unwrap();
    assert_eq!(env.step_counter(), 2);

    env.body_mut(BodyIndex(0)).unwrap().hit(11.0);
    let info = env.step(&idle, DT).unwrap();
    assert!(info.done);

    // The terminal info was captured first; the environment is already fresh.
    assert!(!env.is_done());
    assert_eq!(env.step_counter(), 0);
    assert_eq!(env.body(BodyIndex(0)).unwrap().hp(), 10.0);
    assert_eq!(env.elapsed_time(), 0.0);

    let next = env.step(&idle, DT).unwrap();
    assert!(!next.done);
    assert_eq!(env.step_counter(), 1);
}

#[test]
fn terminal_info_reports_the_finished_episode() {
    let mut env =
        Environment::new(EnvConfig::default(), Scenario::KingOfTheHill, two_fighters()).unwrap();
    env.reset().unwrap();
    env.change_reward(BodyIndex(0), 0.5).unwrap();
    env.body_mut(BodyIndex(0)).unwrap().hit(10.0);
    let idle = ScriptedActions::idle(&actions(&env));
    let info = env.step(&idle, DT).unwrap();
    assert!(info.done);
    assert_eq!(info.victor, Some(BodyIndex(1)));
    assert_eq!(info.rewards, vec![0.5 - 100.0, 100.0]);
    // Scores were zeroed by the inline reset.
    assert_eq!(env.scores(), &[0.0, 0.0]);
}

#[test]
fn both_dead_is_a_draw() {
    let mut env =
        Environment::new(EnvConfig::default(), Scenario::KingOfTheHill, two_fighters()).unwrap();
    env.reset().unwrap();
    env.body_mut(BodyIndex(0)).unwrap().hit(10.0);
    env.body_mut(BodyIndex(1)).unwrap().hit(10.0);
    let info = env
        .step(&ScriptedActions::idle(&actions(&env)), DT)
        .unwrap();
    assert!(info.done);
    assert_eq!(info.victor, None);
    assert_eq!(info.rewards, vec![-100.0, -100.0]);
}

#[test]
fn config_from_toml_drives_the_episode_length() {
    let cfg = EnvConfig::from_toml_str("max_steps = 5\nseed = 3\n").unwrap();
    let mut env = Environment::new(cfg, Scenario::Target, vec![fighter("f")]).unwrap();
    env.reset().unwrap();
    let mut script = ScriptedActions::repeat(vec![vec![0, 1, 0, 1]], 5);
    let mut finished = None;
    for step in 1..=5 {
        let info = env.step(&script.next_frame(), DT).unwrap();
        if info.done {
            finished = Some(step);
        }
    }
    assert_eq!(finished, Some(5));
}

#[test]
fn bullet_hit_is_reported_once_as_entity_destroyed() {
    let mut env =
        Environment::new(EnvConfig::default(), Scenario::KingOfTheHill, two_fighters()).unwrap();
    env.reset().unwrap();
    let mut state = env.state().unwrap();
    state.bullets.push(BulletState {
        owner: BodyIndex(0),
        transform: Transform::new(0.0, 11.0, 0.0),
        velocity: Vec2::new(0.0, 20.0),
        life: 30,
    });
    env.set_state(&state).unwrap();

    let idle = ScriptedActions::idle(&actions(&env));
    let mut destroyed = Vec::new();
    for _ in 0..20 {
        let info = env.step(&idle, DT).unwrap();
        destroyed.extend(
            info.events
                .into_iter()
                .filter(|e| matches!(e, SimEvent::EntityDestroyed { .. })),
        );
    }
    assert_eq!(env.body(BodyIndex(1)).unwrap().hp(), 9.0);
    assert_eq!(destroyed.len(), 1);
    let SimEvent::EntityDestroyed { time, transform, .. } = &destroyed[0] else {
        unreachable!()
    };
    assert!(*time > 0.0);
    assert!(transform.position.y > 11.0);
}

#[test]
fn firing_thrusters_trigger_exhaust_effects() {
    let mut env =
        Environment::new(EnvConfig::default(), Scenario::Target, vec![fighter("f")]).unwrap();
    env.reset().unwrap();

    // Fighter slots: gun, its thruster, gun, its thruster.
    let info = env.step(&[vec![0, 1, 0, 1]], DT).unwrap();
    let exhausts: Vec<_> = info
        .events
        .iter()
        .filter(|e| {
            matches!(
                e,
                SimEvent::EffectTriggered {
                    effect: EffectKind::ThrusterParticles,
                    ..
                }
            )
        })
        .collect();
    assert_eq!(exhausts.len(), 2);
    assert!(exhausts.iter().all(|e| (e.time() - DT).abs() < 1e-6));

    env.forward(DT).unwrap();
    assert_eq!(env.events().len(), 2);

    let info = env.step(&ScriptedActions::idle(&actions(&env)), DT).unwrap();
    assert!(info.events.is_empty());
}
