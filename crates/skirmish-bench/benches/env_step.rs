//! Criterion benchmarks for environment stepping.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skirmish_bench::{duel_profile, target_profile};
use skirmish_engine::{EnvironmentActor, Policy, RandomPolicy};

const DT: f32 = 1.0 / 60.0;

fn bench_target_step(c: &mut Criterion) {
    let mut env = target_profile(42).unwrap();
    env.reset().unwrap();
    let actions = vec![vec![1]];

    c.bench_function("target_step", |b| {
        b.iter(|| {
            let info = env.step(&actions, DT).unwrap();
            black_box(&info);
        });
    });
}

fn bench_duel_step(c: &mut Criterion) {
    let mut env = duel_profile(42).unwrap();
    let mut policy = RandomPolicy::for_environment(7, &env);
    let mut obs = env.reset().unwrap().observations;

    c.bench_function("duel_step_random_policy", |b| {
        b.iter(|| {
            let actions = policy.act(&obs);
            let info = env.step(&actions, DT).unwrap();
            obs = info.observations;
        });
    });
}

fn bench_actor_round_trip(c: &mut Criterion) {
    let actor = EnvironmentActor::spawn(duel_profile(42).unwrap()).unwrap();
    actor.reset().wait().unwrap();
    let idle = vec![vec![0; 4], vec![0; 4]];

    c.bench_function("actor_step_round_trip", |b| {
        b.iter(|| {
            let info = actor.step(idle.clone(), DT).wait().unwrap();
            black_box(&info);
        });
    });
}

fn bench_1000_steps_duel(c: &mut Criterion) {
    c.bench_function("1000_steps_duel", |b| {
        b.iter(|| {
            let mut env = duel_profile(42).unwrap();
            env.reset().unwrap();
            let idle = vec![vec![0; 4], vec![0; 4]];
            for _ in 0..1000 {
                black_box(env.step(&idle, DT).unwrap());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_target_step,
    bench_duel_step,
    bench_actor_round_trip,
    bench_1000_steps_duel
);
criterion_main!(benches);
