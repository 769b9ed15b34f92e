//! Headless king-of-the-hill run driven by a random policy.
//!
//! Demonstrates: config (optionally from a TOML file) → Environment →
//! EnvironmentActor → reset → step with policy actions → episode ends →
//! stop.
//!
//! ```text
//! RUST_LOG=skirmish_engine=debug cargo run -p skirmish-engine --example headless -- arena.toml
//! ```

use skirmish_engine::{EnvConfig, Environment, EnvironmentActor, Policy, RandomPolicy, Scenario};
use skirmish_test_utils::two_fighters;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EPISODES: usize = 3;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "skirmish_engine=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).unwrap();
            EnvConfig::from_toml_str(&text).unwrap()
        }
        None => EnvConfig {
            max_steps: 300,
            seed: 42,
            ..EnvConfig::default()
        },
    };
    let dt = config.dt;

    let env = Environment::new(config, Scenario::KingOfTheHill, two_fighters()).unwrap();
    let mut policy = RandomPolicy::for_environment(7, &env);
    let mut actor = EnvironmentActor::spawn(env).unwrap();

    println!("=== Skirmish headless king of the hill ===\n");
    let mut info = actor.reset().wait().unwrap();
    for episode in 1..=EPISODES {
        let mut steps = 0u32;
        let mut returns = [0.0f32; 2];
        loop {
            let actions = policy.act(&info.observations);
            info = actor.step(actions, dt).wait().unwrap();
            steps += 1;
            for (total, r) in returns.iter_mut().zip(&info.rewards) {
                *total += r;
            }
            if info.done {
                break;
            }
        }
        let victor = info
            .victor
            .map_or_else(|| "none".to_owned(), |v| v.to_string());
        println!(
            "episode {episode}: {steps} steps, returns [{:.2}, {:.2}], victor {victor}",
            returns[0], returns[1]
        );
        // The actor has already reset; fetch fresh observations.
        info = actor.reset().wait().unwrap();
    }

    let metrics = actor
        .with_environment(|env| env.last_metrics().clone())
        .wait()
        .unwrap();
    println!(
        "\nlast step: {}us total, {}us physics, {} contacts",
        metrics.total_us, metrics.physics_us, metrics.contacts_dispatched
    );

    let report = actor.stop();
    println!(
        "stopped after {} commands in {}ms",
        report.commands_served, report.total_ms
    );
}
