//! Several environments stepped together for vectorized training.
//!
//! [`VecEnv`] owns N [`EnvironmentActor`]s. Each batched call enqueues one
//! command per actor before waiting on any reply, so the environments run
//! in parallel on their own threads and results come back in actor order.

use crate::actor::{EnvironmentActor, ShutdownReport};
use crate::environment::Environment;
use crate::error::{ActorError, EnvError};
use crate::pending::Pending;
use crate::step_info::StepInfo;

/// A batch of independently threaded environments.
#[derive(Debug)]
pub struct VecEnv {
    actors: Vec<EnvironmentActor>,
}

impl VecEnv {
    /// Start one actor per environment.
    pub fn new(envs: Vec<Environment>) -> Result<Self, ActorError> {
        let actors = envs
            .into_iter()
            .map(EnvironmentActor::spawn)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { actors })
    }

    /// Number of environments.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// True if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// One actor.
    pub fn actor(&self, index: usize) -> Option<&EnvironmentActor> {
        self.actors.get(index)
    }

    /// Reset every environment.
    pub fn reset_all(&self) -> Result<Vec<StepInfo>, ActorError> {
        let pending: Vec<_> = self.actors.iter().map(EnvironmentActor::reset).collect();
        collect(pending)
    }

    /// Step every environment with its own action batch.
    pub fn step_all(
        &self,
        actions: Vec<Vec<Vec<i32>>>,
        dt: f32,
    ) -> Result<Vec<StepInfo>, ActorError> {
        if actions.len() != self.actors.len() {
            return Err(EnvError::ActionBatch {
                expected: self.actors.len(),
                got: actions.len(),
            }
            .into());
        }
        let pending: Vec<_> = self
            .actors
            .iter()
            .zip(actions)
            .map(|(actor, a)| actor.step(a, dt))
            .collect();
        collect(pending)
    }

    /// Stop every actor, returning one report each.
    pub fn stop_all(&mut self) -> Vec<ShutdownReport> {
        self.actors.iter_mut().map(EnvironmentActor::stop).collect()
    }
}

/// Wait on every reply, returning the first error after all have resolved.
fn collect<T>(pending: Vec<Pending<T>>) -> Result<Vec<T>, ActorError> {
    let results: Vec<_> = pending.into_iter().map(Pending::wait).collect();
    results.into_iter().collect()
}
