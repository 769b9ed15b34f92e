//! User-facing [`EnvironmentActor`] and its lifecycle.
//!
//! # Architecture
//!
//! ```text
//! Caller thread(s)                 Environment thread
//!     |                                   |
//!     |--step(actions)------------------->| cmd_rx.recv()
//!     |   [cmd_tx: unbounded]             | env.step(..)
//!     |<--Pending<StepInfo> via reply-----| reply.send(result)
//!     |                                   |
//!     |--stop()-------------------------->| Command::Stop
//!     |<--JoinHandle<Environment>---------| loop exits
//! ```
//!
//! Commands submitted before [`start`](EnvironmentActor::start) queue up
//! and run, in order, once the thread exists.

use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use skirmish_core::{BodyIndex, RenderData};

use crate::actor_thread::{ActorThreadState, Command, Job, ThreadExit};
use crate::environment::Environment;
use crate::error::ActorError;
use crate::pending::Pending;
use crate::step_info::{EnvState, StepInfo};

// ── ShutdownReport ─────────────────────────────────────────────────

/// Report from [`EnvironmentActor::stop`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Time spent stopping, including the join.
    pub total_ms: u64,
    /// Whether the thread was joined and the environment recovered.
    pub joined: bool,
    /// Commands the thread ran.
    pub commands_served: u64,
    /// Commands dropped unrun, each resolved as [`ActorError::Stopped`].
    pub commands_discarded: usize,
}

// ── ActorState ─────────────────────────────────────────────────────

/// Lifecycle of an [`EnvironmentActor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorState {
    /// Built; commands queue but nothing runs.
    Idle,
    /// The thread is serving commands.
    Running,
    /// Terminal. New commands resolve as [`ActorError::Stopped`].
    Stopped,
}

// ── ActorHandle ────────────────────────────────────────────────────

/// A cloneable producer for an actor's command queue.
///
/// Handles can be moved to other threads. Commands from every handle and
/// from the actor itself share one queue and run in the order they were
/// enqueued.
#[derive(Clone, Debug)]
pub struct ActorHandle {
    cmd_tx: Sender<Command>,
}

impl ActorHandle {
    fn submit<T, F>(&self, f: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Environment) -> Result<T, ActorError> + Send + 'static,
    {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        if self.cmd_tx.send(Command::Run(Job::new(f, reply_tx))).is_err() {
            // The job, and its reply sender, were dropped with the error.
            return Pending::stopped();
        }
        Pending::new(reply_rx)
    }

    /// Start a new episode.
    pub fn reset(&self) -> Pending<StepInfo> {
        self.submit(|env| Ok(env.reset()?))
    }

    /// Advance one control step.
    pub fn step(&self, actions: Vec<Vec<i32>>, dt: f32) -> Pending<StepInfo> {
        self.submit(move |env| Ok(env.step(&actions, dt)?))
    }

    /// Advance physics only.
    pub fn forward(&self, dt: f32) -> Pending<()> {
        self.submit(move |env| Ok(env.forward(dt)?))
    }

    /// Add to a body's pending reward.
    pub fn change_reward(&self, body: BodyIndex, delta: f32) -> Pending<()> {
        self.submit(move |env| Ok(env.change_reward(body, delta)?))
    }

    /// End the episode at the next step.
    pub fn set_done(&self) -> Pending<()> {
        self.submit(|env| {
            env.set_done();
            Ok(())
        })
    }

    /// Snapshot the simulation.
    pub fn state(&self) -> Pending<EnvState> {
        self.submit(|env| Ok(env.state()?))
    }

    /// Restore a snapshot.
    pub fn set_state(&self, state: EnvState) -> Pending<()> {
        self.submit(move |env| Ok(env.set_state(&state)?))
    }

    /// Collect drawables.
    pub fn render_data(&self, lightweight: bool) -> Pending<RenderData> {
        self.submit(move |env| Ok(env.render_data(lightweight)?))
    }

    /// Run `f` against the environment on its own thread.
    pub fn with_environment<R, F>(&self, f: F) -> Pending<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut Environment) -> R + Send + 'static,
    {
        self.submit(move |env| Ok(f(env)))
    }
}

// ── EnvironmentActor ───────────────────────────────────────────────

/// An [`Environment`] served by its own thread.
///
/// Every operation enqueues a command and returns a [`Pending`] at once.
/// The actor is `Sync`; share it by reference or hand out
/// [`ActorHandle`]s.
///
/// Dropping a running actor stops it and joins the thread.
#[derive(Debug)]
pub struct EnvironmentActor {
    handle: ActorHandle,
    /// Present while Idle.
    idle: Mutex<Option<(Environment, Receiver<Command>)>>,
    thread: Option<JoinHandle<ThreadExit>>,
    /// Recovered from the thread on stop.
    recovered: Mutex<Option<Environment>>,
    state: ActorState,
}

// Compile-time assertion: callers may share an actor across threads.
const _: () = {
    #[allow(dead_code)]
    fn assert_sync<T: Sync + Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_sync::<EnvironmentActor>();
        assert_sync::<ActorHandle>();
    }
};

impl EnvironmentActor {
    /// Wrap `env` in an idle actor.
    pub fn new(env: Environment) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        Self {
            handle: ActorHandle { cmd_tx },
            idle: Mutex::new(Some((env, cmd_rx))),
            thread: None,
            recovered: Mutex::new(None),
            state: ActorState::Idle,
        }
    }

    /// Build and start an actor in one call.
    pub fn spawn(env: Environment) -> Result<Self, ActorError> {
        let mut actor = Self::new(env);
        actor.start()?;
        Ok(actor)
    }

    /// Spawn the thread. Idempotent while running.
    pub fn start(&mut self) -> Result<(), ActorError> {
        match self.state {
            ActorState::Running => return Ok(()),
            ActorState::Stopped => return Err(ActorError::Stopped),
            ActorState::Idle => {}
        }
        let slot = self.idle.get_mut().unwrap_or_else(PoisonError::into_inner);
        let Some((env, cmd_rx)) = slot.take() else {
            return Err(ActorError::Stopped);
        };
        // Builder::spawn drops the closure on failure, so the environment is
        // lost with it.
        let thread = thread::Builder::new()
            .name("skirmish-env".into())
            .spawn(move || ActorThreadState::new(env, cmd_rx).run())
            .map_err(|e| {
                self.state = ActorState::Stopped;
                ActorError::Spawn {
                    reason: e.to_string(),
                }
            })?;
        self.thread = Some(thread);
        self.state = ActorState::Running;
        tracing::debug!("environment actor started");
        Ok(())
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> ActorState {
        self.state
    }

    /// A cloneable producer for this actor's queue.
    pub fn handle(&self) -> ActorHandle {
        self.handle.clone()
    }

    /// See [`ActorHandle::reset`].
    pub fn reset(&self) -> Pending<StepInfo> {
        self.handle.reset()
    }

    /// See [`ActorHandle::step`].
    pub fn step(&self, actions: Vec<Vec<i32>>, dt: f32) -> Pending<StepInfo> {
        self.handle.step(actions, dt)
    }

    /// See [`ActorHandle::forward`].
    pub fn forward(&self, dt: f32) -> Pending<()> {
        self.handle.forward(dt)
    }

    /// See [`ActorHandle::change_reward`].
    pub fn change_reward(&self, body: BodyIndex, delta: f32) -> Pending<()> {
        self.handle.change_reward(body, delta)
    }

    /// See [`ActorHandle::set_done`].
    pub fn set_done(&self) -> Pending<()> {
        self.handle.set_done()
    }

    /// See [`ActorHandle::state`].
    pub fn state(&self) -> Pending<EnvState> {
        self.handle.state()
    }

    /// See [`ActorHandle::set_state`].
    pub fn set_state(&self, state: EnvState) -> Pending<()> {
        self.handle.set_state(state)
    }

    /// See [`ActorHandle::render_data`].
    pub fn render_data(&self, lightweight: bool) -> Pending<RenderData> {
        self.handle.render_data(lightweight)
    }

    /// See [`ActorHandle::with_environment`].
    pub fn with_environment<R, F>(&self, f: F) -> Pending<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut Environment) -> R + Send + 'static,
    {
        self.handle.with_environment(f)
    }

    /// Stop after everything already queued, join the thread, and keep the
    /// environment for [`take_environment`](Self::take_environment).
    pub fn stop(&mut self) -> ShutdownReport {
        let start = Instant::now();
        let report = match self.state {
            ActorState::Stopped => {
                return ShutdownReport {
                    joined: true,
                    ..ShutdownReport::default()
                }
            }
            ActorState::Idle => {
                let slot = self.idle.get_mut().unwrap_or_else(PoisonError::into_inner);
                match slot.take() {
                    Some((env, cmd_rx)) => {
                        let discarded = cmd_rx.try_iter().count();
                        *self.recovered.get_mut().unwrap_or_else(PoisonError::into_inner) =
                            Some(env);
                        ShutdownReport {
                            joined: true,
                            commands_discarded: discarded,
                            ..ShutdownReport::default()
                        }
                    }
                    None => ShutdownReport::default(),
                }
            }
            ActorState::Running => {
                // If the thread is already gone the send fails; join still
                // reports what happened.
                let _ = self.handle.cmd_tx.send(Command::Stop);
                match self.thread.take().map(JoinHandle::join) {
                    Some(Ok(exit)) => {
                        *self.recovered.get_mut().unwrap_or_else(PoisonError::into_inner) =
                            Some(exit.env);
                        ShutdownReport {
                            joined: true,
                            commands_served: exit.served,
                            commands_discarded: exit.discarded,
                            ..ShutdownReport::default()
                        }
                    }
                    Some(Err(_)) => {
                        tracing::error!("environment thread panicked outside a command");
                        ShutdownReport::default()
                    }
                    None => ShutdownReport::default(),
                }
            }
        };
        self.state = ActorState::Stopped;
        let report = ShutdownReport {
            total_ms: start.elapsed().as_millis() as u64,
            ..report
        };
        tracing::debug!(
            served = report.commands_served,
            discarded = report.commands_discarded,
            total_ms = report.total_ms,
            "environment actor stopped"
        );
        report
    }

    /// The environment, once stopped. Returns `None` before stop or after
    /// it has already been taken.
    pub fn take_environment(&mut self) -> Option<Environment> {
        if self.state != ActorState::Stopped {
            return None;
        }
        self.recovered
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Drop for EnvironmentActor {
    fn drop(&mut self) {
        if self.state != ActorState::Stopped {
            self.stop();
        }
    }
}
