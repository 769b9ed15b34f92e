//! Command loop for the environment thread.
//!
//! The thread owns the [`Environment`] exclusively (moved in via
//! `thread::Builder::spawn`) and returns it when the loop exits, so
//! [`EnvironmentActor::stop`](crate::EnvironmentActor::stop) can hand it
//! back. Commands arrive on an unbounded crossbeam channel; each carries
//! its own `bounded(1)` reply sender.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crossbeam_channel::{Receiver, Sender};

use crate::environment::Environment;
use crate::error::ActorError;

/// Reply side of a [`Pending`](crate::Pending).
pub(crate) type Reply<T> = Sender<Result<T, ActorError>>;

/// A type-erased command bound to its reply channel.
pub(crate) struct Job(Box<dyn FnOnce(&mut Environment) + Send>);

impl Job {
    /// Wrap `f` so that its result, or its panic, lands in `reply`.
    pub fn new<T, F>(f: F, reply: Reply<T>) -> Self
    where
        T: Send + 'static,
        F: FnOnce(&mut Environment) -> Result<T, ActorError> + Send + 'static,
    {
        Self(Box::new(move |env: &mut Environment| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| f(env))).unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::error!(%message, "command panicked");
                Err(ActorError::Panicked { message })
            });
            // The caller may have dropped its Pending.
            let _ = reply.send(result);
        }))
    }

    fn run(self, env: &mut Environment) {
        (self.0)(env)
    }
}

/// Messages on the command queue.
pub(crate) enum Command {
    /// Run a job against the environment.
    Run(Job),
    /// Exit after everything queued before this.
    Stop,
}

/// What the thread hands back on exit.
pub(crate) struct ThreadExit {
    pub env: Environment,
    pub served: u64,
    pub discarded: usize,
}

/// State held by the environment thread's loop.
pub(crate) struct ActorThreadState {
    env: Environment,
    cmd_rx: Receiver<Command>,
}

impl ActorThreadState {
    pub fn new(env: Environment, cmd_rx: Receiver<Command>) -> Self {
        Self { env, cmd_rx }
    }

    /// Serve commands in arrival order until `Stop` or until every sender
    /// is gone.
    pub fn run(mut self) -> ThreadExit {
        tracing::debug!(scenario = self.env.scenario().name(), "environment thread started");
        let mut served = 0u64;
        while let Ok(command) = self.cmd_rx.recv() {
            match command {
                Command::Run(job) => {
                    job.run(&mut self.env);
                    served += 1;
                }
                Command::Stop => break,
            }
        }
        // Anything sent after Stop is dropped here, which resolves its
        // Pending as Stopped.
        let discarded = self.cmd_rx.try_iter().count();
        drop(self.cmd_rx);
        tracing::debug!(served, discarded, "environment thread stopped");
        ThreadExit {
            env: self.env,
            served,
            discarded,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_both_string_kinds() {
        let a: Box<dyn Any + Send> = Box::new("static");
        let b: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let c: Box<dyn Any + Send> = Box::new(3u8);
        assert_eq!(panic_message(a.as_ref()), "static");
        assert_eq!(panic_message(b.as_ref()), "owned");
        assert_eq!(panic_message(c.as_ref()), "non-string panic payload");
    }
}
