//! One-shot replies from the actor thread.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

use crate::error::ActorError;

/// The eventual result of one queued command.
///
/// Backed by a `bounded(1)` channel whose sender travels with the command.
/// If the command is dropped without running (the actor stopped first),
/// the sender goes with it and the result is [`ActorError::Stopped`].
#[derive(Debug)]
#[must_use = "a Pending does nothing unless waited on"]
pub struct Pending<T> {
    rx: Receiver<Result<T, ActorError>>,
}

impl<T> Pending<T> {
    pub(crate) fn new(rx: Receiver<Result<T, ActorError>>) -> Self {
        Self { rx }
    }

    /// A reply that is already [`ActorError::Stopped`].
    pub(crate) fn stopped() -> Self {
        let (_, rx) = crossbeam_channel::bounded(1);
        Self { rx }
    }

    /// Block until the command has run.
    pub fn wait(self) -> Result<T, ActorError> {
        self.rx.recv().unwrap_or(Err(ActorError::Stopped))
    }

    /// Block for at most `timeout`.
    ///
    /// A timeout does not cancel the command. The reply is delivered once,
    /// so after a successful call later calls report `Stopped`.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<T, ActorError> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ActorError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(ActorError::Stopped),
        }
    }

    /// The result, if it has arrived.
    pub fn try_get(&self) -> Option<Result<T, ActorError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ActorError::Stopped)),
        }
    }
}
