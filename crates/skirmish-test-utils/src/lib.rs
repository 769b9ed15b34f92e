//! Test fixtures and helpers for Skirmish development.
//!
//! Provides ready-made [`ShipDescription`]s and a [`ScriptedActions`]
//! source for driving environments from tests and benches without a
//! learned policy.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{base_only, describe, fighter, gunboat, scout, two_fighters};

/// Replays a fixed sequence of action batches, then idles.
///
/// Each frame is one action vector per body. Once the script runs out,
/// every body gets all-zero flags of the length seen in the first frame.
pub struct ScriptedActions {
    frames: Vec<Vec<Vec<i32>>>,
    cursor: usize,
    idle: Vec<Vec<i32>>,
}

impl ScriptedActions {
    pub fn new(frames: Vec<Vec<Vec<i32>>>) -> Self {
        let idle = frames
            .first()
            .map(|f| f.iter().map(|a| vec![0; a.len()]).collect())
            .unwrap_or_default();
        Self {
            frames,
            cursor: 0,
            idle,
        }
    }

    /// A script that holds the same frame for `steps` steps.
    pub fn repeat(frame: Vec<Vec<i32>>, steps: usize) -> Self {
        Self::new(vec![frame; steps])
    }

    /// All-zero flags for bodies with the given action counts.
    pub fn idle(action_counts: &[usize]) -> Vec<Vec<i32>> {
        action_counts.iter().map(|n| vec![0; *n]).collect()
    }

    /// The next frame.
    pub fn next_frame(&mut self) -> Vec<Vec<i32>> {
        match self.frames.get(self.cursor) {
            Some(frame) => {
                self.cursor += 1;
                frame.clone()
            }
            None => self.idle.clone(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.cursor)
    }
}
