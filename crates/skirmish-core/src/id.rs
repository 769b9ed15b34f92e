//! Strongly-typed identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a module within one body's composition graph.
///
/// Allocated sequentially by the graph and never reused, so a stale
/// `ModuleId` fails lookups instead of aliasing a newer module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(pub u32);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ModuleId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a transient entity (a bullet) inside one environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Position of a body in its environment's body list.
///
/// Rewards, scores, and action batches are all indexed by this value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyIndex(pub u32);

impl BodyIndex {
    /// The index as a `usize` for slice access.
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BodyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BodyIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
