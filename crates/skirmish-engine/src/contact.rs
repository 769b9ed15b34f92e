//! Typed contact callbacks.
//!
//! After each physics step the environment turns every contact event into
//! two calls: A's callback with B as the partner, then B's with A. The
//! receiving entity is found by an exhaustive match on
//! [`ParentType`](skirmish_physics::ParentType). Callbacks never reach back
//! into other entities; they record their effects in the
//! [`ContactContext`] and the environment applies them afterwards.

use skirmish_core::BodyIndex;
use skirmish_physics::{EntityKey, ParentType};

use crate::config::RewardConfig;
use crate::reward::RewardLedger;

/// The other side of a contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactPartner {
    /// The partner's key.
    pub key: EntityKey,
    /// For bullets, the body that fired it.
    pub owner: Option<BodyIndex>,
}

impl ContactPartner {
    /// The partner's kind.
    pub fn parent_type(&self) -> ParentType {
        self.key.parent_type
    }

    /// The partner as a body index, if it is a body.
    pub fn as_body(&self) -> Option<BodyIndex> {
        (self.key.parent_type == ParentType::Body).then_some(BodyIndex(self.key.index))
    }
}

/// Shared state contact callbacks write into.
#[derive(Debug)]
pub struct ContactContext<'a> {
    /// Reward accumulator for the current step.
    pub ledger: &'a mut RewardLedger,
    /// Reward magnitudes.
    pub rewards: &'a RewardConfig,
    /// Damage to apply to bodies once dispatch is complete.
    pub hits: Vec<(BodyIndex, f32)>,
}

impl<'a> ContactContext<'a> {
    /// A context with no pending hits.
    pub fn new(ledger: &'a mut RewardLedger, rewards: &'a RewardConfig) -> Self {
        Self {
            ledger,
            rewards,
            hits: Vec::new(),
        }
    }
}

/// An entity that reacts to contacts.
pub trait Collidable {
    /// Called when this entity starts touching `other`.
    fn begin_contact(&mut self, other: ContactPartner, ctx: &mut ContactContext<'_>);

    /// Called when this entity stops touching `other`, including when
    /// `other` is removed from the world.
    fn end_contact(&mut self, other: ContactPartner, ctx: &mut ContactContext<'_>);
}
