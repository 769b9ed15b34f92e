//! Per-body reward and score accumulators.

use skirmish_core::BodyIndex;

/// Rewards accumulated during the current step and scores accumulated over
/// the episode, one slot per body.
///
/// Out-of-range indices are ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RewardLedger {
    rewards: Vec<f32>,
    scores: Vec<f32>,
}

impl RewardLedger {
    /// A zeroed ledger for `bodies` bodies.
    pub fn new(bodies: usize) -> Self {
        Self {
            rewards: vec![0.0; bodies],
            scores: vec![0.0; bodies],
        }
    }

    /// Add `delta` to this step's reward for `body`.
    pub fn change_reward(&mut self, body: BodyIndex, delta: f32) {
        if let Some(r) = self.rewards.get_mut(body.get()) {
            *r += delta;
        }
    }

    /// Add `delta` to the episode score for `body`.
    pub fn add_score(&mut self, body: BodyIndex, delta: f32) {
        if let Some(s) = self.scores.get_mut(body.get()) {
            *s += delta;
        }
    }

    /// This step's rewards.
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Episode scores.
    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Overwrite the episode scores. Extra or missing entries are ignored.
    pub fn set_scores(&mut self, scores: &[f32]) {
        for (slot, value) in self.scores.iter_mut().zip(scores) {
            *slot = *value;
        }
    }

    /// Zero this step's rewards.
    pub fn clear_rewards(&mut self) {
        self.rewards.iter_mut().for_each(|r| *r = 0.0);
    }

    /// Zero rewards and scores.
    pub fn reset(&mut self) {
        self.clear_rewards();
        self.scores.iter_mut().for_each(|s| *s = 0.0);
    }
}
