//! The policy call shape: observations in, action flags out.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::environment::Environment;

/// Something that chooses actions for every body.
pub trait Policy {
    /// One action vector per body, given one observation vector per body.
    fn act(&mut self, observations: &[Vec<f32>]) -> Vec<Vec<i32>>;
}

/// Uniformly random on/off flags, reproducible from a seed.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    action_counts: Vec<usize>,
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    /// A policy for bodies with the given action counts.
    pub fn new(seed: u64, action_counts: Vec<usize>) -> Self {
        Self {
            action_counts,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// A policy sized to every body in `env`.
    pub fn for_environment(seed: u64, env: &Environment) -> Self {
        Self::new(seed, env.bodies().iter().map(|b| b.input_count()).collect())
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observations: &[Vec<f32>]) -> Vec<Vec<i32>> {
        let rng = &mut self.rng;
        self.action_counts
            .iter()
            .map(|&n| (0..n).map(|_| i32::from(rng.gen_bool(0.5))).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_follow_action_counts() {
        let mut policy = RandomPolicy::new(1, vec![4, 1]);
        let actions = policy.act(&[vec![], vec![]]);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].len(), 4);
        assert_eq!(actions[1].len(), 1);
        assert!(actions.iter().flatten().all(|f| *f == 0 || *f == 1));
    }

    #[test]
    fn same_seed_same_actions() {
        let mut a = RandomPolicy::new(9, vec![8]);
        let mut b = RandomPolicy::new(9, vec![8]);
        for _ in 0..5 {
            assert_eq!(a.act(&[]), b.act(&[]));
        }
    }
}
