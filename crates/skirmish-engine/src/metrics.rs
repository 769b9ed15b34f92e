//! Per-step performance counters.
//!
//! [`StepMetrics`] is filled by every [`Environment::step`](crate::Environment::step)
//! and read back through
//! [`Environment::last_metrics`](crate::Environment::last_metrics).

/// Timing and entity counts for a single step.
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the whole step.
    pub total_us: u64,
    /// Time spent inside the physics pipeline.
    pub physics_us: u64,
    /// Contact events dispatched after the physics step.
    pub contacts_dispatched: u32,
    /// Bullets alive at the end of the step.
    pub bullets_live: u32,
    /// Bullets fired during the step.
    pub bullets_spawned: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.physics_us, 0);
        assert_eq!(m.contacts_dispatched, 0);
        assert_eq!(m.bullets_live, 0);
        assert_eq!(m.bullets_spawned, 0);
    }
}
