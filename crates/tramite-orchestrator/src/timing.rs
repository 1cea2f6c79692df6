use std::time::Duration;

use tramite_phases::Phase;
use tramite_utils::error::OrchestratorError;

/// Timing knobs for a review run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewTiming {
    /// Time from phase entry to phase completion.
    pub phase_duration: Duration,
    /// Stagger between consecutive checklist items.
    pub item_interval: Duration,
    /// Pause between the last phase completion and `AllPhasesCompleted`.
    pub settle_delay: Duration,
    /// Host-side pause between completion and the delivery step.
    pub confirmation_delay: Duration,
}

impl Default for ReviewTiming {
    fn default() -> Self {
        Self {
            phase_duration: Duration::from_millis(3000),
            item_interval: Duration::from_millis(600),
            settle_delay: Duration::from_millis(500),
            confirmation_delay: Duration::from_millis(1000),
        }
    }
}

impl ReviewTiming {
    /// Check that every phase's item cascade ends before the phase does.
    ///
    /// `phase_duration` must exceed `item_count × item_interval` for each
    /// phase, so all items are visible when the phase completes.
    pub fn check_cascade(&self, phases: &[Phase]) -> Result<(), OrchestratorError> {
        for phase in phases {
            let cascade = self.item_interval.saturating_mul(phase.item_count() as u32);
            if cascade >= self.phase_duration {
                return Err(OrchestratorError::CascadeExceedsPhase {
                    phase_id: phase.id.get(),
                    item_count: phase.item_count(),
                    item_interval_ms: self.item_interval.as_millis() as u64,
                    phase_duration_ms: self.phase_duration.as_millis() as u64,
                });
            }
        }
        Ok(())
    }

    /// Offset from `start` to `AllPhasesCompleted` for `phase_count` phases.
    #[must_use]
    pub fn run_duration(&self, phase_count: usize) -> Duration {
        if phase_count == 0 {
            return Duration::ZERO;
        }
        self.phase_duration.saturating_mul(phase_count as u32) + self.settle_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tramite_phases::review_phases;

    #[test]
    fn test_default_timing_accepts_review_phases() {
        let timing = ReviewTiming::default();
        assert!(timing.check_cascade(&review_phases()).is_ok());
        assert_eq!(timing.run_duration(4), Duration::from_millis(12_500));
    }

    #[test]
    fn test_cascade_equal_to_phase_duration_is_rejected() {
        let timing = ReviewTiming {
            phase_duration: Duration::from_millis(1800),
            ..ReviewTiming::default()
        };
        let err = timing.check_cascade(&review_phases()).unwrap_err();
        assert_eq!(
            err,
            OrchestratorError::CascadeExceedsPhase {
                phase_id: 1,
                item_count: 3,
                item_interval_ms: 600,
                phase_duration_ms: 1800,
            }
        );
    }

    #[test]
    fn test_empty_run_has_zero_duration() {
        assert_eq!(ReviewTiming::default().run_duration(0), Duration::ZERO);
    }
}
