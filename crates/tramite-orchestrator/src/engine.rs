//! Clock-agnostic orchestrator core.

use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;
use tramite_phases::Phase;
use tramite_utils::error::OrchestratorError;
use tramite_utils::logging::{log_phase_complete, log_phase_start, log_run_cancelled, phase_span};

use crate::events::{EventSink, RunEvent};
use crate::state::{RunState, RunStatus, VisibleItem};
use crate::timeline::{Action, Scheduled, Timeline};
use crate::timing::ReviewTiming;

/// Token identifying one run. Cheap to copy; stale tokens are harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunHandle {
    run_id: u64,
}

impl RunHandle {
    #[must_use]
    pub fn run_id(self) -> u64 {
        self.run_id
    }
}

struct ActiveRun {
    handle: RunHandle,
    phases: Vec<Phase>,
    state: RunState,
}

/// Review simulation state machine driven by a logical clock.
///
/// The host owns time: [`advance_to`](Self::advance_to) fires every callback
/// due up to the given offset, in `(due, scheduling order)` order. One run
/// may be active at a time; [`start`](Self::start) rejects a second one.
///
/// ```rust
/// use std::time::Duration;
/// use tramite_orchestrator::{Orchestrator, RecordingSink, ReviewTiming, RunEvent};
/// use tramite_phases::review_phases;
///
/// let mut orchestrator = Orchestrator::new(ReviewTiming::default(), RecordingSink::new());
/// orchestrator.start(&review_phases()).unwrap();
/// orchestrator.advance_to(Duration::from_millis(12_500));
///
/// let last = orchestrator.sink().events().last().unwrap();
/// assert_eq!(last.event, RunEvent::AllPhasesCompleted);
/// assert_eq!(orchestrator.state().unwrap().progress_percent, 100);
/// ```
pub struct Orchestrator<S: EventSink> {
    timing: ReviewTiming,
    sink: S,
    timeline: Timeline,
    now: Duration,
    /// Bumped on every start and cancel; entries from older generations are dead.
    generation: u64,
    next_run_id: u64,
    run: Option<ActiveRun>,
}

impl<S: EventSink> Orchestrator<S> {
    #[must_use]
    pub fn new(timing: ReviewTiming, sink: S) -> Self {
        Self {
            timing,
            sink,
            timeline: Timeline::new(),
            now: Duration::ZERO,
            generation: 0,
            next_run_id: 1,
            run: None,
        }
    }

    /// Begin a run over `phases`.
    ///
    /// Phase 1 is entered at the current offset and its callbacks are
    /// scheduled immediately. An empty list completes at once with 100%
    /// progress and a single `AllPhasesCompleted`.
    ///
    /// # Errors
    ///
    /// - [`OrchestratorError::RunInProgress`] while another run is active.
    /// - [`OrchestratorError::DuplicatePhaseId`] when two phases share an id.
    /// - [`OrchestratorError::CascadeExceedsPhase`] when a phase's checklist
    ///   would not finish revealing before the phase completes.
    pub fn start(&mut self, phases: &[Phase]) -> Result<RunHandle, OrchestratorError> {
        if let Some(run) = &self.run
            && run.state.status.is_active()
        {
            return Err(OrchestratorError::RunInProgress {
                run_id: run.handle.run_id,
            });
        }
        check_unique_ids(phases)?;
        self.timing.check_cascade(phases)?;

        self.generation += 1;
        self.timeline.clear();

        let handle = RunHandle {
            run_id: self.next_run_id,
        };
        self.next_run_id += 1;

        let mut state = RunState::new(handle.run_id, phases.len());
        debug!(run_id = handle.run_id, phase_count = phases.len(), "Starting review run");

        if phases.is_empty() {
            state.progress_percent = 100;
            state.terminal_reached = true;
            state.status = RunStatus::Completed;
            self.run = Some(ActiveRun {
                handle,
                phases: Vec::new(),
                state,
            });
            self.sink.emit(self.now, RunEvent::AllPhasesCompleted);
            return Ok(handle);
        }

        self.run = Some(ActiveRun {
            handle,
            phases: phases.to_vec(),
            state,
        });
        self.enter_phase(0);

        Ok(handle)
    }

    /// Invalidate every pending callback of `handle`'s run.
    ///
    /// Idempotent. A handle for a run that already finished, was already
    /// cancelled or has been superseded is ignored.
    pub fn cancel(&mut self, handle: RunHandle) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        if run.handle != handle || !run.state.status.is_active() {
            return;
        }

        self.generation += 1;
        let pending = self.timeline.clear();
        run.state.status = RunStatus::Cancelled;
        log_run_cancelled(handle.run_id, pending);
    }

    /// Fire every callback due at or before `target`. Returns how many fired.
    ///
    /// The clock never moves backwards; an earlier `target` is a no-op.
    pub fn advance_to(&mut self, target: Duration) -> usize {
        if target < self.now {
            return 0;
        }

        let mut fired = 0;
        while let Some(entry) = self.timeline.pop_due(target) {
            self.now = entry.due;
            if self.fire(entry) {
                fired += 1;
            }
        }
        self.now = target;
        fired
    }

    pub fn advance_by(&mut self, delta: Duration) -> usize {
        self.advance_to(self.now.saturating_add(delta))
    }

    /// Offset of the next pending callback, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.timeline.next_due()
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn timing(&self) -> &ReviewTiming {
        &self.timing
    }

    /// State of the latest run, kept after it completes or is cancelled.
    #[must_use]
    pub fn state(&self) -> Option<&RunState> {
        self.run.as_ref().map(|run| &run.state)
    }

    #[must_use]
    pub fn current_handle(&self) -> Option<RunHandle> {
        self.run.as_ref().map(|run| run.handle)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| run.state.status.is_active())
    }

    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.timeline.len()
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn enter_phase(&mut self, phase_index: usize) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let Some(phase) = run.phases.get(phase_index) else {
            return;
        };

        let _span = phase_span(run.handle.run_id, phase.id.get(), &phase.name).entered();
        log_phase_start(
            run.handle.run_id,
            phase.id.get(),
            &phase.name,
            phase.item_count(),
        );

        run.state.active_phase_id = Some(phase.id);
        let entry = self.now;
        for item_index in 0..phase.item_count() {
            let offset = self.timing.item_interval.saturating_mul(item_index as u32);
            self.timeline.schedule(
                entry + offset,
                self.generation,
                Action::RevealItem {
                    phase_index,
                    item_index,
                },
            );
        }
        self.timeline.schedule(
            entry + self.timing.phase_duration,
            self.generation,
            Action::CompletePhase { phase_index },
        );

        self.sink.emit(
            self.now,
            RunEvent::PhaseStarted {
                phase_id: phase.id,
                title: phase.title.clone(),
            },
        );
    }

    fn fire(&mut self, entry: Scheduled) -> bool {
        if entry.generation != self.generation {
            return false;
        }
        let Some(run) = self.run.as_mut() else {
            return false;
        };
        if !run.state.status.is_active() {
            return false;
        }

        match entry.action {
            Action::RevealItem {
                phase_index,
                item_index,
            } => {
                let Some(phase) = run.phases.get(phase_index) else {
                    return false;
                };
                let Some(text) = phase.items.get(item_index) else {
                    return false;
                };
                run.state.visible_items.push(VisibleItem {
                    phase_id: phase.id,
                    item_index,
                    text: text.clone(),
                });
                self.sink.emit(
                    self.now,
                    RunEvent::ItemRevealed {
                        phase_id: phase.id,
                        item_index,
                        text: text.clone(),
                    },
                );
            }
            Action::CompletePhase { phase_index } => {
                let Some(phase) = run.phases.get(phase_index) else {
                    return false;
                };
                let phase_id = phase.id;
                run.state.mark_completed(phase_id);
                let progress = run.state.progress_percent;
                log_phase_complete(run.handle.run_id, phase_id.get(), &phase.name, progress);
                self.sink.emit(
                    self.now,
                    RunEvent::PhaseCompleted {
                        phase_id,
                        progress_percent: progress,
                    },
                );

                if phase_index + 1 < run.phases.len() {
                    self.enter_phase(phase_index + 1);
                } else {
                    run.state.active_phase_id = None;
                    run.state.terminal_reached = true;
                    run.state.status = RunStatus::Settling;
                    self.timeline.schedule(
                        self.now + self.timing.settle_delay,
                        self.generation,
                        Action::Settle,
                    );
                }
            }
            Action::Settle => {
                run.state.status = RunStatus::Completed;
                debug!(run_id = run.handle.run_id, "Review run completed");
                self.sink.emit(self.now, RunEvent::AllPhasesCompleted);
            }
        }
        true
    }
}

/// Completion and item bookkeeping are keyed by phase id.
fn check_unique_ids(phases: &[Phase]) -> Result<(), OrchestratorError> {
    let mut seen = HashSet::with_capacity(phases.len());
    match phases.iter().find(|phase| !seen.insert(phase.id)) {
        Some(phase) => Err(OrchestratorError::DuplicatePhaseId {
            phase_id: phase.id.get(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use tramite_phases::{PhaseId, review_phases};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn orchestrator() -> Orchestrator<RecordingSink> {
        Orchestrator::new(ReviewTiming::default(), RecordingSink::new())
    }

    #[test]
    fn test_first_item_fires_on_first_advance() {
        let mut orch = orchestrator();
        orch.start(&review_phases()).unwrap();

        assert_eq!(orch.sink().events().len(), 1);
        assert_eq!(orch.next_due(), Some(Duration::ZERO));

        orch.advance_to(Duration::ZERO);
        let state = orch.state().unwrap();
        assert_eq!(state.visible_items.len(), 1);
        assert_eq!(state.active_phase_id, Some(PhaseId(1)));
    }

    #[test]
    fn test_items_visible_then_cleared_on_completion() {
        let mut orch = orchestrator();
        orch.start(&review_phases()).unwrap();

        orch.advance_to(ms(2999));
        assert_eq!(orch.state().unwrap().visible_items.len(), 3);

        orch.advance_to(ms(3000));
        let state = orch.state().unwrap();
        assert_eq!(state.completed_phase_ids, vec![PhaseId(1)]);
        assert_eq!(state.progress_percent, 25);
        assert_eq!(state.active_phase_id, Some(PhaseId(2)));
        // Phase 2's first item is due at the same offset it was entered.
        assert_eq!(state.visible_items.len(), 1);
        assert_eq!(state.visible_items[0].phase_id, PhaseId(2));
    }

    #[test]
    fn test_settling_then_completed() {
        let mut orch = orchestrator();
        orch.start(&review_phases()).unwrap();

        orch.advance_to(ms(12_000));
        let state = orch.state().unwrap();
        assert!(state.terminal_reached);
        assert_eq!(state.status, RunStatus::Settling);
        assert_eq!(state.active_phase_id, None);
        assert!(orch.is_active());

        orch.advance_to(ms(12_499));
        assert_eq!(orch.state().unwrap().status, RunStatus::Settling);

        orch.advance_to(ms(12_500));
        assert_eq!(orch.state().unwrap().status, RunStatus::Completed);
        assert!(!orch.is_active());
        assert_eq!(orch.next_due(), None);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut orch = orchestrator();
        orch.start(&review_phases()).unwrap();
        orch.advance_to(ms(1000));

        assert_eq!(orch.advance_to(ms(500)), 0);
        assert_eq!(orch.now(), ms(1000));
    }

    #[test]
    fn test_advance_by_accumulates() {
        let mut orch = orchestrator();
        orch.start(&review_phases()).unwrap();

        orch.advance_by(ms(1500));
        orch.advance_by(ms(1500));

        assert_eq!(orch.now(), ms(3000));
        assert_eq!(orch.state().unwrap().progress_percent, 25);
    }

    #[test]
    fn test_cancel_clears_pending_callbacks() {
        let mut orch = orchestrator();
        let handle = orch.start(&review_phases()).unwrap();
        assert!(orch.pending_callbacks() > 0);

        orch.cancel(handle);

        assert_eq!(orch.pending_callbacks(), 0);
        assert_eq!(orch.state().unwrap().status, RunStatus::Cancelled);
        assert!(!orch.is_active());
    }

    #[test]
    fn test_stale_handle_does_not_cancel_new_run() {
        let mut orch = orchestrator();
        let first = orch.start(&review_phases()).unwrap();
        orch.cancel(first);
        let second = orch.start(&review_phases()).unwrap();

        orch.cancel(first);

        assert!(orch.is_active());
        assert_eq!(orch.current_handle(), Some(second));
        assert_ne!(first.run_id(), second.run_id());
    }

    #[test]
    fn test_restart_after_cancel_starts_from_zero_progress() {
        let mut orch = orchestrator();
        let first = orch.start(&review_phases()).unwrap();
        orch.advance_to(ms(6000));
        orch.cancel(first);

        orch.start(&review_phases()).unwrap();
        let state = orch.state().unwrap();

        assert_eq!(state.progress_percent, 0);
        assert!(state.completed_phase_ids.is_empty());
        assert_eq!(state.status, RunStatus::Running);
    }

    #[test]
    fn test_duplicate_phase_ids_are_rejected() {
        let mut orch = orchestrator();
        let phases = vec![
            Phase::new(1, "Uno", "Primera", ["a"]),
            Phase::new(1, "Otra", "Repetida", ["b"]),
        ];

        let err = orch.start(&phases).unwrap_err();

        assert!(matches!(err, OrchestratorError::DuplicatePhaseId { phase_id: 1 }));
        assert!(orch.state().is_none());
        assert!(orch.sink().events().is_empty());
        assert_eq!(orch.pending_callbacks(), 0);
    }

    #[test]
    fn test_advance_by_saturates_on_huge_delta() {
        let mut orch = orchestrator();
        orch.start(&review_phases()).unwrap();
        orch.advance_by(ms(1000));

        orch.advance_by(Duration::MAX);

        assert_eq!(orch.now(), Duration::MAX);
        assert_eq!(orch.state().unwrap().status, RunStatus::Completed);
    }
}
