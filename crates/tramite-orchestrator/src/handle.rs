//! Wall-clock driver for the orchestrator.
//!
//! **Integration rule**: hosts that want real timers use `OrchestratorHandle`;
//! the bare [`Orchestrator`] is for hosts that own their clock, and for tests.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::debug;
use tramite_phases::Phase;
use tramite_utils::error::OrchestratorError;

use crate::engine::{Orchestrator, RunHandle};
use crate::events::{ChannelSink, RunEvent, TimedEvent};
use crate::state::{RunState, RunStatus};
use crate::timing::ReviewTiming;

type Shared = Arc<Mutex<Orchestrator<ChannelSink>>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Orchestrator<ChannelSink>> {
    // A panic inside a callback leaves the state consistent enough to cancel.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One review run driven by a tokio task against the wall clock.
///
/// # Overview
///
/// `OrchestratorHandle::start` spawns a task that sleeps until the next due
/// callback and advances the orchestrator to it. Events arrive on an
/// unbounded channel in fire order; read them with
/// [`next_event`](Self::next_event) or wait for the end with
/// [`wait_for_completion`](Self::wait_for_completion).
///
/// # Cancellation
///
/// [`cancel`](Self::cancel) takes the orchestrator lock and invalidates all
/// pending callbacks before returning, so no event is produced afterwards.
/// Dropping the handle cancels the run; this is how host teardown is
/// expressed.
///
/// # Example
///
/// ```rust,no_run
/// use tramite_orchestrator::{OrchestratorHandle, ReviewTiming, RunEvent};
/// use tramite_phases::review_phases;
///
/// # async fn demo() -> Result<(), tramite_orchestrator::OrchestratorError> {
/// let mut handle = OrchestratorHandle::start(review_phases(), ReviewTiming::default())?;
/// while let Some(timed) = handle.next_event().await {
///     if let RunEvent::PhaseCompleted { progress_percent, .. } = timed.event {
///         println!("{progress_percent}%");
///     }
/// }
/// # Ok(())
/// # }
/// ```
///
/// Must be created inside a tokio runtime.
pub struct OrchestratorHandle {
    shared: Shared,
    run: RunHandle,
    events: UnboundedReceiver<TimedEvent>,
    driver: JoinHandle<()>,
    completed: bool,
}

impl OrchestratorHandle {
    /// Start a run and spawn its driver task.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::CascadeExceedsPhase`] when the timing
    /// cannot fit a phase's checklist.
    pub fn start(phases: Vec<Phase>, timing: ReviewTiming) -> Result<Self, OrchestratorError> {
        let (tx, rx) = unbounded_channel();
        let mut orchestrator = Orchestrator::new(timing, ChannelSink::new(tx));
        let run = orchestrator.start(&phases)?;
        if !orchestrator.is_active() {
            orchestrator.sink_mut().close();
        }

        let shared: Shared = Arc::new(Mutex::new(orchestrator));
        let driver = tokio::spawn(drive(Arc::clone(&shared), Instant::now()));

        Ok(Self {
            shared,
            run,
            events: rx,
            driver,
            completed: false,
        })
    }

    #[must_use]
    pub fn run_handle(&self) -> RunHandle {
        self.run
    }

    /// Snapshot of the run state.
    #[must_use]
    pub fn state(&self) -> Option<RunState> {
        lock(&self.shared).state().cloned()
    }

    /// Cancel the run. Idempotent.
    pub fn cancel(&self) {
        let mut orchestrator = lock(&self.shared);
        orchestrator.cancel(self.run);
        orchestrator.sink_mut().close();
        self.driver.abort();
    }

    /// Next event, or `None` once the run has completed or been cancelled
    /// and every event before that point has been read.
    pub async fn next_event(&mut self) -> Option<TimedEvent> {
        let event = self.events.recv().await?;
        if event.event == RunEvent::AllPhasesCompleted {
            self.completed = true;
        }
        Some(event)
    }

    /// Drain events until the run ends, passing each to `observer`.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Cancelled`] when the run ended without
    /// `AllPhasesCompleted`.
    pub async fn wait_for_completion<F>(&mut self, mut observer: F) -> Result<RunState, OrchestratorError>
    where
        F: FnMut(&TimedEvent),
    {
        while let Some(event) = self.next_event().await {
            observer(&event);
        }

        match self.state() {
            Some(state) if self.completed && state.status == RunStatus::Completed => Ok(state),
            _ => Err(OrchestratorError::Cancelled {
                run_id: self.run.run_id(),
            }),
        }
    }
}

impl fmt::Debug for OrchestratorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrchestratorHandle")
            .field("run_id", &self.run.run_id())
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

impl Drop for OrchestratorHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn drive(shared: Shared, origin: Instant) {
    loop {
        let next = lock(&shared).next_due();
        let Some(due) = next else {
            break;
        };

        sleep_until(origin + due).await;

        let mut orchestrator = lock(&shared);
        orchestrator.advance_to(due);
        if !orchestrator.is_active() {
            orchestrator.sink_mut().close();
            break;
        }
    }
    debug!("Review driver finished");
}
