use serde::Serialize;
use tramite_phases::PhaseId;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Phases are being worked through.
    Running,
    /// Every phase is complete; waiting out the settle delay.
    Settling,
    /// `AllPhasesCompleted` has fired.
    Completed,
    /// The run was cancelled before completing.
    Cancelled,
}

impl RunStatus {
    /// Running or settling: timers may still fire.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Settling)
    }
}

/// A checklist item currently shown for the active phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleItem {
    pub phase_id: PhaseId,
    pub item_index: usize,
    pub text: String,
}

/// Mutable per-run state, owned by the orchestrator.
///
/// Hosts read it through [`Orchestrator::state`](crate::Orchestrator::state)
/// snapshots; only scheduled callbacks, `start` and `cancel` change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunState {
    pub run_id: u64,
    pub status: RunStatus,
    /// Completed phases in completion order. Only grows.
    pub completed_phase_ids: Vec<PhaseId>,
    pub active_phase_id: Option<PhaseId>,
    pub visible_items: Vec<VisibleItem>,
    /// `round(100 × completed / total)`, never decreasing.
    pub progress_percent: u8,
    pub terminal_reached: bool,
    pub total_phases: usize,
}

impl RunState {
    pub(crate) fn new(run_id: u64, total_phases: usize) -> Self {
        Self {
            run_id,
            status: RunStatus::Running,
            completed_phase_ids: Vec::with_capacity(total_phases),
            active_phase_id: None,
            visible_items: Vec::new(),
            progress_percent: 0,
            terminal_reached: false,
            total_phases,
        }
    }

    pub(crate) fn mark_completed(&mut self, phase_id: PhaseId) {
        if !self.completed_phase_ids.contains(&phase_id) {
            self.completed_phase_ids.push(phase_id);
        }
        self.progress_percent = progress_percent(self.completed_phase_ids.len(), self.total_phases);
        self.visible_items.retain(|item| item.phase_id != phase_id);
    }
}

/// Aggregate progress, rounded half up. An empty review counts as done.
#[must_use]
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total);
    ((200 * completed + total) / (2 * total)) as u8
}
