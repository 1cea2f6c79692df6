//! Phase Orchestrator
//!
//! A cooperatively scheduled state machine that walks a review through its
//! phases, reveals each phase's checklist on a staggered schedule, tracks
//! aggregate progress and cancels cleanly.
//!
//! [`Orchestrator`] is the clock-agnostic core: the host advances logical
//! time with [`Orchestrator::advance_to`]. [`OrchestratorHandle`] drives the
//! same core from a tokio task against the wall clock.

pub mod engine;
pub mod events;
pub mod handle;
pub mod state;
pub mod timeline;
pub mod timing;

pub use engine::{Orchestrator, RunHandle};
pub use events::{ChannelSink, EventSink, RecordingSink, RunEvent, TimedEvent};
pub use handle::OrchestratorHandle;
pub use state::{RunState, RunStatus, VisibleItem};
pub use timing::ReviewTiming;
pub use tramite_utils::error::OrchestratorError;
