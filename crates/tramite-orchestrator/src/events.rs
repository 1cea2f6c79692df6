use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tramite_phases::PhaseId;

/// Host-visible notifications, pushed in fire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// A phase became active. Carries the display title.
    PhaseStarted { phase_id: PhaseId, title: String },
    ItemRevealed {
        phase_id: PhaseId,
        item_index: usize,
        text: String,
    },
    PhaseCompleted {
        phase_id: PhaseId,
        progress_percent: u8,
    },
    /// Fires exactly once per run, after the last `PhaseCompleted`.
    AllPhasesCompleted,
}

/// An event stamped with the logical offset from `start` it fired at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimedEvent {
    #[serde(rename = "at_ms", serialize_with = "serialize_millis")]
    pub at: Duration,
    #[serde(flatten)]
    pub event: RunEvent,
}

fn serialize_millis<S: serde::Serializer>(at: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(at.as_millis() as u64)
}

/// Receiver of run events.
pub trait EventSink {
    fn emit(&mut self, at: Duration, event: RunEvent);
}

impl<F> EventSink for F
where
    F: FnMut(Duration, RunEvent),
{
    fn emit(&mut self, at: Duration, event: RunEvent) {
        self(at, event);
    }
}

/// Collects events in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<TimedEvent>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<TimedEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, at: Duration, event: RunEvent) {
        self.events.push(TimedEvent { at, event });
    }
}

/// Forwards events over an unbounded tokio channel.
///
/// Closing the sink drops the sender so receivers observe end-of-stream.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Option<UnboundedSender<TimedEvent>>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(tx: UnboundedSender<TimedEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn close(&mut self) {
        self.tx = None;
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().is_none_or(|tx| tx.is_closed())
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, at: Duration, event: RunEvent) {
        if let Some(tx) = &self.tx {
            // A dropped receiver only means nobody is listening any more.
            let _ = tx.send(TimedEvent { at, event });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |at: Duration, event: RunEvent| seen.push((at, event));
            sink.emit(Duration::from_millis(5), RunEvent::AllPhasesCompleted);
        }
        assert_eq!(
            seen,
            vec![(Duration::from_millis(5), RunEvent::AllPhasesCompleted)]
        );
    }

    #[test]
    fn test_channel_sink_close_ends_stream() {
        let (tx, mut rx) = unbounded_channel();
        let mut sink = ChannelSink::new(tx);

        sink.emit(Duration::ZERO, RunEvent::AllPhasesCompleted);
        sink.close();
        sink.emit(Duration::ZERO, RunEvent::AllPhasesCompleted);

        assert!(sink.is_closed());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = TimedEvent {
            at: Duration::from_millis(600),
            event: RunEvent::ItemRevealed {
                phase_id: PhaseId(2),
                item_index: 1,
                text: "Revisando".into(),
            },
        };
        let json = tramite_utils::canonicalization::emit_jcs(&event).unwrap();
        assert_eq!(
            json,
            r#"{"at_ms":600,"event":"item_revealed","item_index":1,"phase_id":2,"text":"Revisando"}"#
        );
    }
}
