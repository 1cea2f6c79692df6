//! Explicit scheduler for one run: a min-heap of `(due, sequence)` entries.
//!
//! Every entry carries the generation it was scheduled under. The
//! orchestrator bumps its generation on cancel and drops entries from older
//! generations when they surface.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

/// What a scheduled callback does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RevealItem {
        phase_index: usize,
        item_index: usize,
    },
    CompletePhase {
        phase_index: usize,
    },
    Settle,
}

#[derive(Debug, Clone, Copy)]
pub struct Scheduled {
    pub due: Duration,
    pub seq: u64,
    pub generation: u64,
    pub action: Action,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Fire time first, then scheduling order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Default)]
pub struct Timeline {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, generation: u64, action: Action) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled {
            due,
            seq,
            generation,
            action,
        }));
    }

    /// Remove and return the earliest entry due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<Scheduled> {
        match self.heap.peek() {
            Some(Reverse(entry)) if entry.due <= now => self.heap.pop().map(|Reverse(e)| e),
            _ => None,
        }
    }

    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(entry)| entry.due)
    }

    /// Drop every pending entry, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let pending = self.heap.len();
        self.heap.clear();
        pending
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
