//! Deterministic per-agent timer queue.
//!
//! Timers are keyed by simulation tick rather than wall-clock time so that replaying the same
//! moves fires the same timers on the same ticks. The queue lives inside the agent status and
//! is replicated/replayed along with it.

use std::{cmp::Reverse, collections::BinaryHeap};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    /// Restore one boost charge; reschedules itself while below max.
    BoostRecharge,
    /// Re-enable magnetize after a grazing bounce.
    Remagnetize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerEntry {
    pub due_tick: u64,
    /// Insertion sequence; breaks ties between timers due on the same tick.
    pub seq: u64,
    pub kind: TimerKind,
}

/// Min-heap of scheduled, cancellable, fire-once timers.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<TimerEntry>>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn schedule(&mut self, kind: TimerKind, now_tick: u64, delay_ticks: u64) {
        let entry = TimerEntry {
            due_tick: now_tick + delay_ticks.max(1),
            seq: self.next_seq,
            kind,
        };
        self.next_seq += 1;
        self.heap.push(Reverse(entry));
    }

    /// Schedule unless a timer of the same kind is already pending.
    pub fn schedule_once(&mut self, kind: TimerKind, now_tick: u64, delay_ticks: u64) -> bool {
        if self.is_scheduled(kind) {
            return false;
        }
        self.schedule(kind, now_tick, delay_ticks);
        true
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.heap.retain(|Reverse(entry)| entry.kind != kind);
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.heap.iter().any(|Reverse(entry)| entry.kind == kind)
    }

    /// Pop the earliest timer due at or before `now_tick`.
    pub fn pop_due(&mut self, now_tick: u64) -> Option<TimerKind> {
        match self.heap.peek() {
            Some(Reverse(entry)) if entry.due_tick <= now_tick => {
                self.heap.pop().map(|Reverse(entry)| entry.kind)
            }
            _ => None,
        }
    }

    /// Pending entries in firing order.
    pub fn entries(&self) -> Vec<TimerEntry> {
        let mut entries: Vec<TimerEntry> = self.heap.iter().map(|Reverse(e)| *e).collect();
        entries.sort();
        entries
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Rebuild a queue from persisted entries and sequence counter.
    pub fn from_parts(entries: impl IntoIterator<Item = TimerEntry>, next_seq: u64) -> Self {
        let heap: BinaryHeap<Reverse<TimerEntry>> = entries.into_iter().map(Reverse).collect();
        let next_seq = heap
            .iter()
            .map(|Reverse(e)| e.seq + 1)
            .max()
            .unwrap_or(0)
            .max(next_seq);
        Self { heap, next_seq }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl PartialEq for TimerQueue {
    fn eq(&self, other: &Self) -> bool {
        self.next_seq == other.next_seq && self.entries() == other.entries()
    }
}
