//! Deferred action queue keyed by a millisecond clock
//!
//! Entries are plain data (no closures) so the queue can be inspected,
//! cleared and replayed. Due entries come out in the order they were scheduled.

use serde::{Deserialize, Serialize};

/// One pending action and the time it becomes due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent<A> {
    pub due_ms: u64,
    pub action: A,
}

/// Time-ordered queue of deferred actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<A> {
    events: Vec<ScheduledEvent<A>>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire once `now_ms + delay_ms` has been reached
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, action: A) {
        self.events.push(ScheduledEvent {
            due_ms: now_ms.saturating_add(delay_ms),
            action,
        });
    }

    /// Remove and return every action due at `now_ms`, in scheduling order
    ///
    /// Anything scheduled while the caller applies the returned actions lands
    /// in the queue for a later call, never this one.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<A> {
        if !self.events.iter().any(|e| e.due_ms <= now_ms) {
            return Vec::new();
        }

        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.events)
            .into_iter()
            .partition(|e| e.due_ms <= now_ms);
        self.events = pending;
        due.into_iter().map(|e| e.action).collect()
    }

    /// Drop every pending action
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Pending entries in scheduling order
    pub fn pending(&self) -> impl Iterator<Item = &ScheduledEvent<A>> {
        self.events.iter()
    }

    /// Pending entries, for amending actions already queued
    pub fn pending_mut(&mut self) -> impl Iterator<Item = &mut ScheduledEvent<A>> {
        self.events.iter_mut()
    }

    /// Earliest due time among pending entries
    pub fn next_due(&self) -> Option<u64> {
        self.events.iter().map(|e| e.due_ms).min()
    }
}
