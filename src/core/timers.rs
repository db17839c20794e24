//! Scheduled effects
//!
//! All delayed work (session disposal grace, resize debouncing, streamed
//! output pacing) goes through one explicit timer queue drained by the
//! event loop, instead of ad hoc timers buried in handlers. Entries fire in
//! deadline order; ties fire in insertion order so streamed lines never
//! reorder.

use std::time::{Duration, Instant};

use super::output::OutputKind;
use super::session::SessionId;

/// Work to perform when a timer fires
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimerAction {
    /// Release a closed session's display resources
    DisposeSession(SessionId),
    /// Apply a debounced terminal resize
    ApplyResize { cols: u16, rows: u16 },
    /// Write one paced output line to a session's screen
    EmitLine {
        session: SessionId,
        text: String,
        kind: OutputKind,
    },
}

/// Timer queue drained by the event loop
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
    next_seq: u64,
}

struct Entry {
    deadline: Instant,
    seq: u64,
    action: TimerAction,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire `delay` from `now`
    pub fn schedule(&mut self, now: Instant, delay: Duration, action: TimerAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            deadline: now + delay,
            seq,
            action,
        });
    }

    /// Debounced resize: replaces any pending resize so only the last
    /// geometry within the quiet window is applied.
    pub fn schedule_resize(&mut self, now: Instant, delay: Duration, cols: u16, rows: u16) {
        self.entries
            .retain(|entry| !matches!(entry.action, TimerAction::ApplyResize { .. }));
        self.schedule(now, delay, TimerAction::ApplyResize { cols, rows });
    }

    /// Remove and return every action due at `now`, in firing order
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerAction> {
        let mut due: Vec<Entry> = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            if self.entries[index].deadline <= now {
                due.push(self.entries.swap_remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|entry| (entry.deadline, entry.seq));
        due.into_iter().map(|entry| entry.action).collect()
    }

    /// Whether anything is still queued
    #[allow(dead_code)]
    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }
}
