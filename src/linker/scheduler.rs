//! RelinkScheduler: task coalescing for relink passes and saves
//!
//! The scheduler records intent only. `schedule(kind, now)` sets (or
//! pushes back) a deadline for that kind; `drain_due(now)` hands back at
//! most one task per kind whose deadline has passed. The caller then runs
//! the task against whatever the state is at that moment, so a pass can
//! never work from a snapshot taken at schedule time.
//!
//! Immediate triggers (card mutations, chapter deletion, document switch)
//! bypass the queue: the caller runs the pass synchronously and cancels
//! any pending debounced relink, which would only repeat it.

use instant::Instant;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LinkerConfig;

// =============================================================================
// Types
// =============================================================================

/// Deferred work the scheduler can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    Relink,
    Save,
}

impl TaskKind {
    pub const ALL: [TaskKind; 2] = [TaskKind::Relink, TaskKind::Save];

    fn slot(self) -> usize {
        match self {
            TaskKind::Relink => 0,
            TaskKind::Save => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Relink => "relink",
            TaskKind::Save => "save",
        }
    }
}

/// Why a relink was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    CardCreated,
    CardUpdated,
    CardDeleted,
    ChapterDeleted,
    DocumentSwitched,
    ProjectImported,
    /// Explicit request from the host
    Manual,
    Keystroke,
}

/// How soon a trigger must be honoured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Latency {
    /// Run before control returns to the caller
    Immediate,
    /// Coalesce behind the quiet period
    Debounced,
}

impl Trigger {
    pub fn latency(self) -> Latency {
        match self {
            Trigger::Keystroke => Latency::Debounced,
            _ => Latency::Immediate,
        }
    }
}

// =============================================================================
// RelinkScheduler
// =============================================================================

/// Pending deadlines, one slot per [`TaskKind`]. Holds no document data.
#[derive(Debug, Clone)]
pub struct RelinkScheduler {
    pending: [Option<Instant>; 2],
    debounce: [Duration; 2],
    /// Requests folded into an already-pending task
    coalesced: u64,
}

impl RelinkScheduler {
    pub fn new(config: &LinkerConfig) -> Self {
        Self {
            pending: [None, None],
            debounce: [config.relink_debounce(), config.save_debounce()],
            coalesced: 0,
        }
    }

    /// Record intent to run `kind` once its quiet period has elapsed.
    /// A pending task of the same kind is superseded: its deadline moves
    /// to `now + debounce`.
    pub fn schedule(&mut self, kind: TaskKind, now: Instant) {
        let slot = kind.slot();
        if self.pending[slot].is_some() {
            self.coalesced += 1;
        }
        self.pending[slot] = Some(now + self.debounce[slot]);
    }

    /// Drop a pending task; returns whether one was pending
    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        self.pending[kind.slot()].take().is_some()
    }

    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.pending[kind.slot()].is_some()
    }

    /// Take every task whose deadline is at or before `now`, at most one
    /// per kind, relink before save.
    pub fn drain_due(&mut self, now: Instant) -> Vec<TaskKind> {
        let mut due = Vec::new();
        for kind in TaskKind::ALL {
            let slot = kind.slot();
            if matches!(self.pending[slot], Some(deadline) if deadline <= now) {
                self.pending[slot] = None;
                due.push(kind);
            }
        }
        due
    }

    /// Earliest pending deadline, for arming a single host timer
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().flatten().min().copied()
    }

    /// Time until the next deadline (zero if already due)
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_deadline().map(|deadline| {
            if deadline > now {
                deadline - now
            } else {
                Duration::ZERO
            }
        })
    }

    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }
}
