// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Deferred work.
//!
//! Time is a plain millisecond counter supplied by the host, so every delay is testable
//! without sleeping.

/// Milliseconds on the host's monotonic clock.
pub type Millis = u64;

/// Kinds of deferred work. At most one task of each kind is pending at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    /// Debounced rebuild after page mutations.
    Refresh,
    /// End of the tracking suppression window that follows a jump.
    ReleaseSuppression,
    /// Position sync after a rebuild.
    ProgressSync,
    /// Restore a row after the copy confirmation.
    CopyFlashRevert,
    /// Debounced panel clamp after a viewport resize.
    ResizeClamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    kind: TaskKind,
    deadline: Millis,
    seq: u64,
}

/// Cancel-and-reschedule timers.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Vec<Pending>,
    next_seq: u64,
}

impl Scheduler {
    /// Schedules `kind` to run `delay` ms after `now`, replacing a pending task of that kind.
    pub fn schedule(&mut self, kind: TaskKind, now: Millis, delay: Millis) {
        self.cancel(kind);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending { kind, deadline: now.saturating_add(delay), seq });
    }

    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|task| task.kind != kind);
        before != self.pending.len()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.pending.iter().any(|task| task.kind == kind)
    }

    pub fn deadline(&self, kind: TaskKind) -> Option<Millis> {
        self.pending.iter().find(|task| task.kind == kind).map(|task| task.deadline)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending.iter().map(|task| task.deadline).min()
    }

    /// Removes and returns the tasks due at `now`, earliest deadline first; tasks sharing a
    /// deadline keep scheduling order.
    pub fn due(&mut self, now: Millis) -> Vec<TaskKind> {
        let mut due = Vec::new();
        self.pending.retain(|task| {
            if task.deadline <= now {
                due.push(*task);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|task| (task.deadline, task.seq));
        due.into_iter().map(|task| task.kind).collect()
    }
}

/// Lets at most one scroll reaction through per rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameGate {
    requested: bool,
}

impl FrameGate {
    /// Requests a frame callback; `false` when one is already queued.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.requested, true)
    }

    /// Consumes the queued request at frame time.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    pub fn clear(&mut self) {
        self.requested = false;
    }
}
