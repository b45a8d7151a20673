//! Deferred actions keyed by session generation
//!
//! Staggered effects (zen-mode toggles, spaced-out messages) are queued here
//! and polled once per tick. Every task remembers the session generation it
//! was scheduled in; a restart bumps the generation and stale tasks are
//! discarded instead of firing.

use crate::settings::Feature;

/// Something to do later
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    SetFeature(Feature, bool),
    ClearMessages,
    PostMessage { text: String, duration_ms: f64 },
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    due_ms: f64,
    generation: u32,
    /// Insertion order, breaks ties between equal due times
    seq: u64,
    action: DeferredAction,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    tasks: Vec<ScheduledTask>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, generation: u32, due_ms: f64, action: DeferredAction) {
        self.tasks.push(ScheduledTask {
            due_ms,
            generation,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Remove and return actions due by `now_ms` for `generation`, earliest first
    ///
    /// Tasks from any other generation are dropped.
    pub fn take_due(&mut self, generation: u32, now_ms: f64) -> Vec<DeferredAction> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.generation == generation);
        let stale = before - self.tasks.len();
        if stale > 0 {
            log::debug!("Dropped {} stale deferred task(s)", stale);
        }

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|t| t.due_ms <= now_ms);
        self.tasks = pending;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|t| t.action).collect()
    }

    /// Drop every task not belonging to `generation`
    pub fn cancel_stale(&mut self, generation: u32) {
        self.tasks.retain(|t| t.generation == generation);
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// True when a queued task of `generation` matches `pred`
    pub fn any_pending(&self, generation: u32, pred: impl Fn(&DeferredAction) -> bool) -> bool {
        self.tasks
            .iter()
            .any(|t| t.generation == generation && pred(&t.action))
    }
}
