//! Scheduled Follow-ups
//!
//! The Controller schedules a handful of delayed, one-shot actions: the
//! carryover auto-send, the crisis follow-up message, and the scroll settle
//! after appends. Each lives in a named slot; scheduling into an occupied
//! slot replaces the pending task, and `cancel_all` aborts everything so a
//! timer can never act on a torn-down session.
//!
//! Fired timers are delivered as values through a channel the Controller
//! drains with `try_recv`, keeping the state machine free of callbacks.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Named slots for scheduled actions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// Auto-send of the staged carryover input
    CarryoverSend,
    /// Delayed coping-strategies follow-up after a crisis reply
    CrisisFollowUp,
    /// Scroll-to-bottom settle after transcript appends
    ScrollToBottom,
}

/// A fired timer, carrying whatever the action needs
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimerFired {
    /// The carryover input should be sent now
    CarryoverSend {
        /// The staged text to send
        text: String,
    },
    /// The crisis follow-up message should be appended now
    CrisisFollowUp,
    /// The transcript should scroll to its end now
    ScrollToBottom,
}

impl TimerFired {
    /// The slot this firing belongs to
    #[must_use]
    pub fn slot(&self) -> TimerSlot {
        match self {
            Self::CarryoverSend { .. } => TimerSlot::CarryoverSend,
            Self::CrisisFollowUp => TimerSlot::CrisisFollowUp,
            Self::ScrollToBottom => TimerSlot::ScrollToBottom,
        }
    }
}

/// Session-scoped timer set
#[derive(Debug)]
pub struct Timers {
    tx: mpsc::Sender<TimerFired>,
    rx: mpsc::Receiver<TimerFired>,
    handles: HashMap<TimerSlot, JoinHandle<()>>,
}

impl Timers {
    /// Create an empty timer set
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(8);
        Self {
            tx,
            rx,
            handles: HashMap::new(),
        }
    }

    /// Schedule `event` to fire after `delay`, replacing any pending task
    /// in the same slot.
    pub fn schedule(&mut self, delay: Duration, event: TimerFired) {
        let slot = event.slot();
        if let Some(previous) = self.handles.remove(&slot) {
            previous.abort();
        }
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session was torn down; nothing to do.
            let _ = tx.send(event).await;
        });
        self.handles.insert(slot, handle);
        self.prune_finished();
    }

    /// Drain one fired timer, if any
    pub fn try_recv(&mut self) -> Option<TimerFired> {
        self.rx.try_recv().ok()
    }

    /// Whether a task is pending in the given slot
    pub fn is_scheduled(&self, slot: TimerSlot) -> bool {
        self.handles
            .get(&slot)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Abort every pending task and discard anything already delivered
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
        while self.rx.try_recv().is_ok() {}
    }

    fn prune_finished(&mut self) {
        self.handles.retain(|_, handle| !handle.is_finished());
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scheduled_timer_fires() {
        let mut timers = Timers::new();
        timers.schedule(Duration::from_millis(5), TimerFired::ScrollToBottom);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(timers.try_recv(), Some(TimerFired::ScrollToBottom));
        assert_eq!(timers.try_recv(), None);
    }

    #[tokio::test]
    async fn test_rescheduling_replaces_pending_task() {
        let mut timers = Timers::new();
        timers.schedule(
            Duration::from_millis(5),
            TimerFired::CarryoverSend {
                text: "first".to_string(),
            },
        );
        timers.schedule(
            Duration::from_millis(5),
            TimerFired::CarryoverSend {
                text: "second".to_string(),
            },
        );

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(
            timers.try_recv(),
            Some(TimerFired::CarryoverSend {
                text: "second".to_string()
            })
        );
        assert_eq!(timers.try_recv(), None);
    }

    #[tokio::test]
    async fn test_cancel_all_prevents_firing() {
        let mut timers = Timers::new();
        timers.schedule(Duration::from_millis(5), TimerFired::CrisisFollowUp);
        timers.cancel_all();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(timers.try_recv(), None);
        assert!(!timers.is_scheduled(TimerSlot::CrisisFollowUp));
    }

    #[tokio::test]
    async fn test_cancel_all_discards_already_fired_timers() {
        let mut timers = Timers::new();
        timers.schedule(Duration::from_millis(1), TimerFired::ScrollToBottom);

        tokio::time::sleep(Duration::from_millis(20)).await;
        timers.cancel_all();
        assert_eq!(timers.try_recv(), None);
    }

    #[tokio::test]
    async fn test_independent_slots_both_fire() {
        let mut timers = Timers::new();
        timers.schedule(Duration::from_millis(5), TimerFired::CrisisFollowUp);
        timers.schedule(Duration::from_millis(5), TimerFired::ScrollToBottom);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let first = timers.try_recv().unwrap();
        let second = timers.try_recv().unwrap();
        assert_ne!(first.slot(), second.slot());
    }
}
