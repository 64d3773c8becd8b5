//! Cancellable single-shot timers backing the scheduler's two slots.
//!
//! Aborting a handle is best effort: a task already past its sleep and
//! waiting on the session lock still runs, which is why every fire is also
//! checked against the scheduler epoch.

use tokio::task::JoinHandle;

use crate::scheduler::TimerKind;

#[derive(Debug, Default)]
pub(crate) struct TimerSlots {
    debounce: Option<JoinHandle<()>>,
    stabilize: Option<JoinHandle<()>>,
}

impl TimerSlots {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<JoinHandle<()>> {
        match kind {
            TimerKind::Debounce => &mut self.debounce,
            TimerKind::Stabilize => &mut self.stabilize,
        }
    }

    /// Install a new timer, aborting whatever it supersedes.
    pub(crate) fn replace(&mut self, kind: TimerKind, handle: JoinHandle<()>) {
        if let Some(old) = self.slot(kind).replace(handle) {
            old.abort();
        }
    }

    /// Forget the handle of a timer that is firing right now.
    pub(crate) fn release(&mut self, kind: TimerKind) {
        self.slot(kind).take();
    }

    /// Abort every pending timer.
    pub(crate) fn cancel_all(&mut self) {
        for kind in [TimerKind::Debounce, TimerKind::Stabilize] {
            if let Some(handle) = self.slot(kind).take() {
                handle.abort();
            }
        }
    }

    pub(crate) fn is_pending(&self, kind: TimerKind) -> bool {
        let slot = match kind {
            TimerKind::Debounce => &self.debounce,
            TimerKind::Stabilize => &self.stabilize,
        };
        slot.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TimerSlots {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
