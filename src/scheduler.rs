//! Refresh scheduling state machine.
//!
//! Decides *when* a reload runs. It owns no timers itself: arming produces a
//! [`TimerTicket`] for the session to spawn, and a fired ticket is only
//! honoured if its epoch is still the armed one for its slot. Re-arming or
//! closing the solution bumps the epoch, so late callbacks no-op.
//!
//! ```text
//!            line-changed (restart)          solution-opened
//!   Idle ───────────────────────► Debouncing          │
//!    ▲                               │ fire           ▼
//!    │                               ▼        StabilizingAfterOpen ◄─┐
//!    ├──────────────────────── Refreshing ◄──────────┘ fire          │
//!    │                               │ count changed or zero ────────┘
//!    └── settled / exhausted ◄───────┘   (until retry budget spent)
//!
//!   solution-before-closing: cancel both slots, back to Idle
//! ```

use std::time::Duration;
use tracing::{debug, info};

/// Default quiet period after the last edit.
pub const DEFAULT_EDIT_DEBOUNCE_MS: u64 = 2000;

/// Default delay between polls after a solution opens.
pub const DEFAULT_SOLUTION_OPEN_DELAY_MS: u64 = 3000;

/// Default number of re-polls after a solution opens.
pub const DEFAULT_MAX_OPEN_RETRIES: u32 = 20;

/// Timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Quiet period after the last edit before reloading.
    pub edit_debounce: Duration,
    /// Delay before each post-open poll.
    pub solution_open_delay: Duration,
    /// Re-polls allowed after the first post-open poll.
    pub max_open_retries: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            edit_debounce: Duration::from_millis(DEFAULT_EDIT_DEBOUNCE_MS),
            solution_open_delay: Duration::from_millis(DEFAULT_SOLUTION_OPEN_DELAY_MS),
            max_open_retries: DEFAULT_MAX_OPEN_RETRIES,
        }
    }
}

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Nothing pending
    Idle,
    /// Waiting for edits to go quiet
    Debouncing,
    /// Polling until the task count settles after a solution opened
    StabilizingAfterOpen,
    /// A reload is running
    Refreshing,
}

impl std::fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Debouncing => write!(f, "debouncing"),
            Self::StabilizingAfterOpen => write!(f, "stabilizing"),
            Self::Refreshing => write!(f, "refreshing"),
        }
    }
}

/// The two independent timer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Edit debounce
    Debounce,
    /// Post-open stabilization poll
    Stabilize,
}

/// A request to fire `kind` after `delay`, valid only for `epoch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket {
    pub kind: TimerKind,
    pub epoch: u64,
    pub delay: Duration,
}

/// What to do after a stabilization poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilizeOutcome {
    /// Count still moving or zero; poll again.
    Retry(TimerTicket),
    /// Count repeated; stop polling.
    Settled,
    /// Retry budget spent; stop polling.
    Exhausted,
}

/// Refresh scheduler state.
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    config: SchedulerConfig,
    epoch: u64,
    debounce_armed: Option<u64>,
    stabilize_armed: Option<u64>,
    retry_count: u32,
    last_observed_count: usize,
    refreshing: bool,
}

impl RefreshScheduler {
    /// Create an idle scheduler.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            epoch: 0,
            debounce_armed: None,
            stabilize_armed: None,
            retry_count: 0,
            last_observed_count: 0,
            refreshing: false,
        }
    }

    /// Timing parameters in use.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Current phase. A running reload wins, then stabilization, then debounce.
    #[must_use]
    pub fn phase(&self) -> SchedulerPhase {
        if self.refreshing {
            SchedulerPhase::Refreshing
        } else if self.stabilize_armed.is_some() {
            SchedulerPhase::StabilizingAfterOpen
        } else if self.debounce_armed.is_some() {
            SchedulerPhase::Debouncing
        } else {
            SchedulerPhase::Idle
        }
    }

    /// Re-polls performed since the last solution-opened signal.
    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Task count seen by the last stabilization poll.
    #[must_use]
    pub fn last_observed_count(&self) -> usize {
        self.last_observed_count
    }

    fn arm(&mut self, kind: TimerKind) -> TimerTicket {
        self.epoch += 1;
        let delay = match kind {
            TimerKind::Debounce => {
                self.debounce_armed = Some(self.epoch);
                self.config.edit_debounce
            }
            TimerKind::Stabilize => {
                self.stabilize_armed = Some(self.epoch);
                self.config.solution_open_delay
            }
        };
        TimerTicket {
            kind,
            epoch: self.epoch,
            delay,
        }
    }

    /// An edit happened: (re)start the debounce timer.
    pub fn line_changed(&mut self) -> TimerTicket {
        let restarted = self.debounce_armed.is_some();
        let ticket = self.arm(TimerKind::Debounce);
        if restarted {
            debug!("Debounce restarted (epoch {})", ticket.epoch);
        }
        ticket
    }

    /// A solution opened: reset stabilization and arm the first poll.
    pub fn solution_opened(&mut self) -> TimerTicket {
        self.retry_count = 0;
        self.last_observed_count = 0;
        let ticket = self.arm(TimerKind::Stabilize);
        info!("Solution opened, stabilizing (epoch {})", ticket.epoch);
        ticket
    }

    /// The solution is closing: every armed timer becomes stale.
    pub fn solution_closing(&mut self) {
        self.epoch += 1;
        self.debounce_armed = None;
        self.stabilize_armed = None;
        self.refreshing = false;
        debug!("Timers cancelled for solution close (epoch {})", self.epoch);
    }

    /// A timer fired. Returns true if the ticket is current, in which case
    /// the slot is disarmed and the scheduler enters `Refreshing`.
    pub fn begin_fire(&mut self, ticket: &TimerTicket) -> bool {
        let slot = match ticket.kind {
            TimerKind::Debounce => &mut self.debounce_armed,
            TimerKind::Stabilize => &mut self.stabilize_armed,
        };
        if *slot != Some(ticket.epoch) {
            debug!("Ignoring stale {:?} timer (epoch {})", ticket.kind, ticket.epoch);
            return false;
        }
        *slot = None;
        self.refreshing = true;
        true
    }

    /// A debounce-driven reload finished.
    pub fn finish_debounce(&mut self) {
        self.refreshing = false;
    }

    /// A stabilization poll finished having observed `count` tasks.
    ///
    /// Only the count is compared, so content churn at a constant count
    /// reads as settled.
    pub fn finish_stabilize(&mut self, count: usize) -> StabilizeOutcome {
        self.refreshing = false;

        if self.retry_count >= self.config.max_open_retries {
            info!(
                "Stabilization gave up after {} retries ({} tasks)",
                self.retry_count, count
            );
            return StabilizeOutcome::Exhausted;
        }
        if count != 0 && count == self.last_observed_count {
            info!("Task count settled at {count}");
            return StabilizeOutcome::Settled;
        }

        self.last_observed_count = count;
        self.retry_count += 1;
        StabilizeOutcome::Retry(self.arm(TimerKind::Stabilize))
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
