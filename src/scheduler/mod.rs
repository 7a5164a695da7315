//! Refresh timing for the feed view.
//!
//! [`RefreshScheduler`] is a pure state machine: it is fed triggers together
//! with the current instant and answers with a [`Directive`]. The driver in
//! [`runtime`] owns the single timer and the in-flight refresh, and is the
//! only thing that feeds the machine.

pub mod interval;
pub mod runtime;

use std::time::Duration;

use tokio::time::Instant;

pub use interval::MAX_INTERVAL;
pub use runtime::{spawn_scheduler, RefreshTarget, SchedulerHandle};

pub const DEFAULT_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_MIN_BUSY_MS: u64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    /// Fired when the view opens.
    Initial,
    Periodic,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No live view; no timer.
    Idle,
    Armed { deadline: Instant },
    Refreshing { kind: RefreshKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ViewOpened,
    Tick,
    Interact,
    ManualRefresh,
    RefreshFinished,
    ViewClosed,
}

/// What the driver has to do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Nothing,
    Start(RefreshKind),
    /// A manual refresh joined the refresh already in flight: raise the busy
    /// flag but do not fetch again.
    Adopt,
}

#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    state: SchedulerState,
    interval: Duration,
}

impl RefreshScheduler {
    /// The interval is capped at [`MAX_INTERVAL`].
    pub fn new(interval: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            interval: interval.min(MAX_INTERVAL),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the periodic timer fires next, if it is armed.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Armed { deadline } => Some(deadline),
            _ => None,
        }
    }

    pub fn handle(&mut self, trigger: Trigger, now: Instant) -> Directive {
        use SchedulerState::*;

        let (next, directive) = match (self.state, trigger) {
            (Idle, Trigger::ViewOpened) => (
                Refreshing {
                    kind: RefreshKind::Initial,
                },
                Directive::Start(RefreshKind::Initial),
            ),
            // Without a view nothing runs; a late completion does not re-arm.
            (Idle, _) => (Idle, Directive::Nothing),

            (_, Trigger::ViewClosed) => (Idle, Directive::Nothing),

            (Armed { deadline }, Trigger::Tick) if now >= deadline => (
                Refreshing {
                    kind: RefreshKind::Periodic,
                },
                Directive::Start(RefreshKind::Periodic),
            ),
            (Armed { .. }, Trigger::Interact) => (self.armed_from(now), Directive::Nothing),
            (Armed { .. }, Trigger::ManualRefresh) => (
                Refreshing {
                    kind: RefreshKind::Manual,
                },
                Directive::Start(RefreshKind::Manual),
            ),
            (Armed { deadline }, _) => (Armed { deadline }, Directive::Nothing),

            (Refreshing { .. }, Trigger::RefreshFinished) => {
                (self.armed_from(now), Directive::Nothing)
            }
            (Refreshing { kind }, Trigger::ManualRefresh) if kind != RefreshKind::Manual => (
                Refreshing {
                    kind: RefreshKind::Manual,
                },
                Directive::Adopt,
            ),
            (Refreshing { kind }, _) => (Refreshing { kind }, Directive::Nothing),
        };

        self.state = next;
        directive
    }

    fn armed_from(&self, now: Instant) -> SchedulerState {
        let deadline = now
            .checked_add(self.interval)
            .unwrap_or_else(|| now + MAX_INTERVAL);
        SchedulerState::Armed { deadline }
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_INTERVAL_SECS))
    }
}
