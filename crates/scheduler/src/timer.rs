//! Owner-held timers

use std::time::Duration;
use tracing::trace;

/// Shortest period a timer accepts
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Whether a timer fires once or keeps rescheduling itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    Once,
    Repeating,
}

/// A schedulable task slot.
///
/// A `Timer` holds at most one pending deadline. Calling [`Timer::start`] on a
/// running timer replaces the old deadline, so two schedules of the same
/// timer can never overlap. Dropping the timer cancels it.
#[derive(Debug, Clone)]
pub struct Timer {
    period: Duration,
    mode: TimerMode,
    next_deadline: Option<Duration>,
}

impl Timer {
    /// One-shot timer firing `delay` after it is started
    pub fn once(delay: Duration) -> Self {
        Self {
            period: delay,
            mode: TimerMode::Once,
            next_deadline: None,
        }
    }

    /// Repeating timer firing every `period` after it is started
    pub fn repeating(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            mode: TimerMode::Repeating,
            next_deadline: None,
        }
    }

    /// Schedule the first firing relative to `now`, discarding any pending one
    pub fn start(&mut self, now: Duration) {
        if self.next_deadline.is_some() {
            trace!("Restarting running timer ({:?})", self.mode);
        }
        self.next_deadline = Some(now + self.period);
    }

    /// Convenience: build and start in one step
    pub fn started(mut self, now: Duration) -> Self {
        self.start(now);
        self
    }

    /// Drop the pending deadline. Cancelling an idle timer is a no-op.
    pub fn cancel(&mut self) {
        self.next_deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_deadline.is_some()
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time until the next firing, if running
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.next_deadline.map(|d| d.saturating_sub(now))
    }

    /// Number of firings that became due up to `now` since the last call.
    ///
    /// A repeating timer that was checked late reports every missed period
    /// and stays aligned to its original schedule. A one-shot timer reports
    /// at most one firing and then stops.
    pub fn fired(&mut self, now: Duration) -> u32 {
        let deadline = match self.next_deadline {
            Some(d) if now >= d => d,
            _ => return 0,
        };

        match self.mode {
            TimerMode::Once => {
                self.next_deadline = None;
                1
            }
            TimerMode::Repeating => {
                let behind = (now - deadline).as_nanos() / self.period.as_nanos();
                let count = u32::try_from(behind + 1).unwrap_or(u32::MAX);
                self.next_deadline = Some(deadline + self.period * count);
                count
            }
        }
    }
}
