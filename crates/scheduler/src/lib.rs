//! Timer Scheduling
//!
//! Cooperative, owner-held timers driven by an injectable clock:
//! - `Clock` abstraction with a wall-clock and a manually advanced implementation
//! - One-shot and repeating `Timer`s with explicit `start` / `cancel`
//!
//! Timers never run callbacks on their own. The owning component asks the
//! timer how many times it fired since the last check and reacts on its own
//! execution context, so there is exactly one place that can act on a timer.

mod clock;
mod timer;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use timer::{Timer, TimerMode};
