//! Drowsiness alert escalation
//!
//! Lifecycle of a single critical alert:
//!
//! ```text
//! Idle --trigger--> Active --countdown hits 0--> Emergency --dispatch--> Idle
//!                     |
//!                     +--dismiss / mute--> Idle
//! ```
//!
//! The countdown timer lives inside the `Active` phase, so leaving `Active`
//! by any path drops it and a second countdown cannot exist.

use chrono::{DateTime, Utc};
use scheduler::{SharedClock, Timer};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::log::{AlertLog, AlertRecord};

const TRIGGERED_MESSAGE: &str = "CRITICAL: Drowsiness alert triggered!";
const EMERGENCY_MESSAGE: &str = "Emergency protocol activated. Calling emergency contact...";
const DISMISSED_MESSAGE: &str = "Alert dismissed by driver.";
const MUTED_MESSAGE: &str = "Alert muted. Monitoring continues...";

/// Escalation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Countdown length in ticks (default: 30)
    pub countdown_ticks: u32,
    /// Duration of one countdown tick (default: 1s)
    pub tick: Duration,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            countdown_ticks: 30,
            tick: Duration::from_secs(1),
        }
    }
}

/// Externally visible escalation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscalationState {
    Idle,
    Active,
    Emergency,
}

/// Details handed to the emergency dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyEvent {
    /// When the unacknowledged alert was raised
    pub triggered_at: DateTime<Utc>,
    /// When the countdown expired
    pub dispatched_at: DateTime<Utc>,
    /// Countdown the driver had to respond
    pub countdown_ticks: u32,
}

/// Performs the emergency action (navigation, contact notification).
pub trait EmergencyDispatcher: Send {
    fn dispatch(&self, event: &EmergencyEvent);
}

impl<F> EmergencyDispatcher for F
where
    F: Fn(&EmergencyEvent) + Send,
{
    fn dispatch(&self, event: &EmergencyEvent) {
        self(event)
    }
}

/// Dispatcher that only records the emergency in the log output
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDispatcher;

impl EmergencyDispatcher for LoggingDispatcher {
    fn dispatch(&self, event: &EmergencyEvent) {
        error!(
            "EMERGENCY: alert raised at {} unanswered for {} ticks, contacting emergency contact",
            event.triggered_at, event.countdown_ticks
        );
    }
}

/// Result of advancing the controller's clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationTick {
    /// No alert is active
    Idle,
    /// Alert active, `remaining` ticks until the emergency action
    CountingDown { remaining: u32 },
    /// The countdown expired and the emergency action ran
    EmergencyDispatched,
}

enum Phase {
    Idle,
    Active {
        countdown: Timer,
        remaining: u32,
        triggered_at: DateTime<Utc>,
    },
}

/// Owns the alert lifecycle and its countdown timer
pub struct EscalationController {
    config: EscalationConfig,
    clock: SharedClock,
    dispatcher: Box<dyn EmergencyDispatcher>,
    phase: Phase,
    emergencies: u64,
}

impl EscalationController {
    /// Create a new controller in `Idle`
    pub fn new(
        config: EscalationConfig,
        clock: SharedClock,
        dispatcher: Box<dyn EmergencyDispatcher>,
    ) -> Self {
        info!(
            "Creating escalation controller ({} x {:?} countdown)",
            config.countdown_ticks, config.tick
        );
        Self {
            config,
            clock,
            dispatcher,
            phase: Phase::Idle,
            emergencies: 0,
        }
    }

    /// Raise the drowsiness alert and start the countdown.
    ///
    /// Only valid from `Idle`; returns `false` (and changes nothing) otherwise.
    pub fn trigger(&mut self, log: &mut AlertLog) -> bool {
        if let Phase::Active { remaining, .. } = &self.phase {
            debug!("Trigger ignored: alert already active ({} ticks left)", remaining);
            return false;
        }

        let countdown = Timer::repeating(self.config.tick).started(self.clock.now());
        self.phase = Phase::Active {
            countdown,
            remaining: self.config.countdown_ticks,
            triggered_at: Utc::now(),
        };

        warn!("Drowsiness alert triggered, escalating in {} ticks", self.config.countdown_ticks);
        log.append(AlertRecord::critical(TRIGGERED_MESSAGE));
        true
    }

    /// Driver acknowledged the alert
    pub fn dismiss(&mut self, log: &mut AlertLog) -> bool {
        if !self.cancel_countdown() {
            debug!("Dismiss ignored: no active alert");
            return false;
        }
        info!("Alert dismissed by driver");
        log.append(AlertRecord::info(DISMISSED_MESSAGE));
        true
    }

    /// Driver silenced the alert. Same state effect as `dismiss`; monitoring
    /// is not paused.
    pub fn mute(&mut self, log: &mut AlertLog) -> bool {
        if !self.cancel_countdown() {
            debug!("Mute ignored: no active alert");
            return false;
        }
        info!("Alert muted by driver");
        log.append(AlertRecord::warning(MUTED_MESSAGE));
        true
    }

    /// Process countdown ticks that became due since the last call
    pub fn poll(&mut self, log: &mut AlertLog) -> EscalationTick {
        let now = self.clock.now();

        let (ticks, remaining, triggered_at) = match &mut self.phase {
            Phase::Idle => return EscalationTick::Idle,
            Phase::Active {
                countdown,
                remaining,
                triggered_at,
            } => {
                let fired = countdown.fired(now);
                *remaining = remaining.saturating_sub(fired);
                (fired, *remaining, *triggered_at)
            }
        };

        if remaining > 0 {
            if ticks > 0 {
                debug!("Escalation countdown: {} ticks left", remaining);
            }
            return EscalationTick::CountingDown { remaining };
        }

        self.escalate(triggered_at, log);
        EscalationTick::EmergencyDispatched
    }

    /// Current state. `Emergency` is transient and only held while the
    /// dispatcher runs.
    pub fn state(&self) -> EscalationState {
        match self.phase {
            Phase::Idle => EscalationState::Idle,
            Phase::Active { .. } => EscalationState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active { .. })
    }

    /// Countdown shown to the driver; the full length when no alert is active
    pub fn remaining_ticks(&self) -> u32 {
        match &self.phase {
            Phase::Idle => self.config.countdown_ticks,
            Phase::Active { remaining, .. } => *remaining,
        }
    }

    /// Time until the next countdown tick, if an alert is active
    pub fn next_wakeup(&self) -> Option<Duration> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Active { countdown, .. } => countdown.remaining(self.clock.now()),
        }
    }

    /// Number of emergency actions dispatched so far
    pub fn emergency_count(&self) -> u64 {
        self.emergencies
    }

    pub fn config(&self) -> &EscalationConfig {
        &self.config
    }

    /// Drop any running countdown without logging. Used when the owning
    /// surface shuts down.
    pub fn shutdown(&mut self) {
        if self.cancel_countdown() {
            info!("Escalation controller shut down with an active alert");
        }
    }

    fn cancel_countdown(&mut self) -> bool {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => false,
            Phase::Active { .. } => true,
        }
    }

    fn escalate(&mut self, triggered_at: DateTime<Utc>, log: &mut AlertLog) {
        // Timer is dropped here; Emergency lasts only for the dispatch below.
        self.phase = Phase::Idle;
        debug!("Escalation state: {:?}", EscalationState::Emergency);

        let event = EmergencyEvent {
            triggered_at,
            dispatched_at: Utc::now(),
            countdown_ticks: self.config.countdown_ticks,
        };
        self.dispatcher.dispatch(&event);
        self.emergencies += 1;

        error!("Emergency protocol activated");
        log.append(AlertRecord::critical(EMERGENCY_MESSAGE));
    }
}
