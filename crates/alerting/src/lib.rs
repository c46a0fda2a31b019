//! Alerting System
//!
//! Provides the driver-facing alert history and the escalation protocol for
//! unacknowledged critical drowsiness alerts.

mod escalation;
mod log;

pub use escalation::{
    EmergencyDispatcher, EmergencyEvent, EscalationConfig, EscalationController, EscalationState,
    EscalationTick, LoggingDispatcher,
};
pub use log::{AlertLog, AlertRecord, Severity, DEFAULT_CAPACITY};
