//! Monitoring pipeline
//!
//! Feeds each reading through classification and aggregation, records
//! alerts, and publishes state changes to subscribers.

use alerting::{AlertLog, AlertRecord};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::analysis::alert_for;
use crate::classifier::classify;
use crate::config::ThresholdConfig;
use crate::reading::SignalReading;
use crate::state::{ChannelStatus, MonitoringState, OverallStatus, Tier};

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CAPACITY: usize = 64;

/// State-change notification for UI-facing subscribers
#[derive(Debug, Clone, Serialize)]
pub enum MonitorEvent {
    /// A channel was reclassified (published for every reading)
    ChannelUpdated {
        previous: ChannelStatus,
        current: ChannelStatus,
    },
    /// The overall tier changed
    OverallChanged {
        previous: OverallStatus,
        current: OverallStatus,
    },
    /// An alert was appended to the history
    AlertRaised(AlertRecord),
}

/// Outcome of ingesting a single reading
#[derive(Debug, Clone)]
pub struct MonitorUpdate {
    pub previous: ChannelStatus,
    pub current: ChannelStatus,
    pub overall: OverallStatus,
    pub alert: Option<AlertRecord>,
}

impl MonitorUpdate {
    /// Whether the channel's tier changed with this reading
    pub fn tier_changed(&self) -> bool {
        self.previous.tier != self.current.tier
    }
}

/// Owns the monitoring state and the event bus
pub struct Monitor {
    config: ThresholdConfig,
    state: MonitoringState,
    events: broadcast::Sender<MonitorEvent>,
}

impl Monitor {
    pub fn new(config: ThresholdConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            state: MonitoringState::default(),
            events,
        }
    }

    /// Subscribe to state-change events
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    /// Classify a reading, recompute the overall status and append an alert
    /// when the reading's channel is Warning or Critical.
    pub fn ingest(&mut self, reading: SignalReading, log: &mut AlertLog) -> MonitorUpdate {
        let current = classify(&reading, &self.config);
        let channel = current.channel();
        let previous = *self.state.get(channel);
        let previous_overall = self.state.overall();

        self.state = self.state.with_status(current);
        let overall = self.state.overall();

        if previous.tier != current.tier {
            info!("{} status: {:?} -> {:?}", channel, previous.tier, current.tier);
        } else {
            debug!("{} reading {:?} ({:?})", channel, current.raw_value, current.tier);
        }
        self.publish(MonitorEvent::ChannelUpdated { previous, current });

        if overall != previous_overall {
            match overall.tier {
                Tier::Critical => warn!("Overall driver status: CRITICAL"),
                tier => info!("Overall driver status: {:?}", tier),
            }
            self.publish(MonitorEvent::OverallChanged {
                previous: previous_overall,
                current: overall,
            });
        }

        let alert = alert_for(&current);
        if let Some(record) = &alert {
            log.append(record.clone());
            self.publish(MonitorEvent::AlertRaised(record.clone()));
        }

        MonitorUpdate {
            previous,
            current,
            overall,
            alert,
        }
    }

    /// Current per-channel state
    pub fn state(&self) -> &MonitoringState {
        &self.state
    }

    pub fn overall(&self) -> OverallStatus {
        self.state.overall()
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Forget all readings (driver change)
    pub fn reset(&mut self) {
        self.state = MonitoringState::default();
    }

    fn publish(&self, event: MonitorEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}
