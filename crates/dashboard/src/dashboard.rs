//! Dashboard runtime
//!
//! Wires monitoring, the alert history and the escalation controller
//! together. Everything is mutated from one place; callers drive it with
//! `ingest` for readings and `tick` for time.

use alerting::{
    AlertLog, EmergencyDispatcher, EscalationConfig, EscalationController, EscalationState,
    EscalationTick, DEFAULT_CAPACITY,
};
use dms::{
    Channel, Monitor, MonitorEvent, MonitorUpdate, MonitoringState, OverallStatus,
    SignalReading, ThresholdConfig, Tier,
};
use scheduler::SharedClock;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub thresholds: ThresholdConfig,
    pub escalation: EscalationConfig,
    /// Raise the escalation alert when drowsiness classifies Critical
    pub auto_escalate: bool,
    /// Alert history size (default: 5)
    pub alert_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            escalation: EscalationConfig::default(),
            auto_escalate: true,
            alert_capacity: DEFAULT_CAPACITY,
        }
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    monitor: Monitor,
    alerts: AlertLog,
    escalation: EscalationController,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        clock: SharedClock,
        dispatcher: Box<dyn EmergencyDispatcher>,
    ) -> Self {
        info!(
            "Creating dashboard (auto escalation {})",
            if config.auto_escalate { "on" } else { "off" }
        );
        Self {
            monitor: Monitor::new(config.thresholds.clone()),
            alerts: AlertLog::with_capacity(config.alert_capacity),
            escalation: EscalationController::new(config.escalation.clone(), clock, dispatcher),
            config,
        }
    }

    /// Classify one reading and record any resulting alert
    pub fn ingest(&mut self, reading: SignalReading) -> MonitorUpdate {
        let update = self.monitor.ingest(reading, &mut self.alerts);

        if self.config.auto_escalate
            && update.current.channel() == Channel::Drowsiness
            && update.current.tier == Tier::Critical
        {
            self.escalation.trigger(&mut self.alerts);
        }

        update
    }

    /// Ingest every reading of one feed cycle, in order
    pub fn ingest_batch(&mut self, readings: impl IntoIterator<Item = SignalReading>) -> OverallStatus {
        for reading in readings {
            self.ingest(reading);
        }
        self.monitor.overall()
    }

    /// Advance the escalation countdown to the current time
    pub fn tick(&mut self) -> EscalationTick {
        self.escalation.poll(&mut self.alerts)
    }

    /// Time until the escalation countdown next needs a `tick`
    pub fn next_wakeup(&self) -> Option<Duration> {
        self.escalation.next_wakeup()
    }

    /// Raise the drowsiness alert by hand
    pub fn trigger(&mut self) -> bool {
        self.escalation.trigger(&mut self.alerts)
    }

    pub fn dismiss(&mut self) -> bool {
        self.escalation.dismiss(&mut self.alerts)
    }

    pub fn mute(&mut self) -> bool {
        self.escalation.mute(&mut self.alerts)
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn overall(&self) -> OverallStatus {
        self.monitor.overall()
    }

    pub fn state(&self) -> &MonitoringState {
        self.monitor.state()
    }

    pub fn escalation_state(&self) -> EscalationState {
        self.escalation.state()
    }

    /// Countdown shown on the alert overlay
    pub fn countdown(&self) -> u32 {
        self.escalation.remaining_ticks()
    }

    pub fn emergency_count(&self) -> u64 {
        self.escalation.emergency_count()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.monitor.subscribe()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Cancel every pending timer; the dashboard is being closed
    pub fn shutdown(&mut self) {
        if self.escalation.is_active() {
            warn!("Dashboard closing with an unacknowledged alert");
        }
        self.escalation.shutdown();
        info!("Dashboard shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::Severity;
    use dms::HeadPose;
    use scheduler::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn dashboard(config: DashboardConfig) -> (Dashboard, Arc<ManualClock>, Arc<AtomicUsize>) {
        let clock = ManualClock::shared();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let dashboard = Dashboard::new(
            config,
            clock.clone(),
            Box::new(move |_: &alerting::EmergencyEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (dashboard, clock, calls)
    }

    #[test]
    fn test_critical_drowsiness_escalates() {
        let (mut dash, _, _) = dashboard(DashboardConfig::default());

        dash.ingest(SignalReading::drowsiness(0.18));

        assert_eq!(dash.escalation_state(), EscalationState::Active);
        let messages: Vec<_> = dash.alerts().all().map(|r| r.message().to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "CRITICAL: Drowsiness alert triggered!",
                "Drowsiness detected! EAR value critically low.",
            ]
        );
    }

    #[test]
    fn test_repeated_critical_does_not_restart_countdown() {
        let (mut dash, clock, _) = dashboard(DashboardConfig::default());

        dash.ingest(SignalReading::drowsiness(0.18));
        clock.advance(Duration::from_secs(10));
        dash.tick();
        dash.ingest(SignalReading::drowsiness(0.17));
        dash.tick();

        assert_eq!(dash.countdown(), 20);
    }

    #[test]
    fn test_nan_drowsiness_does_not_escalate() {
        let (mut dash, _, _) = dashboard(DashboardConfig::default());

        let update = dash.ingest(SignalReading::drowsiness(f64::NAN));

        assert_eq!(update.current.tier, Tier::Safe);
        assert_eq!(dash.escalation_state(), EscalationState::Idle);
        assert!(dash.alerts().is_empty());
    }

    #[test]
    fn test_auto_escalation_can_be_disabled() {
        let (mut dash, _, _) = dashboard(DashboardConfig {
            auto_escalate: false,
            ..Default::default()
        });

        dash.ingest(SignalReading::drowsiness(0.18));

        assert_eq!(dash.escalation_state(), EscalationState::Idle);
        assert_eq!(dash.alerts().len(), 1);
    }

    #[test]
    fn test_other_channels_do_not_escalate() {
        let (mut dash, _, _) = dashboard(DashboardConfig::default());

        let overall = dash.ingest_batch([
            SignalReading::phone(95.0),
            SignalReading::audio(100.0),
            SignalReading::distraction(HeadPose::Down),
        ]);

        assert_eq!(overall.tier, Tier::Critical);
        assert_eq!(dash.escalation_state(), EscalationState::Idle);
        assert_eq!(dash.alerts().len(), 3);
    }

    #[test]
    fn test_dismiss_then_deadline_passes() {
        let (mut dash, clock, calls) = dashboard(DashboardConfig::default());

        assert!(dash.trigger());
        clock.advance(Duration::from_secs(5));
        dash.tick();
        assert!(dash.dismiss());
        assert_eq!(dash.countdown(), 30);

        clock.advance(Duration::from_secs(60));
        assert_eq!(dash.tick(), EscalationTick::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(dash.alerts().latest().unwrap().severity(), Severity::Info);
    }

    #[test]
    fn test_shutdown_cancels_countdown() {
        let (mut dash, clock, calls) = dashboard(DashboardConfig::default());

        dash.trigger();
        dash.shutdown();
        clock.advance(Duration::from_secs(31));

        assert_eq!(dash.tick(), EscalationTick::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_alert_history_stays_bounded() {
        let (mut dash, _, _) = dashboard(DashboardConfig::default());

        for _ in 0..20 {
            dash.ingest(SignalReading::phone(55.0));
        }

        assert_eq!(dash.alerts().len(), 5);
    }
}
