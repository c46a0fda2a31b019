//! Async drivers for the dashboard and for face sign-in sessions

use dms::{MonitorEvent, SignalFeed};
use driver_auth::{
    AuthContext, FaceSessionApi, PollEvent, Session, SessionPoller, SessionRequest, SessionState,
};
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::dashboard::Dashboard;

/// Summary of a monitoring run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitoringStats {
    pub batches: u64,
    pub readings: u64,
    pub emergencies: u64,
}

/// Feed the dashboard from `feed` until `shutdown` completes.
///
/// The feed is sampled at its cadence. While an alert is active the loop
/// also wakes at each countdown tick, aligned to when the alert was raised.
/// All timers are cancelled before returning.
pub async fn run_monitoring<F, S>(
    dashboard: &mut Dashboard,
    feed: &mut F,
    shutdown: S,
) -> MonitoringStats
where
    F: SignalFeed,
    S: Future<Output = ()>,
{
    let mut stats = MonitoringStats::default();
    let emergencies_before = dashboard.emergency_count();

    let mut feed_interval = time::interval(feed.cadence());
    feed_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Monitoring started (feed every {:?})", feed.cadence());
    tokio::pin!(shutdown);

    loop {
        let countdown = dashboard.next_wakeup();

        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            _ = feed_interval.tick() => {
                let batch = feed.next_batch();
                stats.batches += 1;
                stats.readings += batch.len() as u64;
                let overall = dashboard.ingest_batch(batch);
                debug!("Overall status: {:?}", overall.tier);
            }
            _ = sleep_for(countdown) => {
                dashboard.tick();
            }
        }
    }

    dashboard.shutdown();
    stats.emergencies = dashboard.emergency_count() - emergencies_before;
    info!(
        "Monitoring stopped after {} batches ({} readings, {} emergencies)",
        stats.batches, stats.readings, stats.emergencies
    );
    stats
}

/// Sleep for `wait`, or forever when nothing is scheduled
async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(wait) => time::sleep(wait).await,
        None => std::future::pending().await,
    }
}

/// Log monitoring events until the dashboard goes away
pub async fn log_events(mut events: broadcast::Receiver<MonitorEvent>) {
    loop {
        match events.recv().await {
            Ok(MonitorEvent::OverallChanged { previous, current }) => {
                info!("Driver status {:?} -> {:?}", previous.tier, current.tier);
            }
            Ok(MonitorEvent::AlertRaised(record)) => {
                info!("[{}] {}", record.severity(), record.message());
            }
            Ok(MonitorEvent::ChannelUpdated { current, .. }) => {
                debug!("{} -> {:?} ({:?})", current.channel(), current.tier, current.raw_value);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Event logger lagged, {} events skipped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Run one face session until it fails, or until it succeeds and the
/// success message has been shown. `shutdown` cancels the session.
pub async fn run_face_session<A, S>(
    poller: &mut SessionPoller<A>,
    auth: &mut AuthContext,
    request: SessionRequest,
    shutdown: S,
) -> Option<Session>
where
    A: FaceSessionApi,
    S: Future<Output = ()>,
{
    let kind = request.kind();
    let session = poller.initiate(request).await;
    if session.is_terminal() {
        return Some(session);
    }

    tokio::pin!(shutdown);

    loop {
        let wait = poller
            .next_wakeup()
            .unwrap_or(poller.config().poll_interval);

        // Shutdown also abandons a status request that is still in flight
        let events = tokio::select! {
            _ = &mut shutdown => {
                info!("{} cancelled", kind);
                poller.cancel_all();
                return None;
            }
            events = async {
                time::sleep(wait).await;
                poller.poll(auth).await
            } => events,
        };

        for event in events {
            match event {
                PollEvent::Updated { state, message, .. } => {
                    info!("{}: {:?} {}", kind, state, message);
                }
                PollEvent::Finished { state, message, .. } => {
                    info!("{} finished: {:?} {}", kind, state, message);
                    if state != SessionState::Success {
                        return poller.session(kind).cloned();
                    }
                }
                PollEvent::Proceed { .. } => {
                    return poller.session(kind).cloned();
                }
            }
        }
    }
}
