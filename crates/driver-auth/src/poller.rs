//! Session polling
//!
//! Drives face login / face registration sessions to completion:
//!
//! ```text
//! initiate --start ok--> Pending/InProgress --poll every 500ms--> Success | Failed | Error
//!          --start failed--> Error
//! ```
//!
//! Each session owns its poll timer, elapsed-time counter and post-success
//! delay. Replacing or cancelling a session drops all three, so two pollers
//! for the same operation cannot overlap. There is no overall deadline: a
//! session the backend never finishes is polled until cancelled.

use scheduler::{SharedClock, Timer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::client::FaceSessionApi;
use crate::context::AuthContext;
use crate::error::ApiError;
use crate::session::{Session, SessionKind, SessionRequest, SessionState};
use crate::types::{SessionStatusResponse, StartSessionResponse};

/// Poller timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Interval between status requests (default: 500ms)
    pub poll_interval: Duration,
    /// Resolution of the elapsed-time counter (default: 1s)
    pub elapsed_tick: Duration,
    /// Delay between success and `Proceed` (default: 2s)
    pub success_display_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            elapsed_tick: Duration::from_secs(1),
            success_display_delay: Duration::from_secs(2),
        }
    }
}

/// Something the caller should react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// Non-terminal state change
    Updated {
        kind: SessionKind,
        state: SessionState,
        message: String,
    },
    /// Session reached Success, Failed or Error; polling has stopped
    Finished {
        kind: SessionKind,
        state: SessionState,
        message: String,
    },
    /// Success was displayed long enough; move on (e.g. to the dashboard)
    Proceed { kind: SessionKind },
}

struct TrackedSession {
    session: Session,
    poll: Timer,
    elapsed: Timer,
    elapsed_secs: u64,
    proceed: Timer,
}

/// Drives at most one session per kind
pub struct SessionPoller<A> {
    api: A,
    clock: SharedClock,
    config: PollerConfig,
    sessions: HashMap<SessionKind, TrackedSession>,
}

impl<A: FaceSessionApi> SessionPoller<A> {
    pub fn new(api: A, clock: SharedClock, config: PollerConfig) -> Self {
        Self {
            api,
            clock,
            config,
            sessions: HashMap::new(),
        }
    }

    /// Start a new session, replacing any previous one of the same kind.
    ///
    /// The returned session is `Error` when the backend could not start the
    /// operation; it is never polled in that case.
    pub async fn initiate(&mut self, request: SessionRequest) -> Session {
        let kind = request.kind();
        if self.sessions.remove(&kind).is_some() {
            info!("Cancelled previous {} session before restarting", kind);
        }

        let mut session = Session::new(kind, self.clock.now());
        info!("Starting {}", kind);
        let started = self.api.start_session(&request).await;

        let mut poll = Timer::repeating(self.config.poll_interval);
        let mut elapsed = Timer::repeating(self.config.elapsed_tick);

        match accept_start(kind, started) {
            Ok((id, message)) => {
                info!("{} session {} started", kind, id);
                session.id = Some(id);
                session.payload.message = message;
                let now = self.clock.now();
                poll.start(now);
                elapsed.start(now);
            }
            Err(message) => {
                error!("Could not start {}: {}", kind, message);
                session.state = SessionState::Error;
                session.payload.message = message;
            }
        }

        self.sessions.insert(
            kind,
            TrackedSession {
                session: session.clone(),
                poll,
                elapsed,
                elapsed_secs: 0,
                proceed: Timer::once(self.config.success_display_delay),
            },
        );
        session
    }

    /// Run every timer that became due. Status requests happen here.
    pub async fn poll(&mut self, auth: &mut AuthContext) -> Vec<PollEvent> {
        let mut events = Vec::new();

        for kind in SessionKind::ALL {
            let now = self.clock.now();
            let Some(tracked) = self.sessions.get_mut(&kind) else {
                continue;
            };

            tracked.elapsed_secs += u64::from(tracked.elapsed.fired(now));

            if tracked.proceed.fired(now) > 0 {
                info!("{} complete, proceeding", kind);
                events.push(PollEvent::Proceed { kind });
            }

            // Missed intervals collapse into a single request
            if tracked.poll.fired(now) == 0 {
                continue;
            }
            let Some(id) = tracked.session.id.clone() else {
                tracked.poll.cancel();
                continue;
            };

            debug!("Polling {} session {}", kind, id);
            let result = self.api.session_status(kind, &id).await;
            tracked.session.last_polled_at = Some(self.clock.now());

            if let Some(event) = apply_status(&mut tracked.session, result) {
                events.push(event);
            }

            if tracked.session.is_terminal() {
                tracked.poll.cancel();
                tracked.elapsed.cancel();
                finish(tracked, auth, self.clock.now());
            }
        }

        events
    }

    /// Stop tracking one session, dropping its timers
    pub fn cancel(&mut self, kind: SessionKind) -> Option<Session> {
        let tracked = self.sessions.remove(&kind)?;
        info!("Cancelled {} session", kind);
        Some(tracked.session)
    }

    /// Stop everything (the owning view is closing)
    pub fn cancel_all(&mut self) {
        for kind in SessionKind::ALL {
            self.cancel(kind);
        }
    }

    pub fn session(&self, kind: SessionKind) -> Option<&Session> {
        self.sessions.get(&kind).map(|t| &t.session)
    }

    /// Whether a status request is still scheduled for `kind`
    pub fn is_polling(&self, kind: SessionKind) -> bool {
        self.sessions.get(&kind).is_some_and(|t| t.poll.is_running())
    }

    /// Whole seconds since the session started polling (display only)
    pub fn elapsed_secs(&self, kind: SessionKind) -> Option<u64> {
        self.sessions.get(&kind).map(|t| t.elapsed_secs)
    }

    /// Earliest pending timer deadline, useful for sleeping between polls
    pub fn next_wakeup(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.sessions
            .values()
            .flat_map(|t| [&t.poll, &t.elapsed, &t.proceed])
            .filter_map(|timer| timer.remaining(now))
            .min()
    }

    /// Whether any session still has something scheduled
    pub fn is_idle(&self) -> bool {
        self.next_wakeup().is_none()
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }
}

fn accept_start(
    kind: SessionKind,
    started: Result<StartSessionResponse, ApiError>,
) -> Result<(String, String), String> {
    match started {
        Ok(StartSessionResponse {
            success: true,
            session_id: Some(id),
            message,
            ..
        }) => Ok((id, message.unwrap_or_else(|| format!("{kind} started")))),
        Ok(resp) => Err(resp
            .error
            .unwrap_or_else(|| format!("Failed to start {kind}"))),
        Err(err) => Err(err.to_string()),
    }
}

fn apply_status(
    session: &mut Session,
    result: Result<SessionStatusResponse, ApiError>,
) -> Option<PollEvent> {
    let kind = session.kind;
    let previous = session.state;

    match result {
        Err(err) => {
            warn!("{} status request failed: {}", kind, err);
            session.state = SessionState::Error;
            session.payload.message = format!("Lost connection to server: {err}");
        }
        Ok(resp) if !resp.success => {
            // Reported but not fatal; keep polling
            let message = resp.error.unwrap_or_default();
            warn!("{} status not available: {}", kind, message);
            session.payload.message = message;
        }
        Ok(resp) => {
            match resp.status.as_deref().map(|s| (s, SessionState::from_remote(s))) {
                Some((_, Some(state))) => session.state = state,
                Some((raw, None)) => debug!("{} reported unknown status '{}'", kind, raw),
                None => debug!("{} status response without status", kind),
            }
            if let Some(message) = resp.message {
                session.payload.message = message;
            }
            if resp.driver.is_some() {
                session.payload.driver = resp.driver;
            }
        }
    }

    if session.state.is_terminal() {
        Some(PollEvent::Finished {
            kind,
            state: session.state,
            message: session.payload.message.clone(),
        })
    } else if session.state != previous {
        debug!("{} state: {:?} -> {:?}", kind, previous, session.state);
        Some(PollEvent::Updated {
            kind,
            state: session.state,
            message: session.payload.message.clone(),
        })
    } else {
        None
    }
}

fn finish(tracked: &mut TrackedSession, auth: &mut AuthContext, now: Duration) {
    let session = &tracked.session;
    match session.state {
        SessionState::Success => {
            match (session.kind, &session.payload.driver) {
                (SessionKind::Login, Some(driver)) => {
                    auth.login(driver.clone());
                }
                (SessionKind::Login, None) => {
                    warn!("Face login succeeded without a driver profile");
                }
                (SessionKind::Registration, _) => {
                    auth.update_face_registration(true);
                }
            }
            info!("{} succeeded: {}", session.kind, session.payload.message);
            tracked.proceed.start(now);
        }
        SessionState::Failed => {
            warn!("{} failed: {}", session.kind, session.payload.message);
        }
        _ => {
            error!("{} error: {}", session.kind, session.payload.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DriverProfile;
    use scheduler::ManualClock;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedApi {
        start: RefCell<VecDeque<Result<StartSessionResponse, ApiError>>>,
        statuses: RefCell<VecDeque<Result<SessionStatusResponse, ApiError>>>,
        status_calls: Cell<usize>,
        start_calls: Cell<usize>,
    }

    impl ScriptedApi {
        fn started(id: &str) -> Result<StartSessionResponse, ApiError> {
            Ok(StartSessionResponse {
                success: true,
                session_id: Some(id.to_string()),
                message: Some("Face scan started".to_string()),
                error: None,
            })
        }

        fn status(status: &str) -> Result<SessionStatusResponse, ApiError> {
            Ok(SessionStatusResponse {
                success: true,
                status: Some(status.to_string()),
                message: Some(format!("status {status}")),
                ..Default::default()
            })
        }

        fn with(
            start: Vec<Result<StartSessionResponse, ApiError>>,
            statuses: Vec<Result<SessionStatusResponse, ApiError>>,
        ) -> Self {
            Self {
                start: RefCell::new(start.into()),
                statuses: RefCell::new(statuses.into()),
                ..Default::default()
            }
        }
    }

    impl FaceSessionApi for &ScriptedApi {
        async fn start_session(
            &self,
            _request: &SessionRequest,
        ) -> Result<StartSessionResponse, ApiError> {
            self.start_calls.set(self.start_calls.get() + 1);
            self.start
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Transport("no scripted start".into())))
        }

        async fn session_status(
            &self,
            _kind: SessionKind,
            _session_id: &str,
        ) -> Result<SessionStatusResponse, ApiError> {
            self.status_calls.set(self.status_calls.get() + 1);
            self.statuses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(SessionStatusResponse::default()))
        }
    }

    fn driver() -> DriverProfile {
        DriverProfile {
            name: "John Doe".to_string(),
            ..Default::default()
        }
    }

    async fn step<'a>(
        poller: &mut SessionPoller<&'a ScriptedApi>,
        clock: &ManualClock,
        auth: &mut AuthContext,
        ms: u64,
    ) -> Vec<PollEvent> {
        clock.advance(Duration::from_millis(ms));
        poller.poll(auth).await
    }

    #[tokio::test]
    async fn test_login_polls_until_success() {
        let mut success = ScriptedApi::status("success").unwrap();
        success.driver = Some(driver());
        let api = ScriptedApi::with(
            vec![ScriptedApi::started("s-1")],
            vec![
                ScriptedApi::status("initializing"),
                ScriptedApi::status("scanning"),
                ScriptedApi::status("scanning"),
                Ok(success),
            ],
        );
        let clock = ManualClock::shared();
        let mut auth = AuthContext::new();
        let mut poller = SessionPoller::new(&api, clock.clone(), PollerConfig::default());

        let session = poller.initiate(SessionRequest::Login).await;
        assert_eq!(session.id.as_deref(), Some("s-1"));
        assert_eq!(session.state, SessionState::Pending);

        // Nothing happens before the first interval
        assert!(step(&mut poller, &clock, &mut auth, 499).await.is_empty());
        assert_eq!(api.status_calls.get(), 0);

        step(&mut poller, &clock, &mut auth, 1).await;
        let events = step(&mut poller, &clock, &mut auth, 500).await;
        assert!(matches!(
            events.as_slice(),
            [PollEvent::Updated { state: SessionState::InProgress, .. }]
        ));
        step(&mut poller, &clock, &mut auth, 500).await;
        let events = step(&mut poller, &clock, &mut auth, 500).await;
        assert!(matches!(
            events.as_slice(),
            [PollEvent::Finished { state: SessionState::Success, .. }]
        ));
        assert_eq!(api.status_calls.get(), 4);
        assert!(!poller.is_polling(SessionKind::Login));

        // No further requests after success
        for _ in 0..10 {
            step(&mut poller, &clock, &mut auth, 500).await;
        }
        assert_eq!(api.status_calls.get(), 4);

        let session = poller.session(SessionKind::Login).unwrap();
        assert_eq!(session.payload.driver, Some(driver()));
        assert_eq!(auth.current().unwrap().driver_id, "john_doe");
    }

    #[tokio::test]
    async fn test_proceed_after_display_delay() {
        let mut success = ScriptedApi::status("success").unwrap();
        success.driver = Some(driver());
        let api = ScriptedApi::with(vec![ScriptedApi::started("s-1")], vec![Ok(success)]);
        let clock = ManualClock::shared();
        let mut auth = AuthContext::new();
        let mut poller = SessionPoller::new(&api, clock.clone(), PollerConfig::default());

        poller.initiate(SessionRequest::Login).await;
        step(&mut poller, &clock, &mut auth, 500).await;

        assert!(step(&mut poller, &clock, &mut auth, 1999).await.is_empty());
        let events = step(&mut poller, &clock, &mut auth, 1).await;
        assert_eq!(events, vec![PollEvent::Proceed { kind: SessionKind::Login }]);
        assert!(step(&mut poller, &clock, &mut auth, 5000).await.is_empty());
        assert!(poller.is_idle());
    }

    #[tokio::test]
    async fn test_network_failure_is_terminal() {
        let api = ScriptedApi::with(
            vec![ScriptedApi::started("s-1")],
            vec![
                ScriptedApi::status("scanning"),
                Err(ApiError::Transport("connection refused".into())),
                ScriptedApi::status("success"),
            ],
        );
        let clock = ManualClock::shared();
        let mut auth = AuthContext::new();
        let mut poller = SessionPoller::new(&api, clock.clone(), PollerConfig::default());

        poller.initiate(SessionRequest::Login).await;
        step(&mut poller, &clock, &mut auth, 500).await;
        let events = step(&mut poller, &clock, &mut auth, 500).await;
        assert!(matches!(
            events.as_slice(),
            [PollEvent::Finished { state: SessionState::Error, .. }]
        ));

        for _ in 0..10 {
            step(&mut poller, &clock, &mut auth, 500).await;
        }
        assert_eq!(api.status_calls.get(), 2);
        assert!(!auth.is_authenticated());
        assert!(poller
            .session(SessionKind::Login)
            .unwrap()
            .payload
            .message
            .starts_with("Lost connection to server"));
    }

    #[tokio::test]
    async fn test_failed_start_never_polls() {
        let api = ScriptedApi::with(
            vec![Ok(StartSessionResponse {
                success: false,
                ..Default::default()
            })],
            vec![],
        );
        let clock = ManualClock::shared();
        let mut auth = AuthContext::new();
        let mut poller = SessionPoller::new(&api, clock.clone(), PollerConfig::default());

        let session = poller
            .initiate(SessionRequest::Registration {
                driver_id: "john_doe".into(),
            })
            .await;
        assert_eq!(session.state, SessionState::Error);
        assert_eq!(session.payload.message, "Failed to start face registration");

        step(&mut poller, &clock, &mut auth, 5000).await;
        assert_eq!(api.status_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_operation_failure_is_distinct_from_error() {
        let api = ScriptedApi::with(
            vec![ScriptedApi::started("s-1")],
            vec![ScriptedApi::status("failed")],
        );
        let clock = ManualClock::shared();
        let mut auth = AuthContext::new();
        let mut poller = SessionPoller::new(&api, clock.clone(), PollerConfig::default());

        poller.initiate(SessionRequest::Login).await;
        let events = step(&mut poller, &clock, &mut auth, 500).await;
        assert!(matches!(
            events.as_slice(),
            [PollEvent::Finished { state: SessionState::Failed, .. }]
        ));
    }

    #[tokio::test]
    async fn test_unknown_status_keeps_polling() {
        let api = ScriptedApi::with(
            vec![ScriptedApi::started("s-1")],
            vec![
                ScriptedApi::status("warming_up"),
                Ok(SessionStatusResponse {
                    success: false,
                    error: Some("Session not ready".into()),
                    ..Default::default()
                }),
                ScriptedApi::status("processing"),
            ],
        );
        let clock = ManualClock::shared();
        let mut auth = AuthContext::new();
        let mut poller = SessionPoller::new(&api, clock.clone(), PollerConfig::default());

        poller.initiate(SessionRequest::Login).await;
        for _ in 0..3 {
            step(&mut poller, &clock, &mut auth, 500).await;
        }
        assert!(poller.is_polling(SessionKind::Login));
        assert_eq!(
            poller.session(SessionKind::Login).unwrap().state,
            SessionState::InProgress
        );
    }

    #[tokio::test]
    async fn test_retry_replaces_previous_session() {
        let api = ScriptedApi::with(
            vec![ScriptedApi::started("s-1"), ScriptedApi::started("s-2")],
            vec![ScriptedApi::status("failed")],
        );
        let clock = ManualClock::shared();
        let mut auth = AuthContext::new();
        let mut poller = SessionPoller::new(&api, clock.clone(), PollerConfig::default());

        poller.initiate(SessionRequest::Login).await;
        step(&mut poller, &clock, &mut auth, 500).await;
        assert!(!poller.is_polling(SessionKind::Login));

        let session = poller.initiate(SessionRequest::Login).await;
        assert_eq!(session.id.as_deref(), Some("s-2"));
        assert!(poller.is_polling(SessionKind::Login));

        // One request per interval: the old schedule is gone
        step(&mut poller, &clock, &mut auth, 500).await;
        assert_eq!(api.status_calls.get(), 2);
    }

    #[tokio::test]
    async fn test_elapsed_counter_does_not_end_session() {
        let api = ScriptedApi::with(vec![ScriptedApi::started("s-1")], vec![]);
        let clock = ManualClock::shared();
        let mut auth = AuthContext::new();
        let mut poller = SessionPoller::new(&api, clock.clone(), PollerConfig::default());

        poller.initiate(SessionRequest::Login).await;
        for _ in 0..240 {
            step(&mut poller, &clock, &mut auth, 500).await;
        }

        assert_eq!(poller.elapsed_secs(SessionKind::Login), Some(120));
        assert!(poller.is_polling(SessionKind::Login));
        assert_eq!(api.status_calls.get(), 240);
    }

    #[tokio::test]
    async fn test_registration_success_marks_face_registered() {
        let api = ScriptedApi::with(
            vec![ScriptedApi::started("r-1")],
            vec![ScriptedApi::status("capturing"), ScriptedApi::status("success")],
        );
        let clock = ManualClock::shared();
        let mut auth = AuthContext::new();
        auth.login(driver());
        let mut poller = SessionPoller::new(&api, clock.clone(), PollerConfig::default());

        poller
            .initiate(SessionRequest::Registration {
                driver_id: "john_doe".into(),
            })
            .await;
        step(&mut poller, &clock, &mut auth, 500).await;
        step(&mut poller, &clock, &mut auth, 500).await;

        assert!(auth.face_registered());
    }

    #[tokio::test]
    async fn test_cancel_all_stops_polling() {
        let api = ScriptedApi::with(
            vec![ScriptedApi::started("s-1"), ScriptedApi::started("r-1")],
            vec![],
        );
        let clock = ManualClock::shared();
        let mut auth = AuthContext::new();
        let mut poller = SessionPoller::new(&api, clock.clone(), PollerConfig::default());

        poller.initiate(SessionRequest::Login).await;
        poller
            .initiate(SessionRequest::Registration {
                driver_id: "john_doe".into(),
            })
            .await;
        assert_eq!(api.start_calls.get(), 2);

        poller.cancel_all();
        step(&mut poller, &clock, &mut auth, 5000).await;
        assert_eq!(api.status_calls.get(), 0);
        assert!(poller.session(SessionKind::Login).is_none());
        assert!(poller.is_idle());
    }
}
