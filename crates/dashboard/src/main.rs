//! Smart Drive Dashboard - Main Entry Point
//!
//! ```text
//! smart-drive-dashboard                          monitor with the simulated feed
//! smart-drive-dashboard face-login               sign in by face
//! smart-drive-dashboard face-register <driver>   register a driver's face
//! ```

use alerting::LoggingDispatcher;
use anyhow::{bail, Context};
use dashboard::{
    init_logging, log_events, run_face_session, run_monitoring, Dashboard, DashboardConfig,
    Settings, TokioClock,
};
use dms::SimulatedFeed;
use driver_auth::{AuthContext, HttpAuthClient, PollerConfig, SessionPoller, SessionRequest};
use tracing::{info, warn};

enum Command {
    Monitor,
    FaceSession(SessionRequest),
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Command> {
    let command = match args.next().as_deref() {
        None | Some("monitor") => Command::Monitor,
        Some("face-login") => Command::FaceSession(SessionRequest::Login),
        Some("face-register") => {
            let driver_id = args
                .next()
                .context("face-register requires a driver id")?;
            Command::FaceSession(SessionRequest::Registration { driver_id })
        }
        Some(other) => bail!("unknown command '{other}' (expected monitor, face-login or face-register <driver_id>)"),
    };

    if let Some(extra) = args.next() {
        bail!("unexpected argument '{extra}'");
    }
    Ok(command)
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn monitor() -> anyhow::Result<()> {
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut dashboard = Dashboard::new(
        DashboardConfig::default(),
        TokioClock::shared(),
        Box::new(LoggingDispatcher),
    );
    let logger = tokio::spawn(log_events(dashboard.subscribe()));
    let mut feed = SimulatedFeed::new(seed);

    info!("Monitoring with simulated feed (seed {}), Ctrl-C to stop", seed);
    let stats = run_monitoring(&mut dashboard, &mut feed, ctrl_c()).await;

    for record in dashboard.alerts().all() {
        info!("history: [{}] {}", record.severity(), record.message());
    }
    info!("{} emergencies dispatched this run", stats.emergencies);

    // Closing the event bus ends the logger
    drop(dashboard);
    logger.await.context("event logger panicked")?;
    Ok(())
}

async fn face_session(settings: &Settings, request: SessionRequest) -> anyhow::Result<()> {
    let client = HttpAuthClient::new(&settings.api_base_url)
        .with_context(|| format!("invalid API base URL '{}'", settings.api_base_url))?;
    let mut poller = SessionPoller::new(client, TokioClock::shared(), PollerConfig::default());
    let mut auth = AuthContext::new();

    let kind = request.kind();
    match run_face_session(&mut poller, &mut auth, request, ctrl_c()).await {
        Some(session) => {
            info!("{} ended: {:?} {}", kind, session.state, session.payload.message);
            if let Some(driver) = auth.current() {
                info!("Signed in as {} ({})", driver.profile.name, driver.driver_id);
            }
        }
        None => info!("{} cancelled", kind),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    info!("=== Smart Drive Dashboard v{} ===", env!("CARGO_PKG_VERSION"));

    let settings = Settings::from_env()?;
    info!("Backend: {}", settings.api_base_url);

    match parse_args(std::env::args().skip(1))? {
        Command::Monitor => monitor().await,
        Command::FaceSession(request) => face_session(&settings, request).await,
    }
}
