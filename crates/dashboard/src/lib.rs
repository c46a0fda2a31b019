//! Smart Drive Dashboard
//!
//! Client-side runtime of the driver-monitoring dashboard: readings flow
//! from a signal feed through classification into the alert history and
//! the escalation protocol; face login and registration run as polled
//! backend sessions.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod clock;
mod dashboard;
mod runner;
mod settings;

pub use clock::TokioClock;
pub use dashboard::{Dashboard, DashboardConfig};
pub use runner::{log_events, run_face_session, run_monitoring, MonitoringStats};
pub use settings::{Settings, SettingsError, DEFAULT_API_BASE_URL, ENV_PREFIX};

/// Initialize logging
pub fn init_logging() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}
