//! Driver Monitoring System (DMS)
//!
//! Turns periodic safety-signal readings into a driver-safety status:
//! - Per-channel threshold classification (drowsiness, distraction, phone, audio)
//! - Overall status aggregation
//! - Alert records for non-safe channels
//! - Change notifications for UI subscribers

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod feed;
pub mod monitor;
pub mod reading;
pub mod state;

pub use analysis::{aggregate, alert_for};
pub use classifier::{classify, classify_value};
pub use config::{ThresholdConfig, ValueRange};
pub use feed::{ScriptedFeed, SignalFeed, SimulatedFeed};
pub use monitor::{Monitor, MonitorEvent, MonitorUpdate};
pub use reading::SignalReading;
pub use state::{
    Channel, ChannelStatus, HeadPose, MonitoringState, OverallStatus, SignalValue, Tier,
};
