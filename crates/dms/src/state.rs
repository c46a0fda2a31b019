//! Driver state model

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::aggregate;

/// Monitored safety signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Drowsiness,
    Distraction,
    Phone,
    Audio,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Drowsiness,
        Channel::Distraction,
        Channel::Phone,
        Channel::Audio,
    ];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Channel::Drowsiness => "drowsiness",
            Channel::Distraction => "distraction",
            Channel::Phone => "phone",
            Channel::Audio => "audio",
        };
        f.write_str(s)
    }
}

/// Severity tier, ordered Safe < Warning < Critical
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Safe,
    Warning,
    Critical,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Safe, Tier::Warning, Tier::Critical];
}

/// Coarse head orientation reported by the pose estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HeadPose {
    #[default]
    Forward,
    Left,
    Right,
    Down,
}

impl HeadPose {
    pub const ALL: [HeadPose; 4] = [
        HeadPose::Forward,
        HeadPose::Left,
        HeadPose::Right,
        HeadPose::Down,
    ];
}

impl fmt::Display for HeadPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HeadPose::Forward => "forward",
            HeadPose::Left => "left",
            HeadPose::Right => "right",
            HeadPose::Down => "down",
        };
        f.write_str(s)
    }
}

/// Raw value of one reading; the variant determines the channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "value", rename_all = "snake_case")]
pub enum SignalValue {
    /// Eye-closure ratio (EAR)
    Drowsiness(f64),
    /// Head pose
    Distraction(HeadPose),
    /// Phone-use confidence, 0-100
    Phone(f64),
    /// Ambient audio level in dB
    Audio(f64),
}

impl SignalValue {
    pub fn channel(&self) -> Channel {
        match self {
            SignalValue::Drowsiness(_) => Channel::Drowsiness,
            SignalValue::Distraction(_) => Channel::Distraction,
            SignalValue::Phone(_) => Channel::Phone,
            SignalValue::Audio(_) => Channel::Audio,
        }
    }

    /// Value each channel starts from before the first reading arrives
    pub fn resting(channel: Channel) -> Self {
        match channel {
            Channel::Drowsiness => SignalValue::Drowsiness(0.28),
            Channel::Distraction => SignalValue::Distraction(HeadPose::Forward),
            Channel::Phone => SignalValue::Phone(0.0),
            Channel::Audio => SignalValue::Audio(45.0),
        }
    }
}

/// Classified state of one channel. Replaced, never edited, by the next
/// classification of that channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub tier: Tier,
    /// Value after clamping
    pub raw_value: SignalValue,
}

impl ChannelStatus {
    pub fn new(tier: Tier, raw_value: SignalValue) -> Self {
        Self { tier, raw_value }
    }

    pub fn channel(&self) -> Channel {
        self.raw_value.channel()
    }

    fn resting(channel: Channel) -> Self {
        Self::new(Tier::Safe, SignalValue::resting(channel))
    }
}

/// Aggregated driver-safety status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverallStatus {
    pub tier: Tier,
}

/// Latest status of every channel.
///
/// Updates produce a new value instead of editing in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitoringState {
    pub drowsiness: ChannelStatus,
    pub distraction: ChannelStatus,
    pub phone: ChannelStatus,
    pub audio: ChannelStatus,
}

impl MonitoringState {
    /// Return a state with `status` replacing its channel's entry
    pub fn with_status(self, status: ChannelStatus) -> Self {
        let mut next = self;
        match status.channel() {
            Channel::Drowsiness => next.drowsiness = status,
            Channel::Distraction => next.distraction = status,
            Channel::Phone => next.phone = status,
            Channel::Audio => next.audio = status,
        }
        next
    }

    pub fn get(&self, channel: Channel) -> &ChannelStatus {
        match channel {
            Channel::Drowsiness => &self.drowsiness,
            Channel::Distraction => &self.distraction,
            Channel::Phone => &self.phone,
            Channel::Audio => &self.audio,
        }
    }

    pub fn statuses(&self) -> [ChannelStatus; 4] {
        [self.drowsiness, self.distraction, self.phone, self.audio]
    }

    pub fn overall(&self) -> OverallStatus {
        aggregate(&self.statuses())
    }
}

impl Default for MonitoringState {
    fn default() -> Self {
        Self {
            drowsiness: ChannelStatus::resting(Channel::Drowsiness),
            distraction: ChannelStatus::resting(Channel::Distraction),
            phone: ChannelStatus::resting(Channel::Phone),
            audio: ChannelStatus::resting(Channel::Audio),
        }
    }
}
