//! Threshold classification
//!
//! Maps the latest reading of a channel to a severity tier. Pure and
//! history-free: only the reading itself and the thresholds matter.
//! Out-of-range values are clamped, never rejected.

use crate::config::ThresholdConfig;
use crate::reading::SignalReading;
use crate::state::{ChannelStatus, HeadPose, SignalValue, Tier};

/// Classify one reading
pub fn classify(reading: &SignalReading, config: &ThresholdConfig) -> ChannelStatus {
    classify_value(reading.value, config)
}

/// Classify a raw value
pub fn classify_value(value: SignalValue, config: &ThresholdConfig) -> ChannelStatus {
    match value {
        SignalValue::Drowsiness(ear) => {
            // NaN is noise: read it as open eyes
            let ear = config.ear_range.clamp_or(ear, config.ear_range.max);
            let tier = if ear < config.ear_critical {
                Tier::Critical
            } else if ear < config.ear_warning {
                Tier::Warning
            } else {
                Tier::Safe
            };
            ChannelStatus::new(tier, SignalValue::Drowsiness(ear))
        }
        SignalValue::Distraction(pose) => {
            // Looking away is never escalated past a warning
            let tier = match pose {
                HeadPose::Forward => Tier::Safe,
                _ => Tier::Warning,
            };
            ChannelStatus::new(tier, value)
        }
        SignalValue::Phone(confidence) => {
            let confidence = config.phone_range.clamp(confidence);
            let tier = if confidence > config.phone_critical {
                Tier::Critical
            } else if confidence > config.phone_warning {
                Tier::Warning
            } else {
                Tier::Safe
            };
            ChannelStatus::new(tier, SignalValue::Phone(confidence))
        }
        SignalValue::Audio(level) => {
            let level = config.audio_range.clamp(level);
            let tier = if level > config.audio_critical_db {
                Tier::Critical
            } else {
                Tier::Safe
            };
            ChannelStatus::new(tier, SignalValue::Audio(level))
        }
    }
}
