//! Signal readings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{Channel, HeadPose, SignalValue};

/// One observation from the signal feed. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalReading {
    pub value: SignalValue,
    pub observed_at: DateTime<Utc>,
}

impl SignalReading {
    pub fn new(value: SignalValue, observed_at: DateTime<Utc>) -> Self {
        Self { value, observed_at }
    }

    /// Reading stamped with the current time
    pub fn now(value: SignalValue) -> Self {
        Self::new(value, Utc::now())
    }

    pub fn drowsiness(ear: f64) -> Self {
        Self::now(SignalValue::Drowsiness(ear))
    }

    pub fn distraction(pose: HeadPose) -> Self {
        Self::now(SignalValue::Distraction(pose))
    }

    pub fn phone(confidence: f64) -> Self {
        Self::now(SignalValue::Phone(confidence))
    }

    pub fn audio(level_db: f64) -> Self {
        Self::now(SignalValue::Audio(level_db))
    }

    pub fn channel(&self) -> Channel {
        self.value.channel()
    }
}
