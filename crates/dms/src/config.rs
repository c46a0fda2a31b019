//! DMS configuration

use serde::{Deserialize, Serialize};

/// Inclusive range a channel's raw value is clamped into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp into the range. NaN is treated as the lower bound.
    pub fn clamp(&self, value: f64) -> f64 {
        self.clamp_or(value, self.min)
    }

    /// Clamp into the range, replacing NaN with `fallback`
    pub fn clamp_or(&self, value: f64, fallback: f64) -> f64 {
        let value = if value.is_nan() { fallback } else { value };
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-channel classification thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// EAR below this is critical (default: 0.22)
    pub ear_critical: f64,
    /// EAR below this is a warning (default: 0.25)
    pub ear_warning: f64,
    /// Accepted EAR range (default: 0.15 - 0.35)
    pub ear_range: ValueRange,

    /// Phone confidence above this is a warning (default: 40)
    pub phone_warning: f64,
    /// Phone confidence above this is critical (default: 70)
    pub phone_critical: f64,
    /// Accepted phone confidence range (default: 0 - 100)
    pub phone_range: ValueRange,

    /// Audio level above this is critical, in dB (default: 85)
    pub audio_critical_db: f64,
    /// Accepted audio range in dB (default: 0 - 140)
    pub audio_range: ValueRange,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            ear_critical: 0.22,
            ear_warning: 0.25,
            ear_range: ValueRange::new(0.15, 0.35),
            phone_warning: 40.0,
            phone_critical: 70.0,
            phone_range: ValueRange::new(0.0, 100.0),
            audio_critical_db: 85.0,
            audio_range: ValueRange::new(0.0, 140.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        let range = ValueRange::new(0.15, 0.35);
        assert_eq!(range.clamp(0.05), 0.15);
        assert_eq!(range.clamp(0.9), 0.35);
        assert_eq!(range.clamp(0.2), 0.2);
        assert_eq!(range.clamp(f64::NAN), 0.15);
        assert_eq!(range.clamp(f64::INFINITY), 0.35);
        assert_eq!(range.clamp_or(f64::NAN, 0.35), 0.35);
        assert_eq!(range.clamp_or(f64::NAN, 9.0), 0.35);
    }
}
