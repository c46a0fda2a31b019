//! Signal feeds
//!
//! A feed yields a batch of readings once per cadence period. Every value a
//! feed produces is expected to fall in the channel's declared range, but
//! classification tolerates transient noise outside it.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

use crate::reading::SignalReading;
use crate::state::{HeadPose, SignalValue};

/// Default cadence of the dashboard feed
pub const DEFAULT_CADENCE: Duration = Duration::from_secs(3);

/// Source of periodic signal readings
pub trait SignalFeed {
    /// Interval between two batches
    fn cadence(&self) -> Duration;

    /// Readings for the next period, in observation order
    fn next_batch(&mut self) -> Vec<SignalReading>;
}

/// Feed replaying a fixed script, one batch per period. Empty once drained.
#[derive(Debug, Clone)]
pub struct ScriptedFeed {
    batches: VecDeque<Vec<SignalReading>>,
    cadence: Duration,
}

impl ScriptedFeed {
    pub fn new(batches: Vec<Vec<SignalReading>>) -> Self {
        Self {
            batches: batches.into(),
            cadence: DEFAULT_CADENCE,
        }
    }

    /// One value per batch
    pub fn from_values(values: impl IntoIterator<Item = SignalValue>) -> Self {
        Self::new(
            values
                .into_iter()
                .map(|v| vec![SignalReading::now(v)])
                .collect(),
        )
    }

    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn is_exhausted(&self) -> bool {
        self.batches.is_empty()
    }
}

impl SignalFeed for ScriptedFeed {
    fn cadence(&self) -> Duration {
        self.cadence
    }

    fn next_batch(&mut self) -> Vec<SignalReading> {
        self.batches.pop_front().unwrap_or_default()
    }
}

/// Pseudo-random demo feed for running without sensors.
///
/// Deterministic for a given seed: EAR drifts in a bounded random walk, head
/// pose changes on roughly 30% of periods, phone confidence is reported on
/// roughly 15%, and audio level every period.
#[derive(Debug, Clone)]
pub struct SimulatedFeed {
    rng: Mcg128Xsl64,
    cycle: u64,
    ear: f64,
    cadence: Duration,
}

impl SimulatedFeed {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
            cycle: 0,
            ear: 0.28,
            cadence: DEFAULT_CADENCE,
        }
    }

    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }
}

impl SignalFeed for SimulatedFeed {
    fn cadence(&self) -> Duration {
        self.cadence
    }

    fn next_batch(&mut self) -> Vec<SignalReading> {
        self.cycle += 1;
        let mut batch = Vec::with_capacity(4);

        self.ear = (self.ear + self.rng.gen_range(-0.05..0.05)).clamp(0.15, 0.35);
        batch.push(SignalReading::drowsiness(self.ear));

        if self.rng.gen::<f64>() > 0.7 {
            let idx = self.rng.gen_range(0..HeadPose::ALL.len());
            batch.push(SignalReading::distraction(HeadPose::ALL[idx]));
        }

        if self.rng.gen::<f64>() > 0.85 {
            batch.push(SignalReading::phone(self.rng.gen_range(0..100) as f64));
        }

        batch.push(SignalReading::audio(self.rng.gen_range(40..90) as f64));

        debug!("Simulated feed cycle {}: {} readings", self.cycle, batch.len());
        batch
    }
}
