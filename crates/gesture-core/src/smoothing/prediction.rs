//! Short-horizon linear prediction.
//!
//! Compensates pipeline latency by projecting the latest sample forward
//! along its recent velocity. Noisy velocity lowers the projection weight.

use std::collections::VecDeque;

use oxboard_common::ms_to_secs;
use oxboard_gesture_model::TimestampMs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Samples used to estimate velocity.
    pub history: usize,
    /// How far ahead to project, in milliseconds.
    pub horizon_ms: f64,
    /// Scales velocity variance into a confidence penalty.
    pub variance_gain: f64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            history: 5,
            horizon_ms: 40.0,
            variance_gain: 10.0,
        }
    }
}

/// Single-axis linear predictor.
#[derive(Debug, Clone)]
pub struct LinearPredictor {
    config: PredictionConfig,
    samples: VecDeque<(TimestampMs, f64)>,
    confidence: f64,
}

impl LinearPredictor {
    pub fn new(config: PredictionConfig) -> Self {
        Self {
            samples: VecDeque::with_capacity(config.history.max(2)),
            config,
            confidence: 0.0,
        }
    }

    /// Record a sample and return the predicted value.
    pub fn predict(&mut self, value: f64, timestamp_ms: TimestampMs) -> f64 {
        self.samples.push_back((timestamp_ms, value));
        while self.samples.len() > self.config.history.max(2) {
            self.samples.pop_front();
        }

        let velocities: Vec<f64> = self
            .samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .filter_map(|((t0, x0), (t1, x1))| {
                let dt = ms_to_secs(t1.saturating_sub(*t0));
                (dt > 0.0).then(|| (x1 - x0) / dt)
            })
            .collect();

        if velocities.is_empty() {
            self.confidence = 0.0;
            return value;
        }

        let n = velocities.len() as f64;
        let mean = velocities.iter().sum::<f64>() / n;
        let variance = velocities.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        self.confidence = 1.0 / (1.0 + variance * self.config.variance_gain);
        value + mean * (self.config.horizon_ms / 1000.0) * self.confidence
    }

    /// Confidence of the last prediction, 0 before any velocity estimate.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.confidence = 0.0;
    }
}

impl Default for LinearPredictor {
    fn default() -> Self {
        Self::new(PredictionConfig::default())
    }
}
