//! Statistical outlier clipping over a rolling window.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    /// Number of recent raw samples kept.
    pub window: usize,
    /// Samples farther than `k` standard deviations from the mean are clipped.
    pub k: f64,
    /// Lower bound on the standard deviation so a still hand does not clip
    /// every small tremor.
    pub min_sigma: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            window: 10,
            k: 2.0,
            min_sigma: 0.01,
        }
    }
}

/// Minimum window fill before clipping starts.
const MIN_SAMPLES: usize = 3;

/// Clips single-axis samples that jump too far from the recent mean.
#[derive(Debug, Clone)]
pub struct OutlierRejector {
    config: OutlierConfig,
    window: VecDeque<f64>,
}

impl OutlierRejector {
    pub fn new(config: OutlierConfig) -> Self {
        Self {
            window: VecDeque::with_capacity(config.window.max(1)),
            config,
        }
    }

    /// Filter one sample.
    ///
    /// The returned value may be clipped to `mean ± k·σ`, but the raw sample
    /// is what enters the window, so a sustained move is followed after a few
    /// frames.
    pub fn filter(&mut self, value: f64) -> f64 {
        let output = if self.window.len() >= MIN_SAMPLES {
            let (mean, sigma) = self.stats();
            let limit = self.config.k * sigma.max(self.config.min_sigma);
            let deviation = value - mean;
            if deviation.abs() > limit {
                mean + limit.copysign(deviation)
            } else {
                value
            }
        } else {
            value
        };

        self.window.push_back(value);
        while self.window.len() > self.config.window.max(1) {
            self.window.pop_front();
        }

        output
    }

    fn stats(&self) -> (f64, f64) {
        let n = self.window.len() as f64;
        let mean = self.window.iter().sum::<f64>() / n;
        let variance = self.window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (mean, variance.sqrt())
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

impl Default for OutlierRejector {
    fn default() -> Self {
        Self::new(OutlierConfig::default())
    }
}
