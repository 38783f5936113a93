//! Motion-adaptive exponential smoothing.
//!
//! Slow motion gets heavy smoothing, fast motion follows closely. Same idea
//! as a One Euro filter, with the cutoff replaced by a direct alpha ramp.

use oxboard_common::ms_to_secs;
use oxboard_gesture_model::TimestampMs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Alpha with no motion before clamping.
    pub base_alpha: f64,
    pub min_alpha: f64,
    pub max_alpha: f64,
    /// Alpha added per unit/s of speed.
    pub speed_gain: f64,
    /// Alpha added per unit/s² of acceleration.
    pub accel_gain: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            base_alpha: 0.1,
            min_alpha: 0.1,
            max_alpha: 0.9,
            speed_gain: 0.5,
            accel_gain: 0.01,
        }
    }
}

impl AdaptiveConfig {
    pub fn alpha(&self, speed: f64, accel: f64) -> f64 {
        (self.base_alpha + self.speed_gain * speed.abs() + self.accel_gain * accel.abs())
            .clamp(self.min_alpha, self.max_alpha)
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    raw: f64,
    smoothed: f64,
    velocity: f64,
    timestamp_ms: TimestampMs,
}

/// Single-axis adaptive EMA.
#[derive(Debug, Clone)]
pub struct AdaptiveSmoother {
    config: AdaptiveConfig,
    last: Option<Sample>,
    alpha: f64,
}

impl AdaptiveSmoother {
    pub fn new(config: AdaptiveConfig) -> Self {
        Self {
            config,
            last: None,
            alpha: config.min_alpha,
        }
    }

    pub fn smooth(&mut self, value: f64, timestamp_ms: TimestampMs) -> f64 {
        let Some(last) = self.last else {
            self.last = Some(Sample {
                raw: value,
                smoothed: value,
                velocity: 0.0,
                timestamp_ms,
            });
            return value;
        };

        let dt = ms_to_secs(timestamp_ms.saturating_sub(last.timestamp_ms));
        let (velocity, accel) = if dt > 0.0 {
            let v = (value - last.raw) / dt;
            (v, (v - last.velocity) / dt)
        } else {
            (last.velocity, 0.0)
        };

        self.alpha = self.config.alpha(velocity, accel);
        let smoothed = last.smoothed + self.alpha * (value - last.smoothed);

        self.last = Some(Sample {
            raw: value,
            smoothed,
            velocity,
            timestamp_ms,
        });
        smoothed
    }

    /// Alpha used for the last update.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.alpha = self.config.min_alpha;
    }
}

impl Default for AdaptiveSmoother {
    fn default() -> Self {
        Self::new(AdaptiveConfig::default())
    }
}
