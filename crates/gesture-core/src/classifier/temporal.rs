//! Rolling gesture history used to reject flickering detections.

use std::collections::VecDeque;

use oxboard_gesture_model::{GestureType, HandSide, TimestampMs};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    pub window_ms: u64,
    pub max_samples: usize,
    /// Weight of type consistency, the remainder goes to confidence stability.
    pub consistency_weight: f64,
    /// Exponent scale for `exp(-k * variance)`.
    pub variance_scale: f64,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            window_ms: 1000,
            max_samples: 50,
            consistency_weight: 0.7,
            variance_scale: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TemporalSample {
    gesture_type: GestureType,
    confidence: f64,
    timestamp_ms: TimestampMs,
}

/// Per-hand-side history of detections.
#[derive(Debug, Clone)]
pub struct TemporalFilter {
    config: TemporalConfig,
    // left, right, both
    histories: [VecDeque<TemporalSample>; 3],
}

fn slot(side: HandSide) -> usize {
    match side {
        HandSide::Left => 0,
        HandSide::Right => 1,
        HandSide::Both => 2,
    }
}

impl TemporalFilter {
    pub fn new(config: TemporalConfig) -> Self {
        Self {
            config,
            histories: Default::default(),
        }
    }

    /// Record a detection and drop samples outside the window.
    pub fn record(
        &mut self,
        side: HandSide,
        gesture_type: GestureType,
        confidence: f64,
        timestamp_ms: TimestampMs,
    ) {
        let history = &mut self.histories[slot(side)];
        history.push_back(TemporalSample {
            gesture_type,
            confidence,
            timestamp_ms,
        });
        while history
            .front()
            .is_some_and(|s| timestamp_ms.saturating_sub(s.timestamp_ms) > self.config.window_ms)
        {
            history.pop_front();
        }
        while history.len() > self.config.max_samples {
            history.pop_front();
        }
    }

    /// Fraction of samples that share the most common gesture type.
    pub fn type_consistency(&self, side: HandSide) -> f64 {
        let history = &self.histories[slot(side)];
        if history.is_empty() {
            return 0.0;
        }
        let mut counts = [0usize; GestureType::ALL.len()];
        for sample in history {
            if let Some(i) = GestureType::ALL.iter().position(|t| *t == sample.gesture_type) {
                counts[i] += 1;
            }
        }
        let modal = counts.iter().copied().max().unwrap_or(0);
        modal as f64 / history.len() as f64
    }

    /// `exp(-k * variance)` of this gesture type's recent confidences.
    pub fn confidence_stability(&self, side: HandSide, gesture_type: GestureType) -> f64 {
        let history = &self.histories[slot(side)];
        let (n, sum) = history
            .iter()
            .filter(|s| s.gesture_type == gesture_type)
            .fold((0usize, 0.0), |(n, sum), s| (n + 1, sum + s.confidence));
        if n == 0 {
            return 0.0;
        }
        let mean = sum / n as f64;
        let variance = history
            .iter()
            .filter(|s| s.gesture_type == gesture_type)
            .map(|s| (s.confidence - mean).powi(2))
            .sum::<f64>()
            / n as f64;
        (-self.config.variance_scale * variance).exp()
    }

    /// Weighted blend of type consistency and confidence stability.
    pub fn stability(&self, side: HandSide, gesture_type: GestureType) -> f64 {
        let w = self.config.consistency_weight;
        w * self.type_consistency(side) + (1.0 - w) * self.confidence_stability(side, gesture_type)
    }

    pub fn len(&self, side: HandSide) -> usize {
        self.histories[slot(side)].len()
    }

    pub fn reset(&mut self) {
        self.histories.iter_mut().for_each(VecDeque::clear);
    }
}

impl Default for TemporalFilter {
    fn default() -> Self {
        Self::new(TemporalConfig::default())
    }
}
