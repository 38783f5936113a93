//! Hand-center motion history: swipe velocity and speed stability.

use std::collections::VecDeque;

use oxboard_common::ms_to_secs;
use oxboard_gesture_model::{Point, TimestampMs};

/// Rolling hand-center positions for one hand.
#[derive(Debug, Clone)]
pub struct MotionHistory {
    window_ms: u64,
    samples: VecDeque<(TimestampMs, Point)>,
}

/// Below this mean speed (units/s) the hand counts as still.
const STILL_SPEED: f64 = 0.05;

impl MotionHistory {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            samples: VecDeque::new(),
        }
    }

    pub fn push(&mut self, timestamp_ms: TimestampMs, center: Point) {
        if self
            .samples
            .back()
            .is_some_and(|(t, _)| *t > timestamp_ms)
        {
            // Time went backwards; start over.
            self.samples.clear();
        }
        self.samples.push_back((timestamp_ms, center));
        while self
            .samples
            .front()
            .is_some_and(|(t, _)| timestamp_ms.saturating_sub(*t) > self.window_ms)
        {
            self.samples.pop_front();
        }
    }

    /// Average velocity `(vx, vy)` in units/s across the window.
    pub fn velocity(&self) -> Option<(f64, f64)> {
        let (t0, p0) = self.samples.front()?;
        let (t1, p1) = self.samples.back()?;
        let dt = ms_to_secs(t1.saturating_sub(*t0));
        if dt <= 0.0 {
            return None;
        }
        Some(((p1.x - p0.x) / dt, (p1.y - p0.y) / dt))
    }

    /// `1 / (1 + cv)` of frame-to-frame speeds.
    ///
    /// Returns 1.0 with fewer than three samples or when the hand is still.
    pub fn velocity_stability(&self) -> f64 {
        if self.samples.len() < 3 {
            return 1.0;
        }
        let speeds = self
            .samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .filter_map(|((t0, p0), (t1, p1))| {
                let dt = ms_to_secs(t1.saturating_sub(*t0));
                (dt > 0.0).then(|| p0.distance_to(p1) / dt)
            });

        let (n, sum) = speeds.clone().fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
        if n == 0 {
            return 1.0;
        }
        let mean = sum / n as f64;
        if mean < STILL_SPEED {
            return 1.0;
        }
        let variance = speeds.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        1.0 / (1.0 + variance.sqrt() / mean)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
