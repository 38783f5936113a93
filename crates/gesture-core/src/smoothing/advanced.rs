//! The advanced smoothing chain:
//! outlier rejection, then prediction, then adaptive EMA, then Kalman.

use oxboard_gesture_model::{HandResult, Point, TimestampMs, LANDMARK_COUNT};
use serde::{Deserialize, Serialize};

use super::adaptive::{AdaptiveConfig, AdaptiveSmoother};
use super::kalman::{KalmanConfig, KalmanFilter2D};
use super::outlier::{OutlierConfig, OutlierRejector};
use super::prediction::{LinearPredictor, PredictionConfig};

/// Tuning for every stage of the advanced chain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    pub outlier: OutlierConfig,
    pub prediction: PredictionConfig,
    pub adaptive: AdaptiveConfig,
}

#[derive(Debug, Clone)]
struct AxisChain {
    outlier: OutlierRejector,
    predictor: LinearPredictor,
    adaptive: AdaptiveSmoother,
}

impl AxisChain {
    fn new(config: &AdvancedConfig) -> Self {
        Self {
            outlier: OutlierRejector::new(config.outlier),
            predictor: LinearPredictor::new(config.prediction),
            adaptive: AdaptiveSmoother::new(config.adaptive),
        }
    }

    fn process(&mut self, value: f64, timestamp_ms: TimestampMs) -> f64 {
        let clipped = self.outlier.filter(value);
        let predicted = self.predictor.predict(clipped, timestamp_ms);
        self.adaptive.smooth(predicted, timestamp_ms)
    }

    fn reset(&mut self) {
        self.outlier.reset();
        self.predictor.reset();
        self.adaptive.reset();
    }
}

/// Advanced chain for one landmark.
#[derive(Debug, Clone)]
pub struct AdvancedSmoother {
    x: AxisChain,
    y: AxisChain,
    kalman: Option<KalmanFilter2D>,
    kalman_config: KalmanConfig,
}

impl AdvancedSmoother {
    pub fn new(config: &AdvancedConfig, kalman_config: KalmanConfig) -> Self {
        Self {
            x: AxisChain::new(config),
            y: AxisChain::new(config),
            kalman: None,
            kalman_config,
        }
    }

    pub fn update(&mut self, measurement: Point, timestamp_ms: TimestampMs) -> Point {
        let staged = Point::with_z(
            self.x.process(measurement.x, timestamp_ms),
            self.y.process(measurement.y, timestamp_ms),
            measurement.z,
        );
        if let Some(filter) = self.kalman.as_mut() {
            return filter.update(staged, &self.kalman_config);
        }
        self.kalman = Some(KalmanFilter2D::new(staged));
        staged
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.kalman = None;
    }
}

/// Advanced chains for the 21 landmarks of one hand, created lazily.
#[derive(Debug, Clone)]
pub struct AdvancedLandmarkSmoother {
    config: AdvancedConfig,
    kalman_config: KalmanConfig,
    chains: [Option<AdvancedSmoother>; LANDMARK_COUNT],
}

impl AdvancedLandmarkSmoother {
    pub fn new(config: AdvancedConfig, kalman_config: KalmanConfig) -> Self {
        Self {
            config,
            kalman_config,
            chains: std::array::from_fn(|_| None),
        }
    }

    /// Smooth one landmark. Ids outside `0..21` pass through unchanged.
    pub fn update(&mut self, id: usize, measurement: Point, timestamp_ms: TimestampMs) -> Point {
        let (config, kalman_config) = (self.config, self.kalman_config);
        let Some(slot) = self.chains.get_mut(id) else {
            return measurement;
        };
        slot.get_or_insert_with(|| AdvancedSmoother::new(&config, kalman_config))
            .update(measurement, timestamp_ms)
    }

    pub fn smooth_hand(&mut self, hand: &HandResult, timestamp_ms: TimestampMs) -> HandResult {
        let landmarks = hand
            .landmarks
            .iter()
            .enumerate()
            .map(|(id, p)| self.update(id, *p, timestamp_ms))
            .collect();
        HandResult::new(landmarks, hand.handedness, hand.confidence)
    }

    pub fn active_chains(&self) -> usize {
        self.chains.iter().filter(|c| c.is_some()).count()
    }

    pub fn reset(&mut self) {
        self.chains.iter_mut().for_each(|c| *c = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_passes_through() {
        let mut smoother = AdvancedSmoother::new(&AdvancedConfig::default(), KalmanConfig::default());
        let p = Point::new(0.4, 0.6);
        assert_eq!(smoother.update(p, 0), p);
    }

    #[test]
    fn test_spike_is_damped() {
        let mut smoother = AdvancedSmoother::new(&AdvancedConfig::default(), KalmanConfig::default());
        for i in 0..10u64 {
            smoother.update(Point::new(0.5, 0.5), i * 16);
        }
        let out = smoother.update(Point::new(0.9, 0.5), 160);
        assert!(out.x < 0.55, "spike leaked through: {}", out.x);
        assert!((out.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_settles_on_new_position() {
        let mut smoother = AdvancedSmoother::new(&AdvancedConfig::default(), KalmanConfig::default());
        smoother.update(Point::new(0.2, 0.2), 0);
        let mut out = Point::ORIGIN;
        for i in 1..200u64 {
            out = smoother.update(Point::new(0.6, 0.2), i * 16);
        }
        assert!((out.x - 0.6).abs() < 0.01, "x={}", out.x);
    }

    #[test]
    fn test_hand_smoother_allocates_per_landmark_and_resets() {
        let mut smoother =
            AdvancedLandmarkSmoother::new(AdvancedConfig::default(), KalmanConfig::default());
        let hand = HandResult::new(
            (0..21).map(|i| Point::new(0.3 + i as f64 * 0.01, 0.5)).collect(),
            oxboard_gesture_model::Handedness::Left,
            0.9,
        );
        let out = smoother.smooth_hand(&hand, 0);
        assert_eq!(out, hand);
        assert_eq!(smoother.active_chains(), 21);
        assert_eq!(smoother.update(30, Point::new(0.1, 0.1), 16), Point::new(0.1, 0.1));
        smoother.reset();
        assert_eq!(smoother.active_chains(), 0);
    }
}
