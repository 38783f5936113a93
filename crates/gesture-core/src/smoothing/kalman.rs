//! Per-landmark Kalman filtering.
//!
//! Each axis runs an independent constant-velocity filter with state
//! `(x, v)` and covariance `(P_x, P_v, P_xv)`. The 2x2 covariance algebra is
//! written out by hand since the matrix is symmetric and tiny.

use oxboard_gesture_model::{HandResult, Point, LANDMARK_COUNT};
use serde::{Deserialize, Serialize};

/// Kalman tuning shared by every landmark filter.
///
/// Defaults favor stability over responsiveness for hand tracking at 60Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanConfig {
    /// Process noise added to the position variance each step.
    pub process_noise_position: f64,
    /// Process noise added to the velocity variance each step.
    pub process_noise_velocity: f64,
    /// Measurement noise.
    pub measurement_noise: f64,
    /// Fixed time step in seconds.
    pub dt: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_noise_position: 0.005,
            process_noise_velocity: 0.05,
            measurement_noise: 0.15,
            dt: 1.0 / 60.0,
        }
    }
}

impl KalmanConfig {
    /// Tuning for a given frame rate.
    pub fn for_fps(fps: u32) -> Self {
        Self {
            dt: 1.0 / fps.max(1) as f64,
            ..Self::default()
        }
    }
}

/// One-dimensional constant-velocity Kalman filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisKalman {
    x: f64,
    v: f64,
    p_x: f64,
    p_v: f64,
    p_xv: f64,
}

impl AxisKalman {
    /// Start at the first measurement with zero velocity and unit covariance.
    pub fn new(initial: f64) -> Self {
        Self {
            x: initial,
            v: 0.0,
            p_x: 1.0,
            p_v: 1.0,
            p_xv: 0.0,
        }
    }

    /// Run one predict/update cycle and return the filtered position.
    pub fn update(&mut self, measurement: f64, config: &KalmanConfig) -> f64 {
        let dt = config.dt;

        // Predict
        let x_pred = self.x + self.v * dt;
        let v_pred = self.v;
        let p_x_pred =
            self.p_x + 2.0 * self.p_xv * dt + self.p_v * dt * dt + config.process_noise_position;
        let p_v_pred = self.p_v + config.process_noise_velocity;
        let p_xv_pred = self.p_xv + self.p_v * dt;

        // Innovation
        let y = measurement - x_pred;
        let s = p_x_pred + config.measurement_noise;
        if s <= f64::EPSILON {
            self.x = measurement;
            return self.x;
        }

        // Gains
        let k_x = p_x_pred / s;
        let k_v = p_xv_pred / s;

        // Update
        self.x = x_pred + k_x * y;
        self.v = v_pred + k_v * y;
        self.p_x = p_x_pred - k_x * p_x_pred;
        self.p_v = p_v_pred - k_v * p_xv_pred;
        self.p_xv = p_xv_pred - k_x * p_xv_pred;

        self.x
    }

    pub fn position(&self) -> f64 {
        self.x
    }

    pub fn velocity(&self) -> f64 {
        self.v
    }

    /// Position variance.
    pub fn variance(&self) -> f64 {
        self.p_x
    }
}

/// Independent x/y filters for one landmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanFilter2D {
    x: AxisKalman,
    y: AxisKalman,
    z: f64,
}

impl KalmanFilter2D {
    pub fn new(initial: Point) -> Self {
        Self {
            x: AxisKalman::new(initial.x),
            y: AxisKalman::new(initial.y),
            z: initial.z,
        }
    }

    /// Filter a measurement. Depth is passed through unfiltered.
    pub fn update(&mut self, measurement: Point, config: &KalmanConfig) -> Point {
        self.z = measurement.z;
        Point::with_z(
            self.x.update(measurement.x, config),
            self.y.update(measurement.y, config),
            self.z,
        )
    }

    pub fn position(&self) -> Point {
        Point::with_z(self.x.position(), self.y.position(), self.z)
    }

    pub fn velocity(&self) -> (f64, f64) {
        (self.x.velocity(), self.y.velocity())
    }
}

/// Kalman filters for the 21 landmarks of one hand, created lazily.
#[derive(Debug, Clone)]
pub struct LandmarkSmoother {
    config: KalmanConfig,
    filters: [Option<KalmanFilter2D>; LANDMARK_COUNT],
}

impl LandmarkSmoother {
    pub fn new(config: KalmanConfig) -> Self {
        Self {
            config,
            filters: [None; LANDMARK_COUNT],
        }
    }

    /// Filter one landmark. Ids outside `0..21` pass through unchanged.
    pub fn update(&mut self, id: usize, measurement: Point) -> Point {
        let config = self.config;
        match self.filters.get_mut(id) {
            Some(Some(filter)) => filter.update(measurement, &config),
            Some(slot @ None) => {
                *slot = Some(KalmanFilter2D::new(measurement));
                measurement
            }
            None => measurement,
        }
    }

    /// Filter every landmark of a hand, keeping handedness and confidence.
    pub fn smooth_hand(&mut self, hand: &HandResult) -> HandResult {
        let landmarks = hand
            .landmarks
            .iter()
            .enumerate()
            .map(|(id, p)| self.update(id, *p))
            .collect();
        HandResult::new(landmarks, hand.handedness, hand.confidence)
    }

    /// Number of landmarks with a live filter.
    pub fn active_filters(&self) -> usize {
        self.filters.iter().filter(|f| f.is_some()).count()
    }

    pub fn filter(&self, id: usize) -> Option<&KalmanFilter2D> {
        self.filters.get(id).and_then(Option::as_ref)
    }

    pub fn reset(&mut self) {
        self.filters = [None; LANDMARK_COUNT];
    }

    pub fn config(&self) -> &KalmanConfig {
        &self.config
    }
}

impl Default for LandmarkSmoother {
    fn default() -> Self {
        Self::new(KalmanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_to_step_input() {
        let config = KalmanConfig::default();
        let mut filter = AxisKalman::new(0.0);

        let mut converged_at = None;
        for i in 0..200 {
            let out = filter.update(1.0, &config);
            if (out - 1.0).abs() < 0.01 && converged_at.is_none() {
                converged_at = Some(i);
            }
        }

        let steps = converged_at.expect("filter should converge");
        assert!(steps < 100, "took {steps} updates to converge");
        assert!((filter.position() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_output_stays_between_estimate_and_measurement() {
        let config = KalmanConfig::default();
        let mut filter = AxisKalman::new(0.5);
        let out = filter.update(0.6, &config);
        assert!(out > 0.5 && out < 0.6);
    }

    #[test]
    fn test_reduces_jitter() {
        let config = KalmanConfig::default();
        let mut filter = KalmanFilter2D::new(Point::new(0.5, 0.5));
        let noisy = [
            (0.53, 0.48),
            (0.47, 0.52),
            (0.52, 0.49),
            (0.48, 0.51),
            (0.51, 0.50),
            (0.49, 0.50),
        ];
        for (x, y) in noisy {
            let p = filter.update(Point::new(x, y), &config);
            assert!((p.x - 0.5).abs() < 0.03, "x={} drifted", p.x);
            assert!((p.y - 0.5).abs() < 0.03, "y={} drifted", p.y);
        }
    }

    #[test]
    fn test_smoother_creates_filters_lazily() {
        let mut smoother = LandmarkSmoother::default();
        assert_eq!(smoother.active_filters(), 0);

        let first = smoother.update(4, Point::new(0.3, 0.4));
        assert_eq!(first, Point::new(0.3, 0.4));
        assert_eq!(smoother.active_filters(), 1);
        assert!(smoother.filter(4).is_some());

        // Out-of-range ids never allocate.
        let passthrough = smoother.update(42, Point::new(0.9, 0.9));
        assert_eq!(passthrough, Point::new(0.9, 0.9));
        assert_eq!(smoother.active_filters(), 1);

        smoother.reset();
        assert_eq!(smoother.active_filters(), 0);
    }
}
