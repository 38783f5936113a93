//! Landmark smoothing.
//!
//! Raw tracker landmarks jitter by a few thousandths of the frame every
//! frame. The smoothers here turn that into stable positions before any
//! geometry is measured. Selectable pipelines:
//!
//! - **Kalman**: one constant-velocity filter per landmark and axis
//! - **Advanced**: outlier clipping, short-horizon prediction, adaptive EMA,
//!   then the Kalman pass
//! - **None**: pass through

pub mod adaptive;
pub mod advanced;
pub mod kalman;
pub mod outlier;
pub mod prediction;

pub use adaptive::{AdaptiveConfig, AdaptiveSmoother};
pub use advanced::{AdvancedConfig, AdvancedLandmarkSmoother, AdvancedSmoother};
pub use kalman::{AxisKalman, KalmanConfig, KalmanFilter2D, LandmarkSmoother};
pub use outlier::{OutlierConfig, OutlierRejector};
pub use prediction::{LinearPredictor, PredictionConfig};

use oxboard_common::SmoothingPreset;
use oxboard_gesture_model::{HandResult, TimestampMs};
use serde::{Deserialize, Serialize};

/// Which smoothing pipeline runs on each hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMode {
    #[default]
    Kalman,
    Advanced,
    /// No smoothing, pass through raw landmarks.
    None,
}

impl From<SmoothingPreset> for SmoothingMode {
    fn from(preset: SmoothingPreset) -> Self {
        match preset {
            SmoothingPreset::Kalman => Self::Kalman,
            SmoothingPreset::Advanced => Self::Advanced,
            SmoothingPreset::None => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub mode: SmoothingMode,
    pub kalman: KalmanConfig,
    pub advanced: AdvancedConfig,
}

/// Smoothing state for one hand side.
#[derive(Debug, Clone)]
pub enum HandSmoother {
    Kalman(LandmarkSmoother),
    Advanced(Box<AdvancedLandmarkSmoother>),
    Passthrough,
}

impl HandSmoother {
    pub fn new(config: &SmoothingConfig) -> Self {
        match config.mode {
            SmoothingMode::Kalman => Self::Kalman(LandmarkSmoother::new(config.kalman)),
            SmoothingMode::Advanced => Self::Advanced(Box::new(AdvancedLandmarkSmoother::new(
                config.advanced,
                config.kalman,
            ))),
            SmoothingMode::None => Self::Passthrough,
        }
    }

    pub fn smooth_hand(&mut self, hand: &HandResult, timestamp_ms: TimestampMs) -> HandResult {
        match self {
            Self::Kalman(smoother) => smoother.smooth_hand(hand),
            Self::Advanced(smoother) => smoother.smooth_hand(hand, timestamp_ms),
            Self::Passthrough => hand.clone(),
        }
    }

    pub fn mode(&self) -> SmoothingMode {
        match self {
            Self::Kalman(_) => SmoothingMode::Kalman,
            Self::Advanced(_) => SmoothingMode::Advanced,
            Self::Passthrough => SmoothingMode::None,
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Kalman(smoother) => smoother.reset(),
            Self::Advanced(smoother) => smoother.reset(),
            Self::Passthrough => {}
        }
    }
}
