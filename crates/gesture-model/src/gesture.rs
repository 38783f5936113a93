//! Gesture detections.
//!
//! Every detection is a [`GestureResult`]: a typed payload ([`GestureKind`])
//! plus confidence, creation time, and the hand(s) it came from. Payloads
//! carry only the fields relevant to their kind.

use serde::{Deserialize, Serialize};

use crate::hand::{HandSide, TimestampMs};
use crate::point::Point;

/// Gesture kinds the classifier can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureType {
    Pinch,
    Fist,
    PalmOpen,
    Point,
    FingerCount,
    SwipeHorizontal,
    SwipeVertical,
    TwoHandPinch,
    TwoHandRotate,
    #[serde(alias = "spread")]
    SpreadHands,
}

impl GestureType {
    pub const ALL: [GestureType; 10] = [
        GestureType::Pinch,
        GestureType::Fist,
        GestureType::PalmOpen,
        GestureType::Point,
        GestureType::FingerCount,
        GestureType::SwipeHorizontal,
        GestureType::SwipeVertical,
        GestureType::TwoHandPinch,
        GestureType::TwoHandRotate,
        GestureType::SpreadHands,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pinch => "pinch",
            Self::Fist => "fist",
            Self::PalmOpen => "palm-open",
            Self::Point => "point",
            Self::FingerCount => "finger-count",
            Self::SwipeHorizontal => "swipe-horizontal",
            Self::SwipeVertical => "swipe-vertical",
            Self::TwoHandPinch => "two-hand-pinch",
            Self::TwoHandRotate => "two-hand-rotate",
            Self::SpreadHands => "spread-hands",
        }
    }

    /// Whether the gesture needs both hands in frame.
    pub fn is_two_handed(&self) -> bool {
        matches!(
            self,
            Self::TwoHandPinch | Self::TwoHandRotate | Self::SpreadHands
        )
    }

    /// Parse a name as used in mapping files (`"spread"` is accepted).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "spread" => Some(Self::SpreadHands),
            other => Self::ALL.into_iter().find(|t| t.as_str() == other),
        }
    }
}

/// Direction of a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Typed gesture payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GestureKind {
    /// Thumb and index fingertips close together.
    Pinch {
        /// `(threshold - distance) / threshold`, clamped to [0, 1].
        strength: f64,
        /// Thumb-tip to index-tip distance (normalized).
        distance: f64,
        /// Midpoint between the two fingertips.
        position: Point,
    },

    /// All fingertips close to the wrist.
    Fist { mean_tip_distance: f64 },

    /// At least three of index..pinky extended.
    PalmOpen { extended_fingers: u8 },

    /// Index extended, middle/ring/pinky curled.
    Point { tip: Point },

    /// Number of extended fingers, thumb included.
    FingerCount { count: u8 },

    SwipeHorizontal {
        direction: SwipeDirection,
        /// Signed velocity along x (normalized units per second).
        velocity: f64,
    },

    SwipeVertical {
        direction: SwipeDirection,
        /// Signed velocity along y (normalized units per second).
        velocity: f64,
    },

    /// Both hands pinching at once.
    TwoHandPinch {
        left_strength: f64,
        right_strength: f64,
        /// Wrist-to-wrist distance (normalized).
        wrist_distance: f64,
        /// Horizontal midpoint of both wrists.
        crossfader: f64,
    },

    /// Wrists rotating around their shared centroid.
    TwoHandRotate {
        /// Rotation since the previous frame in radians, in [0, π].
        rotation: f64,
        clockwise: bool,
    },

    /// Hands moving apart.
    #[serde(alias = "spread")]
    SpreadHands {
        /// Wrist distance as a fraction of the screen diagonal.
        distance: f64,
        /// Distance relative to a full spread, clamped to [0, 1].
        ratio: f64,
        /// Horizontal midpoint of both wrists.
        crossfader: f64,
    },
}

impl GestureKind {
    pub fn gesture_type(&self) -> GestureType {
        match self {
            Self::Pinch { .. } => GestureType::Pinch,
            Self::Fist { .. } => GestureType::Fist,
            Self::PalmOpen { .. } => GestureType::PalmOpen,
            Self::Point { .. } => GestureType::Point,
            Self::FingerCount { .. } => GestureType::FingerCount,
            Self::SwipeHorizontal { .. } => GestureType::SwipeHorizontal,
            Self::SwipeVertical { .. } => GestureType::SwipeVertical,
            Self::TwoHandPinch { .. } => GestureType::TwoHandPinch,
            Self::TwoHandRotate { .. } => GestureType::TwoHandRotate,
            Self::SpreadHands { .. } => GestureType::SpreadHands,
        }
    }

    /// Crossfader position carried by two-hand payloads.
    pub fn crossfader(&self) -> Option<f64> {
        match self {
            Self::TwoHandPinch { crossfader, .. } | Self::SpreadHands { crossfader, .. } => {
                Some(*crossfader)
            }
            _ => None,
        }
    }
}

/// A single gesture detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureResult {
    #[serde(flatten)]
    pub kind: GestureKind,

    /// Detection confidence in [0, 1].
    pub confidence: f64,

    /// Time the detection was produced.
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<HandSide>,
}

impl GestureResult {
    pub fn new(
        kind: GestureKind,
        confidence: f64,
        timestamp_ms: TimestampMs,
        hand: Option<HandSide>,
    ) -> Self {
        Self {
            kind,
            confidence: confidence.clamp(0.0, 1.0),
            timestamp_ms,
            hand,
        }
    }

    pub fn gesture_type(&self) -> GestureType {
        self.kind.gesture_type()
    }
}
