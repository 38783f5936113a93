//! Deterministic synthetic hands.
//!
//! Poses are fixed landmark offsets from the wrist, laid out so every
//! pairwise landmark distance stays within the plausible band used by the
//! quality scorer. Left hands are mirrored horizontally.

use std::fmt;
use std::str::FromStr;

use oxboard_gesture_model::{HandFrame, HandResult, Handedness, Point, ScreenSize, TimestampMs};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pose {
    OpenPalm,
    Fist,
    Pinch,
    Point,
}

impl Pose {
    pub const ALL: [Pose; 4] = [Pose::OpenPalm, Pose::Fist, Pose::Pinch, Pose::Point];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenPalm => "open-palm",
            Self::Fist => "fist",
            Self::Pinch => "pinch",
            Self::Point => "point",
        }
    }

    fn offsets(&self) -> &'static [(f64, f64); 21] {
        match self {
            Self::OpenPalm => &OPEN_PALM,
            Self::Fist => &FIST,
            Self::Pinch => &PINCH,
            Self::Point => &POINT,
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(Pose::as_str).collect();
                format!("unknown pose '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

#[rustfmt::skip]
const OPEN_PALM: [(f64, f64); 21] = [
    (0.0, 0.0),
    (-0.04, -0.03), (-0.07, -0.06), (-0.09, -0.09), (-0.11, -0.13),
    (-0.03, -0.10), (-0.035, -0.15), (-0.04, -0.18), (-0.045, -0.21),
    (0.0, -0.105), (0.0, -0.16), (0.0, -0.195), (0.0, -0.23),
    (0.03, -0.10), (0.035, -0.15), (0.04, -0.18), (0.045, -0.21),
    (0.055, -0.09), (0.065, -0.125), (0.072, -0.15), (0.08, -0.175),
];

#[rustfmt::skip]
const FIST: [(f64, f64); 21] = [
    (0.0, 0.0),
    (-0.03, -0.02), (-0.055, -0.035), (-0.07, -0.055), (-0.085, -0.07),
    (-0.03, -0.09), (-0.03, -0.12), (-0.02, -0.10), (-0.02, -0.075),
    (0.0, -0.095), (0.0, -0.125), (0.008, -0.108), (0.005, -0.08),
    (0.025, -0.09), (0.028, -0.118), (0.033, -0.102), (0.03, -0.074),
    (0.05, -0.08), (0.055, -0.105), (0.06, -0.092), (0.052, -0.066),
];

#[rustfmt::skip]
const PINCH: [(f64, f64); 21] = [
    (0.0, 0.0),
    (-0.04, -0.03), (-0.07, -0.06), (-0.085, -0.09), (-0.08, -0.12),
    (-0.03, -0.10), (-0.05, -0.14), (-0.065, -0.145), (-0.075, -0.135),
    (0.0, -0.105), (0.0, -0.16), (0.0, -0.195), (0.0, -0.23),
    (0.03, -0.10), (0.035, -0.15), (0.04, -0.18), (0.045, -0.21),
    (0.055, -0.09), (0.065, -0.125), (0.072, -0.15), (0.08, -0.175),
];

#[rustfmt::skip]
const POINT: [(f64, f64); 21] = [
    (0.0, 0.0),
    (-0.04, -0.03), (-0.06, -0.06), (-0.055, -0.085), (-0.02, -0.08),
    (-0.03, -0.10), (-0.035, -0.15), (-0.04, -0.18), (-0.045, -0.21),
    (0.0, -0.105), (0.005, -0.135), (0.01, -0.115), (0.008, -0.09),
    (0.028, -0.10), (0.032, -0.128), (0.036, -0.108), (0.034, -0.085),
    (0.055, -0.09), (0.06, -0.115), (0.064, -0.1), (0.058, -0.078),
];

/// A hand in `pose` with its wrist at `wrist`.
pub fn hand(pose: Pose, handedness: Handedness, wrist: Point, confidence: f64) -> HandResult {
    let mirror = match handedness {
        Handedness::Left => -1.0,
        Handedness::Right => 1.0,
    };
    let landmarks = pose
        .offsets()
        .iter()
        .map(|(dx, dy)| Point::new(wrist.x + mirror * dx, wrist.y + dy))
        .collect();
    HandResult::new(landmarks, handedness, confidence)
}

/// Parameters for a generated frame sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceSpec {
    pub pose: Pose,
    pub frames: usize,
    pub interval_ms: u64,
    /// Wrist position of the right hand (or the only hand).
    pub start: Point,
    /// Wrist displacement per frame.
    pub step: Point,
    /// Add a mirrored left hand at `1 - x`.
    pub both_hands: bool,
    pub confidence: f64,
    pub screen: ScreenSize,
}

impl SequenceSpec {
    pub fn new(pose: Pose, frames: usize) -> Self {
        Self {
            pose,
            frames,
            interval_ms: 33,
            start: Point::new(0.6, 0.6),
            step: Point::ORIGIN,
            both_hands: false,
            confidence: 0.9,
            screen: ScreenSize::default(),
        }
    }
}

/// Generate a frame sequence starting at timestamp 0.
pub fn sequence(spec: &SequenceSpec) -> Vec<HandFrame> {
    (0..spec.frames)
        .map(|i| {
            let n = i as f64;
            let wrist = Point::new(spec.start.x + spec.step.x * n, spec.start.y + spec.step.y * n);
            let mut hands = vec![hand(spec.pose, Handedness::Right, wrist, spec.confidence)];
            if spec.both_hands {
                let mirrored = Point::new(1.0 - wrist.x, wrist.y);
                hands.insert(0, hand(spec.pose, Handedness::Left, mirrored, spec.confidence));
            }
            HandFrame::new(i as TimestampMs * spec.interval_ms, hands, spec.screen)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairwise_distances_are_plausible() {
        for pose in Pose::ALL {
            let h = hand(pose, Handedness::Right, Point::new(0.5, 0.6), 1.0);
            for (i, a) in h.landmarks.iter().enumerate() {
                for (j, b) in h.landmarks.iter().enumerate().skip(i + 1) {
                    let d = a.distance_to(b);
                    assert!(
                        (0.01..=0.5).contains(&d),
                        "{pose}: landmarks {i} and {j} are {d} apart"
                    );
                }
            }
        }
    }

    #[test]
    fn test_left_hand_is_mirrored() {
        let right = hand(Pose::OpenPalm, Handedness::Right, Point::new(0.5, 0.5), 1.0);
        let left = hand(Pose::OpenPalm, Handedness::Left, Point::new(0.5, 0.5), 1.0);
        for (r, l) in right.landmarks.iter().zip(&left.landmarks) {
            assert!((r.x - 0.5 + (l.x - 0.5)).abs() < 1e-12);
            assert_eq!(r.y, l.y);
        }
    }

    #[test]
    fn test_pose_parsing() {
        for pose in Pose::ALL {
            assert_eq!(pose.as_str().parse::<Pose>().unwrap(), pose);
        }
        assert!("wave".parse::<Pose>().is_err());
    }

    #[test]
    fn test_sequence_timestamps_and_hands() {
        let spec = SequenceSpec {
            both_hands: true,
            step: Point::new(0.01, 0.0),
            ..SequenceSpec::new(Pose::Fist, 4)
        };
        let frames = sequence(&spec);
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[3].timestamp_ms, 99);
        assert_eq!(frames[0].hands.len(), 2);
        assert_eq!(frames[0].hands[0].handedness, Handedness::Left);
        assert!((frames[3].hands[1].landmarks[0].x - 0.63).abs() < 1e-12);
    }
}
