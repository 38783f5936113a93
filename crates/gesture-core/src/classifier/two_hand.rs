//! Detectors that need one left and one right hand.

use std::f64::consts::PI;

use oxboard_gesture_model::{GestureKind, HandResult, Point, ScreenSize};

use super::single_hand::detect_pinch;
use super::ClassifierConfig;

/// Horizontal midpoint of both wrists in [0, 1].
fn crossfader(left: &Point, right: &Point) -> f64 {
    ((left.x + right.x) / 2.0).clamp(0.0, 1.0)
}

/// Both hands pinching. Confidence is the mean hand confidence.
pub fn detect_two_hand_pinch(
    left: &HandResult,
    right: &HandResult,
    screen: &ScreenSize,
    config: &ClassifierConfig,
) -> Option<(GestureKind, f64)> {
    let (Some(GestureKind::Pinch { strength: ls, .. }), Some(GestureKind::Pinch { strength: rs, .. })) =
        (detect_pinch(left, config), detect_pinch(right, config))
    else {
        return None;
    };
    let (lw, rw) = (left.wrist()?, right.wrist()?);
    Some((
        GestureKind::TwoHandPinch {
            left_strength: ls,
            right_strength: rs,
            wrist_distance: screen.normalized_distance(&lw, &rw),
            crossfader: crossfader(&lw, &rw),
        },
        (left.confidence + right.confidence) / 2.0,
    ))
}

/// Hands apart. Confidence scales with how far apart they are.
pub fn detect_spread(
    left: &HandResult,
    right: &HandResult,
    screen: &ScreenSize,
    config: &ClassifierConfig,
) -> Option<(GestureKind, f64)> {
    let (lw, rw) = (left.wrist()?, right.wrist()?);
    let distance = screen.normalized_distance(&lw, &rw);
    let ratio = if config.spread_full_distance > 0.0 {
        (distance / config.spread_full_distance).min(1.0)
    } else {
        1.0
    };
    if ratio <= config.spread_min_ratio {
        return None;
    }
    Some((
        GestureKind::SpreadHands {
            distance,
            ratio,
            crossfader: crossfader(&lw, &rw),
        },
        left.confidence.min(right.confidence) * ratio,
    ))
}

/// Tracks wrist positions relative to their shared centroid between frames.
#[derive(Debug, Clone, Default)]
pub struct RotationTracker {
    previous: Option<[Point; 2]>,
}

fn angle_delta(previous: &Point, current: &Point) -> f64 {
    let d = (current.y.atan2(current.x) - previous.y.atan2(previous.x)).abs();
    d.min(2.0 * PI - d)
}

fn cross(previous: &Point, current: &Point) -> f64 {
    previous.x * current.y - previous.y * current.x
}

impl RotationTracker {
    /// Compare this frame's wrists against the previous frame's.
    ///
    /// Positive cross products mean clockwise on screen since `y` grows
    /// downward.
    pub fn update(
        &mut self,
        left: &HandResult,
        right: &HandResult,
        config: &ClassifierConfig,
    ) -> Option<(GestureKind, f64)> {
        let (lw, rw) = (left.wrist()?, right.wrist()?);
        let c = lw.midpoint(&rw);
        let current = [
            Point::new(lw.x - c.x, lw.y - c.y),
            Point::new(rw.x - c.x, rw.y - c.y),
        ];
        let previous = self.previous.replace(current)?;

        let rotation = (angle_delta(&previous[0], &current[0])
            + angle_delta(&previous[1], &current[1]))
            / 2.0;
        if rotation <= config.rotation_threshold {
            return None;
        }
        let turn = cross(&previous[0], &current[0]) + cross(&previous[1], &current[1]);
        Some((
            GestureKind::TwoHandRotate {
                rotation,
                clockwise: turn > 0.0,
            },
            left.confidence.min(right.confidence),
        ))
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// Run every two-hand detector, appending `(kind, confidence)` to `out`.
pub fn detect_all(
    left: &HandResult,
    right: &HandResult,
    screen: &ScreenSize,
    config: &ClassifierConfig,
    rotation: &mut RotationTracker,
    out: &mut Vec<(GestureKind, f64)>,
) {
    if !left.is_usable() || !right.is_usable() {
        rotation.reset();
        return;
    }
    out.extend(detect_two_hand_pinch(left, right, screen, config));
    out.extend(rotation.update(left, right, config));
    out.extend(detect_spread(left, right, screen, config));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{self, Pose};
    use oxboard_gesture_model::Handedness;

    fn pair(pose: Pose, lw: Point, rw: Point, lc: f64, rc: f64) -> (HandResult, HandResult) {
        (
            synthetic::hand(pose, Handedness::Left, lw, lc),
            synthetic::hand(pose, Handedness::Right, rw, rc),
        )
    }

    #[test]
    fn test_full_spread_confidence_is_weaker_hand() {
        let (l, r) = pair(Pose::OpenPalm, Point::new(0.2, 0.7), Point::new(0.8, 0.7), 0.9, 0.8);
        let (kind, confidence) =
            detect_spread(&l, &r, &ScreenSize::default(), &ClassifierConfig::default()).unwrap();
        match kind {
            GestureKind::SpreadHands { ratio, crossfader, .. } => {
                assert_eq!(ratio, 1.0);
                assert!((crossfader - 0.5).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(confidence, 0.8);
    }

    #[test]
    fn test_close_hands_do_not_spread() {
        let (l, r) = pair(Pose::OpenPalm, Point::new(0.45, 0.7), Point::new(0.55, 0.7), 0.9, 0.9);
        assert!(detect_spread(&l, &r, &ScreenSize::default(), &ClassifierConfig::default()).is_none());
    }

    #[test]
    fn test_partial_spread_scales_confidence() {
        let screen = ScreenSize::new(1000.0, 1000.0);
        let (l, r) = pair(Pose::OpenPalm, Point::new(0.3, 0.7), Point::new(0.6, 0.7), 1.0, 1.0);
        let (_, confidence) =
            detect_spread(&l, &r, &screen, &ClassifierConfig::default()).unwrap();
        let expected = (0.3 / 2f64.sqrt()) / 0.5;
        assert!((confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_two_hand_pinch_needs_both() {
        let screen = ScreenSize::default();
        let config = ClassifierConfig::default();
        let (l, r) = pair(Pose::Pinch, Point::new(0.3, 0.7), Point::new(0.7, 0.7), 0.9, 0.7);
        let (kind, confidence) = detect_two_hand_pinch(&l, &r, &screen, &config).unwrap();
        assert!((confidence - 0.8).abs() < 1e-12);
        assert!(matches!(kind, GestureKind::TwoHandPinch { .. }));

        let open = synthetic::hand(Pose::OpenPalm, Handedness::Right, Point::new(0.7, 0.7), 0.9);
        assert!(detect_two_hand_pinch(&l, &open, &screen, &config).is_none());
    }

    #[test]
    fn test_rotation_direction() {
        let config = ClassifierConfig::default();
        let mut tracker = RotationTracker::default();

        let (l, r) = pair(Pose::OpenPalm, Point::new(0.3, 0.5), Point::new(0.7, 0.5), 0.9, 0.9);
        assert!(tracker.update(&l, &r, &config).is_none());

        // Left wrist moves up, right wrist moves down: clockwise on screen.
        let (l2, r2) = pair(Pose::OpenPalm, Point::new(0.32, 0.4), Point::new(0.68, 0.6), 0.9, 0.9);
        let (kind, _) = tracker.update(&l2, &r2, &config).unwrap();
        match kind {
            GestureKind::TwoHandRotate { rotation, clockwise } => {
                assert!(rotation > 0.3 && rotation <= PI);
                assert!(clockwise);
            }
            other => panic!("unexpected {other:?}"),
        }

        // And back again.
        let (kind, _) = tracker.update(&l, &r, &config).unwrap();
        assert!(matches!(kind, GestureKind::TwoHandRotate { clockwise: false, .. }));
    }

    #[test]
    fn test_small_rotation_is_ignored() {
        let config = ClassifierConfig::default();
        let mut tracker = RotationTracker::default();
        let (l, r) = pair(Pose::OpenPalm, Point::new(0.3, 0.5), Point::new(0.7, 0.5), 0.9, 0.9);
        tracker.update(&l, &r, &config);
        let (l2, r2) = pair(Pose::OpenPalm, Point::new(0.3, 0.49), Point::new(0.7, 0.51), 0.9, 0.9);
        assert!(tracker.update(&l2, &r2, &config).is_none());
    }
}
