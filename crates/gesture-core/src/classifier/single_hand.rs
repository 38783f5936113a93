//! Geometric detectors for one hand.
//!
//! All detectors assume a usable hand (21 landmarks). Distances are in
//! normalized image units and `y` grows downward, so an extended finger has
//! its tip *above* (smaller `y` than) its PIP joint.

use oxboard_gesture_model::landmark::{
    FINGERTIPS, FINGER_TIP_PIP, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP,
    PINKY_TIP, RING_PIP, RING_TIP, THUMB_IP, THUMB_TIP, WRIST,
};
use oxboard_gesture_model::{GestureKind, HandResult, Point};

use super::ClassifierConfig;

/// `(threshold - distance) / threshold`, clamped to [0, 1].
pub fn pinch_strength(distance: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return 0.0;
    }
    ((threshold - distance) / threshold).clamp(0.0, 1.0)
}

fn lm(hand: &HandResult, index: usize) -> Point {
    hand.landmarks[index]
}

fn extended(hand: &HandResult, tip: usize, joint: usize, margin: f64) -> bool {
    lm(hand, tip).y < lm(hand, joint).y - margin
}

pub fn detect_pinch(hand: &HandResult, config: &ClassifierConfig) -> Option<GestureKind> {
    let thumb = lm(hand, THUMB_TIP);
    let index = lm(hand, INDEX_TIP);
    let distance = thumb.distance_to(&index);
    let strength = pinch_strength(distance, config.pinch_threshold);
    (strength > config.pinch_min_strength).then(|| GestureKind::Pinch {
        strength,
        distance,
        position: thumb.midpoint(&index),
    })
}

pub fn detect_fist(hand: &HandResult, config: &ClassifierConfig) -> Option<GestureKind> {
    let wrist = lm(hand, WRIST);
    let mean_tip_distance = FINGERTIPS
        .iter()
        .map(|&tip| wrist.distance_to(&lm(hand, tip)))
        .sum::<f64>()
        / FINGERTIPS.len() as f64;
    (mean_tip_distance < config.fist_threshold).then_some(GestureKind::Fist { mean_tip_distance })
}

pub fn detect_palm_open(hand: &HandResult, config: &ClassifierConfig) -> Option<GestureKind> {
    let extended_fingers = FINGER_TIP_PIP
        .iter()
        .filter(|(tip, pip)| extended(hand, *tip, *pip, config.extension_margin))
        .count() as u8;
    (extended_fingers >= config.palm_min_extended)
        .then_some(GestureKind::PalmOpen { extended_fingers })
}

pub fn detect_point(hand: &HandResult, config: &ClassifierConfig) -> Option<GestureKind> {
    let margin = config.extension_margin;
    let index_out = extended(hand, INDEX_TIP, INDEX_PIP, margin);
    let others_curled = [(MIDDLE_TIP, MIDDLE_PIP), (RING_TIP, RING_PIP), (PINKY_TIP, PINKY_PIP)]
        .iter()
        .all(|(tip, pip)| !extended(hand, *tip, *pip, margin));
    (index_out && others_curled).then(|| GestureKind::Point {
        tip: lm(hand, INDEX_TIP),
    })
}

/// Extended fingers, thumb included.
pub fn count_fingers(hand: &HandResult, config: &ClassifierConfig) -> u8 {
    let margin = config.count_margin;
    let fingers = FINGER_TIP_PIP
        .iter()
        .filter(|(tip, pip)| extended(hand, *tip, *pip, margin))
        .count();
    let thumb = usize::from(extended(hand, THUMB_TIP, THUMB_IP, margin));
    (fingers + thumb) as u8
}

/// Run every single-hand detector, appending matches to `out`.
///
/// Finger count is always reported for a usable hand.
pub fn detect_all(hand: &HandResult, config: &ClassifierConfig, out: &mut Vec<GestureKind>) {
    if !hand.is_usable() {
        return;
    }
    out.extend(detect_pinch(hand, config));
    out.extend(detect_fist(hand, config));
    out.extend(detect_palm_open(hand, config));
    out.extend(detect_point(hand, config));
    out.push(GestureKind::FingerCount {
        count: count_fingers(hand, config),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{self, Pose};
    use oxboard_gesture_model::{GestureType, Handedness};

    fn types(hand: &HandResult) -> Vec<GestureType> {
        let mut out = Vec::new();
        detect_all(hand, &ClassifierConfig::default(), &mut out);
        out.iter().map(GestureKind::gesture_type).collect()
    }

    #[test]
    fn test_pinch_strength_reference_value() {
        let thumb = Point::new(0.50, 0.50);
        let index = Point::new(0.53, 0.50);
        let strength = pinch_strength(thumb.distance_to(&index), 0.08);
        assert!((strength - 0.625).abs() < 1e-9, "got {strength}");
    }

    #[test]
    fn test_pinch_strength_is_clamped() {
        assert_eq!(pinch_strength(0.0, 0.08), 1.0);
        assert_eq!(pinch_strength(0.2, 0.08), 0.0);
        assert_eq!(pinch_strength(0.01, 0.0), 0.0);
    }

    #[test]
    fn test_open_palm_pose() {
        let hand = synthetic::hand(Pose::OpenPalm, Handedness::Right, Point::new(0.5, 0.6), 0.9);
        let found = types(&hand);
        assert!(found.contains(&GestureType::PalmOpen));
        assert!(!found.contains(&GestureType::Fist));
        assert!(!found.contains(&GestureType::Pinch));
        assert_eq!(count_fingers(&hand, &ClassifierConfig::default()), 5);
    }

    #[test]
    fn test_fist_pose() {
        let hand = synthetic::hand(Pose::Fist, Handedness::Left, Point::new(0.4, 0.6), 0.9);
        let found = types(&hand);
        assert!(found.contains(&GestureType::Fist));
        assert!(!found.contains(&GestureType::PalmOpen));
        assert_eq!(count_fingers(&hand, &ClassifierConfig::default()), 0);
    }

    #[test]
    fn test_pinch_pose() {
        let hand = synthetic::hand(Pose::Pinch, Handedness::Right, Point::new(0.5, 0.6), 0.9);
        let pinch = detect_pinch(&hand, &ClassifierConfig::default());
        match pinch {
            Some(GestureKind::Pinch { strength, .. }) => assert!(strength > 0.3),
            other => panic!("expected pinch, got {other:?}"),
        }
    }

    #[test]
    fn test_point_pose() {
        let hand = synthetic::hand(Pose::Point, Handedness::Right, Point::new(0.5, 0.6), 0.9);
        let found = types(&hand);
        assert!(found.contains(&GestureType::Point));
        assert!(!found.contains(&GestureType::PalmOpen));
        assert_eq!(count_fingers(&hand, &ClassifierConfig::default()), 1);
    }

    #[test]
    fn test_unusable_hand_reports_nothing() {
        let mut hand = synthetic::hand(Pose::OpenPalm, Handedness::Right, Point::new(0.5, 0.6), 0.9);
        hand.landmarks.truncate(20);
        assert!(types(&hand).is_empty());
    }
}
