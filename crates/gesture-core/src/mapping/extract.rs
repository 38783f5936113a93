//! Raw control values carried by each gesture kind.

use std::f64::consts::PI;

use oxboard_gesture_model::{GestureKind, GestureResult, HandResult, HandSide, Handedness, Point};

/// Center of the hand a single-hand gesture came from.
pub fn gesture_hand_center(gesture: &GestureResult, hands: &[HandResult]) -> Option<Point> {
    let handedness = match gesture.hand? {
        HandSide::Left => Handedness::Left,
        HandSide::Right => Handedness::Right,
        HandSide::Both => return None,
    };
    hands
        .iter()
        .find(|h| h.handedness == handedness && h.is_usable())
        .and_then(HandResult::center)
}

/// The value a gesture feeds into a mapping, before calibration and curves.
///
/// Falls back to the gesture confidence when the kind carries no natural
/// value or the source hand is no longer in the frame.
pub fn raw_value(gesture: &GestureResult, hands: &[HandResult]) -> f64 {
    let center = || gesture_hand_center(gesture, hands);
    let value = match &gesture.kind {
        GestureKind::TwoHandPinch { crossfader, .. } | GestureKind::SpreadHands { crossfader, .. } => {
            Some(*crossfader)
        }
        GestureKind::Fist { .. } | GestureKind::PalmOpen { .. } => center().map(|c| c.y),
        GestureKind::Point { .. } => center().map(|c| c.x),
        GestureKind::Pinch { strength, .. } => Some(*strength),
        GestureKind::FingerCount { count } => Some(f64::from(*count) / 5.0),
        GestureKind::TwoHandRotate { rotation, .. } => Some(rotation / PI),
        GestureKind::SwipeHorizontal { velocity, .. }
        | GestureKind::SwipeVertical { velocity, .. } => Some(*velocity),
    };
    value.unwrap_or(gesture.confidence)
}
