//! Gesture classification.
//!
//! Turns smoothed hands into [`GestureResult`]s. Every candidate detection
//! passes three gates before it is emitted:
//!
//! 1. `min(detector confidence, quality score) > min_confidence`
//! 2. temporal stability above [`ClassifierConfig::min_temporal_stability`]
//! 3. velocity stability above [`ClassifierConfig::min_velocity_stability`]
//!
//! `min_confidence` is passed per call so the performance governor can
//! tighten or relax it at runtime.

pub mod confidence;
pub mod motion;
pub mod single_hand;
pub mod temporal;
pub mod two_hand;

pub use confidence::{ConfidenceScorer, ScoringConfig};
pub use motion::MotionHistory;
pub use temporal::{TemporalConfig, TemporalFilter};
pub use two_hand::RotationTracker;

use oxboard_gesture_model::{
    GestureKind, GestureResult, HandResult, HandSide, Handedness, ScreenSize, SwipeDirection,
    TimestampMs,
};
use serde::{Deserialize, Serialize};

/// Detection thresholds. Distances are normalized image units, velocities
/// are units per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Thumb-index distance at which pinch strength reaches zero.
    pub pinch_threshold: f64,
    /// Pinches weaker than this are not reported.
    pub pinch_min_strength: f64,
    /// Mean wrist-to-fingertip distance below which the hand is a fist.
    pub fist_threshold: f64,
    /// How far a fingertip must sit above its PIP joint to count as extended
    /// for palm and point detection.
    pub extension_margin: f64,
    pub palm_min_extended: u8,
    /// Extension margin used for finger counting.
    pub count_margin: f64,
    pub swipe_window_ms: u64,
    pub swipe_velocity: f64,
    /// Dominant axis must be this many times faster than the other.
    pub swipe_dominance: f64,
    /// Minimum rotation in radians between frames.
    pub rotation_threshold: f64,
    /// Normalized wrist distance that counts as a full spread.
    pub spread_full_distance: f64,
    pub spread_min_ratio: f64,
    pub min_temporal_stability: f64,
    pub min_velocity_stability: f64,
    pub scoring: ScoringConfig,
    pub temporal: TemporalConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.08,
            pinch_min_strength: 0.3,
            fist_threshold: 0.1,
            extension_margin: 0.02,
            palm_min_extended: 3,
            count_margin: 0.03,
            swipe_window_ms: 500,
            swipe_velocity: 0.8,
            swipe_dominance: 2.0,
            rotation_threshold: 0.3,
            spread_full_distance: 0.5,
            spread_min_ratio: 0.2,
            min_temporal_stability: 0.4,
            min_velocity_stability: 0.3,
            scoring: ScoringConfig::default(),
            temporal: TemporalConfig::default(),
        }
    }
}

/// A detection before gating.
#[derive(Debug, Clone)]
struct Candidate {
    kind: GestureKind,
    confidence: f64,
    side: HandSide,
    score: f64,
    velocity_stability: f64,
}

/// Stateful classifier: keeps motion and temporal history between frames.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: ClassifierConfig,
    scorer: ConfidenceScorer,
    temporal: TemporalFilter,
    motion: [MotionHistory; 2],
    rotation: RotationTracker,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            scorer: ConfidenceScorer::new(config.scoring),
            temporal: TemporalFilter::new(config.temporal),
            motion: [
                MotionHistory::new(config.swipe_window_ms),
                MotionHistory::new(config.swipe_window_ms),
            ],
            rotation: RotationTracker::default(),
            config,
        }
    }

    /// Classify one frame of (already smoothed) hands.
    ///
    /// Only the first usable hand of each handedness is considered. `scratch`
    /// is working memory for quality scoring.
    pub fn classify(
        &mut self,
        hands: &[HandResult],
        screen: &ScreenSize,
        timestamp_ms: TimestampMs,
        min_confidence: f64,
        scratch: &mut Vec<f64>,
    ) -> Vec<GestureResult> {
        let slots = [
            first_usable(hands, Handedness::Left),
            first_usable(hands, Handedness::Right),
        ];

        let mut candidates = Vec::new();
        let mut scores = [0.0; 2];
        let mut velocity = [1.0; 2];
        let mut kinds = Vec::new();

        for (i, slot) in slots.iter().enumerate() {
            let Some(hand) = slot else {
                self.motion[i].clear();
                continue;
            };
            if let Some(center) = hand.center() {
                self.motion[i].push(timestamp_ms, center);
            }
            scores[i] = self.scorer.hand_score(hand, scratch);
            velocity[i] = self.motion[i].velocity_stability();

            kinds.clear();
            single_hand::detect_all(hand, &self.config, &mut kinds);
            kinds.extend(self.detect_swipe(i));

            let side = HandSide::from(hand.handedness);
            candidates.extend(kinds.drain(..).map(|kind| Candidate {
                kind,
                confidence: hand.confidence,
                side,
                score: scores[i],
                velocity_stability: velocity[i],
            }));
        }

        match slots {
            [Some(left), Some(right)] => {
                let mut pairs = Vec::new();
                two_hand::detect_all(
                    left,
                    right,
                    screen,
                    &self.config,
                    &mut self.rotation,
                    &mut pairs,
                );
                if !pairs.is_empty() {
                    let score = match (left.wrist(), right.wrist()) {
                        (Some(lw), Some(rw)) => {
                            self.scorer
                                .two_hand_score(scores[0], scores[1], &lw, &rw, screen)
                        }
                        _ => 0.0,
                    };
                    let velocity_stability = velocity[0].min(velocity[1]);
                    candidates.extend(pairs.into_iter().map(|(kind, confidence)| Candidate {
                        kind,
                        confidence,
                        side: HandSide::Both,
                        score,
                        velocity_stability,
                    }));
                }
            }
            _ => self.rotation.reset(),
        }

        for c in &candidates {
            self.temporal
                .record(c.side, c.kind.gesture_type(), c.confidence, timestamp_ms);
        }

        candidates
            .into_iter()
            .filter_map(|c| {
                let gesture_type = c.kind.gesture_type();
                let temporal = self.temporal.stability(c.side, gesture_type);
                let emitted = c.confidence.min(c.score) > min_confidence
                    && temporal > self.config.min_temporal_stability
                    && c.velocity_stability > self.config.min_velocity_stability;
                tracing::trace!(
                    gesture = gesture_type.as_str(),
                    confidence = c.confidence,
                    score = c.score,
                    temporal,
                    velocity = c.velocity_stability,
                    emitted,
                    "Gesture candidate"
                );
                emitted.then(|| GestureResult::new(c.kind, c.confidence, timestamp_ms, Some(c.side)))
            })
            .collect()
    }

    fn detect_swipe(&self, slot: usize) -> Option<GestureKind> {
        let (vx, vy) = self.motion[slot].velocity()?;
        let c = &self.config;
        if vx.abs() > c.swipe_dominance * vy.abs() && vx.abs() > c.swipe_velocity {
            let direction = if vx > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            };
            return Some(GestureKind::SwipeHorizontal {
                direction,
                velocity: vx,
            });
        }
        if vy.abs() > c.swipe_dominance * vx.abs() && vy.abs() > c.swipe_velocity {
            let direction = if vy > 0.0 {
                SwipeDirection::Down
            } else {
                SwipeDirection::Up
            };
            return Some(GestureKind::SwipeVertical {
                direction,
                velocity: vy,
            });
        }
        None
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Forget all motion, rotation, and temporal history.
    pub fn reset(&mut self) {
        self.temporal.reset();
        self.motion.iter_mut().for_each(MotionHistory::clear);
        self.rotation.reset();
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

fn first_usable(hands: &[HandResult], handedness: Handedness) -> Option<&HandResult> {
    hands
        .iter()
        .find(|h| h.handedness == handedness && h.is_usable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{self, Pose};
    use oxboard_gesture_model::{GestureType, Point};

    fn classify_sequence(
        classifier: &mut GestureClassifier,
        frames: &[Vec<HandResult>],
    ) -> Vec<GestureResult> {
        let mut scratch = Vec::new();
        let mut last = Vec::new();
        for (i, hands) in frames.iter().enumerate() {
            last = classifier.classify(
                hands,
                &ScreenSize::default(),
                i as u64 * 33,
                0.6,
                &mut scratch,
            );
        }
        last
    }

    fn types(results: &[GestureResult]) -> Vec<GestureType> {
        results.iter().map(GestureResult::gesture_type).collect()
    }

    #[test]
    fn test_open_palm_is_emitted_with_hand_tag() {
        let hand = synthetic::hand(Pose::OpenPalm, Handedness::Right, Point::new(0.5, 0.6), 0.9);
        let mut classifier = GestureClassifier::default();
        let results = classify_sequence(&mut classifier, &vec![vec![hand]; 3]);

        let palm = results
            .iter()
            .find(|r| r.gesture_type() == GestureType::PalmOpen)
            .expect("palm-open emitted");
        assert_eq!(palm.hand, Some(HandSide::Right));
        assert_eq!(palm.confidence, 0.9);
        assert!(types(&results).contains(&GestureType::FingerCount));
    }

    #[test]
    fn test_low_confidence_hand_is_gated() {
        let hand = synthetic::hand(Pose::OpenPalm, Handedness::Left, Point::new(0.5, 0.6), 0.5);
        let mut classifier = GestureClassifier::default();
        assert!(classify_sequence(&mut classifier, &[vec![hand]]).is_empty());
    }

    #[test]
    fn test_threshold_is_per_call() {
        let hand = synthetic::hand(Pose::Fist, Handedness::Left, Point::new(0.5, 0.6), 0.7);
        let mut classifier = GestureClassifier::default();
        let mut scratch = Vec::new();
        let screen = ScreenSize::default();

        let relaxed = classifier.classify(&[hand.clone()], &screen, 0, 0.6, &mut scratch);
        assert!(types(&relaxed).contains(&GestureType::Fist));

        let strict = classifier.classify(&[hand], &screen, 33, 0.8, &mut scratch);
        assert!(strict.is_empty());
    }

    #[test]
    fn test_spread_hands_emitted_for_both() {
        let left = synthetic::hand(Pose::OpenPalm, Handedness::Left, Point::new(0.2, 0.7), 0.9);
        let right = synthetic::hand(Pose::OpenPalm, Handedness::Right, Point::new(0.8, 0.7), 0.9);
        let mut classifier = GestureClassifier::default();
        let results = classify_sequence(&mut classifier, &[vec![left, right]]);

        let spread = results
            .iter()
            .find(|r| r.gesture_type() == GestureType::SpreadHands)
            .expect("spread emitted");
        assert_eq!(spread.hand, Some(HandSide::Both));
        assert!((spread.confidence - 0.9).abs() < 1e-12);
        assert_eq!(spread.kind.crossfader(), Some(0.5));
    }

    #[test]
    fn test_horizontal_swipe() {
        let frames: Vec<Vec<HandResult>> = (0..6)
            .map(|i| {
                vec![synthetic::hand(
                    Pose::OpenPalm,
                    Handedness::Right,
                    Point::new(0.3 + i as f64 * 0.05, 0.6),
                    0.9,
                )]
            })
            .collect();
        let mut classifier = GestureClassifier::default();
        let results = classify_sequence(&mut classifier, &frames);

        let swipe = results
            .iter()
            .find(|r| r.gesture_type() == GestureType::SwipeHorizontal)
            .expect("swipe emitted");
        match swipe.kind {
            GestureKind::SwipeHorizontal {
                direction,
                velocity,
            } => {
                assert_eq!(direction, SwipeDirection::Right);
                assert!(velocity > 1.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_short_hand_is_ignored() {
        let mut hand = synthetic::hand(Pose::OpenPalm, Handedness::Right, Point::new(0.5, 0.6), 0.9);
        hand.landmarks.truncate(10);
        let mut classifier = GestureClassifier::default();
        assert!(classify_sequence(&mut classifier, &[vec![hand]]).is_empty());
    }

    #[test]
    fn test_reset_clears_history() {
        let hand = synthetic::hand(Pose::OpenPalm, Handedness::Right, Point::new(0.5, 0.6), 0.9);
        let mut classifier = GestureClassifier::default();
        classify_sequence(&mut classifier, &vec![vec![hand]; 4]);
        classifier.reset();
        assert!(classifier.motion.iter().all(MotionHistory::is_empty));
        assert_eq!(classifier.temporal.len(HandSide::Right), 0);
    }
}
