//! Hand-quality scoring.

use oxboard_gesture_model::{HandResult, Point, ScreenSize, LANDMARK_COUNT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Landmarks closer than this to any frame edge count as clipped.
    pub edge_margin: f64,
    /// Multiplier applied once per clipped landmark.
    pub edge_penalty: f64,
    /// Plausible pairwise landmark distance band.
    pub min_pair_distance: f64,
    pub max_pair_distance: f64,
    /// Normalized wrist distance band where two-hand tracking is most reliable.
    pub optimal_distance_min: f64,
    pub optimal_distance_max: f64,
    pub optimal_boost: f64,
    pub suboptimal_penalty: f64,
    /// Wrists within this vertical distance count as aligned.
    pub alignment_tolerance: f64,
    pub aligned_boost: f64,
    pub misaligned_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            edge_margin: 0.05,
            edge_penalty: 0.8,
            min_pair_distance: 0.01,
            max_pair_distance: 0.5,
            optimal_distance_min: 0.2,
            optimal_distance_max: 0.6,
            optimal_boost: 1.2,
            suboptimal_penalty: 0.8,
            alignment_tolerance: 0.1,
            aligned_boost: 1.1,
            misaligned_penalty: 0.9,
        }
    }
}

/// Scores how trustworthy a tracked hand looks.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    config: ScoringConfig,
}

impl ConfidenceScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Hand confidence, penalized for clipped landmarks and implausible
    /// geometry. `scratch` holds the pairwise distances and is cleared first.
    pub fn hand_score(&self, hand: &HandResult, scratch: &mut Vec<f64>) -> f64 {
        if !hand.is_usable() {
            return 0.0;
        }
        let landmarks = &hand.landmarks[..LANDMARK_COUNT];

        let near_edge = landmarks.iter().filter(|p| self.near_edge(p)).count();
        let edge_factor = self.config.edge_penalty.powi(near_edge as i32);

        scratch.clear();
        for (i, a) in landmarks.iter().enumerate() {
            for b in &landmarks[i + 1..] {
                scratch.push(a.distance_to(b));
            }
        }
        let plausible = scratch
            .iter()
            .filter(|d| (self.config.min_pair_distance..=self.config.max_pair_distance).contains(*d))
            .count();
        let consistency = plausible as f64 / scratch.len().max(1) as f64;

        (hand.confidence * edge_factor * consistency).clamp(0.0, 1.0)
    }

    /// Combined score for a two-hand gesture.
    pub fn two_hand_score(
        &self,
        left_score: f64,
        right_score: f64,
        left_wrist: &Point,
        right_wrist: &Point,
        screen: &ScreenSize,
    ) -> f64 {
        let c = &self.config;
        let mut score = (left_score.max(0.0) * right_score.max(0.0)).sqrt();

        let distance = screen.normalized_distance(left_wrist, right_wrist);
        score *= if (c.optimal_distance_min..=c.optimal_distance_max).contains(&distance) {
            c.optimal_boost
        } else {
            c.suboptimal_penalty
        };

        score *= if (left_wrist.y - right_wrist.y).abs() < c.alignment_tolerance {
            c.aligned_boost
        } else {
            c.misaligned_penalty
        };

        score.clamp(0.0, 1.0)
    }

    fn near_edge(&self, p: &Point) -> bool {
        let m = self.config.edge_margin;
        p.x < m || p.x > 1.0 - m || p.y < m || p.y > 1.0 - m
    }
}
