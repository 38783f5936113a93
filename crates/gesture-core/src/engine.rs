//! Frame-level pipeline: smoothing, classification, governance and mapping.

use oxboard_common::{EngineDefaults, OxboardResult};
use oxboard_gesture_model::{
    ActiveGesture, GestureConflict, GestureResult, HandFrame, HandResult, Handedness, TimestampMs,
};
use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifierConfig, GestureClassifier};
use crate::governor::{
    BufferPool, GovernorConfig, GovernorOutcome, GovernorStats, PerformanceGovernor, ResultCache,
};
use crate::mapping::{MappingRegistry, RegistryConfig};
use crate::smoothing::{HandSmoother, KalmanConfig, SmoothingConfig};

/// Everything needed to build a [`GestureEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub smoothing: SmoothingConfig,
    pub classifier: ClassifierConfig,
    pub registry: RegistryConfig,
    pub governor: GovernorConfig,
    /// Capacity of the result cache built by [`GestureEngine::new`].
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_defaults(&EngineDefaults::default())
    }
}

impl EngineConfig {
    /// Engine configuration derived from the application defaults.
    pub fn from_defaults(defaults: &EngineDefaults) -> Self {
        let smoothing = SmoothingConfig {
            mode: defaults.smoothing.into(),
            kalman: KalmanConfig::for_fps(defaults.target_fps),
            ..SmoothingConfig::default()
        };
        let governor = GovernorConfig {
            processing_budget_ms: defaults.max_processing_time_ms,
            skip_threshold_ms: defaults.frame_interval_ms(),
            base_confidence: defaults.min_confidence,
            frame_skipping: defaults.frame_skipping,
            ..GovernorConfig::default()
        };
        Self {
            smoothing,
            classifier: ClassifierConfig::default(),
            registry: RegistryConfig::default(),
            governor,
            cache_capacity: defaults.cache_capacity,
        }
    }
}

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,
    /// Gestures emitted by the classifier (or the cache) this frame.
    pub gestures: Vec<GestureResult>,
    /// Active gestures after conflict resolution.
    pub active: Vec<ActiveGesture>,
    pub conflicts: Vec<GestureConflict>,
    pub skipped: bool,
    pub cache_hit: bool,
}

/// The full gesture pipeline for one camera stream.
///
/// Owns all per-stream state; calls must be serialized by the caller.
#[derive(Debug)]
pub struct GestureEngine {
    config: EngineConfig,
    smoothers: [HandSmoother; 2],
    classifier: GestureClassifier,
    governor: PerformanceGovernor,
    registry: MappingRegistry,
}

impl GestureEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_components(
            config,
            ResultCache::new(config.cache_capacity),
            BufferPool::default(),
        )
    }

    /// Build an engine around a caller-provided cache and buffer pool.
    pub fn with_components(config: EngineConfig, cache: ResultCache, pool: BufferPool) -> Self {
        tracing::debug!(
            smoothing = ?config.smoothing.mode,
            budget_ms = config.governor.processing_budget_ms,
            cache_capacity = cache.capacity(),
            pool_size = pool.size(),
            "Gesture engine created"
        );
        Self {
            smoothers: [
                HandSmoother::new(&config.smoothing),
                HandSmoother::new(&config.smoothing),
            ],
            classifier: GestureClassifier::new(config.classifier),
            governor: PerformanceGovernor::new(config.governor, cache, pool),
            registry: MappingRegistry::new(config.registry),
            config,
        }
    }

    /// Run one frame through the pipeline.
    pub fn process(&mut self, frame: &HandFrame) -> OxboardResult<FrameOutput> {
        let timestamp_ms = frame.timestamp_ms;
        let hands = self.smooth(frame);

        let classifier = &mut self.classifier;
        let outcome = self
            .governor
            .process(&hands, &frame.screen, timestamp_ms, |scratch, threshold| {
                Ok(classifier.classify(&hands, &frame.screen, timestamp_ms, threshold, scratch))
            })?;

        if outcome.is_skipped() {
            return Ok(FrameOutput {
                timestamp_ms,
                gestures: Vec::new(),
                active: self.registry.active_gestures(),
                conflicts: self.registry.conflicts_at(timestamp_ms),
                skipped: true,
                cache_hit: false,
            });
        }

        let cache_hit = outcome.is_cached();
        let gestures = outcome.into_results();
        let active = self
            .registry
            .process_gestures(&gestures, &hands, timestamp_ms);
        tracing::trace!(
            t = timestamp_ms,
            gestures = gestures.len(),
            active = active.len(),
            cache_hit,
            "Frame processed"
        );

        Ok(FrameOutput {
            timestamp_ms,
            gestures,
            active,
            conflicts: self.registry.conflicts_at(timestamp_ms),
            skipped: false,
            cache_hit,
        })
    }

    /// Smooth the first usable hand of each side. A side without a hand has
    /// its smoother reset so the next appearance starts fresh.
    fn smooth(&mut self, frame: &HandFrame) -> Vec<HandResult> {
        let mut hands = Vec::with_capacity(2);
        for handedness in [Handedness::Left, Handedness::Right] {
            let smoother = &mut self.smoothers[handedness.index()];
            match frame.hand(handedness) {
                Some(hand) => hands.push(smoother.smooth_hand(hand, frame.timestamp_ms)),
                None => smoother.reset(),
            }
        }
        let dropped = frame.hands.iter().filter(|h| !h.is_usable()).count();
        if dropped > 0 {
            tracing::trace!(dropped, "Ignoring hands with missing landmarks");
        }
        hands
    }

    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MappingRegistry {
        &mut self.registry
    }

    pub fn governor_stats(&self) -> GovernorStats {
        self.governor.stats()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Forget all per-stream state. Registered mappings are kept.
    pub fn reset(&mut self) {
        self.smoothers.iter_mut().for_each(HandSmoother::reset);
        self.classifier.reset();
        self.governor.reset();
        self.registry.clear_state();
    }
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::SmoothingMode;
    use crate::synthetic::{self, Pose, SequenceSpec};
    use oxboard_common::SmoothingPreset;
    use oxboard_gesture_model::{GestureType, Point, ScreenSize};

    #[test]
    fn test_from_defaults_carries_engine_settings() {
        let defaults = EngineDefaults {
            target_fps: 30,
            smoothing: SmoothingPreset::Advanced,
            min_confidence: 0.7,
            frame_skipping: false,
            cache_capacity: 8,
            ..EngineDefaults::default()
        };
        let config = EngineConfig::from_defaults(&defaults);
        assert_eq!(config.smoothing.mode, SmoothingMode::Advanced);
        assert!((config.smoothing.kalman.dt - 1.0 / 30.0).abs() < 1e-12);
        assert!((config.governor.skip_threshold_ms - 1000.0 / 30.0).abs() < 1e-9);
        assert_eq!(config.governor.base_confidence, 0.7);
        assert!(!config.governor.frame_skipping);
        assert_eq!(config.cache_capacity, 8);
    }

    #[test]
    fn test_short_hands_are_dropped() {
        let mut engine = GestureEngine::default();
        let short = HandResult::new(
            vec![Point::new(0.5, 0.5); 5],
            Handedness::Right,
            0.9,
        );
        let frame = HandFrame::new(0, vec![short], ScreenSize::default());
        let out = engine.process(&frame).unwrap();
        assert!(out.gestures.is_empty());
        assert!(out.active.is_empty());
    }

    #[test]
    fn test_steady_fist_is_emitted() {
        let mut engine = GestureEngine::default();
        let frames = synthetic::sequence(&SequenceSpec::new(Pose::Fist, 10));
        let mut seen = false;
        for frame in &frames {
            let out = engine.process(frame).unwrap();
            seen |= out
                .gestures
                .iter()
                .any(|g| g.gesture_type() == GestureType::Fist);
        }
        assert!(seen);
    }

    #[test]
    fn test_reset_clears_state_but_keeps_mappings() {
        let mut engine = GestureEngine::default();
        for frame in synthetic::sequence(&SequenceSpec::new(Pose::OpenPalm, 3)) {
            engine.process(&frame).unwrap();
        }
        engine.reset();
        assert_eq!(engine.governor_stats().frames_seen, 0);
        assert!(engine.registry().active_gestures().is_empty());
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn test_hand_helper_matches_frame_lookup() {
        let hand = synthetic::hand(Pose::Point, Handedness::Left, Point::new(0.4, 0.6), 0.9);
        let frame = HandFrame::new(0, vec![hand.clone()], ScreenSize::default());
        assert_eq!(frame.hand(Handedness::Left), Some(&hand));
        assert!(frame.hand(Handedness::Right).is_none());
    }
}
