//! Performance governor.
//!
//! Keeps classification inside its per-frame budget by skipping frames,
//! reusing cached results for near-identical frames, lending pooled scratch
//! buffers, and adapting the confidence threshold to measured processing time.

pub mod cache;
pub mod pool;

pub use cache::{CacheKey, ResultCache};
pub use pool::BufferPool;

use std::time::Instant;

use oxboard_common::{FrameClock, FrameIntervalTracker, OxboardResult};
use oxboard_gesture_model::{GestureResult, HandResult, ScreenSize, TimestampMs};
use serde::{Deserialize, Serialize};

/// Governor tuning. Times are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Target processing time per frame.
    pub processing_budget_ms: f64,
    /// Frames arriving faster than this may be skipped.
    pub skip_threshold_ms: f64,
    pub max_skip_threshold_ms: f64,
    /// Factor applied to the skip threshold when over budget.
    pub skip_growth: f64,
    /// Processed frames between adaptation steps.
    pub adapt_interval: u64,
    /// Smoothing factor for the processing time average.
    pub ema_alpha: f64,
    pub adaptive: bool,
    pub base_confidence: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
    pub confidence_step: f64,
    pub frame_skipping: bool,
    pub caching: bool,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            processing_budget_ms: 10.0,
            skip_threshold_ms: 16.67,
            max_skip_threshold_ms: 50.0,
            skip_growth: 1.25,
            adapt_interval: 30,
            ema_alpha: 0.1,
            adaptive: true,
            base_confidence: 0.6,
            min_confidence: 0.5,
            max_confidence: 0.85,
            confidence_step: 0.05,
            frame_skipping: true,
            caching: true,
        }
    }
}

/// Snapshot of governor counters and current tuning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GovernorStats {
    pub frames_seen: u64,
    pub frames_skipped: u64,
    /// Frames that were classified or served from the cache.
    pub frames_processed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub pool_fallbacks: u64,
    pub avg_processing_ms: f64,
    pub confidence_threshold: f64,
    pub skip_threshold_ms: f64,
}

impl GovernorStats {
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

/// What the governor did with a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum GovernorOutcome {
    Skipped,
    Cached(Vec<GestureResult>),
    Processed(Vec<GestureResult>),
}

impl GovernorOutcome {
    /// Emitted gestures, empty for skipped frames.
    pub fn into_results(self) -> Vec<GestureResult> {
        match self {
            Self::Skipped => Vec::new(),
            Self::Cached(results) | Self::Processed(results) => results,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

#[derive(Debug)]
pub struct PerformanceGovernor {
    config: GovernorConfig,
    cache: ResultCache,
    pool: BufferPool,
    intervals: FrameIntervalTracker,
    confidence_threshold: f64,
    skip_threshold_ms: f64,
    avg_processing_ms: Option<f64>,
    frames_skipped: u64,
    frames_processed: u64,
}

impl PerformanceGovernor {
    pub fn new(config: GovernorConfig, cache: ResultCache, pool: BufferPool) -> Self {
        Self {
            confidence_threshold: config.base_confidence,
            skip_threshold_ms: config.skip_threshold_ms,
            config,
            cache,
            pool,
            intervals: FrameIntervalTracker::new(),
            avg_processing_ms: None,
            frames_skipped: 0,
            frames_processed: 0,
        }
    }

    /// Run `classify` for a frame unless it is skipped or cached.
    ///
    /// `classify` receives a pooled scratch buffer and the current confidence
    /// threshold. The buffer goes back to the pool even when it fails.
    pub fn process<F>(
        &mut self,
        hands: &[HandResult],
        screen: &ScreenSize,
        timestamp_ms: TimestampMs,
        classify: F,
    ) -> OxboardResult<GovernorOutcome>
    where
        F: FnOnce(&mut Vec<f64>, f64) -> OxboardResult<Vec<GestureResult>>,
    {
        let (index, interval) = self.intervals.tick(timestamp_ms);
        if self.should_skip(index, interval) {
            self.frames_skipped += 1;
            tracing::trace!(frame = index, "Frame skipped");
            return Ok(GovernorOutcome::Skipped);
        }

        let started = Instant::now();
        let threshold = self.confidence_threshold;

        let key = self
            .config
            .caching
            .then(|| CacheKey::for_frame(hands, screen, threshold));
        if let Some(key) = &key {
            if let Some(results) = self.cache.get(key, timestamp_ms) {
                self.record_processing_time(FrameClock::elapsed_ms_since(started));
                return Ok(GovernorOutcome::Cached(results));
            }
        }

        let results = self
            .pool
            .with_buffer(|buf| classify(buf, threshold));
        self.record_processing_time(FrameClock::elapsed_ms_since(started));
        let results = results?;

        if let Some(key) = key {
            self.cache.insert(key, results.clone());
        }
        Ok(GovernorOutcome::Processed(results))
    }

    fn should_skip(&self, index: u64, interval: Option<f64>) -> bool {
        if !self.config.frame_skipping {
            return false;
        }
        match interval {
            Some(interval) => interval < self.skip_threshold_ms && index % 2 == 0,
            None => false,
        }
    }

    /// Fold a processing time into the running average and adapt the
    /// thresholds every `adapt_interval` frames.
    pub fn record_processing_time(&mut self, elapsed_ms: f64) {
        let alpha = self.config.ema_alpha;
        let avg = match self.avg_processing_ms {
            Some(prev) => alpha * elapsed_ms + (1.0 - alpha) * prev,
            None => elapsed_ms,
        };
        self.avg_processing_ms = Some(avg);
        self.frames_processed += 1;

        if self.config.adaptive
            && self.config.adapt_interval > 0
            && self.frames_processed % self.config.adapt_interval == 0
        {
            self.adapt(avg);
        }
    }

    fn adapt(&mut self, avg_ms: f64) {
        let cfg = &self.config;
        if avg_ms > cfg.processing_budget_ms {
            self.confidence_threshold =
                (self.confidence_threshold + cfg.confidence_step).min(cfg.max_confidence);
            self.skip_threshold_ms =
                (self.skip_threshold_ms * cfg.skip_growth).min(cfg.max_skip_threshold_ms);
            tracing::info!(
                avg_ms,
                threshold = self.confidence_threshold,
                skip_threshold_ms = self.skip_threshold_ms,
                "Over budget, tightening"
            );
        } else if avg_ms < cfg.processing_budget_ms / 2.0 && self.cache.hit_rate() > 0.5 {
            self.confidence_threshold =
                (self.confidence_threshold - cfg.confidence_step).max(cfg.min_confidence);
            self.skip_threshold_ms =
                (self.skip_threshold_ms / cfg.skip_growth).max(cfg.skip_threshold_ms);
            tracing::info!(
                avg_ms,
                threshold = self.confidence_threshold,
                skip_threshold_ms = self.skip_threshold_ms,
                "Under budget, relaxing"
            );
        }
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    pub fn stats(&self) -> GovernorStats {
        GovernorStats {
            frames_seen: self.intervals.frames(),
            frames_skipped: self.frames_skipped,
            frames_processed: self.frames_processed,
            cache_hits: self.cache.hits(),
            cache_misses: self.cache.misses(),
            pool_fallbacks: self.pool.fallbacks(),
            avg_processing_ms: self.avg_processing_ms.unwrap_or(0.0),
            confidence_threshold: self.confidence_threshold,
            skip_threshold_ms: self.skip_threshold_ms,
        }
    }

    /// Clear counters, cache and tuning. Pool buffers are kept.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.intervals.reset();
        self.confidence_threshold = self.config.base_confidence;
        self.skip_threshold_ms = self.config.skip_threshold_ms;
        self.avg_processing_ms = None;
        self.frames_skipped = 0;
        self.frames_processed = 0;
    }
}

impl Default for PerformanceGovernor {
    fn default() -> Self {
        Self::new(
            GovernorConfig::default(),
            ResultCache::default(),
            BufferPool::default(),
        )
    }
}
