//! Clock and timing utilities for landmark frames.
//!
//! The engine never reads a clock to decide gesture timing: cooldowns, hold
//! times and expiry all use the millisecond timestamps the caller stamps on
//! each frame. This module provides:
//! - A frame clock for callers that stamp live frames
//! - Millisecond/second conversions
//! - Inter-frame interval tracking

use std::time::Instant;

/// Caller-supplied frame timestamp in milliseconds.
pub type TimestampMs = u64;

/// A frame clock that provides monotonic millisecond timestamps relative to
/// a fixed epoch (the moment tracking started).
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// The instant tracking started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl FrameClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Milliseconds elapsed since the epoch.
    pub fn now_ms(&self) -> TimestampMs {
        self.epoch.elapsed().as_millis() as TimestampMs
    }

    /// Fractional milliseconds elapsed since an arbitrary instant.
    pub fn elapsed_ms_since(start: Instant) -> f64 {
        start.elapsed().as_secs_f64() * 1000.0
    }

    /// Wall-clock time at the epoch.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Convert milliseconds to seconds.
pub fn ms_to_secs(ms: TimestampMs) -> f64 {
    ms as f64 / 1000.0
}

/// Convert seconds to whole milliseconds.
pub fn secs_to_ms(secs: f64) -> TimestampMs {
    (secs * 1000.0).round().max(0.0) as TimestampMs
}

/// Tracks the interval between consecutive frames.
#[derive(Debug, Default, Clone)]
pub struct FrameIntervalTracker {
    last_ms: Option<TimestampMs>,
    frame_index: u64,
}

impl FrameIntervalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame and return `(frame_index, interval_ms)`.
    ///
    /// The first frame has no interval. Timestamps that go backwards yield a
    /// zero interval rather than wrapping.
    pub fn tick(&mut self, timestamp_ms: TimestampMs) -> (u64, Option<f64>) {
        let interval = self
            .last_ms
            .map(|last| timestamp_ms.saturating_sub(last) as f64);
        let index = self.frame_index;
        self.last_ms = Some(timestamp_ms);
        self.frame_index += 1;
        (index, interval)
    }

    /// Number of frames seen so far.
    pub fn frames(&self) -> u64 {
        self.frame_index
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
