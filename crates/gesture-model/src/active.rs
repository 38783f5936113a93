//! Runtime state produced by the mapping registry.

use serde::{Deserialize, Serialize};

use crate::hand::TimestampMs;
use crate::mapping::ControlType;
use crate::point::Point;

/// A mapping currently driven by a detected gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveGesture {
    pub mapping_id: String,
    pub control_type: ControlType,
    pub confidence: f64,
    /// Value extracted from the gesture before calibration and interpolation.
    pub raw_value: f64,
    /// Value in the mapping's output range, after dead zone and smoothing.
    pub mapped_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_zone: Option<String>,
    pub start_time: TimestampMs,
    pub last_update: TimestampMs,
    /// Set once the gesture has been sustained for the mapping's hold time.
    pub is_held: bool,
    pub hand_positions: HandPositions,
}

impl ActiveGesture {
    /// Milliseconds since the gesture started.
    pub fn duration_ms(&self) -> u64 {
        self.last_update.saturating_sub(self.start_time)
    }

    /// Whether the gesture has gone without an update for longer than `expiry_ms`.
    pub fn is_expired(&self, now: TimestampMs, expiry_ms: u64) -> bool {
        now.saturating_sub(self.last_update) > expiry_ms
    }
}

/// Last known hand centers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandPositions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Point>,
}

/// Why a conflict was resolved the way it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// Ordered by priority, then confidence, then start time.
    Priority,
}

/// Diagnostic record of mappings competing for one control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureConflict {
    pub control_type: ControlType,
    pub mapping_ids: Vec<String>,
    pub winner: String,
    pub timestamp: TimestampMs,
    pub reason: ConflictReason,
}

impl GestureConflict {
    pub fn involves(&self, mapping_id: &str) -> bool {
        self.winner == mapping_id || self.mapping_ids.iter().any(|id| id == mapping_id)
    }
}

/// Per-user calibration applied to raw gesture values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationData {
    /// Multiplier applied to raw values before interpolation.
    pub accuracy_score: f64,
}

impl CalibrationData {
    pub fn new(accuracy_score: f64) -> Self {
        Self { accuracy_score }
    }

    pub fn apply(&self, value: f64) -> f64 {
        value * self.accuracy_score
    }
}

impl Default for CalibrationData {
    fn default() -> Self {
        Self::new(1.0)
    }
}
