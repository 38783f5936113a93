//! Oxboard Gesture Core
//!
//! Turns per-frame hand landmarks into control values:
//! - **Smoothing:** Kalman and adaptive filtering of the 21 landmarks
//! - **Classifier:** Single- and two-hand gesture detection with confidence gating
//! - **Mapping:** Gesture-to-control registry with curves, zones and conflict resolution
//! - **Governor:** Frame skipping, result caching and buffer reuse within a time budget
//!
//! [`GestureEngine`] chains all four. Every stage is synchronous and driven
//! by caller-supplied timestamps, so recorded sessions replay identically.

pub mod classifier;
pub mod engine;
pub mod governor;
pub mod mapping;
pub mod smoothing;
pub mod synthetic;

pub use classifier::{ClassifierConfig, GestureClassifier};
pub use engine::{EngineConfig, FrameOutput, GestureEngine};
pub use governor::{
    BufferPool, GovernorConfig, GovernorOutcome, GovernorStats, PerformanceGovernor, ResultCache,
};
pub use mapping::{MappingRegistry, RegistryConfig};
pub use smoothing::{HandSmoother, SmoothingConfig, SmoothingMode};
