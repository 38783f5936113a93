//! Oxboard Gesture Model
//!
//! Defines the data contracts shared by the gesture engine and its callers:
//! - **Hands:** 21-landmark hand results and per-frame input
//! - **Gestures:** Typed detections with confidence and timestamps
//! - **Mappings:** Gesture-to-control configuration records and profiles
//! - **Runtime:** Active gestures, conflicts, and calibration
//!
//! All coordinates are normalized to `[0.0, 1.0]` relative to the camera
//! frame, with `y` growing downward.

pub mod active;
pub mod gesture;
pub mod hand;
pub mod mapping;
pub mod point;

pub use active::*;
pub use gesture::*;
pub use hand::*;
pub use mapping::*;
pub use point::*;
