//! Gesture-to-control mapping configuration.
//!
//! Mappings are plain data: they can be built in code, loaded from JSON, and
//! exchanged between tools. The registry in the engine owns their runtime
//! behavior; this module owns their shape and validation rules.

use serde::{Deserialize, Serialize};

use crate::gesture::GestureType;
use crate::point::Point;

/// Mixer control a mapping drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlType {
    Volume,
    Pan,
    Crossfade,
    Mute,
    EqLow,
    EqMid,
    EqHigh,
    PlaybackRate,
}

impl ControlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Pan => "pan",
            Self::Crossfade => "crossfade",
            Self::Mute => "mute",
            Self::EqLow => "eq-low",
            Self::EqMid => "eq-mid",
            Self::EqHigh => "eq-high",
            Self::PlaybackRate => "playback-rate",
        }
    }
}

/// Audio stem (or the master bus) a control applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StemTarget {
    Vocals,
    Drums,
    Bass,
    Other,
    #[default]
    Master,
}

/// Which hand(s) must be present for a mapping to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HandRequirement {
    Left,
    Right,
    #[default]
    Either,
    Both,
}

/// Response curve from normalized input to output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    #[default]
    Linear,
    Logarithmic,
    Exponential,
    Quadratic,
    Cubic,
    Step,
}

/// Closed numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const UNIT: ValueRange = ValueRange { min: 0.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// `min < max` with both ends finite.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Largest absolute value in the range.
    pub fn magnitude(&self) -> f64 {
        self.min.abs().max(self.max.abs())
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Axis-aligned bounding box `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inside the unit square with a positive area.
    pub fn is_normalized(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= 1.0 && self.bottom() <= 1.0
    }
}

/// Geometry of a spatial zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ZoneShape {
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    Polygon {
        points: Vec<Point>,
    },
}

impl ZoneShape {
    /// Whether a normalized point lies inside the shape.
    ///
    /// Rectangle edges and circle boundaries count as inside. Polygons use
    /// even-odd ray casting.
    pub fn contains(&self, p: &Point) -> bool {
        match self {
            Self::Rectangle {
                x,
                y,
                width,
                height,
            } => p.x >= *x && p.x <= x + width && p.y >= *y && p.y <= y + height,
            Self::Circle { center, radius } => center.distance_to(p) <= *radius,
            Self::Polygon { points } => polygon_contains(points, p),
        }
    }

    /// Bounding box of the shape, `None` for an empty polygon.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Self::Rectangle {
                x,
                y,
                width,
                height,
            } => Some(Bounds {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            }),
            Self::Circle { center, radius } => Some(Bounds {
                x: center.x - radius,
                y: center.y - radius,
                width: radius * 2.0,
                height: radius * 2.0,
            }),
            Self::Polygon { points } => {
                let first = points.first()?;
                let (mut min_x, mut min_y, mut max_x, mut max_y) =
                    (first.x, first.y, first.x, first.y);
                for p in &points[1..] {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                Some(Bounds {
                    x: min_x,
                    y: min_y,
                    width: max_x - min_x,
                    height: max_y - min_y,
                })
            }
        }
    }
}

fn polygon_contains(points: &[Point], p: &Point) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (&points[i], &points[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Named spatial region gating a mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    #[serde(flatten)]
    pub shape: ZoneShape,
}

impl Zone {
    pub fn rectangle(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            shape: ZoneShape::Rectangle {
                x,
                y,
                width,
                height,
            },
        }
    }

    pub fn circle(id: impl Into<String>, center: Point, radius: f64) -> Self {
        Self {
            id: id.into(),
            shape: ZoneShape::Circle { center, radius },
        }
    }

    pub fn polygon(id: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            shape: ZoneShape::Polygon { points },
        }
    }

    pub fn contains(&self, p: &Point) -> bool {
        self.shape.contains(p)
    }
}

/// A single problem found while validating a mapping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("id is empty")]
    EmptyId,

    #[error("name is empty")]
    EmptyName,

    #[error("min confidence {0} is outside [0, 1]")]
    MinConfidence(f64),

    #[error("input range [{min}, {max}] must have min < max")]
    InputRange { min: f64, max: f64 },

    #[error("output range [{min}, {max}] must have min < max")]
    OutputRange { min: f64, max: f64 },

    #[error("smoothing {0} is outside [0, 1]")]
    Smoothing(f64),

    #[error("dead zone {0} is outside [0, 1]")]
    DeadZone(f64),

    #[error("zone '{zone}' extends outside the unit square")]
    ZoneOutOfBounds { zone: String },

    #[error("zone '{zone}' has no area")]
    ZoneDegenerate { zone: String },

    #[error("polygon zone '{zone}' needs at least 3 points, got {count}")]
    PolygonPoints { zone: String, count: usize },
}

/// A gesture-to-control mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureMapping {
    pub id: String,
    pub name: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    pub gesture_type: GestureType,

    #[serde(default)]
    pub hand_requirement: HandRequirement,

    /// Minimum gesture confidence in [0, 1].
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Optional spatial gates; empty means anywhere.
    #[serde(default)]
    pub zones: Vec<Zone>,

    pub control_type: ControlType,

    #[serde(default)]
    pub target_stem: StemTarget,

    #[serde(default)]
    pub input_range: ValueRange,

    #[serde(default)]
    pub output_range: ValueRange,

    #[serde(default)]
    pub interpolation: InterpolationMode,

    #[serde(default)]
    pub inverted: bool,

    /// Dead zone around zero in [0, 1].
    #[serde(default)]
    pub dead_zone: f64,

    /// Weight of the previous mapped value when updating, in [0, 1].
    #[serde(default)]
    pub smoothing: f64,

    /// Time the gesture must be sustained before it counts as held.
    #[serde(default, rename = "holdTime")]
    pub hold_time_ms: u64,

    /// Minimum time between updates.
    #[serde(default, rename = "cooldown")]
    pub cooldown_ms: u64,

    /// Higher priority wins conflicts on the same control.
    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_min_confidence() -> f64 {
    0.7
}

impl GestureMapping {
    /// A mapping with default ranges, curve, and timing.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        gesture_type: GestureType,
        control_type: ControlType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            gesture_type,
            hand_requirement: HandRequirement::Either,
            min_confidence: default_min_confidence(),
            zones: Vec::new(),
            control_type,
            target_stem: StemTarget::Master,
            input_range: ValueRange::UNIT,
            output_range: ValueRange::UNIT,
            interpolation: InterpolationMode::Linear,
            inverted: false,
            dead_zone: 0.0,
            smoothing: 0.0,
            hold_time_ms: 0,
            cooldown_ms: 0,
            priority: 0,
            tags: Vec::new(),
        }
    }

    /// Collect every validation issue; empty means valid.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.id.trim().is_empty() {
            issues.push(ValidationIssue::EmptyId);
        }
        if self.name.trim().is_empty() {
            issues.push(ValidationIssue::EmptyName);
        }
        if !in_unit(self.min_confidence) {
            issues.push(ValidationIssue::MinConfidence(self.min_confidence));
        }
        if !self.input_range.is_valid() {
            issues.push(ValidationIssue::InputRange {
                min: self.input_range.min,
                max: self.input_range.max,
            });
        }
        if !self.output_range.is_valid() {
            issues.push(ValidationIssue::OutputRange {
                min: self.output_range.min,
                max: self.output_range.max,
            });
        }
        if !in_unit(self.smoothing) {
            issues.push(ValidationIssue::Smoothing(self.smoothing));
        }
        if !in_unit(self.dead_zone) {
            issues.push(ValidationIssue::DeadZone(self.dead_zone));
        }
        for zone in &self.zones {
            validate_zone(zone, &mut issues);
        }

        issues
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn in_unit(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

fn validate_zone(zone: &Zone, issues: &mut Vec<ValidationIssue>) {
    if let ZoneShape::Polygon { points } = &zone.shape {
        if points.len() < 3 {
            issues.push(ValidationIssue::PolygonPoints {
                zone: zone.id.clone(),
                count: points.len(),
            });
            return;
        }
    }
    let Some(bounds) = zone.shape.bounds() else {
        return;
    };
    if !(bounds.width > 0.0 && bounds.height > 0.0) {
        issues.push(ValidationIssue::ZoneDegenerate {
            zone: zone.id.clone(),
        });
    }
    if !bounds.is_normalized() {
        issues.push(ValidationIssue::ZoneOutOfBounds {
            zone: zone.id.clone(),
        });
    }
}

/// A named collection of mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mappings: Vec<GestureMapping>,
}

impl MappingProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mappings: Vec::new(),
        }
    }

    /// Parse a profile from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validation issues per mapping id, only for mappings that have any.
    pub fn validate(&self) -> Vec<(String, Vec<ValidationIssue>)> {
        self.mappings
            .iter()
            .map(|m| (m.id.clone(), m.validate()))
            .filter(|(_, issues)| !issues.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume_mapping() -> GestureMapping {
        GestureMapping::new("vol", "Pinch volume", GestureType::Pinch, ControlType::Volume)
    }

    #[test]
    fn test_default_mapping_is_valid() {
        assert!(volume_mapping().is_valid());
    }

    #[test]
    fn test_validation_aggregates_issues() {
        let mapping = GestureMapping {
            id: String::new(),
            name: " ".to_string(),
            min_confidence: 1.2,
            input_range: ValueRange::new(1.0, 1.0),
            output_range: ValueRange::new(2.0, -2.0),
            smoothing: -0.1,
            dead_zone: 1.5,
            ..volume_mapping()
        };
        let issues = mapping.validate();
        assert_eq!(issues.len(), 7);
        assert!(issues.contains(&ValidationIssue::EmptyId));
        assert!(issues.contains(&ValidationIssue::DeadZone(1.5)));
    }

    #[test]
    fn test_zone_validation() {
        let mapping = GestureMapping {
            zones: vec![
                Zone::rectangle("ok", 0.0, 0.0, 0.5, 0.5),
                Zone::rectangle("wide", 0.6, 0.0, 0.5, 0.5),
                Zone::rectangle("flat", 0.1, 0.1, 0.3, 0.0),
                Zone::circle("edge", Point::new(0.05, 0.5), 0.1),
                Zone::polygon("line", vec![Point::new(0.1, 0.1), Point::new(0.2, 0.2)]),
            ],
            ..volume_mapping()
        };
        let issues = mapping.validate();
        assert_eq!(
            issues,
            vec![
                ValidationIssue::ZoneOutOfBounds {
                    zone: "wide".to_string()
                },
                ValidationIssue::ZoneDegenerate {
                    zone: "flat".to_string()
                },
                ValidationIssue::ZoneOutOfBounds {
                    zone: "edge".to_string()
                },
                ValidationIssue::PolygonPoints {
                    zone: "line".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_zone_containment() {
        let rect = Zone::rectangle("r", 0.2, 0.2, 0.2, 0.2);
        assert!(rect.contains(&Point::new(0.3, 0.3)));
        assert!(rect.contains(&Point::new(0.4, 0.4)));
        assert!(!rect.contains(&Point::new(0.5, 0.3)));

        let circle = Zone::circle("c", Point::new(0.5, 0.5), 0.1);
        assert!(circle.contains(&Point::new(0.58, 0.5)));
        assert!(!circle.contains(&Point::new(0.58, 0.58)));

        let triangle = Zone::polygon(
            "t",
            vec![Point::new(0.1, 0.9), Point::new(0.5, 0.1), Point::new(0.9, 0.9)],
        );
        assert!(triangle.contains(&Point::new(0.5, 0.6)));
        assert!(!triangle.contains(&Point::new(0.15, 0.2)));
    }

    #[test]
    fn test_mapping_json_uses_camel_case_and_defaults() {
        let json = r#"{
            "id": "xf",
            "name": "Crossfade",
            "gestureType": "spread",
            "controlType": "crossfade",
            "holdTime": 150,
            "zones": [{"id": "left", "shape": "rectangle", "x": 0.0, "y": 0.0, "width": 0.5, "height": 1.0}]
        }"#;
        let mapping: GestureMapping = serde_json::from_str(json).unwrap();
        assert_eq!(mapping.gesture_type, GestureType::SpreadHands);
        assert_eq!(mapping.hold_time_ms, 150);
        assert!(mapping.enabled);
        assert_eq!(mapping.min_confidence, 0.7);
        assert_eq!(mapping.target_stem, StemTarget::Master);
        assert_eq!(mapping.zones.len(), 1);
        assert!(mapping.is_valid());
    }

    #[test]
    fn test_profile_reports_only_invalid_mappings() {
        let mut profile = MappingProfile::new("live", "Live set");
        profile.mappings.push(volume_mapping());
        profile.mappings.push(GestureMapping {
            id: "bad".to_string(),
            dead_zone: 2.0,
            ..volume_mapping()
        });
        let report = profile.validate();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].0, "bad");

        let json = profile.to_json().unwrap();
        assert_eq!(MappingProfile::from_json(&json).unwrap(), profile);
    }
}
