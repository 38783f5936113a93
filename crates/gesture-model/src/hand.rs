//! Hand landmark results and per-frame input.
//!
//! Frames are exchanged as JSONL (one frame per line) so recorded sessions
//! can be replayed deterministically. Lines starting with `#` are comments.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Caller-supplied timestamp in milliseconds.
pub type TimestampMs = u64;

/// Number of landmarks in a tracked hand.
pub const LANDMARK_COUNT: usize = 21;

/// Fixed landmark indices.
pub mod landmark {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    /// Fingertips, thumb first.
    pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

    /// `(tip, pip)` pairs for index through pinky.
    pub const FINGER_TIP_PIP: [(usize, usize); 4] = [
        (INDEX_TIP, INDEX_PIP),
        (MIDDLE_TIP, MIDDLE_PIP),
        (RING_TIP, RING_PIP),
        (PINKY_TIP, PINKY_PIP),
    ];
}

/// Which physical hand a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Slot index for per-hand arrays.
    pub fn index(&self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// Hand tag attached to a detected gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSide {
    Left,
    Right,
    Both,
}

impl From<Handedness> for HandSide {
    fn from(h: Handedness) -> Self {
        match h {
            Handedness::Left => HandSide::Left,
            Handedness::Right => HandSide::Right,
        }
    }
}

/// One tracked hand for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    /// Landmarks in fixed index order (see [`landmark`]).
    pub landmarks: Vec<Point>,
    pub handedness: Handedness,
    /// Detection confidence in [0, 1].
    pub confidence: f64,
}

impl HandResult {
    pub fn new(landmarks: Vec<Point>, handedness: Handedness, confidence: f64) -> Self {
        Self {
            landmarks,
            handedness,
            confidence,
        }
    }

    /// A hand with fewer than 21 landmarks cannot be classified.
    pub fn is_usable(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }

    pub fn landmark(&self, index: usize) -> Option<&Point> {
        self.landmarks.get(index)
    }

    pub fn wrist(&self) -> Option<Point> {
        self.landmarks.get(landmark::WRIST).copied()
    }

    /// Mean of the first 21 landmarks.
    pub fn center(&self) -> Option<Point> {
        if !self.is_usable() {
            return None;
        }
        Point::centroid(&self.landmarks[..LANDMARK_COUNT])
    }
}

/// Camera frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Diagonal length in pixels.
    pub fn diagonal(&self) -> f64 {
        (self.width * self.width + self.height * self.height).sqrt()
    }

    /// Distance between two normalized points expressed as a fraction of the
    /// screen diagonal.
    pub fn normalized_distance(&self, a: &Point, b: &Point) -> f64 {
        let diagonal = self.diagonal();
        if diagonal <= 0.0 {
            return a.distance_to(b);
        }
        let dx = (a.x - b.x) * self.width;
        let dy = (a.y - b.y) * self.height;
        (dx * dx + dy * dy).sqrt() / diagonal
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

/// All hand input for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    /// Caller-supplied timestamp.
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    /// Zero, one, or two hands.
    #[serde(default)]
    pub hands: Vec<HandResult>,

    #[serde(default)]
    pub screen: ScreenSize,
}

impl HandFrame {
    pub fn new(timestamp_ms: TimestampMs, hands: Vec<HandResult>, screen: ScreenSize) -> Self {
        Self {
            timestamp_ms,
            hands,
            screen,
        }
    }

    /// First usable hand with the given handedness.
    pub fn hand(&self, handedness: Handedness) -> Option<&HandResult> {
        self.hands
            .iter()
            .find(|h| h.handedness == handedness && h.is_usable())
    }
}

/// Parse frames from JSONL content (one JSON object per line).
pub fn parse_frames(jsonl: &str) -> Result<Vec<HandFrame>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize frames to JSONL format.
pub fn serialize_frames(frames: &[HandFrame]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}
