//! Per-frame hand landmark data.
//!
//! Landmark indices follow the MediaPipe hand model convention (21 named
//! points, WRIST = 0 through PINKY_TIP = 20).  A [`HandFrame`] is one
//! detected hand in one frame; it is produced, consumed and discarded per
//! frame, never persisted.

use serde::Deserialize;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

/// Named landmark indices (MediaPipe hand landmark convention).
#[allow(dead_code)]
pub mod index {
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
}

/// Number of landmarks in a full hand model.
pub const LANDMARK_COUNT: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One estimated skeletal point.
///
/// `x` and `y` are normalized image coordinates in `[0, 1]`, with `y`
/// growing downward (screen convention); `z` is depth relative to the
/// wrist, negative toward the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// HandSide
// ════════════════════════════════════════════════════════════════════════════

/// Detected handedness, as reported by the estimator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum HandSide {
    Left,
    Right,
}

// ════════════════════════════════════════════════════════════════════════════
// HandFrame
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand in one frame.
///
/// Points the estimator failed to report are `None`; downstream digit
/// extraction treats a missing required point as a curled finger rather
/// than an error.
#[derive(Clone, Debug)]
pub struct HandFrame {
    points: [Option<Landmark>; LANDMARK_COUNT],
    side: HandSide,
    confidence: f32,
}

impl HandFrame {
    /// Build a frame from a full 21-point set.
    pub fn new(points: [Landmark; LANDMARK_COUNT], side: HandSide, confidence: f32) -> Self {
        HandFrame {
            points: points.map(Some),
            side,
            confidence,
        }
    }

    /// Build a frame where individual points may be absent.
    pub fn from_partial(
        points: [Option<Landmark>; LANDMARK_COUNT],
        side: HandSide,
        confidence: f32,
    ) -> Self {
        HandFrame {
            points,
            side,
            confidence,
        }
    }

    /// The landmark at `idx`, or `None` if it is absent or out of range.
    pub fn point(&self, idx: usize) -> Option<Landmark> {
        self.points.get(idx).copied().flatten()
    }

    pub fn side(&self) -> HandSide {
        self.side
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Iterate over the present landmarks with their indices, for drawing.
    pub fn present(&self) -> impl Iterator<Item = (usize, Landmark)> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|lm| (i, lm)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
