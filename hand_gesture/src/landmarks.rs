//! Landmark indexing and the [`LandmarkSet`] type.
//!
//! Coordinates are in detector image space: `x`, `y` in `[0, 1]` with `y`
//! growing downward, `z` a relative depth.

use glam::Vec3;
use thiserror::Error;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// The four long fingers as (tip, MCP) pairs: index, middle, ring, pinky.
pub const FINGERS: [(usize, usize); 4] = [
    (INDEX_TIP,  INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP,   RING_MCP),
    (PINKY_TIP,  PINKY_MCP),
];

// Image space → scene units.
const SCENE_X: f32 =  10.0;
const SCENE_Y: f32 = -10.0;
const SCENE_Z: f32 =  -5.0;

/// Map an image-space landmark into scene units.
///
/// The X axis is mirrored so the swarm moves with the user rather than
/// against them.
#[inline]
pub fn to_scene(p: Vec3) -> Vec3 {
    Vec3::new(
        (0.5 - p.x) * SCENE_X,
        (p.y - 0.5) * SCENE_Y,
        (0.5 - p.z) * SCENE_Z,
    )
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("expected {LANDMARK_COUNT} landmarks, got {0}")]
    WrongCount(usize),
}

/// Which hand a landmark set belongs to, as labelled by the detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Parse a detector label, case-insensitively.  Unknown labels are `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "left"  => Some(Handedness::Left),
            "right" => Some(Handedness::Right),
            _       => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Handedness::Left  => "left",
            Handedness::Right => "right",
        }
    }
}

/// Exactly 21 landmarks for one hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandmarkSet([Vec3; LANDMARK_COUNT]);

impl LandmarkSet {
    pub fn new(points: [Vec3; LANDMARK_COUNT]) -> Self { LandmarkSet(points) }

    /// Build from a slice; anything other than 21 points is rejected.
    pub fn from_slice(points: &[Vec3]) -> Result<Self, LandmarkError> {
        let arr: [Vec3; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| LandmarkError::WrongCount(points.len()))?;
        Ok(LandmarkSet(arr))
    }

    #[inline]
    pub fn point(&self, idx: usize) -> Vec3 { self.0[idx] }

    pub fn points(&self) -> &[Vec3; LANDMARK_COUNT] { &self.0 }

    #[inline]
    pub fn dist(&self, a: usize, b: usize) -> f32 { self.0[a].distance(self.0[b]) }

    /// Apply `f` to every landmark.
    pub fn map(&self, f: impl Fn(Vec3) -> Vec3) -> Self {
        LandmarkSet(self.0.map(f))
    }
}
