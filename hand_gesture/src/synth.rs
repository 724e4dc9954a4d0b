//! Synthetic landmark sets.
//!
//! Each [`HandPose`] is built in a canonical hand frame (wrist at the
//! origin, fingers pointing up `+y`, one unit ≈ palm length) and then placed
//! into image space around a cursor.  The keyboard simulator uses these in
//! place of a camera; tests use them as known-good inputs.

use glam::{Vec2, Vec3};

use crate::landmarks::{
    Handedness, LandmarkSet, INDEX_MCP, LANDMARK_COUNT, MIDDLE_MCP, PINKY_MCP, RING_MCP,
    THUMB_CMC, WRIST,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HandPose {
    #[default]
    Open,
    Pinch,
    Fist,
    OneFinger,
    TwoFinger,
    ThreeFinger,
}

impl HandPose {
    pub fn label(self) -> &'static str {
        match self {
            HandPose::Open        => "open",
            HandPose::Pinch       => "pinch",
            HandPose::Fist        => "fist",
            HandPose::OneFinger   => "one",
            HandPose::TwoFinger   => "two",
            HandPose::ThreeFinger => "three",
        }
    }

    /// Which of index, middle, ring, pinky are straight.
    fn extended(self) -> [bool; 4] {
        match self {
            HandPose::Open | HandPose::Pinch => [true,  true,  true,  true ],
            HandPose::Fist                   => [false, false, false, false],
            HandPose::OneFinger              => [true,  false, false, false],
            HandPose::TwoFinger              => [true,  true,  false, false],
            HandPose::ThreeFinger            => [true,  true,  true,  false],
        }
    }
}

// ── Canonical skeleton ────────────────────────────────────────────────────
// (MCP position, finger length) for index, middle, ring, pinky.
const FINGER_BASES: [(Vec2, f32); 4] = [
    (Vec2::new(-0.35, 1.00), 1.00),
    (Vec2::new(-0.10, 1.05), 1.00),
    (Vec2::new( 0.15, 1.00), 0.95),
    (Vec2::new( 0.38, 0.90), 0.80),
];
const FINGER_START: [usize; 4] = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

const THUMB_OPEN: [Vec3; 4] = [
    Vec3::new(-0.35, 0.30, 0.0),
    Vec3::new(-0.60, 0.55, 0.0),
    Vec3::new(-0.75, 0.80, 0.0),
    Vec3::new(-0.85, 1.00, 0.0),
];
const THUMB_TUCKED: [Vec3; 4] = [
    Vec3::new(-0.30, 0.30,  0.00),
    Vec3::new(-0.40, 0.50, -0.05),
    Vec3::new(-0.25, 0.65, -0.10),
    Vec3::new(-0.10, 0.70, -0.10),
];
const PINCH_OFFSET: Vec3 = Vec3::new(-0.04, -0.04, 0.0);

/// Canonical point that lands on the cursor.
const ANCHOR_Y: f32 = 1.0;

fn finger(mcp: Vec2, len: f32, straight: bool) -> [Vec3; 4] {
    let base = mcp.extend(0.0);
    if straight {
        [
            base,
            base + Vec3::new(0.0, 0.45 * len, 0.0),
            base + Vec3::new(0.0, 0.75 * len, 0.0),
            base + Vec3::new(0.0, len, 0.0),
        ]
    } else {
        [
            base,
            Vec3::new(mcp.x,       mcp.y + 0.25, -0.15),
            Vec3::new(mcp.x * 0.8, mcp.y + 0.05, -0.25),
            Vec3::new(mcp.x * 0.6, mcp.y - 0.15, -0.12),
        ]
    }
}

/// The pose in the canonical hand frame.
pub fn canonical(pose: HandPose) -> [Vec3; LANDMARK_COUNT] {
    let mut pts = [Vec3::ZERO; LANDMARK_COUNT];
    pts[WRIST] = Vec3::ZERO;

    for ((&(mcp, len), &start), straight) in FINGER_BASES
        .iter()
        .zip(FINGER_START.iter())
        .zip(pose.extended())
    {
        pts[start..start + 4].copy_from_slice(&finger(mcp, len, straight));
    }

    // Counting poses keep the thumb out so curled fingers don't read as a fist.
    let thumb = if pose == HandPose::Fist { THUMB_TUCKED } else { THUMB_OPEN };
    pts[THUMB_CMC..THUMB_CMC + 4].copy_from_slice(&thumb);

    if pose == HandPose::Pinch {
        let index_tip = pts[INDEX_MCP + 3];
        pts[THUMB_CMC + 3] = index_tip + PINCH_OFFSET;
    }
    pts
}

/// Place `pose` in image space with its palm anchor at `cursor`.
///
/// `size` is image units per canonical unit (≈ 0.12 for a hand at arm's
/// length).  Left hands are mirrored across the vertical axis.
pub fn synthesize(pose: HandPose, cursor: Vec2, size: f32, hand: Handedness) -> LandmarkSet {
    let mirror = match hand {
        Handedness::Right =>  1.0,
        Handedness::Left  => -1.0,
    };
    LandmarkSet::new(canonical(pose)).map(|p| {
        Vec3::new(
            cursor.x + mirror * p.x * size,
            cursor.y - (p.y - ANCHOR_Y) * size,
            p.z * size,
        )
    })
}
