//! First-order low-pass filters.
//!
//! Every control value in the swarm moves by `value += (target − value) × α`
//! once per tick.  With `0 < α ≤ 1` this never overshoots.

use glam::Vec3;

/// Pinch/spread-driven scale and spread, and per-particle tracking.
pub const SCALE_RATE: f32 = 0.15;
/// Per-particle chase toward the blended target.
pub const TRACK_RATE: f32 = 0.15;
/// Swarm center following the pointer.
pub const CENTER_RATE: f32 = 0.2;
/// Heart and text morph toggles.
pub const MORPH_RATE: f32 = 0.12;
/// Scale, spread and center easing back to rest with no hand.
pub const IDLE_PARAM_RATE: f32 = 0.08;
/// Particles drifting home to the idle cloud.
pub const IDLE_DECAY_RATE: f32 = 0.02;

/// Morph weights at or below this are skipped entirely.
pub const MORPH_EPSILON: f32 = 0.001;

pub trait Approach: Copy {
    /// Move `self` a fraction `rate` of the way toward `target`.
    fn approach(&mut self, target: Self, rate: f32);
}

impl Approach for f32 {
    #[inline]
    fn approach(&mut self, target: f32, rate: f32) {
        *self += (target - *self) * rate;
    }
}

impl Approach for Vec3 {
    #[inline]
    fn approach(&mut self, target: Vec3, rate: f32) {
        *self += (target - *self) * rate;
    }
}

#[inline]
pub fn clamp01(v: f32) -> f32 { v.clamp(0.0, 1.0) }
