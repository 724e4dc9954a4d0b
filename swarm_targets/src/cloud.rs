//! The [`TargetCloud`] container plus the idle and fallback generators.

use glam::Vec3;
use rand::Rng;

/// An immutable, ordered set of per-particle offsets.
///
/// Points `[0, sampled)` came from the shape's own sampler; points
/// `[sampled, len)` were filled from a fallback cloud.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetCloud {
    points:  Vec<Vec3>,
    sampled: usize,
}

impl TargetCloud {
    /// Wrap `points`, marking the first `sampled` as genuine shape samples.
    pub fn new(points: Vec<Vec3>, sampled: usize) -> Self {
        let sampled = sampled.min(points.len());
        TargetCloud { points, sampled }
    }

    pub fn len(&self)      -> usize   { self.points.len() }
    pub fn is_empty(&self) -> bool    { self.points.is_empty() }
    pub fn points(&self)   -> &[Vec3] { &self.points }
    pub fn sampled(&self)  -> usize   { self.sampled }

    /// True when any particle had to be filled from the fallback cloud.
    pub fn is_partial(&self) -> bool { self.sampled < self.points.len() }

    pub fn iter(&self) -> impl Iterator<Item = &Vec3> { self.points.iter() }
}

/// Uniform sample in `[-1, 1)`.
#[inline]
pub(crate) fn signed_unit<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>() * 2.0 - 1.0
}

/// Uniform sample in `[-half, half)`.
#[inline]
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, half: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * 2.0 * half
}

/// A box-shaped random point with the given half-extents.
pub fn random_in_box<R: Rng + ?Sized>(rng: &mut R, half: Vec3) -> Vec3 {
    Vec3::new(jitter(rng, half.x), jitter(rng, half.y), jitter(rng, half.z))
}

/// The swarm's resting shape: `count` points uniform in `[-extent, extent]³`.
pub fn idle<R: Rng + ?Sized>(count: usize, extent: f32, rng: &mut R) -> TargetCloud {
    let points = (0..count)
        .map(|_| random_in_box(rng, Vec3::splat(extent)))
        .collect();
    TargetCloud::new(points, count)
}

/// A pure fallback cloud, used when a shape has nothing to sample from.
pub fn fallback<R: Rng + ?Sized>(count: usize, half: Vec3, rng: &mut R) -> TargetCloud {
    let points = (0..count).map(|_| random_in_box(rng, half)).collect();
    TargetCloud::new(points, 0)
}
