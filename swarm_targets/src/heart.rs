//! Heart-shaped target cloud.
//!
//! The silhouette is the classic implicit curve
//!
//! ```text
//! f(x, y) = (x² + y² − 1)³ − x² y³        inside  ⇔  f ≤ 0
//! ```
//!
//! sampled by rejection inside a fixed window, then given a Z thickness that
//! grows with `(−f)^0.25` so the middle of the heart is fuller than its rim.

use glam::Vec3;
use rand::Rng;

use crate::cloud::{jitter, random_in_box, signed_unit, TargetCloud};

// Sampling window for the 2D field.
const MIN_X: f32 = -1.6;
const MAX_X: f32 =  1.6;
const MIN_Y: f32 = -1.8;
const MAX_Y: f32 =  1.8;

/// Scene units per field unit.
pub const HEART_SCALE: f32 = 4.5;
/// Z half-thickness at the deepest interior point (field units).
const DEPTH: f32 = 0.55;
/// Half-width of the per-axis jitter (scene units).
pub const HEART_JITTER: f32 = 0.025;
/// Attempts allowed per requested particle before giving up.
const ATTEMPTS_PER_POINT: usize = 400;
/// Half-extent of the fallback cloud.
const FALLBACK_HALF: f32 = 0.4;

/// The implicit heart field; a point is inside when this is `<= 0`.
#[inline]
pub fn heart_field(x: f32, y: f32) -> f32 {
    let a = x * x + y * y - 1.0;
    a * a * a - x * x * y * y * y
}

/// Generate a heart of exactly `count` points.
pub fn heart<R: Rng + ?Sized>(count: usize, rng: &mut R) -> TargetCloud {
    let mut points = Vec::with_capacity(count);
    let max_attempts = count.saturating_mul(ATTEMPTS_PER_POINT);
    let mut attempts = 0usize;

    while points.len() < count && attempts < max_attempts {
        attempts += 1;

        let x = rng.gen_range(MIN_X..MAX_X);
        let y = rng.gen_range(MIN_Y..MAX_Y);
        let f = heart_field(x, y);
        if f > 0.0 {
            continue;
        }

        let inside = (-f).clamp(0.0, 1.0);
        let z = signed_unit(rng) * DEPTH * inside.powf(0.25);

        points.push(Vec3::new(
            x * HEART_SCALE + jitter(rng, HEART_JITTER),
            y * HEART_SCALE + jitter(rng, HEART_JITTER),
            z * HEART_SCALE + jitter(rng, HEART_JITTER),
        ));
    }

    let sampled = points.len();
    while points.len() < count {
        points.push(random_in_box(rng, Vec3::splat(FALLBACK_HALF)));
    }
    TargetCloud::new(points, sampled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    #[test]
    fn field_sign() {
        assert!(heart_field(0.0, 0.0) < 0.0);
        assert!(heart_field(1.5, 1.5) > 0.0);
        assert!(heart_field(0.0, -1.5) > 0.0);
    }

    #[test]
    fn exact_count() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in [0, 1, 17, 1500] {
            assert_eq!(heart(n, &mut rng).len(), n);
        }
    }

    #[test]
    fn samples_lie_inside_the_curve() {
        let mut rng = StdRng::seed_from_u64(42);
        let cloud = heart(3000, &mut rng);
        assert_eq!(cloud.sampled(), 3000);

        // Undo the scale; the jitter can push a rim point slightly outside,
        // so probe a grid over the jitter box for an inside hit.
        let tol = HEART_JITTER / HEART_SCALE;
        let steps = 8;
        for p in cloud.points() {
            let (x, y) = (p.x / HEART_SCALE, p.y / HEART_SCALE);
            let inside = (0..=steps).any(|i| {
                (0..=steps).any(|j| {
                    let dx = -tol + 2.0 * tol * i as f32 / steps as f32;
                    let dy = -tol + 2.0 * tol * j as f32 / steps as f32;
                    heart_field(x + dx, y + dy) <= 0.0
                })
            });
            assert!(inside, "point ({x}, {y}) is outside the heart");
        }
    }

    #[test]
    fn thicker_in_the_middle() {
        let mut rng = StdRng::seed_from_u64(5);
        let cloud = heart(6000, &mut rng);
        let max_z = |pred: &dyn Fn(&Vec3) -> bool| {
            cloud.iter().filter(|p| pred(p)).map(|p| p.z.abs()).fold(0.0f32, f32::max)
        };
        let core = max_z(&|p| heart_field(p.x / HEART_SCALE, p.y / HEART_SCALE) < -0.5);
        let rim  = max_z(&|p| {
            let f = heart_field(p.x / HEART_SCALE, p.y / HEART_SCALE);
            f > -0.01 && f <= 0.0
        });
        assert!(core > rim);
    }

    /// An rng that only ever returns the top of its range; every heart
    /// sample lands in the window corner, outside the curve.
    struct Corner;
    impl RngCore for Corner {
        fn next_u32(&mut self) -> u32 { u32::MAX }
        fn next_u64(&mut self) -> u64 { u64::MAX }
        fn fill_bytes(&mut self, dest: &mut [u8]) { dest.fill(0xFF) }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            dest.fill(0xFF);
            Ok(())
        }
    }

    #[test]
    fn exhausted_attempts_fall_back() {
        let cloud = heart(8, &mut Corner);
        assert_eq!(cloud.len(), 8);
        assert_eq!(cloud.sampled(), 0);
        assert!(cloud.iter().all(|p| p.abs().max_element() <= FALLBACK_HALF));
    }
}
