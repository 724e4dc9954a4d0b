//! Firework bursts.
//!
//! Each burst is a short-lived ballistic point cloud: particles leave a
//! common origin in uniformly random directions, fall under gravity, lose
//! speed to drag, and fade linearly over the burst lifetime.
//!
//! Bursts live in a slot pool.  An expired slot keeps its buffers and is
//! handed to the next spawn; its generation counter is bumped so that any
//! [`BurstHandle`] still pointing at the old burst stops resolving.

use std::f32::consts::TAU;

use glam::Vec3;
use log::debug;
use rand::Rng;

// ── Physics ───────────────────────────────────────────────────────────────
pub const GRAVITY: f32 = -2.2;
/// Velocity multiplier per tick.
pub const DRAG:    f32 = 0.985;

// ── Spawn distribution ────────────────────────────────────────────────────
const ORIGIN_JITTER: f32 = 0.05;
const SPEED_MIN:     f32 = 4.0;
const SPEED_RANGE:   f32 = 3.6;
const COLOR_BASE:    f32 = 0.75;
const COLOR_RANGE:   f32 = 0.25;
const COLOR_JITTER:  f32 = 0.075;

/// Rendered point size of burst particles (additively blended).
pub const BURST_POINT_SIZE: f32 = 0.030;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireworkConfig {
    /// Minimum time between two realized spawns.
    pub cooldown_ms: f64,
    /// Particles per burst.
    pub particles:   usize,
    pub lifetime_ms: f64,
}

impl Default for FireworkConfig {
    fn default() -> Self {
        FireworkConfig { cooldown_ms: 700.0, particles: 2400, lifetime_ms: 1400.0 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Burst
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct Burst {
    positions:   Vec<Vec3>,
    velocities:  Vec<Vec3>,
    colors:      Vec<Vec3>,
    born_ms:     f64,
    lifetime_ms: f64,
    opacity:     f32,
}

impl Burst {
    /// Refill this burst's buffers with a fresh explosion at `origin`.
    fn ignite<R: Rng + ?Sized>(
        &mut self,
        origin: Vec3,
        now_ms: f64,
        cfg: &FireworkConfig,
        rng: &mut R,
    ) {
        let n = cfg.particles;
        self.positions.clear();
        self.velocities.clear();
        self.colors.clear();
        self.positions.reserve(n);
        self.velocities.reserve(n);
        self.colors.reserve(n);

        let base = Vec3::new(
            COLOR_BASE + rng.gen::<f32>() * COLOR_RANGE,
            COLOR_BASE + rng.gen::<f32>() * COLOR_RANGE,
            COLOR_BASE + rng.gen::<f32>() * COLOR_RANGE,
        );

        for _ in 0..n {
            self.positions.push(origin + Vec3::new(
                rng.gen_range(-ORIGIN_JITTER..ORIGIN_JITTER),
                rng.gen_range(-ORIGIN_JITTER..ORIGIN_JITTER),
                rng.gen_range(-ORIGIN_JITTER..ORIGIN_JITTER),
            ));

            let theta = TAU * rng.gen::<f32>();
            let phi   = (2.0 * rng.gen::<f32>() - 1.0).acos();
            let dir   = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            let speed = SPEED_MIN + rng.gen::<f32>() * SPEED_RANGE;
            self.velocities.push(dir * speed);

            let tint = Vec3::new(
                rng.gen_range(-COLOR_JITTER..COLOR_JITTER),
                rng.gen_range(-COLOR_JITTER..COLOR_JITTER),
                rng.gen_range(-COLOR_JITTER..COLOR_JITTER),
            );
            self.colors.push((base + tint).clamp(Vec3::ZERO, Vec3::ONE));
        }

        self.born_ms     = now_ms;
        self.lifetime_ms = cfg.lifetime_ms;
        self.opacity     = 1.0;
    }

    /// One physics step: fade, gravity, integrate, drag.
    fn step(&mut self, dt: f32, now_ms: f64) {
        self.opacity = self.opacity_at(now_ms);
        for (p, v) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            v.y += GRAVITY * dt;
            *p += *v * dt;
            *v *= DRAG;
        }
    }

    pub fn age_ms(&self, now_ms: f64) -> f64 { now_ms - self.born_ms }

    /// `1 − age/lifetime`, held to `[0, 1]`.
    pub fn opacity_at(&self, now_ms: f64) -> f32 {
        if self.lifetime_ms <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age_ms(now_ms) / self.lifetime_ms).clamp(0.0, 1.0) as f32
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        self.age_ms(now_ms) >= self.lifetime_ms
    }

    pub fn positions(&self)   -> &[Vec3] { &self.positions }
    pub fn velocities(&self)  -> &[Vec3] { &self.velocities }
    pub fn colors(&self)      -> &[Vec3] { &self.colors }
    pub fn opacity(&self)     -> f32     { self.opacity }
    pub fn point_size(&self)  -> f32     { BURST_POINT_SIZE }
}

// ════════════════════════════════════════════════════════════════════════════
// Pool
// ════════════════════════════════════════════════════════════════════════════

/// Generation-checked reference to a burst slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BurstHandle {
    index:      u32,
    generation: u32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    live:       bool,
    burst:      Burst,
}

pub struct FireworkSystem<R> {
    cfg:           FireworkConfig,
    slots:         Vec<Slot>,
    last_spawn_ms: Option<f64>,
    rng:           R,
}

impl<R: Rng> FireworkSystem<R> {
    pub fn new(cfg: FireworkConfig, rng: R) -> Self {
        FireworkSystem { cfg, slots: Vec::new(), last_spawn_ms: None, rng }
    }

    /// Start a burst at `origin` unless the cooldown is still running.
    ///
    /// A request exactly one cooldown after the previous spawn succeeds.
    /// Rejected requests are dropped, not queued.
    pub fn request_spawn(&mut self, origin: Vec3, now_ms: f64) -> Option<BurstHandle> {
        if let Some(last) = self.last_spawn_ms {
            if now_ms - last < self.cfg.cooldown_ms {
                return None;
            }
        }
        self.last_spawn_ms = Some(now_ms);

        let index = match self.slots.iter().position(|s| !s.live) {
            Some(i) => i,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.live = true;
        slot.burst.ignite(origin, now_ms, &self.cfg, &mut self.rng);

        debug!(
            "firework at ({:.2}, {:.2}, {:.2}) in slot {} gen {}",
            origin.x, origin.y, origin.z, index, slot.generation
        );
        Some(BurstHandle { index: index as u32, generation: slot.generation })
    }

    /// Advance every live burst by `dt` seconds and release expired ones.
    pub fn update(&mut self, dt: f32, now_ms: f64) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if !slot.live {
                continue;
            }
            slot.burst.step(dt, now_ms);
            if slot.burst.is_expired(now_ms) {
                slot.live = false;
                slot.generation = slot.generation.wrapping_add(1);
                debug!("firework slot {} released", i);
            }
        }
    }

    /// The burst behind `handle`, if it is still alive.
    pub fn get(&self, handle: BurstHandle) -> Option<&Burst> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.live && s.generation == handle.generation)
            .map(|s| &s.burst)
    }

    pub fn live(&self) -> impl Iterator<Item = &Burst> {
        self.slots.iter().filter(|s| s.live).map(|s| &s.burst)
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.live).count()
    }

    /// Allocated slots, live or free.
    pub fn capacity(&self) -> usize { self.slots.len() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn system() -> FireworkSystem<StdRng> {
        FireworkSystem::new(FireworkConfig::default(), StdRng::seed_from_u64(5))
    }

    #[test]
    fn cooldown_drops_early_requests() {
        let mut fw = system();
        assert!(fw.request_spawn(Vec3::ZERO, 1000.0).is_some());
        assert!(fw.request_spawn(Vec3::ZERO, 1100.0).is_none());
        assert!(fw.request_spawn(Vec3::ZERO, 1699.9).is_none());
        assert!(fw.request_spawn(Vec3::ZERO, 1700.0).is_some());
        assert!(fw.request_spawn(Vec3::ZERO, 2399.0).is_none());
        assert!(fw.request_spawn(Vec3::ZERO, 2400.0).is_some());
        assert_eq!(fw.live_count(), 3);
    }

    #[test]
    fn first_request_is_never_throttled() {
        let mut fw = system();
        assert!(fw.request_spawn(Vec3::ONE, 0.0).is_some());
    }

    #[test]
    fn burst_shape() {
        let mut fw = system();
        let origin = Vec3::new(1.0, -2.0, 0.5);
        let h = fw.request_spawn(origin, 0.0).unwrap();
        let b = fw.get(h).unwrap();

        assert_eq!(b.positions().len(), 2400);
        assert_eq!(b.velocities().len(), 2400);
        assert_eq!(b.colors().len(), 2400);
        assert_eq!(b.opacity(), 1.0);
        assert_eq!(b.point_size(), BURST_POINT_SIZE);

        for p in b.positions() {
            assert!((*p - origin).abs().max_element() <= ORIGIN_JITTER);
        }
        for v in b.velocities() {
            let s = v.length();
            assert!(s >= SPEED_MIN - 1e-3 && s <= SPEED_MIN + SPEED_RANGE + 1e-3, "speed {s}");
        }
        for c in b.colors() {
            assert!(c.min_element() >= COLOR_BASE - COLOR_JITTER - 1e-6);
            assert!(c.max_element() <= 1.0);
        }
    }

    #[test]
    fn opacity_fades_to_zero() {
        let mut fw = system();
        let h = fw.request_spawn(Vec3::ZERO, 0.0).unwrap();
        let b = fw.get(h).unwrap();
        assert_eq!(b.opacity_at(0.0), 1.0);
        assert!((b.opacity_at(700.0) - 0.5).abs() < 1e-6);
        assert_eq!(b.opacity_at(1400.0), 0.0);
        assert_eq!(b.opacity_at(5000.0), 0.0);
    }

    #[test]
    fn gravity_and_drag() {
        let mut fw = system();
        let h = fw.request_spawn(Vec3::ZERO, 0.0).unwrap();
        let before: Vec<Vec3> = fw.get(h).unwrap().velocities().to_vec();
        let p0: Vec<Vec3> = fw.get(h).unwrap().positions().to_vec();

        let dt = 0.016;
        fw.update(dt, 16.0);
        let b = fw.get(h).unwrap();
        for i in 0..before.len() {
            let mut v = before[i];
            v.y += GRAVITY * dt;
            let p = p0[i] + v * dt;
            assert!(b.positions()[i].abs_diff_eq(p, 1e-5));
            assert!(b.velocities()[i].abs_diff_eq(v * DRAG, 1e-5));
        }
    }

    #[test]
    fn expired_bursts_are_released_and_recycled() {
        let mut fw = system();
        let first = fw.request_spawn(Vec3::ZERO, 0.0).unwrap();

        fw.update(0.016, 1399.0);
        assert!(fw.get(first).is_some());

        fw.update(0.016, 1400.0);
        assert!(fw.get(first).is_none());
        assert_eq!(fw.live_count(), 0);

        let second = fw.request_spawn(Vec3::ONE, 1500.0).unwrap();
        assert_eq!(fw.capacity(), 1, "slot reused");
        assert_ne!(first, second);
        assert!(fw.get(first).is_none(), "stale handle must not resolve");
        assert!(fw.get(second).is_some());
    }

    #[test]
    fn overlapping_bursts_live_independently() {
        let mut fw = system();
        let a = fw.request_spawn(Vec3::ZERO, 0.0).unwrap();
        let b = fw.request_spawn(Vec3::ONE, 700.0).unwrap();
        assert_eq!(fw.capacity(), 2);

        fw.update(0.016, 1400.0);
        assert!(fw.get(a).is_none());
        assert!(fw.get(b).is_some());
        fw.update(0.016, 2100.0);
        assert_eq!(fw.live_count(), 0);
    }
}
