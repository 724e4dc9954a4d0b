//! The particle swarm.
//!
//! [`SwarmController`] owns one position per particle and, every render
//! tick, pulls each one toward a target built from up to three influences:
//!
//! 1. the **pose target**: particle `i` is bound to landmark `i mod 21` of
//!    the primary hand, scaled around the swarm center;
//! 2. the **heart** cloud, weighted by `heart_morph`;
//! 3. the active **text** cloud, weighted by `text_morph`.
//!
//! With no hand the swarm relaxes into its idle cloud and slowly turns.

use glam::{Vec2, Vec3};
use hand_gesture::{to_scene, HandSignals, HandTrackState, LandmarkSet, LANDMARK_COUNT};
use log::debug;
use swarm_targets::TargetSet;

use crate::smoothing::{
    clamp01, Approach, CENTER_RATE, IDLE_DECAY_RATE, IDLE_PARAM_RATE, MORPH_EPSILON,
    MORPH_RATE, SCALE_RATE, TRACK_RATE,
};

/// Scale and spread the swarm rests at with no hand.
pub const IDLE_SCALE: f32 = 1.25;

// Pinch below 0.35 grows the swarm, saturating at 0.10.
const PINCH_OPEN:  f32 = 0.35;
const PINCH_RANGE: f32 = 0.25;
// Spread above 0.35 widens the swarm, saturating at 0.70.
const SPREAD_REST:  f32 = 0.35;
const SPREAD_RANGE: f32 = 0.35;
const GAIN:         f32 = 2.5;

/// Rendered point size per unit of scale.
pub const POINT_SIZE: f32 = 0.010;

/// Idle rotation per tick, (about X, about Y).
pub const IDLE_SPIN: Vec2 = Vec2::new(0.00015, 0.0006);

/// Blend the pose target toward the heart, then the result toward the text.
///
/// The order matters: with both weights nonzero the text reads the
/// heart-blended value.
pub fn blend_target(
    pose: Vec3,
    center: Vec3,
    heart: Option<(Vec3, f32)>,
    text: Option<(Vec3, f32)>,
) -> Vec3 {
    let mut target = pose;
    if let Some((h, w)) = heart.filter(|&(_, w)| w > MORPH_EPSILON) {
        target = target.lerp(center + h, w);
    }
    if let Some((t, w)) = text.filter(|&(_, w)| w > MORPH_EPSILON) {
        target = target.lerp(center + t, w);
    }
    target
}

pub struct SwarmController {
    targets:     TargetSet,
    positions:   Vec<Vec3>,
    scale:       f32,
    spread:      f32,
    center:      Vec3,
    heart_morph: f32,
    text_morph:  f32,
    rotation:    Vec2,
    active_text: Option<usize>,
}

impl SwarmController {
    /// Start at rest: every particle on its idle home.
    pub fn new(targets: TargetSet) -> Self {
        let positions = targets.idle.points().to_vec();
        SwarmController {
            targets,
            positions,
            scale:       IDLE_SCALE,
            spread:      IDLE_SCALE,
            center:      Vec3::ZERO,
            heart_morph: 0.0,
            text_morph:  0.0,
            rotation:    Vec2::ZERO,
            active_text: None,
        }
    }

    /// Advance one render tick.
    pub fn tick(&mut self, track: &HandTrackState) {
        match track.primary() {
            Some(hand) => self.follow(hand, track),
            None       => self.settle(),
        }
    }

    fn follow(&mut self, hand: &LandmarkSet, track: &HandTrackState) {
        let s = HandSignals::from_set(hand);

        let pinch01 = clamp01((PINCH_OPEN - s.pinch) / PINCH_RANGE);
        self.scale.approach(1.0 + GAIN * pinch01, SCALE_RATE);
        let spread01 = clamp01((s.spread - SPREAD_REST) / SPREAD_RANGE);
        self.spread.approach(1.0 + GAIN * spread01, SCALE_RATE);
        self.center.approach(to_scene(s.pointer), CENTER_RATE);

        // A missing hand drops its morph at once; a present one eases.
        if !track.left_visible() {
            self.heart_morph = 0.0;
        }
        self.heart_morph.approach(track.heart_target(), MORPH_RATE);
        if !track.right_visible() {
            self.text_morph = 0.0;
        }
        self.text_morph.approach(track.text_target(), MORPH_RATE);

        let picked = match self.targets.texts.len() {
            0 => None,
            n => Some(track.text_index().min(n - 1)),
        };
        if picked != self.active_text && self.text_morph > MORPH_EPSILON {
            debug!("text cloud {:?} → {:?}", self.active_text, picked);
        }
        self.active_text = picked;

        let center = self.center;
        let gain   = self.spread * self.scale;
        let heart_w = self.heart_morph;
        let text_w  = self.text_morph;
        let heart = self.targets.heart.points();
        let text  = picked
            .and_then(|k| self.targets.texts.get(k))
            .map(|c| c.points())
            .unwrap_or(&[]);

        for (i, p) in self.positions.iter_mut().enumerate() {
            let joint = to_scene(hand.point(i % LANDMARK_COUNT));
            let pose  = center + joint * gain;
            let target = blend_target(
                pose,
                center,
                heart.get(i).map(|&h| (h, heart_w)),
                text.get(i).map(|&t| (t, text_w)),
            );
            p.approach(target, TRACK_RATE);
        }
    }

    fn settle(&mut self) {
        self.heart_morph = 0.0;
        self.text_morph  = 0.0;
        self.active_text = None;

        self.scale.approach(IDLE_SCALE, IDLE_PARAM_RATE);
        self.spread.approach(IDLE_SCALE, IDLE_PARAM_RATE);
        self.center.approach(Vec3::ZERO, IDLE_PARAM_RATE);

        for (p, home) in self.positions.iter_mut().zip(self.targets.idle.iter()) {
            p.approach(*home, IDLE_DECAY_RATE);
        }

        self.rotation += IDLE_SPIN;
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn positions(&self)   -> &[Vec3] { &self.positions }
    pub fn len(&self)         -> usize   { self.positions.len() }
    pub fn is_empty(&self)    -> bool    { self.positions.is_empty() }
    pub fn scale(&self)       -> f32     { self.scale }
    pub fn spread(&self)      -> f32     { self.spread }
    pub fn center(&self)      -> Vec3    { self.center }
    pub fn heart_morph(&self) -> f32     { self.heart_morph }
    pub fn text_morph(&self)  -> f32     { self.text_morph }
    pub fn targets(&self)     -> &TargetSet { &self.targets }

    /// Accumulated idle rotation, radians about (X, Y).
    pub fn rotation(&self) -> Vec2 { self.rotation }

    /// Text cloud currently blended in, if any.
    pub fn active_text(&self) -> Option<usize> { self.active_text }

    pub fn point_size(&self) -> f32 { POINT_SIZE * self.scale }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::synth::{synthesize, HandPose};
    use hand_gesture::{Handedness, HandSnapshot};
    use swarm_targets::TargetCloud;

    const N: usize = 84;

    fn cloud(offset: f32) -> TargetCloud {
        let pts = (0..N)
            .map(|i| Vec3::new(i as f32 * 0.1 + offset, offset, -offset))
            .collect();
        TargetCloud::new(pts, N)
    }

    fn targets() -> TargetSet {
        TargetSet {
            idle:  cloud(3.0),
            heart: cloud(-1.0),
            texts: vec![cloud(0.5), cloud(1.5), cloud(2.5)],
        }
    }

    fn tracked(left: Option<HandPose>, right: Option<HandPose>) -> HandTrackState {
        let at = Vec2::new(0.45, 0.55);
        let mut t = HandTrackState::default();
        t.ingest(&HandSnapshot {
            timestamp_ms: 0.0,
            left:  left.map(|p| synthesize(p, at, 0.12, Handedness::Left)),
            right: right.map(|p| synthesize(p, at, 0.12, Handedness::Right)),
        });
        t
    }

    #[test]
    fn starts_on_idle_cloud() {
        let s = SwarmController::new(targets());
        assert_eq!(s.positions(), targets().idle.points());
        assert_eq!(s.scale(), IDLE_SCALE);
        assert_eq!(s.point_size(), POINT_SIZE * IDLE_SCALE);
    }

    #[test]
    fn blend_order_is_heart_then_text() {
        let c = Vec3::new(1.0, 0.0, 0.0);
        let pose = Vec3::ZERO;
        let h = Vec3::new(0.0, 4.0, 0.0);
        let t = Vec3::new(0.0, 0.0, 8.0);

        let got = blend_target(pose, c, Some((h, 0.5)), Some((t, 0.5)));
        let want = pose * 0.25 + (c + h) * 0.25 + (c + t) * 0.5;
        assert!(got.abs_diff_eq(want, 1e-5), "{got} vs {want}");

        // Full text weight hides the heart completely.
        let full = blend_target(pose, c, Some((h, 1.0)), Some((t, 1.0)));
        assert!(full.abs_diff_eq(c + t, 1e-6));
    }

    #[test]
    fn tiny_morphs_are_ignored() {
        let pose = Vec3::new(1.0, 2.0, 3.0);
        let got = blend_target(pose, Vec3::ZERO, Some((Vec3::ONE, 0.001)), None);
        assert_eq!(got, pose);
    }

    #[test]
    fn left_fist_drives_heart_morph() {
        let mut s = SwarmController::new(targets());
        let track = tracked(Some(HandPose::Fist), Some(HandPose::Open));

        s.tick(&track);
        assert!((s.heart_morph() - 0.12).abs() < 1e-6);
        s.tick(&track);
        assert!((s.heart_morph() - 0.2256).abs() < 1e-6);
        let mut prev = s.heart_morph();
        for _ in 0..30 {
            s.tick(&track);
            assert!(s.heart_morph() > prev && s.heart_morph() <= 1.0);
            prev = s.heart_morph();
        }

        // Left hand gone: straight back to zero.
        s.tick(&tracked(None, Some(HandPose::Open)));
        assert_eq!(s.heart_morph(), 0.0);
    }

    #[test]
    fn finger_count_picks_text_cloud() {
        let mut s = SwarmController::new(targets());
        s.tick(&tracked(None, Some(HandPose::TwoFinger)));
        assert_eq!(s.active_text(), Some(1));
        assert!((s.text_morph() - 0.12).abs() < 1e-6);
        s.tick(&tracked(None, Some(HandPose::ThreeFinger)));
        assert_eq!(s.active_text(), Some(2));
        s.tick(&tracked(Some(HandPose::Open), None));
        assert_eq!(s.text_morph(), 0.0);
        assert_eq!(s.active_text(), Some(0));
    }

    #[test]
    fn particles_settle_on_the_hand() {
        let mut s = SwarmController::new(targets());
        let track = tracked(None, Some(HandPose::Open));
        for _ in 0..400 {
            s.tick(&track);
        }
        let hand = track.primary().copied().unwrap();
        let gain = s.spread() * s.scale();
        for (i, p) in s.positions().iter().enumerate() {
            let want = s.center() + to_scene(hand.point(i % LANDMARK_COUNT)) * gain;
            assert!(p.abs_diff_eq(want, 1e-3), "particle {i}: {p} vs {want}");
        }
        assert!((s.point_size() - POINT_SIZE * s.scale()).abs() < 1e-7);
    }

    fn near(a: f32, b: f32) -> bool { (a - b).abs() < 1e-5 }

    #[test]
    fn one_follow_step_uses_exact_rates() {
        let mut s = SwarmController::new(targets());
        let track = tracked(None, Some(HandPose::Pinch));
        let hand = track.primary().copied().unwrap();
        let sig = HandSignals::from_set(&hand);

        let scale_goal  = 1.0 + 2.5 * clamp01((0.35 - sig.pinch) / 0.25);
        let spread_goal = 1.0 + 2.5 * clamp01((sig.spread - 0.35) / 0.35);
        let center_goal = to_scene(sig.pointer);
        let start = s.positions()[5];

        s.tick(&track);
        assert_eq!(s.heart_morph(), 0.0);
        assert!(s.text_morph() <= MORPH_EPSILON);

        let scale  = 0.85 * IDLE_SCALE + 0.15 * scale_goal;
        let spread = 0.85 * IDLE_SCALE + 0.15 * spread_goal;
        let center = center_goal * 0.2;
        assert!(near(s.scale(), scale), "scale {} vs {scale}", s.scale());
        assert!(near(s.spread(), spread), "spread {} vs {spread}", s.spread());
        assert!(s.center().abs_diff_eq(center, 1e-5), "center {} vs {center}", s.center());

        let goal = center + to_scene(hand.point(5)) * (spread * scale);
        let want = start * 0.85 + goal * 0.15;
        let got  = s.positions()[5];
        assert!(got.abs_diff_eq(want, 1e-4), "particle 5: {got} vs {want}");
    }

    #[test]
    fn one_idle_step_uses_exact_rates() {
        let mut s = SwarmController::new(targets());
        s.tick(&tracked(None, Some(HandPose::Pinch)));
        let (scale, spread, center) = (s.scale(), s.spread(), s.center());
        let start = s.positions()[7];
        let home  = targets().idle.points()[7];

        s.tick(&HandTrackState::default());
        assert!(near(s.scale(), 0.92 * scale + 0.08 * IDLE_SCALE));
        assert!(near(s.spread(), 0.92 * spread + 0.08 * IDLE_SCALE));
        assert!(s.center().abs_diff_eq(center * 0.92, 1e-6));
        assert!(s.positions()[7].abs_diff_eq(start * 0.98 + home * 0.02, 1e-5));
    }

    #[test]
    fn pinch_grows_the_swarm() {
        let mut open  = SwarmController::new(targets());
        let mut pinch = SwarmController::new(targets());
        let t_open  = tracked(None, Some(HandPose::Open));
        let t_pinch = tracked(None, Some(HandPose::Pinch));
        for _ in 0..100 {
            open.tick(&t_open);
            pinch.tick(&t_pinch);
        }
        assert!((pinch.scale() - 3.5).abs() < 1e-3, "pinch scale {}", pinch.scale());
        assert!((open.scale() - 1.0).abs() < 1e-3, "open scale {}", open.scale());
    }

    #[test]
    fn idle_returns_monotonically_to_rest() {
        let mut s = SwarmController::new(targets());
        let hand = tracked(None, Some(HandPose::Pinch));
        for _ in 0..60 {
            s.tick(&hand);
        }
        assert!(s.scale() > 2.0);

        let idle = HandTrackState::default();
        let home = targets().idle;
        let err = |s: &SwarmController| -> f32 {
            s.positions().iter().zip(home.iter()).map(|(p, h)| p.distance(*h)).sum()
        };

        let mut prev = (s.scale(), s.spread(), s.center().length(), err(&s));
        for _ in 0..600 {
            s.tick(&idle);
            let now = (s.scale(), s.spread(), s.center().length(), err(&s));
            assert!((now.0 - IDLE_SCALE).abs() <= (prev.0 - IDLE_SCALE).abs());
            assert!((now.1 - IDLE_SCALE).abs() <= (prev.1 - IDLE_SCALE).abs());
            assert!(now.2 <= prev.2);
            assert!(now.3 <= prev.3);
            prev = now;
        }
        assert!((s.scale() - IDLE_SCALE).abs() < 1e-4);
        assert!(s.center().length() < 1e-4);
        assert!(prev.3 / (N as f32) < 0.01);
        assert_eq!(s.heart_morph(), 0.0);
        assert!(s.rotation().y > 0.0);
        assert!((s.rotation() - IDLE_SPIN * 600.0).length() < 1e-4);
    }
}
