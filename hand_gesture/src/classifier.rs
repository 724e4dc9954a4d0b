//! Stateless classification of a single hand.
//!
//! Every distance is divided by the hand size (wrist → middle fingertip), so
//! all outputs are invariant under uniform scaling of the landmarks: a hand
//! close to the camera and the same hand far away classify identically.

use glam::Vec3;

use crate::landmarks::{
    LandmarkSet, FINGERS, INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP,
    PINKY_TIP, RING_MCP, RING_TIP, THUMB_TIP, WRIST,
};

/// Floor for the hand size so ratios never divide by zero.
pub const MIN_HAND_SIZE: f32 = 1e-6;

/// A finger counts as extended when its tip is this much farther from the
/// wrist than its MCP joint, in hand-size units.
pub const EXTENDED_MARGIN: f32 = 0.28;

const FIST_TIP_RADIUS:   f32   = 0.45;
const FIST_THUMB_RADIUS: f32   = 0.55;
const FIST_MIN_TIPS:     usize = 3;

// ════════════════════════════════════════════════════════════════════════════
// Continuous signals
// ════════════════════════════════════════════════════════════════════════════

/// Continuous control signals for one hand, recomputed every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSignals {
    /// Wrist → middle fingertip distance, floored at [`MIN_HAND_SIZE`].
    pub hand_size: f32,
    /// Thumb tip ↔ index tip, normalized.  Smaller = more pinched.
    pub pinch: f32,
    /// Mean of index↔pinky and thumb↔pinky tip distances, normalized.
    /// Larger = more open.
    pub spread: f32,
    /// Index fingertip, in image space.
    pub pointer: Vec3,
}

impl HandSignals {
    pub fn from_set(set: &LandmarkSet) -> Self {
        let size = hand_size(set);
        HandSignals {
            hand_size: size,
            pinch:  set.dist(THUMB_TIP, INDEX_TIP) / size,
            spread: (set.dist(INDEX_TIP, PINKY_TIP) + set.dist(THUMB_TIP, PINKY_TIP))
                / (2.0 * size),
            pointer: set.point(INDEX_TIP),
        }
    }

    /// `None` unless `points` holds exactly one full landmark set.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        LandmarkSet::from_slice(points).ok().map(|s| Self::from_set(&s))
    }
}

#[inline]
pub fn hand_size(set: &LandmarkSet) -> f32 {
    set.dist(WRIST, MIDDLE_TIP).max(MIN_HAND_SIZE)
}

/// How much farther the tip reaches from the wrist than the MCP joint, in
/// hand-size units.
pub fn extension(set: &LandmarkSet, tip: usize, mcp: usize) -> f32 {
    let size = hand_size(set);
    set.dist(WRIST, tip) / size - set.dist(WRIST, mcp) / size
}

#[inline]
pub fn is_extended(set: &LandmarkSet, tip: usize, mcp: usize) -> bool {
    extension(set, tip, mcp) > EXTENDED_MARGIN
}

/// Mean of the four long-finger MCP joints.
pub fn palm_center(set: &LandmarkSet) -> Vec3 {
    let sum: Vec3 = FINGERS.iter().map(|&(_, mcp)| set.point(mcp)).sum();
    sum / FINGERS.len() as f32
}

/// At least three fingertips curled onto the palm, thumb tucked in.
pub fn is_fist(set: &LandmarkSet) -> bool {
    let size = hand_size(set);
    let palm = palm_center(set);

    let close = FINGERS
        .iter()
        .filter(|&&(tip, _)| set.point(tip).distance(palm) / size < FIST_TIP_RADIUS)
        .count();
    let thumb_tucked = set.point(THUMB_TIP).distance(palm) / size < FIST_THUMB_RADIUS;

    close >= FIST_MIN_TIPS && thumb_tucked
}

// ════════════════════════════════════════════════════════════════════════════
// Discrete gesture
// ════════════════════════════════════════════════════════════════════════════

/// The discrete pose of one hand.
///
/// Exactly one value holds for any input; when several raw tests pass the
/// first in declaration order wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    Fist,
    ThreeFinger,
    TwoFinger,
    OneFinger,
    #[default]
    None,
}

impl Gesture {
    pub fn detect(set: &LandmarkSet) -> Gesture {
        if is_fist(set) {
            return Gesture::Fist;
        }

        let index  = is_extended(set, INDEX_TIP,  INDEX_MCP);
        let middle = is_extended(set, MIDDLE_TIP, MIDDLE_MCP);
        let ring   = is_extended(set, RING_TIP,   RING_MCP);
        let pinky  = is_extended(set, PINKY_TIP,  PINKY_MCP);

        match (index, middle, ring, pinky) {
            (true, true,  true,  false) => Gesture::ThreeFinger,
            (true, true,  false, false) => Gesture::TwoFinger,
            (true, false, false, false) => Gesture::OneFinger,
            _                           => Gesture::None,
        }
    }

    /// `Gesture::None` unless `points` holds exactly one full landmark set.
    pub fn from_points(points: &[Vec3]) -> Gesture {
        LandmarkSet::from_slice(points)
            .map(|s| Gesture::detect(&s))
            .unwrap_or_default()
    }

    pub fn is_fist(self)         -> bool { self == Gesture::Fist }
    pub fn is_one_finger(self)   -> bool { self == Gesture::OneFinger }
    pub fn is_two_finger(self)   -> bool { self == Gesture::TwoFinger }
    pub fn is_three_finger(self) -> bool { self == Gesture::ThreeFinger }

    /// Raised fingers for the counting gestures, `0` otherwise.
    pub fn finger_count(self) -> usize {
        match self {
            Gesture::OneFinger   => 1,
            Gesture::TwoFinger   => 2,
            Gesture::ThreeFinger => 3,
            Gesture::Fist | Gesture::None => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gesture::Fist        => "fist",
            Gesture::ThreeFinger => "three",
            Gesture::TwoFinger   => "two",
            Gesture::OneFinger   => "one",
            Gesture::None        => "none",
        }
    }
}

/// Signals and gesture for one hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandReading {
    pub signals: HandSignals,
    pub gesture: Gesture,
}

impl HandReading {
    pub fn from_set(set: &LandmarkSet) -> Self {
        HandReading {
            signals: HandSignals::from_set(set),
            gesture: Gesture::detect(set),
        }
    }
}

/// Classify raw landmarks; malformed input (≠ 21 points) is "no hand".
pub fn classify(points: &[Vec3]) -> Option<HandReading> {
    LandmarkSet::from_slice(points).ok().map(|s| HandReading::from_set(&s))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Handedness;
    use crate::synth::{synthesize, HandPose};
    use glam::Vec2;

    fn pose(p: HandPose) -> LandmarkSet {
        synthesize(p, Vec2::new(0.5, 0.5), 0.12, Handedness::Right)
    }

    const ALL_POSES: [HandPose; 6] = [
        HandPose::Open,
        HandPose::Pinch,
        HandPose::Fist,
        HandPose::OneFinger,
        HandPose::TwoFinger,
        HandPose::ThreeFinger,
    ];

    #[test]
    fn malformed_input_is_no_hand() {
        for n in [0, 1, 20, 22, 63] {
            let pts = vec![Vec3::splat(0.3); n];
            assert!(classify(&pts).is_none(), "{n} points");
            assert!(HandSignals::from_points(&pts).is_none());
            assert_eq!(Gesture::from_points(&pts), Gesture::None);
        }
    }

    #[test]
    fn synthetic_poses_classify() {
        assert_eq!(Gesture::detect(&pose(HandPose::Open)),        Gesture::None);
        assert_eq!(Gesture::detect(&pose(HandPose::Pinch)),       Gesture::None);
        assert_eq!(Gesture::detect(&pose(HandPose::Fist)),        Gesture::Fist);
        assert_eq!(Gesture::detect(&pose(HandPose::OneFinger)),   Gesture::OneFinger);
        assert_eq!(Gesture::detect(&pose(HandPose::TwoFinger)),   Gesture::TwoFinger);
        assert_eq!(Gesture::detect(&pose(HandPose::ThreeFinger)), Gesture::ThreeFinger);
    }

    #[test]
    fn flags_are_mutually_exclusive() {
        // Fist geometry with the index finger forced straight would pass
        // both the fist and one-finger raw tests.
        let mut pts = *pose(HandPose::Fist).points();
        let straight = pose(HandPose::OneFinger);
        for i in [INDEX_MCP, INDEX_MCP + 1, INDEX_MCP + 2, INDEX_TIP] {
            pts[i] = straight.point(i);
        }
        let mixed = LandmarkSet::new(pts);

        for set in ALL_POSES.iter().map(|&p| pose(p)).chain(std::iter::once(mixed)) {
            let g = Gesture::detect(&set);
            let flags = [g.is_fist(), g.is_one_finger(), g.is_two_finger(), g.is_three_finger()];
            assert!(flags.iter().filter(|&&f| f).count() <= 1, "{g:?}");
        }
    }

    #[test]
    fn pinch_is_small_when_pinching() {
        let open  = HandSignals::from_set(&pose(HandPose::Open));
        let pinch = HandSignals::from_set(&pose(HandPose::Pinch));
        assert!(pinch.pinch < 0.1, "pinch {}", pinch.pinch);
        assert!(open.pinch > 0.35, "open {}", open.pinch);
        assert!(open.spread > pinch.spread);
    }

    #[test]
    fn ratios_are_scale_invariant() {
        for p in ALL_POSES {
            let a = pose(p);
            for k in [0.01f32, 0.5, 3.0, 250.0] {
                let b = a.map(|v| v * k);
                let sa = HandSignals::from_set(&a);
                let sb = HandSignals::from_set(&b);
                assert!((sa.pinch  - sb.pinch).abs()  < 1e-4, "{p:?} ×{k}");
                assert!((sa.spread - sb.spread).abs() < 1e-4, "{p:?} ×{k}");
                for (tip, mcp) in FINGERS {
                    let ea = extension(&a, tip, mcp);
                    let eb = extension(&b, tip, mcp);
                    assert!((ea - eb).abs() < 1e-4, "{p:?} ×{k} finger {tip}");
                }
                assert_eq!(Gesture::detect(&a), Gesture::detect(&b), "{p:?} ×{k}");
            }
        }
    }

    #[test]
    fn degenerate_hand_does_not_divide_by_zero() {
        let set = LandmarkSet::new([Vec3::ZERO; 21]);
        let s = HandSignals::from_set(&set);
        assert_eq!(s.hand_size, MIN_HAND_SIZE);
        assert!(s.pinch.is_finite() && s.spread.is_finite());
    }

    #[test]
    fn finger_counts() {
        assert_eq!(Gesture::OneFinger.finger_count(), 1);
        assert_eq!(Gesture::ThreeFinger.finger_count(), 3);
        assert_eq!(Gesture::Fist.finger_count(), 0);
    }
}
