//! Per-session hand tracking state.
//!
//! [`HandTrackState`] is advanced once per detection with a [`HandSnapshot`]
//! and once per render tick with [`HandTrackState::expire`].  It decides
//! which hand drives the swarm, rides out short detector dropouts, and turns
//! the per-hand discrete gestures into the heart/text toggle targets.

use glam::Vec3;
use log::{debug, warn};

use crate::classifier::{Gesture, HandSignals};
use crate::landmarks::{to_scene, Handedness, LandmarkSet, INDEX_TIP};

/// Default dropout grace window.
pub const DEFAULT_GRACE_MS: f64 = 500.0;

// ════════════════════════════════════════════════════════════════════════════
// Snapshot
// ════════════════════════════════════════════════════════════════════════════

/// The hands seen by one detection, stamped with the detector timestamp.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandSnapshot {
    pub timestamp_ms: f64,
    pub left:  Option<LandmarkSet>,
    pub right: Option<LandmarkSet>,
}

impl HandSnapshot {
    pub fn empty(timestamp_ms: f64) -> Self {
        HandSnapshot { timestamp_ms, left: None, right: None }
    }

    /// Build a snapshot from labelled raw hands.
    ///
    /// Sets that are not exactly 21 points are skipped.  If the detector
    /// reports the same label twice the later hand wins.
    pub fn from_hands<'a, I>(timestamp_ms: f64, hands: I) -> Self
    where
        I: IntoIterator<Item = (Handedness, &'a [Vec3])>,
    {
        let mut snap = HandSnapshot::empty(timestamp_ms);
        for (hand, points) in hands {
            match LandmarkSet::from_slice(points) {
                Ok(set) => match hand {
                    Handedness::Left  => snap.left  = Some(set),
                    Handedness::Right => snap.right = Some(set),
                },
                Err(e) => warn!("skipping {} hand: {}", hand.name(), e),
            }
        }
        snap
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Right hand if present, else left.
    pub fn primary(&self) -> Option<&LandmarkSet> {
        self.right.as_ref().or(self.left.as_ref())
    }
}

/// A firework spawn request at a scene-space origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireworkTrigger {
    pub origin: Vec3,
}

// ════════════════════════════════════════════════════════════════════════════
// Tracker
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct HandTrackState {
    grace_ms:      f64,
    last_seen_ms:  Option<f64>,
    primary:       Option<LandmarkSet>,
    left_visible:  bool,
    right_visible: bool,
    left_gesture:  Gesture,
    right_gesture: Gesture,
}

impl Default for HandTrackState {
    fn default() -> Self { Self::new(DEFAULT_GRACE_MS) }
}

impl HandTrackState {
    pub fn new(grace_ms: f64) -> Self {
        HandTrackState {
            grace_ms,
            last_seen_ms:  None,
            primary:       None,
            left_visible:  false,
            right_visible: false,
            left_gesture:  Gesture::None,
            right_gesture: Gesture::None,
        }
    }

    /// Absorb one detection.  Returns a spawn request while the right fist
    /// is held; the firework cooldown decides whether anything happens.
    pub fn ingest(&mut self, snap: &HandSnapshot) -> Option<FireworkTrigger> {
        let now = snap.timestamp_ms;

        self.left_visible  = snap.left.is_some();
        self.right_visible = snap.right.is_some();
        self.left_gesture  = snap.left.as_ref().map(Gesture::detect).unwrap_or_default();
        self.right_gesture = snap.right.as_ref().map(Gesture::detect).unwrap_or_default();

        match snap.primary() {
            Some(set) => {
                if self.primary.is_none() {
                    debug!("hand acquired at {:.0} ms", now);
                }
                self.primary = Some(*set);
                self.last_seen_ms = Some(now);
            }
            None => self.expire(now),
        }

        match (&snap.right, self.right_gesture) {
            (Some(right), Gesture::Fist) => Some(FireworkTrigger {
                origin: to_scene(right.point(INDEX_TIP)),
            }),
            _ => None,
        }
    }

    /// Drop a stale primary hand once the grace window has passed without a
    /// sighting.  Called every render tick so a silent or failing detector
    /// still idles out.
    pub fn expire(&mut self, now_ms: f64) {
        let Some(seen) = self.last_seen_ms else { return };
        if self.primary.is_some() && now_ms - seen > self.grace_ms {
            debug!("hand lost for {:.0} ms, going idle", now_ms - seen);
            self.primary       = None;
            self.left_visible  = false;
            self.right_visible = false;
            self.left_gesture  = Gesture::None;
            self.right_gesture = Gesture::None;
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The hand driving the swarm, possibly stale within the grace window.
    pub fn primary(&self) -> Option<&LandmarkSet> { self.primary.as_ref() }

    pub fn primary_signals(&self) -> Option<HandSignals> {
        self.primary.as_ref().map(HandSignals::from_set)
    }

    pub fn has_hand(&self) -> bool { self.primary.is_some() }

    pub fn left_visible(&self)  -> bool { self.left_visible }
    pub fn right_visible(&self) -> bool { self.right_visible }

    pub fn left_gesture(&self)  -> Gesture { self.left_gesture }
    pub fn right_gesture(&self) -> Gesture { self.right_gesture }

    pub fn left_fist(&self) -> bool {
        self.left_visible && self.left_gesture.is_fist()
    }

    /// 1 while the left fist is held, else 0.
    pub fn heart_target(&self) -> f32 {
        if self.left_fist() { 1.0 } else { 0.0 }
    }

    /// 1 while the right hand shows a counting gesture, else 0.
    pub fn text_target(&self) -> f32 {
        if self.right_visible && self.right_gesture.finger_count() > 0 { 1.0 } else { 0.0 }
    }

    /// Which text cloud is active: three fingers → 2, two → 1, otherwise 0.
    pub fn text_index(&self) -> usize {
        match self.right_gesture {
            Gesture::ThreeFinger => 2,
            Gesture::TwoFinger   => 1,
            _                    => 0,
        }
    }
}
