//! # hand_gesture
//!
//! Turns raw 21-point hand landmark sets into the signals that drive the
//! particle swarm.
//!
//! * [`landmarks`]: the fixed anatomical indexing and the [`LandmarkSet`]
//!   invariant (exactly 21 points, or no hand at all).
//! * [`classifier`] (stateless): one landmark set → [`HandSignals`] (hand
//!   size, pinch, spread, pointer) and one discrete [`Gesture`].
//! * [`track`] (stateful): [`HandTrackState`] picks the primary hand,
//!   absorbs detector flicker with a grace window, and latches per-hand
//!   gestures into the heart/text toggle targets.
//! * [`synth`]: synthetic landmark sets for each recognised pose, used by
//!   the keyboard simulator and by tests.
//!
//! ## Gesture → effect mapping
//!
//! | Gesture | Hand | Effect |
//! |---|---|---|
//! | Open hand, pinch, spread | primary (right, else left) | swarm follows and scales |
//! | Fist | Left | heart morph |
//! | One / two / three fingers | Right | text morph (more fingers, more words) |
//! | Fist | Right | firework burst |

pub mod classifier;
pub mod landmarks;
pub mod synth;
pub mod track;

pub use classifier::{classify, Gesture, HandReading, HandSignals};
pub use landmarks::{to_scene, Handedness, LandmarkError, LandmarkSet, LANDMARK_COUNT};
pub use track::{FireworkTrigger, HandSnapshot, HandTrackState};
