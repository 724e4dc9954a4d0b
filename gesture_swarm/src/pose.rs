//! Where hands come from: the simulator window or a LeapMotion controller.
//!
//! A [`FrameSource`] hands out owned frames; a [`PoseEstimator`] turns one
//! frame into a [`Detection`].  The detector thread only sees these two
//! traits, so it doesn't need to know whether the hands came from real
//! hardware or from the simulator window.

use std::sync::mpsc::{Receiver, TryRecvError};

use glam::{Vec2, Vec3};
use hand_gesture::synth::{synthesize, HandPose};
use hand_gesture::{Handedness, HandSnapshot};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Traits and results
// ════════════════════════════════════════════════════════════════════════════

/// Produces camera (or camera-like) frames.
pub trait FrameSource {
    type Frame;

    /// The next frame, or `None` when nothing new is ready.
    fn next_frame(&mut self) -> Option<Self::Frame>;

    /// `true` once the source can never produce another frame.
    fn is_closed(&self) -> bool { false }
}

/// Maps one frame to zero or more labelled hands.
///
/// `timestamp_ms` is strictly increasing across calls.
pub trait PoseEstimator {
    type Frame;

    fn detect(&mut self, frame: &Self::Frame, timestamp_ms: f64)
        -> Result<Detection, EstimatorError>;
}

#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("timestamp {got} ms is not after {last} ms")]
    NonMonotonic { last: f64, got: f64 },
    #[error("tracking device error: {0}")]
    Device(String),
}

/// One hand as reported by an estimator; `landmarks` is unchecked.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedHand {
    pub landmarks:  Vec<Vec3>,
    pub handedness: Handedness,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Detection {
    pub hands: Vec<DetectedHand>,
}

impl Detection {
    /// Validate and label the hands; malformed sets are dropped here.
    pub fn snapshot(&self, timestamp_ms: f64) -> HandSnapshot {
        HandSnapshot::from_hands(
            timestamp_ms,
            self.hands.iter().map(|h| (h.handedness, h.landmarks.as_slice())),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Simulation (keyboard and mouse, always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    Key(SimKey),
    /// Mouse position in image space (`x`, `y` in `[0, 1]`, `y` down).
    Pointer(Vec2),
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    OneFinger,   // 1
    TwoFinger,   // 2
    ThreeFinger, // 3
    Fist,        // F
    Pinch,       // P
    Open,        // O
    ToggleLeft,  // L
    LeftFist,    // K
    ToggleRight, // H
}

/// Image-space width of a simulated hand per canonical hand unit.
pub const SIM_HAND_SIZE: f32 = 0.12;
/// Where the left hand sits relative to the pointer.
const LEFT_OFFSET: Vec2 = Vec2::new(0.3, 0.05);

/// The simulated "camera image": where each hand is and what it does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimFrame {
    pub pointer: Vec2,
    pub right:   Option<HandPose>,
    pub left:    Option<HandPose>,
}

/// Frame source fed by the window's [`SimInput`] events.
pub struct SimCapture {
    rx:         Receiver<SimInput>,
    state:      SimFrame,
    right_pose: HandPose,
    left_pose:  HandPose,
    closed:     bool,
}

impl SimCapture {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimCapture {
            rx,
            state: SimFrame { pointer: Vec2::splat(0.5), right: None, left: None },
            right_pose: HandPose::Open,
            left_pose:  HandPose::Open,
            closed:     false,
        }
    }

    fn apply(&mut self, input: SimInput) {
        let key = match input {
            SimInput::Pointer(p) => {
                self.state.pointer = p.clamp(Vec2::ZERO, Vec2::ONE);
                return;
            }
            SimInput::Key(key) => key,
        };
        let pose = match key {
            SimKey::OneFinger   => HandPose::OneFinger,
            SimKey::TwoFinger   => HandPose::TwoFinger,
            SimKey::ThreeFinger => HandPose::ThreeFinger,
            SimKey::Fist        => HandPose::Fist,
            SimKey::Pinch       => HandPose::Pinch,
            SimKey::Open        => HandPose::Open,
            SimKey::ToggleRight => {
                self.state.right = match self.state.right {
                    Some(_) => None,
                    None    => Some(self.right_pose),
                };
                return;
            }
            SimKey::ToggleLeft => {
                self.state.left = match self.state.left {
                    Some(_) => None,
                    None    => Some(self.left_pose),
                };
                return;
            }
            SimKey::LeftFist => {
                self.left_pose = match self.left_pose {
                    HandPose::Fist => HandPose::Open,
                    _              => HandPose::Fist,
                };
                self.state.left = Some(self.left_pose);
                return;
            }
        };
        // Pose keys also bring the right hand into view.
        self.right_pose  = pose;
        self.state.right = Some(pose);
    }
}

impl FrameSource for SimCapture {
    type Frame = SimFrame;

    /// Drains pending input and returns the current simulated scene.  Once
    /// the window has gone away no further frames are produced.
    fn next_frame(&mut self) -> Option<SimFrame> {
        loop {
            match self.rx.try_recv() {
                Ok(input)                       => self.apply(input),
                Err(TryRecvError::Empty)        => return Some(self.state),
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    return None;
                }
            }
        }
    }

    fn is_closed(&self) -> bool { self.closed }
}

/// Synthesizes 21 landmarks per visible simulated hand.
#[derive(Debug, Default)]
pub struct SimPoseEstimator {
    last_ts: Option<f64>,
}

impl SimPoseEstimator {
    pub fn new() -> Self { Self::default() }
}

impl PoseEstimator for SimPoseEstimator {
    type Frame = SimFrame;

    fn detect(&mut self, frame: &SimFrame, timestamp_ms: f64) -> Result<Detection, EstimatorError> {
        if let Some(last) = self.last_ts {
            if timestamp_ms <= last {
                return Err(EstimatorError::NonMonotonic { last, got: timestamp_ms });
            }
        }
        self.last_ts = Some(timestamp_ms);

        let mut hands = Vec::with_capacity(2);
        if let Some(pose) = frame.left {
            let at = (frame.pointer + LEFT_OFFSET).clamp(Vec2::ZERO, Vec2::ONE);
            hands.push(DetectedHand {
                landmarks:  synthesize(pose, at, SIM_HAND_SIZE, Handedness::Left).points().to_vec(),
                handedness: Handedness::Left,
            });
        }
        if let Some(pose) = frame.right {
            hands.push(DetectedHand {
                landmarks:  synthesize(pose, frame.pointer, SIM_HAND_SIZE, Handedness::Right)
                    .points()
                    .to_vec(),
                handedness: Handedness::Right,
            });
        }
        Ok(Detection { hands })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapMotion hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Joint positions for one Leap hand in device millimetres, already laid out
/// in landmark order.
#[cfg(feature = "leap")]
#[derive(Clone, Debug)]
pub struct LeapHand {
    pub handedness: Handedness,
    pub joints:     [Vec3; hand_gesture::LANDMARK_COUNT],
}

#[cfg(feature = "leap")]
#[derive(Clone, Debug, Default)]
pub struct LeapFrame {
    pub hands: Vec<LeapHand>,
}

/// Frame source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
#[cfg(feature = "leap")]
pub struct LeapCapture {
    connection: leaprs::Connection,
}

#[cfg(feature = "leap")]
impl LeapCapture {
    pub fn open() -> Result<Self, EstimatorError> {
        use leaprs::{Connection, ConnectionConfig};

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| EstimatorError::Device(format!("{e:?}")))?;
        connection
            .open()
            .map_err(|e| EstimatorError::Device(format!("{e:?}")))?;
        Ok(LeapCapture { connection })
    }
}

#[cfg(feature = "leap")]
impl FrameSource for LeapCapture {
    type Frame = LeapFrame;

    fn next_frame(&mut self) -> Option<LeapFrame> {
        use leaprs::{Event, HandType};

        let msg = self.connection.poll(25).ok()?;
        let Event::Tracking(frame) = msg.event() else { return None };

        let hands = frame
            .hands()
            .map(|hand| {
                let handedness = if hand.hand_type() == HandType::Left {
                    Handedness::Left
                } else {
                    Handedness::Right
                };
                macro_rules! v {
                    ($joint:expr) => {{
                        let p = $joint;
                        Vec3::new(p.x, p.y, p.z)
                    }};
                }

                let mut joints = [Vec3::ZERO; hand_gesture::LANDMARK_COUNT];
                for (d, digit) in hand.digits().enumerate().take(5) {
                    let base = 1 + d * 4;
                    joints[base]     = v!(digit.proximal().prev_joint());
                    joints[base + 1] = v!(digit.intermediate().prev_joint());
                    joints[base + 2] = v!(digit.distal().prev_joint());
                    joints[base + 3] = v!(digit.distal().next_joint());
                    if d == 2 {
                        joints[0] = v!(digit.metacarpal().prev_joint());
                    }
                }
                LeapHand { handedness, joints }
            })
            .collect();

        Some(LeapFrame { hands })
    }
}

/// Normalizes Leap joints (mm, y up) into detector image space.
#[cfg(feature = "leap")]
#[derive(Debug, Default)]
pub struct LeapPoseEstimator;

#[cfg(feature = "leap")]
impl LeapPoseEstimator {
    /// Half-width of the interaction box, mm.
    const SPAN_MM:   f32 = 400.0;
    /// Height of the bottom of the interaction box above the device, mm.
    const FLOOR_MM:  f32 = 50.0;

    fn to_image(p: Vec3) -> Vec3 {
        Vec3::new(
            0.5 - p.x / Self::SPAN_MM,
            1.0 - (p.y - Self::FLOOR_MM) / Self::SPAN_MM,
            p.z / Self::SPAN_MM,
        )
    }
}

#[cfg(feature = "leap")]
impl PoseEstimator for LeapPoseEstimator {
    type Frame = LeapFrame;

    fn detect(&mut self, frame: &LeapFrame, _timestamp_ms: f64) -> Result<Detection, EstimatorError> {
        let hands = frame
            .hands
            .iter()
            .map(|h| DetectedHand {
                landmarks:  h.joints.iter().map(|&p| Self::to_image(p)).collect(),
                handedness: h.handedness,
            })
            .collect();
        Ok(Detection { hands })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
