//! The detection loop.
//!
//! [`Detector`] pairs a [`FrameSource`] with a [`PoseEstimator`], throttles
//! inference, stamps every call with a strictly increasing timestamp, and
//! turns the result into a [`HandSnapshot`].  [`spawn_detector`] runs one on
//! its own thread and hands snapshots to the render loop over a channel.

use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use hand_gesture::HandSnapshot;
use log::{debug, error};

use crate::pose::{EstimatorError, FrameSource, PoseEstimator};

/// Idle sleep between throttle checks on the detector thread.
const POLL_SLEEP: Duration = Duration::from_millis(2);

// ════════════════════════════════════════════════════════════════════════════
// Time
// ════════════════════════════════════════════════════════════════════════════

/// Milliseconds since a shared origin.  Copy one into every thread that
/// needs timestamps so detection and rendering agree on "now".
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn start() -> Self { Clock { origin: Instant::now() } }

    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// `ts = max(previous + 1, now)`, starting from 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicStamp {
    last: f64,
}

impl MonotonicStamp {
    pub fn next(&mut self, now_ms: f64) -> f64 {
        let ts = (self.last + 1.0).max(now_ms);
        self.last = ts;
        ts
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Detector
// ════════════════════════════════════════════════════════════════════════════

pub struct Detector<S, E> {
    source:      S,
    estimator:   E,
    interval_ms: f64,
    last_run_ms: Option<f64>,
    stamp:       MonotonicStamp,
    failures:    u64,
}

impl<S, E> Detector<S, E>
where
    S: FrameSource,
    E: PoseEstimator<Frame = S::Frame>,
{
    pub fn new(source: S, estimator: E, interval_ms: f64) -> Self {
        Detector {
            source,
            estimator,
            interval_ms,
            last_run_ms: None,
            stamp: MonotonicStamp::default(),
            failures: 0,
        }
    }

    /// Run one detection if the throttle allows and a frame is ready.
    ///
    /// A failed inference is logged and yields nothing; the tracker keeps
    /// its previous state and the grace window takes care of the rest.
    pub fn poll(&mut self, now_ms: f64) -> Option<HandSnapshot> {
        if let Some(last) = self.last_run_ms {
            if now_ms - last < self.interval_ms {
                return None;
            }
        }
        self.last_run_ms = Some(now_ms);

        // The frame is released when it goes out of scope, on every path.
        let frame = self.source.next_frame()?;
        let ts = self.stamp.next(now_ms);

        match self.estimator.detect(&frame, ts) {
            Ok(det) => Some(det.snapshot(ts)),
            Err(e) => {
                self.failures += 1;
                error!("hand detect failed: {}", e);
                None
            }
        }
    }

    /// Inference calls that returned an error so far.
    pub fn failures(&self) -> u64 { self.failures }

    /// The frame source has shut down; `poll` will never yield again.
    pub fn is_closed(&self) -> bool { self.source.is_closed() }
}

/// Build a detector with `make` on a new thread and run it there.
///
/// Construction happens on the detector thread so device handles never
/// cross threads.  If it fails the error is logged and the channel closes.
/// The thread ends when the frame source closes or the receiving side is
/// dropped, whichever it notices first.
pub fn spawn_detector<F, S, E>(make: F, clock: Clock) -> Receiver<HandSnapshot>
where
    F: FnOnce() -> Result<Detector<S, E>, EstimatorError> + Send + 'static,
    S: FrameSource + 'static,
    E: PoseEstimator<Frame = S::Frame> + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut detector = match make() {
            Ok(d) => d,
            Err(e) => {
                error!("hand tracking unavailable: {}", e);
                return;
            }
        };
        while !detector.is_closed() {
            if let Some(snap) = detector.poll(clock.now_ms()) {
                if tx.send(snap).is_err() {
                    break;
                }
            }
            thread::sleep(POLL_SLEEP);
        }
        debug!("detector thread stopped ({} failed detections)", detector.failures());
    });
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
