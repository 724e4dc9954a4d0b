//! Application state and the main loop.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use hand_gesture::{HandSnapshot, HandTrackState};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swarm_engine::{FireworkSystem, SwarmController};
use swarm_targets::TargetSet;

use crate::config::Config;
use crate::detector::{spawn_detector, Clock, Detector};
use crate::pose::SimInput;
use crate::render::{HeadlessRenderer, Renderer, SceneView};
use crate::visualizer::Visualizer;

/// Longest simulated step per frame, seconds.
pub const MAX_DT: f32 = 0.05;

const DIAG_INTERVAL_MS: f64 = 1000.0;
/// Frame pacing when no window is throttling us.
const HEADLESS_FRAME: Duration = Duration::from_millis(16);

// ════════════════════════════════════════════════════════════════════════════
// FrameLoop
// ════════════════════════════════════════════════════════════════════════════

/// Detections counted since the last diagnostic line.
#[derive(Debug, Default)]
struct Diagnostics {
    window_start_ms: Option<f64>,
    detections:      u32,
}

/// Everything that changes from frame to frame.
pub struct FrameLoop<R> {
    track:        HandTrackState,
    swarm:        SwarmController,
    fireworks:    FireworkSystem<R>,
    last_tick_ms: Option<f64>,
    diag:         Diagnostics,
}

impl<R: Rng> FrameLoop<R> {
    pub fn new(track: HandTrackState, swarm: SwarmController, fireworks: FireworkSystem<R>) -> Self {
        FrameLoop {
            track,
            swarm,
            fireworks,
            last_tick_ms: None,
            diag: Diagnostics::default(),
        }
    }

    /// Feed one detection in.  A held right fist asks for a firework every
    /// detection; the cooldown thins them out.
    pub fn ingest(&mut self, snap: &HandSnapshot) {
        self.diag.detections += 1;
        if let Some(trigger) = self.track.ingest(snap) {
            self.fireworks.request_spawn(trigger.origin, snap.timestamp_ms);
        }
    }

    /// Advance one rendered frame.
    pub fn tick(&mut self, now_ms: f64) {
        let dt = match self.last_tick_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_DT),
            None       => 0.0,
        };
        self.last_tick_ms = Some(now_ms);

        self.fireworks.update(dt, now_ms);
        self.track.expire(now_ms);
        self.swarm.tick(&self.track);

        self.log_diagnostics(now_ms);
    }

    fn log_diagnostics(&mut self, now_ms: f64) {
        let start = *self.diag.window_start_ms.get_or_insert(now_ms);
        if now_ms - start <= DIAG_INTERVAL_MS {
            return;
        }
        let (pinch, spread) = match self.track.primary_signals() {
            Some(s) => (format!("{:.3}", s.pinch), format!("{:.3}", s.spread)),
            None    => ("NA".to_string(), "NA".to_string()),
        };
        debug!(
            "hand detect fps~{} hand={} pinch={} spread={} left_fist={} heart={:.2} text={:.2}",
            self.diag.detections,
            self.track.has_hand(),
            pinch,
            spread,
            self.track.left_fist(),
            self.swarm.heart_morph(),
            self.swarm.text_morph(),
        );
        self.diag.detections = 0;
        self.diag.window_start_ms = Some(now_ms);
    }

    /// One-line summary for the window.
    pub fn status(&self) -> String {
        if !self.track.has_hand() {
            return "no hand - idle".to_string();
        }
        let side = |visible: bool, g: hand_gesture::Gesture| {
            if visible { g.label() } else { "-" }
        };
        format!(
            "left: {}  right: {}  scale {:.2}  heart {:.2}  text {:.2}  fireworks {}",
            side(self.track.left_visible(), self.track.left_gesture()),
            side(self.track.right_visible(), self.track.right_gesture()),
            self.swarm.scale(),
            self.swarm.heart_morph(),
            self.swarm.text_morph(),
            self.fireworks.live_count(),
        )
    }

    pub fn scene(&self) -> SceneView<'_> {
        SceneView::new(&self.swarm, self.fireworks.live(), self.status())
    }

    pub fn track(&self)     -> &HandTrackState      { &self.track }
    pub fn swarm(&self)     -> &SwarmController     { &self.swarm }
    pub fn fireworks(&self) -> &FireworkSystem<R>   { &self.fireworks }
}

// ════════════════════════════════════════════════════════════════════════════
// Entry point
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    /// Render this many frames without a window, then exit.
    pub headless: Option<u64>,
    /// Seed for target generation and fireworks.
    pub seed:     Option<u64>,
}

/// Run the full application until the window closes or the headless frame
/// budget is spent.
pub fn run(cfg: &Config, opts: RunOptions) -> anyhow::Result<()> {
    let mut rng = match opts.seed {
        Some(seed) => {
            info!("using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    // ── Targets and simulation state ──────────────────────────────────────
    let targets = TargetSet::generate(
        cfg.swarm.particle_count,
        cfg.swarm.idle_extent,
        &cfg.text.phrases,
        &mut rng,
    );
    let fireworks = FireworkSystem::new(
        cfg.firework_config(),
        StdRng::from_rng(&mut rng).context("failed to seed the firework rng")?,
    );
    let mut app = FrameLoop::new(
        HandTrackState::new(cfg.tracking.grace_ms),
        SwarmController::new(targets),
        fireworks,
    );

    // ── Hand tracking thread ──────────────────────────────────────────────
    let clock = Clock::start();
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let snapshots = start_tracking(sim_rx, cfg.tracking.detect_interval_ms, clock);

    // ── Renderer ──────────────────────────────────────────────────────────
    let mut renderer: Box<dyn Renderer> = match opts.headless {
        Some(frames) => {
            info!("headless run for {} frames", frames);
            Box::new(HeadlessRenderer::new(Some(frames)))
        }
        None => Box::new(
            Visualizer::new(cfg.window.width, cfg.window.height, sim_tx.clone())
                .context("failed to open the visualizer window")?,
        ),
    };

    // ── Main loop ─────────────────────────────────────────────────────────
    loop {
        drain(&snapshots, &mut app);
        app.tick(clock.now_ms());
        if !renderer.draw(&app.scene()) {
            break;
        }
        if opts.headless.is_some() {
            thread::sleep(HEADLESS_FRAME);
        }
    }

    drop(sim_tx);
    info!("bye");
    Ok(())
}

/// Apply every pending detection without blocking.
fn drain<R: Rng>(rx: &Receiver<HandSnapshot>, app: &mut FrameLoop<R>) {
    loop {
        match rx.try_recv() {
            Ok(snap) => app.ingest(&snap),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => break,
        }
    }
}

#[cfg(not(feature = "leap"))]
fn start_tracking(sim_rx: Receiver<SimInput>, interval_ms: f64, clock: Clock) -> Receiver<HandSnapshot> {
    use crate::pose::{SimCapture, SimPoseEstimator};

    info!("hand source: keyboard simulation (build with --features leap for hardware)");
    spawn_detector(
        move || Ok(Detector::new(SimCapture::new(sim_rx), SimPoseEstimator::new(), interval_ms)),
        clock,
    )
}

#[cfg(feature = "leap")]
fn start_tracking(_sim_rx: Receiver<SimInput>, interval_ms: f64, clock: Clock) -> Receiver<HandSnapshot> {
    use crate::pose::{LeapCapture, LeapPoseEstimator};

    info!("hand source: LeapMotion hardware");
    spawn_detector(
        move || Ok(Detector::new(LeapCapture::open()?, LeapPoseEstimator, interval_ms)),
        clock,
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
