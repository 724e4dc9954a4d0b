//! What a renderer gets to see each frame, and the trait it implements.

use glam::{Vec2, Vec3};
use log::info;
use swarm_engine::{Burst, SwarmController};

/// One live firework burst, borrowed for drawing.
#[derive(Clone, Copy, Debug)]
pub struct BurstView<'a> {
    pub positions:  &'a [Vec3],
    pub colors:     &'a [Vec3],
    pub opacity:    f32,
    pub point_size: f32,
}

impl<'a> From<&'a Burst> for BurstView<'a> {
    fn from(b: &'a Burst) -> Self {
        BurstView {
            positions:  b.positions(),
            colors:     b.colors(),
            opacity:    b.opacity(),
            point_size: b.point_size(),
        }
    }
}

/// Everything needed to draw one frame.
#[derive(Clone, Debug)]
pub struct SceneView<'a> {
    pub positions:  &'a [Vec3],
    pub point_size: f32,
    /// Swarm rotation about x and y, radians.
    pub rotation:   Vec2,
    pub bursts:     Vec<BurstView<'a>>,
    pub status:     String,
}

impl<'a> SceneView<'a> {
    pub fn new<I>(swarm: &'a SwarmController, bursts: I, status: String) -> Self
    where
        I: IntoIterator<Item = &'a Burst>,
    {
        SceneView {
            positions:  swarm.positions(),
            point_size: swarm.point_size(),
            rotation:   swarm.rotation(),
            bursts:     bursts.into_iter().map(BurstView::from).collect(),
            status,
        }
    }

    pub fn burst_particles(&self) -> usize {
        self.bursts.iter().map(|b| b.positions.len()).sum()
    }
}

pub trait Renderer {
    /// Draw one frame.  Returns `false` once the display has been closed.
    fn draw(&mut self, scene: &SceneView) -> bool;
}

/// Draws nothing; stops after a fixed number of frames.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    limit:  Option<u64>,
    peak_bursts: usize,
}

impl HeadlessRenderer {
    /// `limit = None` runs until the caller stops.
    pub fn new(limit: Option<u64>) -> Self {
        HeadlessRenderer { frames: 0, limit, peak_bursts: 0 }
    }

    pub fn frames(&self) -> u64 { self.frames }

    /// Most bursts seen live in a single frame.
    pub fn peak_bursts(&self) -> usize { self.peak_bursts }
}

impl Renderer for HeadlessRenderer {
    fn draw(&mut self, scene: &SceneView) -> bool {
        self.frames += 1;
        self.peak_bursts = self.peak_bursts.max(scene.bursts.len());
        match self.limit {
            Some(limit) if self.frames >= limit => {
                info!("headless run finished after {} frames", self.frames);
                false
            }
            _ => true,
        }
    }
}
