//! Software-rendered visualizer using `minifb`.
//!
//! The swarm is projected through a fixed perspective camera and splatted
//! as small squares whose size falls off with depth:
//!
//! ```text
//!            y
//!            │   fov 75° (vertical)
//!            │ ╱
//!   camera ──┼──────────────▶ −z      near plane 0.1
//!   z = 5    │ ╲
//!            │
//! ```
//!
//! Swarm points are drawn in cyan at 0.95 opacity over black; firework
//! bursts are added on top.  A status line and the key legend sit at the
//! bottom of the window.

use std::sync::mpsc::Sender;
use std::time::Duration;

use glam::{EulerRot, Mat3, Quat, Vec2, Vec3};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use swarm_targets::font;

use crate::pose::{SimInput, SimKey};
use crate::render::{Renderer, SceneView};

// ════════════════════════════════════════════════════════════════════════════
// Camera and colors
// ════════════════════════════════════════════════════════════════════════════

const FOV_Y_DEG: f32 = 75.0;
const CAMERA_Z:  f32 = 5.0;
const NEAR:      f32 = 0.1;

const BG_COLOR:     u32 = 0xFF000000;
const SWARM_COLOR:  u32 = 0xFF00F3FF;
const SWARM_ALPHA:  f32 = 0.95;
const STATUS_COLOR: u32 = 0xFFEEEEEE;
const LEGEND_COLOR: u32 = 0xFF777777;

/// Pixel size of one font cell for the overlay text.
const TEXT_CELL: usize = 2;
const LEGEND: &str = "1/2/3=fingers  F=fist  P=pinch  O=open  H=right hand  L=left hand  K=left fist  Q=quit";

/// Pinhole projection matching the scene camera.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    width:  f32,
    height: f32,
    focal:  f32,
}

impl Camera {
    pub fn new(width: usize, height: usize) -> Self {
        let focal = 1.0 / (FOV_Y_DEG.to_radians() * 0.5).tan();
        Camera { width: width as f32, height: height as f32, focal }
    }

    /// Screen position and depth of a world point, or `None` behind the
    /// near plane.
    pub fn project(&self, p: Vec3) -> Option<(Vec2, f32)> {
        let depth = CAMERA_Z - p.z;
        if depth < NEAR {
            return None;
        }
        let aspect = self.width / self.height;
        let ndc = Vec2::new(p.x * self.focal / aspect, p.y * self.focal) / depth;
        let screen = Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        );
        Some((screen, depth))
    }

    /// Attenuated point size in pixels, never below one.
    pub fn point_px(&self, size: f32, depth: f32) -> usize {
        let px = size * (self.height * 0.5) / depth;
        px.round().max(1.0) as usize
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:  Window,
    buf:     Vec<u32>,
    width:   usize,
    height:  usize,
    camera:  Camera,
    sim_tx:  Sender<SimInput>,
    pointer: Option<Vec2>,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Sender<SimInput>) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "Gesture Swarm",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; width * height],
            width,
            height,
            camera: Camera::new(width, height),
            sim_tx,
            pointer: None,
        })
    }

    /// Poll mouse and keyboard and forward them as [`SimInput`] events.
    /// Returns false when the window should close.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        if one_shot(Key::Q) || one_shot(Key::Escape) {
            return false;
        }

        let keys = [
            (Key::Key1, SimKey::OneFinger),
            (Key::Key2, SimKey::TwoFinger),
            (Key::Key3, SimKey::ThreeFinger),
            (Key::F,    SimKey::Fist),
            (Key::P,    SimKey::Pinch),
            (Key::O,    SimKey::Open),
            (Key::L,    SimKey::ToggleLeft),
            (Key::K,    SimKey::LeftFist),
            (Key::H,    SimKey::ToggleRight),
        ];
        for (key, sim) in keys {
            if one_shot(key) {
                let _ = self.sim_tx.send(SimInput::Key(sim));
            }
        }

        // The camera image is mirrored: screen right is image left.
        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let p = Vec2::new(1.0 - mx / self.width as f32, my / self.height as f32);
            if self.pointer != Some(p) {
                self.pointer = Some(p);
                let _ = self.sim_tx.send(SimInput::Pointer(p));
            }
        }

        true
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &SceneView) {
        self.buf.fill(BG_COLOR);

        let rot = Mat3::from_quat(Quat::from_euler(
            EulerRot::XYZ,
            scene.rotation.x,
            scene.rotation.y,
            0.0,
        ));

        // ── Swarm ─────────────────────────────────────────────────────────
        for &p in scene.positions {
            if let Some((at, depth)) = self.camera.project(rot * p) {
                let px = self.camera.point_px(scene.point_size, depth);
                self.splat(at, px, |dst| blend(dst, SWARM_COLOR, SWARM_ALPHA));
            }
        }

        // ── Fireworks (additive, unrotated) ───────────────────────────────
        for burst in &scene.bursts {
            if burst.opacity <= 0.0 {
                continue;
            }
            for (&p, &c) in burst.positions.iter().zip(burst.colors) {
                if let Some((at, depth)) = self.camera.project(p) {
                    let px  = self.camera.point_px(burst.point_size, depth);
                    let add = to_argb(c * burst.opacity);
                    self.splat(at, px, |dst| add_sat(dst, add));
                }
            }
        }

        // ── Status line and legend ────────────────────────────────────────
        let line_h = (font::GLYPH_ROWS + 2) * TEXT_CELL;
        let status_y = self.height.saturating_sub(2 * line_h + 6);
        let legend_y = self.height.saturating_sub(line_h + 2);
        self.draw_text(&scene.status, 10, status_y, STATUS_COLOR);
        self.draw_text(LEGEND, 10, legend_y, LEGEND_COLOR);

        self.window.update_with_buffer(&self.buf, self.width, self.height).ok();
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    /// Apply `shade` to a `px`-wide square centered on `at`.
    fn splat(&mut self, at: Vec2, px: usize, shade: impl Fn(u32) -> u32) {
        let half = px as f32 * 0.5;
        let x0 = (at.x - half).round();
        let y0 = (at.y - half).round();
        if x0 >= self.width as f32 || y0 >= self.height as f32 {
            return;
        }
        let x1 = (x0 + px as f32).min(self.width as f32);
        let y1 = (y0 + px as f32).min(self.height as f32);
        if x1 <= 0.0 || y1 <= 0.0 {
            return;
        }
        for y in y0.max(0.0) as usize..y1 as usize {
            for x in x0.max(0.0) as usize..x1 as usize {
                let i = y * self.width + x;
                self.buf[i] = shade(self.buf[i]);
            }
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let advance = (font::GLYPH_COLS + 1) * TEXT_CELL;
        let mut cx = x;
        for ch in text.chars() {
            if cx + advance > self.width { break; }
            if let Some(rows) = font::glyph(ch) {
                for row in 0..font::GLYPH_ROWS {
                    for col in 0..font::GLYPH_COLS {
                        if font::lit(&rows, col, row) {
                            self.fill_rect(
                                cx + col * TEXT_CELL,
                                y + row * TEXT_CELL,
                                TEXT_CELL, TEXT_CELL,
                                color,
                            );
                        }
                    }
                }
            }
            cx += advance;
        }
    }
}

impl Renderer for Visualizer {
    fn draw(&mut self, scene: &SceneView) -> bool {
        if !self.poll_input() {
            return false;
        }
        self.render(scene);
        true
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Color helpers
// ────────────────────────────────────────────────────────────────────────────

/// Linear RGB in `[0, 1]` to opaque ARGB.
fn to_argb(c: Vec3) -> u32 {
    let c = (c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    0xFF000000 | ((c.x as u32) << 16) | ((c.y as u32) << 8) | c.z as u32
}

/// Alpha-blend `src` over `dst` with coverage `t`.
fn blend(dst: u32, src: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u32, b: u32| (a as f32 * (1.0 - t) + b as f32 * t).round() as u32;
    let ch = |c: u32, s: u32| (c >> s) & 0xFF;
    0xFF000000
        | (lerp(ch(dst, 16), ch(src, 16)) << 16)
        | (lerp(ch(dst,  8), ch(src,  8)) <<  8)
        |  lerp(ch(dst,  0), ch(src,  0))
}

/// Per-channel saturating add.
fn add_sat(dst: u32, src: u32) -> u32 {
    let ch = |s: u32| (((dst >> s) & 0xFF) + ((src >> s) & 0xFF)).min(0xFF);
    0xFF000000 | (ch(16) << 16) | (ch(8) << 8) | ch(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_center() {
        let cam = Camera::new(1280, 720);
        let (at, depth) = cam.project(Vec3::ZERO).unwrap();
        assert!((at - Vec2::new(640.0, 360.0)).length() < 1e-3);
        assert_eq!(depth, 5.0);
    }

    #[test]
    fn up_is_up_on_screen() {
        let cam = Camera::new(800, 600);
        let (at, _) = cam.project(Vec3::new(1.0, 1.0, 0.0)).unwrap();
        assert!(at.x > 400.0);
        assert!(at.y < 300.0);
    }

    #[test]
    fn behind_near_plane_is_culled() {
        let cam = Camera::new(800, 600);
        assert!(cam.project(Vec3::new(0.0, 0.0, 4.95)).is_none());
        assert!(cam.project(Vec3::new(0.0, 0.0, 4.5)).is_some());
    }

    #[test]
    fn point_size_attenuates_with_depth() {
        let cam = Camera::new(1280, 720);
        // 0.03 * 360 / 5 = 2.16
        assert_eq!(cam.point_px(0.03, 5.0), 2);
        assert_eq!(cam.point_px(0.03, 1.0), 11);
        assert_eq!(cam.point_px(0.001, 5.0), 1);
    }

    #[test]
    fn color_helpers() {
        assert_eq!(to_argb(Vec3::ONE), 0xFFFFFFFF);
        assert_eq!(to_argb(Vec3::new(2.0, -1.0, 0.0)), 0xFFFF0000);
        assert_eq!(blend(BG_COLOR, SWARM_COLOR, 1.0), SWARM_COLOR);
        assert_eq!(blend(BG_COLOR, SWARM_COLOR, 0.0), BG_COLOR);
        assert_eq!(add_sat(0xFF808080, 0xFF808080), 0xFFFFFFFF);
        assert_eq!(add_sat(0xFF100000, 0xFF000001), 0xFF100001);
    }
}
