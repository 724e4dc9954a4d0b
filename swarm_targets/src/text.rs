//! Text-shaped target clouds.
//!
//! A phrase (lines separated by `\n`) is drawn white-on-black onto an
//! offscreen luma+alpha canvas with the built-in bitmap [`font`].  The font
//! shrinks until the widest line and the stacked block both fit.  Every lit
//! pixel is a candidate particle home; positions are normalized against the
//! tight bounding box of the ink rather than the canvas, so short phrases
//! fill the same scene width as long ones.

use glam::Vec3;
use image::{GrayAlphaImage, LumaA};
use rand::Rng;

use crate::cloud::{fallback, jitter, signed_unit, TargetCloud};
use crate::font::{self, GLYPH_COLS, GLYPH_ROWS};

// ── Canvas ────────────────────────────────────────────────────────────────
pub const CANVAS_W: u32 = 1400;
pub const CANVAS_H: u32 = 360;

// ── Font fitting ──────────────────────────────────────────────────────────
const FIT_W:    f32 = 0.86;
const FIT_H:    f32 = 0.70;
const START_PX: f32 = 170.0;
const MIN_PX:   f32 = 90.0;
const STEP_PX:  f32 = 6.0;
const LINE_GAP: f32 = 0.12;

// ── Pixel classification ──────────────────────────────────────────────────
const ALPHA_MIN: u8 = 10;
const LUMA_MIN:  u8 = 200;
const MIN_LIT:   usize = 10;

// ── Scene mapping ─────────────────────────────────────────────────────────
const WIDTH_LONG:  f32 = 11.0;
const WIDTH_SHORT: f32 = 12.0;
const HEIGHT:      f32 = 5.0;
const THICKNESS:   f32 = 1.2 * 0.18;
const JITTER:      f32 = 0.005;

const INK:        LumaA<u8> = LumaA([255, 255]);
const BACKGROUND: LumaA<u8> = LumaA([0, 255]);

/// Largest font size (in px) at which `lines` fit the canvas.
///
/// Shrinks from 170 px in 6 px steps and stops once below 90 px, so a block
/// that never fits ends at 86 px and is drawn (and clipped) at that size.
pub fn fit_font(lines: &[&str]) -> f32 {
    let w = CANVAS_W as f32;
    let h = CANVAS_H as f32;
    let mut px = START_PX;
    while px >= MIN_PX {
        let widest = lines.iter().map(|l| font::measure(l, px)).fold(0.0, f32::max);
        let block  = lines.len() as f32 * px * (1.0 + LINE_GAP);
        if widest <= w * FIT_W && block <= h * FIT_H {
            break;
        }
        px -= STEP_PX;
    }
    px
}

/// Draw `phrase` centered on a fresh canvas.
pub fn rasterize(phrase: &str) -> GrayAlphaImage {
    let mut canvas = GrayAlphaImage::from_pixel(CANVAS_W, CANVAS_H, BACKGROUND);

    let lines: Vec<&str> = phrase.split('\n').collect();
    let px      = fit_font(&lines);
    let cell    = font::cell_size(px);
    let step    = font::advance(px);
    let line_h  = px * (1.0 + LINE_GAP);
    let start_y = CANVAS_H as f32 / 2.0 - (lines.len() - 1) as f32 * line_h / 2.0;

    for (li, line) in lines.iter().enumerate() {
        let mid_y = start_y + li as f32 * line_h;
        let top   = mid_y - GLYPH_ROWS as f32 * cell / 2.0;
        let left  = CANVAS_W as f32 / 2.0 - font::measure(line, px) / 2.0;

        for (ci, ch) in line.chars().enumerate() {
            let Some(rows) = font::glyph(ch) else { continue };
            let gx = left + ci as f32 * step;
            for row in 0..GLYPH_ROWS {
                for col in 0..GLYPH_COLS {
                    if font::lit(&rows, col, row) {
                        fill_cell(
                            &mut canvas,
                            gx + col as f32 * cell,
                            top + row as f32 * cell,
                            cell,
                        );
                    }
                }
            }
        }
    }
    canvas
}

fn fill_cell(canvas: &mut GrayAlphaImage, x: f32, y: f32, side: f32) {
    let clip = |v: f32, max: u32| (v.round().max(0.0) as u32).min(max);
    let (x0, x1) = (clip(x, canvas.width()),  clip(x + side, canvas.width()));
    let (y0, y1) = (clip(y, canvas.height()), clip(y + side, canvas.height()));
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px, py, INK);
        }
    }
}

/// Coordinates of every pixel bright and opaque enough to count as ink.
pub fn lit_pixels(canvas: &GrayAlphaImage) -> Vec<(u32, u32)> {
    canvas
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[1] > ALPHA_MIN && p.0[0] > LUMA_MIN)
        .map(|(x, y, _)| (x, y))
        .collect()
}

/// Generate a text cloud of exactly `count` points for `phrase`.
pub fn text<R: Rng + ?Sized>(phrase: &str, count: usize, rng: &mut R) -> TargetCloud {
    let canvas = rasterize(phrase);
    let lit = lit_pixels(&canvas);
    if lit.len() < MIN_LIT {
        return fallback(count, Vec3::new(1.0, 0.5, 0.5), rng);
    }

    let (mut min_x, mut max_x) = (u32::MAX, 0u32);
    let (mut min_y, mut max_y) = (u32::MAX, 0u32);
    for &(x, y) in &lit {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    let span_x = (max_x - min_x).max(1) as f32;
    let span_y = (max_y - min_y).max(1) as f32;

    let width = if phrase.chars().count() > 10 { WIDTH_LONG } else { WIDTH_SHORT };

    let points = (0..count)
        .map(|_| {
            let (px, py) = lit[rng.gen_range(0..lit.len())];
            let nx = (px - min_x) as f32 / span_x - 0.5;
            let ny = (py - min_y) as f32 / span_y - 0.5;

            // Fuller toward the horizontal middle of the block.
            let c = (1.0 - (nx.abs() * 1.2).min(1.0)).max(0.0);
            let z = signed_unit(rng) * (0.25 + 0.75 * c);

            Vec3::new(
                nx * width + jitter(rng, JITTER),
                -ny * HEIGHT + jitter(rng, JITTER),
                z * THICKNESS + jitter(rng, JITTER),
            )
        })
        .collect();

    TargetCloud::new(points, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn single_line_fits_at_start_size() {
        assert_eq!(fit_font(&["Would you"]), 170.0);
    }

    #[test]
    fn two_lines_shrink_for_height() {
        assert_eq!(fit_font(&["Would you", "be my"]), 110.0);
    }

    #[test]
    fn three_lines_stop_below_minimum() {
        assert_eq!(fit_font(&["Would you", "be my", "Valentine?"]), 86.0);
    }

    #[test]
    fn ink_is_centered() {
        let lit = lit_pixels(&rasterize("Would you"));
        assert!(lit.len() > 1000);
        let min_x = lit.iter().map(|p| p.0).min().unwrap() as f32;
        let max_x = lit.iter().map(|p| p.0).max().unwrap() as f32;
        let mid = (min_x + max_x) / 2.0;
        assert!((mid - CANVAS_W as f32 / 2.0).abs() < 30.0, "ink centre at {mid}");
    }

    #[test]
    fn cloud_spans_the_scene_width() {
        let mut rng = StdRng::seed_from_u64(9);
        let cloud = text("Would you", 4000, &mut rng);
        assert_eq!(cloud.len(), 4000);
        assert!(!cloud.is_partial());

        let half_w = WIDTH_SHORT / 2.0 + JITTER;
        let half_h = HEIGHT / 2.0 + JITTER;
        assert!(cloud.iter().all(|p| p.x.abs() <= half_w && p.y.abs() <= half_h));
        assert!(cloud.iter().any(|p| p.x < -5.0));
        assert!(cloud.iter().any(|p| p.x > 5.0));
    }

    #[test]
    fn long_phrase_uses_narrower_width() {
        let mut rng = StdRng::seed_from_u64(9);
        let cloud = text("Would you\nbe my\nValentine?", 3000, &mut rng);
        let half_w = WIDTH_LONG / 2.0 + JITTER;
        assert!(cloud.iter().all(|p| p.x.abs() <= half_w));
    }

    #[test]
    fn thicker_near_the_middle() {
        let mut rng = StdRng::seed_from_u64(21);
        let cloud = text("Would you", 6000, &mut rng);
        let max_z = |lo: f32, hi: f32| {
            cloud.iter()
                .filter(|p| p.x.abs() >= lo && p.x.abs() < hi)
                .map(|p| p.z.abs())
                .fold(0.0f32, f32::max)
        };
        assert!(max_z(0.0, 1.0) > max_z(5.0, 7.0));
    }

    #[test]
    fn blank_phrases_fall_back() {
        let mut rng = StdRng::seed_from_u64(2);
        for phrase in ["", "    ", "\n\n", "\u{2764}\u{2764}"] {
            let cloud = text(phrase, 250, &mut rng);
            assert_eq!(cloud.len(), 250, "phrase {phrase:?}");
            assert_eq!(cloud.sampled(), 0, "phrase {phrase:?}");
            assert!(cloud.iter().all(|p| p.x.abs() <= 1.0 && p.y.abs() <= 0.5));
        }
    }

    #[test]
    fn oversized_phrase_is_clipped_not_stuck() {
        let mut rng = StdRng::seed_from_u64(4);
        let phrase = "W".repeat(200);
        let cloud = text(&phrase, 100, &mut rng);
        assert_eq!(cloud.len(), 100);
    }
}
