//! Prints ASCII previews of the heart and text clouds.

use rand::{rngs::StdRng, SeedableRng};
use swarm_targets::{heart, text, TargetCloud};

const COLS: usize = 72;
const ROWS: usize = 24;

fn show(label: &str, cloud: &TargetCloud, half_w: f32, half_h: f32) {
    let mut grid = vec![[0u32; COLS]; ROWS];
    for p in cloud.iter() {
        let cx = ((p.x / half_w + 1.0) * 0.5 * COLS as f32) as isize;
        let cy = ((1.0 - p.y / half_h) * 0.5 * ROWS as f32) as isize;
        if (0..COLS as isize).contains(&cx) && (0..ROWS as isize).contains(&cy) {
            grid[cy as usize][cx as usize] += 1;
        }
    }

    println!("── {label}  ({} points, {} sampled)", cloud.len(), cloud.sampled());
    for row in &grid {
        let line: String = row
            .iter()
            .map(|&n| match n {
                0 => ' ',
                1..=3 => '.',
                4..=12 => '*',
                _ => '#',
            })
            .collect();
        println!("   {}", line);
    }
    println!();
}

fn main() {
    let mut rng = StdRng::seed_from_u64(2024);
    let n = 15_000;

    show("heart", &heart(n, &mut rng), 8.0, 8.0);
    for phrase in ["Would you", "Would you\nbe my", "Would you\nbe my\nValentine?"] {
        show(&format!("{:?}", phrase), &text(phrase, n, &mut rng), 6.5, 3.0);
    }
}
