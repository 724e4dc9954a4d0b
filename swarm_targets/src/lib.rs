//! # swarm_targets
//!
//! Static point clouds that a particle swarm can be pulled toward.  Every
//! cloud holds exactly one offset per particle and is generated once, at
//! startup; after that it is read-only.
//!
//! | Cloud | Shape |
//! |---|---|
//! | [`idle`] | uniform random box: the swarm's resting shape |
//! | [`heart`] | implicit heart `(x²+y²−1)³ − x²y³ ≤ 0`, thickened in Z toward its interior |
//! | [`text`] | a phrase rasterized with the built-in bitmap [`font`], extruded into a thin slab |
//!
//! Generation never fails: when sampling cannot produce a shape (an
//! unlucky heart run, a phrase with no drawable glyphs) the remaining
//! particles are filled from a small random fallback cloud.
//!
//! ## Quick start
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use swarm_targets::TargetSet;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let phrases = ["Would you".to_string()];
//! let set = TargetSet::generate(500, 6.0, &phrases, &mut rng);
//!
//! assert_eq!(set.heart.len(), 500);
//! assert_eq!(set.texts.len(), 1);
//! ```

pub mod cloud;
pub mod font;
pub mod heart;
pub mod text;

pub use cloud::{fallback, idle, TargetCloud};
pub use heart::heart;
pub use text::text;

use log::{info, warn};
use rand::Rng;

// ════════════════════════════════════════════════════════════════════════════
// TargetSet: every cloud the swarm can blend toward
// ════════════════════════════════════════════════════════════════════════════

/// The full set of target clouds for one session.
///
/// `texts[k]` belongs to `phrases[k]`; callers conventionally order phrases
/// from shortest to longest so that a higher finger count reveals more of
/// the message.
#[derive(Clone, Debug)]
pub struct TargetSet {
    pub idle:  TargetCloud,
    pub heart: TargetCloud,
    pub texts: Vec<TargetCloud>,
}

impl TargetSet {
    pub fn generate<R: Rng + ?Sized>(
        count: usize,
        idle_extent: f32,
        phrases: &[String],
        rng: &mut R,
    ) -> Self {
        let idle  = idle(count, idle_extent, rng);
        let heart = heart(count, rng);
        if heart.is_partial() {
            warn!(
                "heart sampling filled {}/{} particles; rest use the fallback cloud",
                heart.sampled(), count
            );
        }

        let texts: Vec<TargetCloud> = phrases
            .iter()
            .map(|phrase| {
                let cloud = text(phrase, count, rng);
                if cloud.is_partial() {
                    warn!("phrase {:?} produced no drawable pixels; using fallback cloud", phrase);
                }
                cloud
            })
            .collect();

        info!(
            "generated target clouds: {} particles, heart, {} text phrase(s)",
            count, texts.len()
        );

        TargetSet { idle, heart, texts }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn every_cloud_has_requested_count() {
        let mut rng = StdRng::seed_from_u64(11);
        let phrases: Vec<String> = ["Would you", "Would you\nbe my"]
            .iter().map(|s| s.to_string()).collect();
        let set = TargetSet::generate(321, 6.0, &phrases, &mut rng);
        assert_eq!(set.idle.len(), 321);
        assert_eq!(set.heart.len(), 321);
        for t in &set.texts {
            assert_eq!(t.len(), 321);
        }
    }

    #[test]
    fn zero_particles_is_allowed() {
        let mut rng = StdRng::seed_from_u64(0);
        let set = TargetSet::generate(0, 6.0, &["hi".to_string()], &mut rng);
        assert!(set.heart.is_empty());
        assert!(set.texts[0].is_empty());
    }
}
