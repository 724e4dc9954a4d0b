//! # swarm_engine
//!
//! The per-frame simulation behind the gesture swarm.
//!
//! * [`swarm`]: [`SwarmController`]: a fixed-size particle buffer that
//!   chases a blend of the tracked hand, the heart cloud and one text cloud,
//!   or drifts back to its idle cloud when no hand is present.
//! * [`fireworks`]: [`FireworkSystem`]: cooldown-limited, pooled ballistic
//!   bursts with their own lifetime.
//! * [`smoothing`]: the first-order low-pass filter and its rates.
//!
//! Neither simulation knows about time sources or rendering; the frame loop
//! feeds them hand state, `dt` and timestamps and reads back buffers.

pub mod fireworks;
pub mod smoothing;
pub mod swarm;

pub use fireworks::{Burst, BurstHandle, FireworkConfig, FireworkSystem, BURST_POINT_SIZE};
pub use smoothing::Approach;
pub use swarm::{SwarmController, IDLE_SCALE};
