//! # gesture_swarm
//!
//! A 15 000-particle swarm steered by hand gestures, drawn in a software
//! window.
//!
//! ## Gesture → effect
//!
//! | Gesture | Hand | Effect |
//! |---|---|---|
//! | Open hand | Either (right preferred) | Swarm takes the hand's shape and follows it |
//! | Pinch (thumb to index) | Primary | Swarm grows, up to 3.5× |
//! | Fingers spread wide | Primary | Swarm spreads out |
//! | Fist | Left | Swarm morphs into a heart |
//! | One / two / three fingers | Right | Swarm spells the first / second / third phrase |
//! | Fist | Right | Fireworks at the index fingertip, one every 700 ms while held |
//! | No hand for 500 ms | – | Swarm drifts back to its idle cloud and slowly turns |
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**, a synthetic hand driven by keyboard and mouse.
//! * `leap`: **Hardware mode**, hands from a LeapMotion controller via LeapC.
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse | Moves the hands |
//! | `1` `2` `3` | Right hand raises one, two or three fingers |
//! | `F` / `P` / `O` | Right fist / pinch / open hand |
//! | `H` | Hide or show the right hand |
//! | `L` | Hide or show the left hand |
//! | `K` | Left hand fist on/off |
//! | `Q` / `Esc` | Quit |

pub mod app;
pub mod config;
pub mod detector;
pub mod logging;
pub mod pose;
pub mod render;
pub mod visualizer;
