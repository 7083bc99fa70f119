//! Core deterministic primitives.
//!
//! Pose math, bounding boxes, seeded randomness and state hashing. Nothing in
//! here knows about ships or asteroids.

pub mod pose;
pub mod rect;
pub mod rng;
pub mod hash;

// Re-export core types
pub use pose::{Pose, normalize_degrees, displacement, wrap_axis, impact_angle};
pub use rect::Rect;
pub use rng::DeterministicRng;
pub use hash::{StateHash, compute_state_hash};
