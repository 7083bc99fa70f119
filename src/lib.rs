//! # Asteroid Field
//!
//! Deterministic simulation core for a single-player Asteroids game: a ship,
//! its lasers, splitting asteroids and explosion effects on a wrapping screen.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ASTEROID FIELD                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── pose.rs     - Position/heading, motion and wrap         │
//! │  ├── rect.rs     - Axis-aligned bounding boxes               │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic                                │
//! │  ├── config.rs   - Tunables and sprite catalog               │
//! │  ├── input.rs    - Input frames and recording                │
//! │  ├── entity.rs   - Ship, laser, asteroid, explosion          │
//! │  ├── collision.rs- Broad phase and overlap queries           │
//! │  ├── state.rs    - World state                               │
//! │  ├── tick.rs     - Simulation loop                           │
//! │  ├── events.rs   - Game events                               │
//! │  └── snapshot.rs - Render snapshot                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//! - Trigonometry is floored to whole pixels and degrees
//!
//! Given an identical config and input sequence, the simulation produces
//! identical state hashes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use core::pose::Pose;
pub use core::rect::Rect;
pub use core::rng::DeterministicRng;
pub use game::config::{ConfigError, SimConfig};
pub use game::input::{InputFrame, InputRecording};
pub use game::state::World;
pub use game::tick::{tick, tick_with, replay, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reference simulation tick rate (Hz)
pub const TICK_RATE: u32 = 30;
