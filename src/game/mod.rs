//! Game Logic Module
//!
//! All game simulation code. Deterministic for a given config and input
//! sequence.
//!
//! ## Module Structure
//!
//! - `config`: Tunables, sprite catalog, validation
//! - `input`: Per-tick input frames, fire edge detection, recording
//! - `entity`: Shared body, per-kind state and behavior
//! - `collision`: Broad phase strategies and overlap queries
//! - `state`: World state and per-tick pending buffers
//! - `tick`: Simulation loop
//! - `events`: Game events for hooks and replay
//! - `snapshot`: Render view of the world

pub mod config;
pub mod input;
pub mod entity;
pub mod collision;
pub mod state;
pub mod tick;
pub mod events;
pub mod snapshot;

// Re-export key types
pub use config::{ConfigError, SimConfig};
pub use input::{InputFrame, InputRecording, InputSampler, KeyState};
pub use entity::{Entity, EntityId, SizeTier};
pub use collision::{BroadPhase, BruteForce, UniformGrid};
pub use state::World;
pub use tick::TickResult;
pub use events::{GameEvent, GameEventData};
pub use snapshot::{RenderEntity, RenderKind, RenderSnapshot};
