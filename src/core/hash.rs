//! State Hashing for Verification
//!
//! Deterministic SHA-256 digest of the world, used to check that a replay of
//! recorded inputs lands on exactly the same state as the live run.

use sha2::{Sha256, Digest};

use super::pose::Pose;
use super::rect::Rect;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Domain separator for world state digests.
const WORLD_STATE_DOMAIN: &[u8] = b"ASTEROID_FIELD_STATE_V1";

/// Deterministic hasher for world state.
///
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for world state.
    pub fn for_world_state() -> Self {
        Self::new(WORLD_STATE_DOMAIN)
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a pose.
    #[inline]
    pub fn update_pose(&mut self, pose: Pose) {
        self.update_i32(pose.x);
        self.update_i32(pose.y);
        self.update_i32(pose.rotation);
    }

    /// Update with a bounding rectangle.
    #[inline]
    pub fn update_rect(&mut self, rect: Rect) {
        self.update_i32(rect.x);
        self.update_i32(rect.y);
        self.update_i32(rect.w);
        self.update_i32(rect.h);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute state hash for world verification.
///
/// Called by `World::compute_hash()`; the closure adds the entity data.
pub fn compute_state_hash<F>(tick: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_world_state();

    // Always hash tick first
    hasher.update_u32(tick);

    add_state(&mut hasher);

    hasher.finalize()
}
