//! Game Events
//!
//! Events generated during a tick, in the order they were resolved. They are
//! the hook point for anything layered on top of the core (scoring, audio,
//! a health/lives model) without touching the reaction policy.

use serde::{Serialize, Deserialize};

use crate::game::entity::{EntityId, SizeTier};

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Ship fired a laser
    ProjectileFired {
        /// New laser
        projectile: EntityId,
        /// Heading inherited from the ship
        rotation: i32,
    },

    /// Laser ran out of range
    ProjectileExpired {
        /// Removed laser
        projectile: EntityId,
    },

    /// Laser destroyed an asteroid
    AsteroidDestroyed {
        /// Destroyed asteroid
        asteroid: EntityId,
        /// Laser that hit it
        projectile: EntityId,
        /// Tier of the destroyed asteroid
        size: SizeTier,
        /// Fragments spawned (empty for the smallest tier)
        children: Vec<EntityId>,
    },

    /// Asteroid overlapped the ship.
    ///
    /// The ship survives; only an explosion is shown. A health or lives
    /// model would consume this event.
    ShipStruck {
        /// The ship
        ship: EntityId,
        /// Asteroid overlapping it
        asteroid: EntityId,
    },

    /// Two asteroids bounced off each other
    AsteroidsBounced {
        /// Asteroid whose turn it was
        asteroid: EntityId,
        /// Asteroid it overlapped
        other: EntityId,
        /// Floored heading from `asteroid`'s center to `other`'s, in degrees
        impact_angle: i32,
    },

    /// Explosion effect created
    ExplosionSpawned {
        /// New explosion
        explosion: EntityId,
        /// Top-left x
        x: i32,
        /// Top-left y
        y: i32,
    },

    /// Explosion effect finished
    ExplosionExpired {
        /// Removed explosion
        explosion: EntityId,
    },
}

/// A game event with timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create projectile fired event.
    pub fn projectile_fired(tick: u32, projectile: EntityId, rotation: i32) -> Self {
        Self::new(tick, GameEventData::ProjectileFired { projectile, rotation })
    }

    /// Create projectile expired event.
    pub fn projectile_expired(tick: u32, projectile: EntityId) -> Self {
        Self::new(tick, GameEventData::ProjectileExpired { projectile })
    }

    /// Create asteroid destroyed event.
    pub fn asteroid_destroyed(
        tick: u32,
        asteroid: EntityId,
        projectile: EntityId,
        size: SizeTier,
        children: Vec<EntityId>,
    ) -> Self {
        Self::new(
            tick,
            GameEventData::AsteroidDestroyed {
                asteroid,
                projectile,
                size,
                children,
            },
        )
    }

    /// Create ship struck event.
    pub fn ship_struck(tick: u32, ship: EntityId, asteroid: EntityId) -> Self {
        Self::new(tick, GameEventData::ShipStruck { ship, asteroid })
    }

    /// Create asteroids bounced event.
    pub fn asteroids_bounced(tick: u32, asteroid: EntityId, other: EntityId, impact_angle: i32) -> Self {
        Self::new(
            tick,
            GameEventData::AsteroidsBounced {
                asteroid,
                other,
                impact_angle,
            },
        )
    }

    /// Create explosion spawned event.
    pub fn explosion_spawned(tick: u32, explosion: EntityId, x: i32, y: i32) -> Self {
        Self::new(tick, GameEventData::ExplosionSpawned { explosion, x, y })
    }

    /// Create explosion expired event.
    pub fn explosion_expired(tick: u32, explosion: EntityId) -> Self {
        Self::new(tick, GameEventData::ExplosionExpired { explosion })
    }
}
