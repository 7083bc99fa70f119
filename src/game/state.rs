//! World State
//!
//! The ship plus the projectile, asteroid and explosion collections.
//! Collections are BTreeMaps keyed by monotonic [`EntityId`], so iteration
//! order is insertion order and identical across runs.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::core::pose::Pose;
use crate::core::rng::DeterministicRng;
use crate::game::config::{AsteroidSeed, ConfigError, SimConfig, Sprites};
use crate::game::entity::{Entity, EntityId, EntityKind, SimContext, SizeTier};
use crate::game::events::GameEvent;
use crate::game::input::InputFrame;
use crate::game::snapshot::RenderSnapshot;

// =============================================================================
// PENDING CHANGES
// =============================================================================

/// Spawns and despawns collected while a tick walks its snapshot of ids.
///
/// Despawned ids stop counting as live immediately; both buffers are
/// applied to the collections when the tick ends.
#[derive(Debug, Default)]
pub struct Pending {
    spawns: Vec<Entity>,
    despawns: BTreeSet<EntityId>,
}

impl Pending {
    /// Queue an entity to join the world at tick end.
    pub fn spawn(&mut self, entity: Entity) {
        self.spawns.push(entity);
    }

    /// Mark an entity destroyed.
    pub fn despawn(&mut self, id: EntityId) {
        self.despawns.insert(id);
    }

    /// Has this entity been destroyed during the current tick?
    #[inline]
    pub fn is_despawned(&self, id: EntityId) -> bool {
        self.despawns.contains(&id)
    }
}

// =============================================================================
// WORLD
// =============================================================================

/// Live entity counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiveCounts {
    /// Projectiles in flight
    pub projectiles: usize,
    /// Asteroids
    pub asteroids: usize,
    /// Explosions on screen
    pub explosions: usize,
}

/// Complete simulation state.
#[derive(Clone, Debug)]
pub struct World {
    /// Validated configuration
    pub config: SimConfig,

    /// Ticks simulated so far
    pub tick: u32,

    /// The player ship (always present)
    pub ship: Entity,

    /// Lasers in flight
    pub projectiles: BTreeMap<EntityId, Entity>,

    /// Asteroids
    pub asteroids: BTreeMap<EntityId, Entity>,

    /// Explosion effects
    pub explosions: BTreeMap<EntityId, Entity>,

    /// Next entity id (monotonic counter)
    pub next_entity_id: u32,

    /// Events generated this tick (cleared each tick)
    pub pending_events: Vec<GameEvent>,

    sprites: Sprites,
}

impl World {
    /// Build the starting world described by `config`.
    ///
    /// Fails fast on malformed configuration.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sprites = Sprites::from_catalog(&config.sprites)?;

        let ship = Entity::ship(EntityId(0), &config, &sprites);
        let seeds = config.initial_asteroids.clone();

        let mut world = Self {
            config,
            tick: 0,
            ship,
            projectiles: BTreeMap::new(),
            asteroids: BTreeMap::new(),
            explosions: BTreeMap::new(),
            next_entity_id: 1,
            pending_events: Vec::new(),
            sprites,
        };

        for seed in seeds {
            world.spawn_seeded_asteroid(&seed)?;
        }

        debug!(
            asteroids = world.asteroids.len(),
            width = world.config.screen.width,
            height = world.config.screen.height,
            "world created"
        );
        Ok(world)
    }

    /// Build a world whose starting field is `count` large asteroids laid out
    /// from `seed`, clear of the ship's spawn box.
    pub fn with_scattered_field(
        mut config: SimConfig,
        seed: u64,
        count: usize,
    ) -> Result<Self, ConfigError> {
        config.initial_asteroids.clear();
        let mut world = Self::new(config)?;
        let mut rng = DeterministicRng::new(seed);

        const MAX_ATTEMPTS: usize = 64;
        let ship_box = world.ship.body.bounds();
        let (width, height) = (world.config.screen.width, world.config.screen.height);

        for _ in 0..count {
            let mut placed = None;
            for _ in 0..MAX_ATTEMPTS {
                let pose = Pose::new(
                    rng.next_int_range(0, width),
                    rng.next_int_range(0, height),
                    rng.next_heading(),
                );
                let velocity = rng.next_int_range(3, 6);
                let id = EntityId(world.next_entity_id);
                let candidate = Entity::asteroid(id, pose, velocity, SizeTier::Large, &world.sprites);
                if !candidate.body.bounds().intersects(&ship_box) {
                    placed = Some(candidate);
                    break;
                }
            }
            if let Some(asteroid) = placed {
                world.next_entity_id += 1;
                world.asteroids.insert(asteroid.id, asteroid);
            }
        }

        Ok(world)
    }

    fn spawn_seeded_asteroid(&mut self, seed: &AsteroidSeed) -> Result<EntityId, ConfigError> {
        let size = SizeTier::from_u8(seed.size).ok_or(ConfigError::InvalidSizeTier(seed.size))?;
        let pose = Pose::new(seed.x, seed.y, seed.rotation);
        Ok(self.spawn_asteroid(pose, seed.velocity, size))
    }

    /// Allocate the next entity id.
    pub fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    /// Context for the tick currently being simulated.
    pub fn context(&self) -> SimContext {
        SimContext {
            screen: self.config.screen,
            tick: self.tick,
            animation_period: self.config.animation_period,
        }
    }

    /// Add an asteroid immediately.
    pub fn spawn_asteroid(&mut self, pose: Pose, velocity: i32, size: SizeTier) -> EntityId {
        let asteroid = self.make_asteroid(pose, velocity, size);
        let id = asteroid.id;
        self.asteroids.insert(id, asteroid);
        id
    }

    /// Build an asteroid without adding it (for pending buffers).
    pub fn make_asteroid(&mut self, pose: Pose, velocity: i32, size: SizeTier) -> Entity {
        let id = self.alloc_id();
        Entity::asteroid(id, pose, velocity, size, &self.sprites)
    }

    /// Apply one tick of ship controls.
    pub fn steer_ship(&mut self, input: &InputFrame) {
        self.ship.steer(input, &self.config.ship, &self.sprites);
    }

    /// Add a laser immediately.
    pub fn spawn_projectile(&mut self, x: i32, y: i32, rotation: i32) -> EntityId {
        let id = self.alloc_id();
        let projectile = Entity::projectile(id, x, y, rotation, &self.config, &self.sprites);
        self.projectiles.insert(id, projectile);
        id
    }

    /// Build an explosion without adding it (for pending buffers).
    pub fn make_explosion(&mut self, x: i32, y: i32) -> Entity {
        let id = self.alloc_id();
        Entity::explosion(id, x, y, &self.config, &self.sprites)
    }

    /// Add an explosion immediately.
    pub fn spawn_explosion(&mut self, x: i32, y: i32) -> EntityId {
        let explosion = self.make_explosion(x, y);
        let id = explosion.id;
        self.explosions.insert(id, explosion);
        id
    }

    /// Apply a tick's buffered spawns and despawns.
    pub fn apply_pending(&mut self, pending: Pending) {
        for id in &pending.despawns {
            self.projectiles.remove(id);
            self.asteroids.remove(id);
            self.explosions.remove(id);
        }

        for entity in pending.spawns {
            let collection = match entity.kind {
                EntityKind::Projectile(_) => &mut self.projectiles,
                EntityKind::Asteroid(_) => &mut self.asteroids,
                EntityKind::Explosion(_) => &mut self.explosions,
                // There is exactly one ship
                EntityKind::Ship(_) => continue,
            };
            collection.insert(entity.id, entity);
        }
    }

    /// Live entity counts.
    pub fn live_counts(&self) -> LiveCounts {
        LiveCounts {
            projectiles: self.projectiles.len(),
            asteroids: self.asteroids.len(),
            explosions: self.explosions.len(),
        }
    }

    /// Pose and animation state of every live entity, for the renderer.
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(self)
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, |hasher| {
            hash_entity(hasher, &self.ship);
            for entity in self.projectiles.values() {
                hash_entity(hasher, entity);
            }
            for entity in self.asteroids.values() {
                hash_entity(hasher, entity);
            }
            for entity in self.explosions.values() {
                hash_entity(hasher, entity);
            }
            hasher.update_u32(self.next_entity_id);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

fn hash_entity(hasher: &mut StateHasher, entity: &Entity) {
    hasher.update_u32(entity.id.0);
    match entity.kind {
        EntityKind::Ship(ship) => {
            hasher.update_u8(0);
            hasher.update_bool(ship.thrusting);
        }
        EntityKind::Projectile(projectile) => {
            hasher.update_u8(1);
            hasher.update_i32(projectile.range);
        }
        EntityKind::Asteroid(asteroid) => {
            hasher.update_u8(2);
            hasher.update_u8(asteroid.size as u8);
        }
        EntityKind::Explosion(explosion) => {
            hasher.update_u8(3);
            hasher.update_u32(explosion.age);
        }
    }
    hasher.update_pose(entity.body.pose);
    hasher.update_i32(entity.body.velocity);
    hasher.update_i32(entity.body.traveled);
    hasher.update_u32(entity.body.frame_index() as u32);
    hasher.update_rect(entity.body.bounds());
}
