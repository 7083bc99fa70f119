//! Entity Model
//!
//! Every entity is a shared [`Movable`] body (pose, speed, animation and
//! bounding box) plus an [`EntityKind`] carrying the kind-specific fields.
//! Per-kind behavior is dispatched through the [`Behavior`] trait.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::pose::Pose;
use crate::core::rect::Rect;
use crate::game::config::{FrameSize, Frames, ScreenBounds, ShipLimits, SimConfig, Sprites};
use crate::game::input::InputFrame;

// =============================================================================
// ENTITY ID
// =============================================================================

/// Unique entity identifier (monotonic counter).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// SIMULATION CONTEXT
// =============================================================================

/// Per-tick context passed into every update call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimContext {
    /// Screen bounds for wrap
    pub screen: ScreenBounds,
    /// Tick being simulated
    pub tick: u32,
    /// Ticks between animation frame advances
    pub animation_period: u32,
}

// =============================================================================
// ASTEROID SIZE TIER
// =============================================================================

/// Asteroid subdivision level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SizeTier {
    /// Tier 1: smallest, destroyed outright
    Small = 1,
    /// Tier 2
    Medium = 2,
    /// Tier 3: starting size
    Large = 3,
}

impl SizeTier {
    /// Tier produced when this one splits, if any.
    pub fn split(self) -> Option<SizeTier> {
        match self {
            SizeTier::Large => Some(SizeTier::Medium),
            SizeTier::Medium => Some(SizeTier::Small),
            SizeTier::Small => None,
        }
    }

    /// Get tier from its number (1-3).
    pub fn from_u8(value: u8) -> Option<SizeTier> {
        match value {
            1 => Some(SizeTier::Small),
            2 => Some(SizeTier::Medium),
            3 => Some(SizeTier::Large),
            _ => None,
        }
    }

    /// Index into per-tier tables (0-2).
    #[inline]
    pub fn index(self) -> usize {
        self as usize - 1
    }
}

// =============================================================================
// MOVABLE
// =============================================================================

/// Shared body of every entity.
///
/// The bounding box is refreshed whenever the position or the active frame
/// changes, so it always matches the pose used for this tick's collisions.
#[derive(Clone, Debug, Serialize)]
pub struct Movable {
    /// Position and heading
    pub pose: Pose,

    /// Scalar speed along the heading (units/tick)
    pub velocity: i32,

    /// Cumulative distance covered
    pub traveled: i32,

    frames: Frames,
    animation_timer: u32,
    animation_index: usize,
    bounds: Rect,
}

impl Movable {
    /// Create a body at `pose` showing the first of `frames`.
    pub fn new(pose: Pose, velocity: i32, frames: Frames) -> Self {
        let mut body = Self {
            pose,
            velocity,
            traveled: 0,
            frames,
            animation_timer: 0,
            animation_index: 0,
            bounds: Rect::default(),
        };
        body.refresh_bounds();
        body
    }

    /// Advance one step along the heading, wrap, and accumulate distance.
    pub fn integrate(&mut self, ctx: &SimContext) {
        self.pose.advance(self.velocity, ctx.screen.width, ctx.screen.height);
        self.traveled = self.traveled.saturating_add(self.velocity);
        self.refresh_bounds();
    }

    /// Tick the animation clock; every `period` ticks show the next frame.
    ///
    /// Single-frame sprites stay on frame 0.
    pub fn animate(&mut self, period: u32) {
        self.animation_timer += 1;
        if self.animation_timer >= period {
            self.animation_timer = 0;
            self.animation_index += 1;
            if self.animation_index >= self.frames.len() {
                self.animation_index = 0;
            }
            self.refresh_bounds();
        }
    }

    /// Swap the frame sequence (e.g. ship idle/thrust).
    pub fn set_frames(&mut self, frames: &Frames) {
        if self.frames == *frames {
            return;
        }
        self.frames = frames.clone();
        if self.animation_index >= self.frames.len() {
            self.animation_index = 0;
        }
        self.refresh_bounds();
    }

    /// Set the heading. Bounds do not depend on it.
    #[inline]
    pub fn set_rotation(&mut self, rotation: i32) {
        self.pose.set_rotation(rotation);
    }

    /// Current bounding box.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Center of the bounding box.
    #[inline]
    pub fn center(&self) -> (i32, i32) {
        self.bounds.center()
    }

    /// Index of the active sprite frame.
    #[inline]
    pub fn frame_index(&self) -> usize {
        self.animation_index
    }

    /// Size of the active sprite frame.
    #[inline]
    pub fn frame_size(&self) -> FrameSize {
        self.frames.size(self.animation_index)
    }

    fn refresh_bounds(&mut self) {
        let size = self.frame_size();
        self.bounds = Rect::new(self.pose.x, self.pose.y, size.width, size.height);
    }
}

// =============================================================================
// ENTITY KINDS
// =============================================================================

/// Ship-specific state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ShipState {
    /// Thrust held on the last control update (selects the sprite)
    pub thrusting: bool,
}

/// Laser projectile state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ProjectileState {
    /// Alive while `traveled < range`
    pub range: i32,
}

/// Asteroid state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AsteroidState {
    /// Size tier
    pub size: SizeTier,
}

/// Explosion state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExplosionState {
    /// Lifetime in ticks
    pub ttl: u32,
    /// Ticks shown so far
    pub age: u32,
}

/// Kind-specific entity data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    /// The player ship
    Ship(ShipState),
    /// A laser
    Projectile(ProjectileState),
    /// An asteroid
    Asteroid(AsteroidState),
    /// A purely visual explosion
    Explosion(ExplosionState),
}

/// A simulated entity.
#[derive(Clone, Debug, Serialize)]
pub struct Entity {
    /// Unique id
    pub id: EntityId,
    /// Shared body
    pub body: Movable,
    /// Kind-specific state
    pub kind: EntityKind,
}

/// Per-kind behavior hooks used by the tick.
pub trait Behavior {
    /// Advance motion for one tick.
    fn integrate(&mut self, ctx: &SimContext);

    /// Advance the per-draw counters (animation clock, explosion age).
    fn advance_frame(&mut self, ctx: &SimContext);

    /// Is the entity still within its lifetime?
    fn is_alive(&self) -> bool;

    /// Does the entity take part in collision tests?
    fn collides(&self) -> bool;
}

impl Behavior for Entity {
    fn integrate(&mut self, ctx: &SimContext) {
        match self.kind {
            // Explosions never move
            EntityKind::Explosion(_) => {}
            _ => self.body.integrate(ctx),
        }
    }

    fn advance_frame(&mut self, ctx: &SimContext) {
        if let EntityKind::Explosion(ref mut explosion) = self.kind {
            explosion.age += 1;
        }
        self.body.animate(ctx.animation_period);
    }

    fn is_alive(&self) -> bool {
        match self.kind {
            EntityKind::Projectile(p) => self.body.traveled < p.range,
            EntityKind::Explosion(e) => e.ttl > e.age,
            EntityKind::Ship(_) | EntityKind::Asteroid(_) => true,
        }
    }

    fn collides(&self) -> bool {
        !matches!(self.kind, EntityKind::Explosion(_))
    }
}

impl Entity {
    /// Player ship at the configured spawn point, at rest, heading 0°.
    pub fn ship(id: EntityId, config: &SimConfig, sprites: &Sprites) -> Self {
        let (x, y) = config.ship_spawn;
        Self {
            id,
            body: Movable::new(Pose::new(x, y, 0), 0, sprites.ship_idle.clone()),
            kind: EntityKind::Ship(ShipState::default()),
        }
    }

    /// Laser fired from `(x, y)` along `rotation`.
    pub fn projectile(
        id: EntityId,
        x: i32,
        y: i32,
        rotation: i32,
        config: &SimConfig,
        sprites: &Sprites,
    ) -> Self {
        Self {
            id,
            body: Movable::new(
                Pose::new(x, y, rotation),
                config.projectile_speed,
                sprites.projectile.clone(),
            ),
            kind: EntityKind::Projectile(ProjectileState {
                range: config.projectile_range,
            }),
        }
    }

    /// Asteroid of tier `size`.
    pub fn asteroid(
        id: EntityId,
        pose: Pose,
        velocity: i32,
        size: SizeTier,
        sprites: &Sprites,
    ) -> Self {
        Self {
            id,
            body: Movable::new(pose, velocity, sprites.asteroid[size.index()].clone()),
            kind: EntityKind::Asteroid(AsteroidState { size }),
        }
    }

    /// Stationary explosion at `(x, y)`.
    pub fn explosion(id: EntityId, x: i32, y: i32, config: &SimConfig, sprites: &Sprites) -> Self {
        Self {
            id,
            body: Movable::new(Pose::new(x, y, 0), 0, sprites.explosion.clone()),
            kind: EntityKind::Explosion(ExplosionState {
                ttl: config.explosion_ttl,
                age: 0,
            }),
        }
    }

    /// Asteroid size tier, if this is an asteroid.
    pub fn asteroid_size(&self) -> Option<SizeTier> {
        match self.kind {
            EntityKind::Asteroid(a) => Some(a.size),
            _ => None,
        }
    }

    /// Apply one tick of ship controls. No-op for other kinds.
    ///
    /// Turning wraps the heading, thrust raises speed up to the cap and
    /// selects the thrust sprite, brake lowers speed down to the floor.
    pub fn steer(&mut self, input: &InputFrame, limits: &ShipLimits, sprites: &Sprites) {
        let EntityKind::Ship(ref mut ship) = self.kind else {
            return;
        };
        let body = &mut self.body;

        if input.turn_right() {
            body.pose.rotate(-limits.turn_rate);
        }
        if input.turn_left() {
            body.pose.rotate(limits.turn_rate);
        }

        if input.thrust() {
            ship.thrusting = true;
            body.set_frames(&sprites.ship_thrust);
            body.velocity = (body.velocity + limits.thrust_step).min(limits.max_velocity);
        } else {
            ship.thrusting = false;
            body.set_frames(&sprites.ship_idle);
        }

        if input.brake() {
            body.velocity = (body.velocity - limits.brake_step).max(limits.min_velocity);
        }
    }
}
