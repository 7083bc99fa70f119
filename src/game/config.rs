//! Simulation Configuration
//!
//! Everything the simulation needs to know up front: screen bounds, sprite
//! frame dimensions, ship control limits and the reference tuning constants.
//! Validated once at world construction so the tick itself never fails.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Configuration errors detected at world construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Screen width or height is zero or negative.
    #[error("screen bounds must be positive, got {width}x{height}")]
    InvalidScreen {
        /// Configured width
        width: i32,
        /// Configured height
        height: i32,
    },

    /// A sprite sequence has no frames.
    #[error("sprite `{0}` has no frames")]
    EmptyFrames(&'static str),

    /// A sprite frame has a zero or negative dimension.
    #[error("sprite `{sprite}` frame {index} has non-positive size {width}x{height}")]
    InvalidFrame {
        /// Sprite name
        sprite: &'static str,
        /// Frame index in the sequence
        index: usize,
        /// Frame width
        width: i32,
        /// Frame height
        height: i32,
    },

    /// Ship minimum velocity exceeds the maximum.
    #[error("ship velocity range is empty: min {min} > max {max}")]
    InvalidVelocityRange {
        /// Lower bound
        min: i32,
        /// Upper bound
        max: i32,
    },

    /// A per-tick counter that must be positive is not.
    #[error("`{0}` must be positive")]
    NonPositive(&'static str),

    /// Asteroid size tier outside 1..=3.
    #[error("asteroid size tier {0} is not in 1..=3")]
    InvalidSizeTier(u8),

    /// Configuration could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Screen dimensions used by screen wrap. Fixed for the whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self {
            width: 1100,
            height: 600,
        }
    }
}

/// Pixel dimensions of one sprite frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl FrameSize {
    /// Create a frame size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Ordered sprite frame sequence for one visual state, as configured.
pub type SpriteFrames = Vec<FrameSize>;

/// A validated, non-empty frame sequence with positive dimensions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Frames(Vec<FrameSize>);

impl Frames {
    /// Validate a frame sequence. `sprite` names it in errors.
    pub fn new(sprite: &'static str, frames: &[FrameSize]) -> Result<Self, ConfigError> {
        if frames.is_empty() {
            return Err(ConfigError::EmptyFrames(sprite));
        }
        for (index, frame) in frames.iter().enumerate() {
            if frame.width <= 0 || frame.height <= 0 {
                return Err(ConfigError::InvalidFrame {
                    sprite,
                    index,
                    width: frame.width,
                    height: frame.height,
                });
            }
        }
        Ok(Self(frames.to_vec()))
    }

    /// Number of frames (always at least one).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a validated sequence.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Frame at `index`, falling back to the first frame.
    #[inline]
    pub fn size(&self, index: usize) -> FrameSize {
        self.0.get(index).copied().unwrap_or(self.0[0])
    }
}

/// Frame dimensions for every sprite the core needs to size bounding boxes.
///
/// The rendering shell owns the bitmaps; the core only needs their sizes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteCatalog {
    /// Ship without thrust
    pub ship_idle: SpriteFrames,
    /// Ship while thrusting
    pub ship_thrust: SpriteFrames,
    /// Laser projectile
    pub projectile: SpriteFrames,
    /// Asteroid sprites indexed by size tier - 1 (small, medium, large)
    pub asteroid: [SpriteFrames; 3],
    /// Explosion animation
    pub explosion: SpriteFrames,
}

impl Default for SpriteCatalog {
    fn default() -> Self {
        Self {
            ship_idle: vec![FrameSize::new(40, 40)],
            ship_thrust: vec![FrameSize::new(40, 40)],
            projectile: vec![FrameSize::new(13, 13)],
            asteroid: [
                vec![FrameSize::new(24, 24)],
                vec![FrameSize::new(48, 48)],
                vec![FrameSize::new(96, 96)],
            ],
            explosion: vec![
                FrameSize::new(64, 64),
                FrameSize::new(64, 64),
                FrameSize::new(64, 64),
            ],
        }
    }
}

/// Validated sprite catalog handed to entity constructors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sprites {
    /// Ship without thrust
    pub ship_idle: Frames,
    /// Ship while thrusting
    pub ship_thrust: Frames,
    /// Laser projectile
    pub projectile: Frames,
    /// Asteroid sprites indexed by size tier - 1
    pub asteroid: [Frames; 3],
    /// Explosion animation
    pub explosion: Frames,
}

impl Sprites {
    /// Validate every sequence in the catalog.
    pub fn from_catalog(catalog: &SpriteCatalog) -> Result<Self, ConfigError> {
        Ok(Self {
            ship_idle: Frames::new("ship_idle", &catalog.ship_idle)?,
            ship_thrust: Frames::new("ship_thrust", &catalog.ship_thrust)?,
            projectile: Frames::new("projectile", &catalog.projectile)?,
            asteroid: [
                Frames::new("asteroid_small", &catalog.asteroid[0])?,
                Frames::new("asteroid_medium", &catalog.asteroid[1])?,
                Frames::new("asteroid_large", &catalog.asteroid[2])?,
            ],
            explosion: Frames::new("explosion", &catalog.explosion)?,
        })
    }
}

/// Ship control limits.
///
/// `min_velocity` is the brake floor. The default is 0 (brake
/// only slows down); the reverse-thrust variant uses -7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipLimits {
    /// Brake floor (units/tick)
    pub min_velocity: i32,
    /// Thrust cap (units/tick)
    pub max_velocity: i32,
    /// Degrees turned per tick while a turn key is held
    pub turn_rate: i32,
    /// Velocity gained per tick of thrust
    pub thrust_step: i32,
    /// Velocity lost per tick of brake
    pub brake_step: i32,
}

impl ShipLimits {
    /// Brake floor of the reverse-thrust variant.
    pub const REVERSE_THRUST_FLOOR: i32 = -7;
}

impl Default for ShipLimits {
    fn default() -> Self {
        Self {
            min_velocity: 0,
            max_velocity: 20,
            turn_rate: 5,
            thrust_step: 1,
            brake_step: 1,
        }
    }
}

/// An asteroid placed in the starting field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsteroidSeed {
    /// Spawn X
    pub x: i32,
    /// Spawn Y
    pub y: i32,
    /// Heading in degrees
    pub rotation: i32,
    /// Speed (units/tick)
    pub velocity: i32,
    /// Size tier (1..=3)
    pub size: u8,
}

/// Complete simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Screen bounds for wrap
    pub screen: ScreenBounds,
    /// Sprite frame dimensions
    pub sprites: SpriteCatalog,
    /// Ship control limits
    pub ship: ShipLimits,
    /// Ship spawn position
    pub ship_spawn: (i32, i32),
    /// Offset from the ship position where lasers appear
    pub muzzle_offset: (i32, i32),
    /// Laser speed (units/tick)
    pub projectile_speed: i32,
    /// Laser range: alive while traveled < range
    pub projectile_range: i32,
    /// Explosion lifetime in ticks
    pub explosion_ttl: u32,
    /// Ticks between animation frame advances
    pub animation_period: u32,
    /// Reference tick rate (Hz), used by the shell for pacing only
    pub tick_rate: u32,
    /// Starting asteroid field
    pub initial_asteroids: Vec<AsteroidSeed>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            screen: ScreenBounds::default(),
            sprites: SpriteCatalog::default(),
            ship: ShipLimits::default(),
            ship_spawn: (550, 300),
            muzzle_offset: (20, 20),
            projectile_speed: 35,
            projectile_range: 600,
            explosion_ttl: 15,
            animation_period: 5,
            tick_rate: crate::TICK_RATE,
            initial_asteroids: vec![
                AsteroidSeed { x: 50, y: 50, rotation: 10, velocity: 5, size: 3 },
                AsteroidSeed { x: 50, y: 150, rotation: 210, velocity: 6, size: 3 },
            ],
        }
    }
}

impl SimConfig {
    /// Check every invariant the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen.width <= 0 || self.screen.height <= 0 {
            return Err(ConfigError::InvalidScreen {
                width: self.screen.width,
                height: self.screen.height,
            });
        }

        Sprites::from_catalog(&self.sprites)?;

        if self.ship.min_velocity > self.ship.max_velocity {
            return Err(ConfigError::InvalidVelocityRange {
                min: self.ship.min_velocity,
                max: self.ship.max_velocity,
            });
        }

        if self.animation_period == 0 {
            return Err(ConfigError::NonPositive("animation_period"));
        }
        if self.explosion_ttl == 0 {
            return Err(ConfigError::NonPositive("explosion_ttl"));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::NonPositive("tick_rate"));
        }

        for seed in &self.initial_asteroids {
            if !(1..=3).contains(&seed.size) {
                return Err(ConfigError::InvalidSizeTier(seed.size));
            }
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration.
    ///
    /// Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Use the reverse-thrust brake floor.
    pub fn with_reverse_thrust(mut self) -> Self {
        self.ship.min_velocity = ShipLimits::REVERSE_THRUST_FLOOR;
        self
    }
}
