//! Pose and Motion Math
//!
//! Screen-space pose (integer position, integer degrees) and the
//! rotation-to-displacement decomposition used by every moving entity.
//!
//! ## Conventions
//!
//! ```text
//!   rotation 90°          screen y grows DOWN, rotation follows the
//!        ^                standard trigonometric convention, so the
//!        |                vertical displacement is subtracted:
//!  180 <-+-> 0°
//!        |                  x' = x + floor(v·cos θ)
//!        v                  y' = y - floor(v·sin θ)
//!      270°
//! ```
//!
//! Screen wrap is a snap to the opposite edge, not a modulo.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Full turn in degrees.
pub const FULL_TURN: i32 = 360;

/// Position and heading of an entity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Screen-space X (grows right)
    pub x: i32,
    /// Screen-space Y (grows down)
    pub y: i32,
    /// Heading in degrees, always in [0, 360)
    pub rotation: i32,
}

impl Pose {
    /// Create a pose. The rotation is normalized into [0, 360).
    #[inline]
    pub fn new(x: i32, y: i32, rotation: i32) -> Self {
        Self {
            x,
            y,
            rotation: normalize_degrees(rotation),
        }
    }

    /// Rotate by `delta` degrees, wrapping into [0, 360).
    #[inline]
    pub fn rotate(&mut self, delta: i32) {
        self.rotation = normalize_degrees(self.rotation + delta);
    }

    /// Set the heading, wrapping into [0, 360).
    #[inline]
    pub fn set_rotation(&mut self, rotation: i32) {
        self.rotation = normalize_degrees(rotation);
    }

    /// Advance along the current heading and snap back on screen.
    pub fn advance(&mut self, velocity: i32, width: i32, height: i32) {
        let (dx, dy) = displacement(self.rotation, velocity);
        self.x += dx;
        self.y -= dy;
        self.x = wrap_axis(self.x, width);
        self.y = wrap_axis(self.y, height);
    }
}

impl fmt::Debug for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pose({}, {} @ {}°)", self.x, self.y, self.rotation)
    }
}

/// Wrap an angle in degrees into [0, 360).
#[inline]
pub fn normalize_degrees(degrees: i32) -> i32 {
    degrees.rem_euclid(FULL_TURN)
}

/// Displacement for one step along `rotation` at scalar `velocity`.
///
/// Returns `(floor(v·cos θ), floor(v·sin θ))` in the trigonometric frame.
/// The caller inverts the Y component for screen space.
#[inline]
pub fn displacement(rotation: i32, velocity: i32) -> (i32, i32) {
    let radians = f64::from(rotation).to_radians();
    let v = f64::from(velocity);
    let dx = (v * radians.cos()).floor() as i32;
    let dy = (v * radians.sin()).floor() as i32;
    (dx, dy)
}

/// Snap a coordinate back onto the screen.
///
/// Below zero snaps to `bound`, above `bound` snaps to zero. Values on the
/// closed range `[0, bound]` are left alone.
#[inline]
pub fn wrap_axis(value: i32, bound: i32) -> i32 {
    if value < 0 {
        bound
    } else if value > bound {
        0
    } else {
        value
    }
}

/// Heading of the vector `(dx, dy)` in whole degrees.
///
/// `floor(atan2(dy, dx))`, except a zero `dx` always yields 0.
#[inline]
pub fn impact_angle(dx: i32, dy: i32) -> i32 {
    if dx == 0 {
        return 0;
    }
    f64::from(dy).atan2(f64::from(dx)).to_degrees().floor() as i32
}
