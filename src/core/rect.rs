//! Axis-Aligned Bounding Boxes
//!
//! Narrow-phase collision shape for every entity. The rectangle is anchored
//! at the entity position (top-left) and sized by the active sprite frame.

use serde::{Serialize, Deserialize};

/// Axis-aligned rectangle in screen space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width (pixels)
    pub w: i32,
    /// Height (pixels)
    pub h: i32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Integer center point.
    #[inline]
    pub const fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Does this rectangle have a positive area?
    #[inline]
    pub const fn has_area(&self) -> bool {
        self.w > 0 && self.h > 0
    }

    /// Check if two rectangles overlap.
    ///
    /// Shared edges do not count as overlap, and empty rectangles never
    /// overlap anything.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.has_area()
            && other.has_area()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let right = Rect::new(10, 0, 10, 10);
        let below = Rect::new(0, 10, 10, 10);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
    }

    #[test]
    fn test_contained() {
        let outer = Rect::new(0, 0, 100, 100);
        let inner = Rect::new(40, 40, 5, 5);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn test_empty_rect_never_overlaps() {
        let a = Rect::new(0, 0, 10, 10);
        let empty = Rect::new(5, 5, 0, 3);
        assert!(!a.intersects(&empty));
        assert!(!empty.intersects(&empty));
    }

    #[test]
    fn test_center() {
        assert_eq!(Rect::new(10, 20, 30, 40).center(), (25, 40));
        assert_eq!(Rect::new(0, 0, 5, 5).center(), (2, 2));
    }
}
