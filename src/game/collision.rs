//! Collision Detection
//!
//! Two phases: a pluggable [`BroadPhase`] picks candidate boxes from a pool,
//! then the narrow phase keeps the ones whose rectangles really overlap.
//! Reaction policy lives in the tick; nothing here mutates entities.

use std::collections::BTreeMap;

use crate::core::rect::Rect;
use crate::game::entity::EntityId;

/// A collision pool entry: entity id and its current bounding box.
pub type PoolEntry = (EntityId, Rect);

/// Candidate selection for pair tests.
///
/// Implementations must return indices into `pool` in ascending order and
/// must never drop a pair that actually overlaps.
pub trait BroadPhase {
    /// Indices of pool entries that may overlap `subject`.
    fn candidates(&self, subject: &Rect, pool: &[PoolEntry]) -> Vec<usize>;
}

/// Every pool entry is a candidate. O(n) per query, O(n²) per tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForce;

impl BroadPhase for BruteForce {
    fn candidates(&self, _subject: &Rect, pool: &[PoolEntry]) -> Vec<usize> {
        (0..pool.len()).collect()
    }
}

/// Uniform grid: only entries sharing at least one cell with the subject.
#[derive(Clone, Copy, Debug)]
pub struct UniformGrid {
    cell_size: i32,
}

impl UniformGrid {
    /// Create a grid with square cells of `cell_size` pixels (at least 1).
    pub fn new(cell_size: i32) -> Self {
        Self {
            cell_size: cell_size.max(1),
        }
    }

    /// Inclusive cell range `(min_cx, min_cy, max_cx, max_cy)` covered by `rect`.
    fn cell_span(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        let last_x = rect.right().max(rect.x + 1) - 1;
        let last_y = rect.bottom().max(rect.y + 1) - 1;
        (
            rect.x.div_euclid(self.cell_size),
            rect.y.div_euclid(self.cell_size),
            last_x.div_euclid(self.cell_size),
            last_y.div_euclid(self.cell_size),
        )
    }
}

impl BroadPhase for UniformGrid {
    fn candidates(&self, subject: &Rect, pool: &[PoolEntry]) -> Vec<usize> {
        // Bucket the pool by cell
        let mut cells: BTreeMap<(i32, i32), Vec<usize>> = BTreeMap::new();
        for (index, (_, rect)) in pool.iter().enumerate() {
            let (x0, y0, x1, y1) = self.cell_span(rect);
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    cells.entry((cx, cy)).or_default().push(index);
                }
            }
        }

        let (x0, y0, x1, y1) = self.cell_span(subject);
        let mut found = Vec::new();
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(bucket) = cells.get(&(cx, cy)) {
                    found.extend_from_slice(bucket);
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }
}

/// Ids of pool entries whose boxes overlap `subject`, in pool order.
pub fn overlapping(broad: &dyn BroadPhase, subject: &Rect, pool: &[PoolEntry]) -> Vec<EntityId> {
    broad
        .candidates(subject, pool)
        .into_iter()
        .filter_map(|index| pool.get(index))
        .filter(|(_, rect)| subject.intersects(rect))
        .map(|(id, _)| *id)
        .collect()
}

/// First pool entry overlapping `subject`, if any.
pub fn first_overlap(broad: &dyn BroadPhase, subject: &Rect, pool: &[PoolEntry]) -> Option<EntityId> {
    broad
        .candidates(subject, pool)
        .into_iter()
        .filter_map(|index| pool.get(index))
        .find(|(_, rect)| subject.intersects(rect))
        .map(|(id, _)| *id)
}
