//! Render Snapshot
//!
//! Read-only view of the world after a tick. The presentation shell draws
//! from this and never touches simulation state.

use serde::{Serialize, Deserialize};

use crate::game::entity::{Entity, EntityId, EntityKind, SizeTier};
use crate::game::state::World;

/// Which sprite sequence an entity is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderKind {
    /// Ship, idle or thrusting
    Ship {
        /// Thrust sprite selected
        thrusting: bool,
    },
    /// Laser
    Projectile,
    /// Asteroid of a given tier
    Asteroid {
        /// Size tier
        size: SizeTier,
    },
    /// Explosion effect
    Explosion,
}

/// One drawable entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderEntity {
    /// Entity id
    pub id: EntityId,
    /// Sprite selection
    pub kind: RenderKind,
    /// Top-left x
    pub x: i32,
    /// Top-left y
    pub y: i32,
    /// Heading in degrees, [0, 360)
    pub rotation: i32,
    /// Active animation frame
    pub frame: usize,
}

impl RenderEntity {
    fn from_entity(entity: &Entity) -> Self {
        let kind = match entity.kind {
            EntityKind::Ship(ship) => RenderKind::Ship {
                thrusting: ship.thrusting,
            },
            EntityKind::Projectile(_) => RenderKind::Projectile,
            EntityKind::Asteroid(asteroid) => RenderKind::Asteroid {
                size: asteroid.size,
            },
            EntityKind::Explosion(_) => RenderKind::Explosion,
        };
        Self {
            id: entity.id,
            kind,
            x: entity.body.pose.x,
            y: entity.body.pose.y,
            rotation: entity.body.pose.rotation,
            frame: entity.body.frame_index(),
        }
    }
}

/// Everything the shell needs to draw one frame.
///
/// Entities are listed in draw order: ship, projectiles, explosions,
/// asteroids, each group by ascending id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    /// Tick this snapshot was taken after
    pub tick: u32,
    /// Drawable entities
    pub entities: Vec<RenderEntity>,
}

impl RenderSnapshot {
    /// Capture the current world.
    pub fn capture(world: &World) -> Self {
        let entities = std::iter::once(&world.ship)
            .chain(world.projectiles.values())
            .chain(world.explosions.values())
            .chain(world.asteroids.values())
            .map(RenderEntity::from_entity)
            .collect();

        Self {
            tick: world.tick,
            entities,
        }
    }

    /// Number of entities whose kind matches `pred`.
    pub fn count_where(&self, pred: impl Fn(&RenderKind) -> bool) -> usize {
        self.entities.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Find an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&RenderEntity> {
        self.entities.iter().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::SimConfig;

    #[test]
    fn test_snapshot_draw_order() {
        let mut world = World::new(SimConfig::default()).unwrap();
        let laser = world.spawn_projectile(10, 10, 0);
        let boom = world.spawn_explosion(20, 20);

        let snapshot = world.snapshot();
        let kinds: Vec<_> = snapshot.entities.iter().map(|e| e.kind).collect();
        assert_eq!(kinds[0], RenderKind::Ship { thrusting: false });
        assert_eq!(kinds[1], RenderKind::Projectile);
        assert_eq!(kinds[2], RenderKind::Explosion);
        assert_eq!(kinds[3], RenderKind::Asteroid { size: SizeTier::Large });
        assert_eq!(snapshot.entities.len(), 5);

        assert_eq!(snapshot.get(laser).map(|e| (e.x, e.y)), Some((10, 10)));
        assert_eq!(snapshot.get(boom).map(|e| e.frame), Some(0));
        assert_eq!(
            snapshot.count_where(|k| matches!(k, RenderKind::Asteroid { .. })),
            2
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let world = World::new(SimConfig::default()).unwrap();
        let snapshot = world.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: RenderSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
