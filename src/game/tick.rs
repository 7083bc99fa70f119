//! Simulation Tick
//!
//! One fixed step of the game loop. The order of the steps is part of the
//! observable behavior: a laser moves before asteroids test against it, and
//! an asteroid reacts to collisions right after its own motion.
//!
//! Asteroids are walked over a snapshot of their ids taken before step 4.
//! Anything destroyed during the walk is skipped and stops counting as a
//! collision partner; anything spawned waits in [`Pending`] until the tick
//! ends.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::core::pose::{FULL_TURN, Pose, displacement, impact_angle, normalize_degrees};
use crate::game::collision::{BroadPhase, BruteForce, PoolEntry, first_overlap, overlapping};
use crate::game::config::{ConfigError, SimConfig};
use crate::game::entity::{Behavior, Entity, EntityId, SimContext};
use crate::game::events::GameEvent;
use crate::game::input::{InputFrame, InputRecording};
use crate::game::snapshot::RenderSnapshot;
use crate::game::state::{Pending, World};

/// Fragment headings relative to the projectile heading.
const FRAGMENT_SPREAD: [i32; 3] = [0, 45, -45];

/// Result of a tick.
#[derive(Debug)]
pub struct TickResult {
    /// Tick that was simulated
    pub tick: u32,
    /// Events generated this tick, in resolution order
    pub events: Vec<GameEvent>,
    /// World as it should be drawn after this tick
    pub snapshot: RenderSnapshot,
}

/// Run one simulation tick with brute-force pair tests.
pub fn tick(world: &mut World, input: InputFrame) -> TickResult {
    tick_with(world, input, &BruteForce)
}

/// Run one simulation tick.
///
/// # Determinism
///
/// Identical worlds fed identical inputs end in identical states:
/// - Collections are BTreeMaps keyed by monotonic ids
/// - Ids are allocated in resolution order
/// - Broad phases return candidates in pool order
pub fn tick_with(world: &mut World, input: InputFrame, broad: &dyn BroadPhase) -> TickResult {
    // 0. Advance tick counter
    world.tick += 1;
    let ctx = world.context();
    let mut pending = Pending::default();

    // 1. Ship: fire, controls, motion
    update_ship(world, &input, &ctx);

    // 2. Lasers
    update_projectiles(world, &ctx);

    // 3. Explosions
    update_explosions(world, &ctx);

    // 4. Asteroids and everything they can hit
    resolve_asteroids(world, &ctx, broad, &mut pending);

    world.apply_pending(pending);

    // 5. Snapshot for the renderer
    TickResult {
        tick: world.tick,
        events: world.take_events(),
        snapshot: world.snapshot(),
    }
}

// =============================================================================
// STEPS 1-3
// =============================================================================

fn update_ship(world: &mut World, input: &InputFrame, ctx: &SimContext) {
    // Fire from the pre-move position
    if input.fire_pressed() {
        let pose = world.ship.body.pose;
        let (dx, dy) = world.config.muzzle_offset;
        let id = world.spawn_projectile(pose.x + dx, pose.y + dy, pose.rotation);
        trace!(projectile = %id, rotation = pose.rotation, "projectile fired");
        world.push_event(GameEvent::projectile_fired(ctx.tick, id, pose.rotation));
    }

    world.steer_ship(input);
    world.ship.integrate(ctx);
    world.ship.advance_frame(ctx);
}

fn update_projectiles(world: &mut World, ctx: &SimContext) {
    let mut expired = Vec::new();
    for (id, projectile) in world.projectiles.iter_mut() {
        projectile.integrate(ctx);
        projectile.advance_frame(ctx);
        if !projectile.is_alive() {
            expired.push(*id);
        }
    }

    for id in expired {
        world.projectiles.remove(&id);
        trace!(projectile = %id, "projectile expired");
        world.push_event(GameEvent::projectile_expired(ctx.tick, id));
    }
}

fn update_explosions(world: &mut World, ctx: &SimContext) {
    let mut expired = Vec::new();
    for (id, explosion) in world.explosions.iter_mut() {
        explosion.advance_frame(ctx);
        if !explosion.is_alive() {
            expired.push(*id);
        }
    }

    for id in expired {
        world.explosions.remove(&id);
        trace!(explosion = %id, "explosion expired");
        world.push_event(GameEvent::explosion_expired(ctx.tick, id));
    }
}

// =============================================================================
// STEP 4: ASTEROIDS
// =============================================================================

fn resolve_asteroids(
    world: &mut World,
    ctx: &SimContext,
    broad: &dyn BroadPhase,
    pending: &mut Pending,
) {
    let order: Vec<EntityId> = world.asteroids.keys().copied().collect();

    for id in order {
        if pending.is_despawned(id) {
            continue;
        }

        // a. Motion
        let Some(asteroid) = world.asteroids.get_mut(&id) else {
            continue;
        };
        asteroid.integrate(ctx);
        asteroid.advance_frame(ctx);
        let bounds = asteroid.body.bounds();

        // b. Lasers: the first overlapping one destroys the asteroid
        let lasers = live_pool(&world.projectiles, pending, None);
        if let Some(projectile) = first_overlap(broad, &bounds, &lasers) {
            destroy_asteroid(world, id, projectile, ctx, pending);
            continue;
        }

        // c. Ship
        if world.ship.collides() && bounds.intersects(&world.ship.body.bounds()) {
            strike_ship(world, id, ctx, pending);
        }

        // d. Other asteroids. Candidates come from the post-motion box;
        // each pair is re-checked against current boxes before reacting.
        let rocks = live_pool(&world.asteroids, pending, Some(id));
        for other in overlapping(broad, &bounds, &rocks) {
            bounce(world, id, other, ctx);
        }
    }
}

/// Boxes of live, collidable entities in id order.
fn live_pool(
    collection: &BTreeMap<EntityId, Entity>,
    pending: &Pending,
    skip: Option<EntityId>,
) -> Vec<PoolEntry> {
    collection
        .values()
        .filter(|e| Some(e.id) != skip && !pending.is_despawned(e.id) && e.collides())
        .map(|e| (e.id, e.body.bounds()))
        .collect()
}

fn destroy_asteroid(
    world: &mut World,
    asteroid_id: EntityId,
    projectile_id: EntityId,
    ctx: &SimContext,
    pending: &mut Pending,
) {
    let (Some(asteroid), Some(projectile)) = (
        world.asteroids.get(&asteroid_id),
        world.projectiles.get(&projectile_id),
    ) else {
        return;
    };
    let Some(size) = asteroid.asteroid_size() else {
        return;
    };
    let pose = asteroid.body.pose;
    let velocity = asteroid.body.velocity;
    let (cx, cy) = asteroid.body.center();
    let frame = asteroid.body.frame_size();
    let heading = projectile.body.pose.rotation;

    pending.despawn(asteroid_id);
    pending.despawn(projectile_id);

    let explosion = world.make_explosion(pose.x, pose.y);
    let explosion_id = explosion.id;
    pending.spawn(explosion);

    let mut children = Vec::new();
    if let Some(child_size) = size.split() {
        for spread in FRAGMENT_SPREAD {
            let rotation = normalize_degrees(heading + spread);
            let (ox, _) = displacement(rotation, frame.width / 2);
            let (_, oy) = displacement(rotation, frame.height / 2);
            let child = world.make_asteroid(
                Pose::new(cx + ox, cy - oy, rotation),
                velocity,
                child_size,
            );
            children.push(child.id);
            pending.spawn(child);
        }
    }

    debug!(
        tick = ctx.tick,
        asteroid = %asteroid_id,
        projectile = %projectile_id,
        size = size as u8,
        fragments = children.len(),
        "asteroid destroyed"
    );

    world.push_event(GameEvent::asteroid_destroyed(
        ctx.tick,
        asteroid_id,
        projectile_id,
        size,
        children,
    ));
    world.push_event(GameEvent::explosion_spawned(ctx.tick, explosion_id, pose.x, pose.y));
}

fn strike_ship(world: &mut World, asteroid_id: EntityId, ctx: &SimContext, pending: &mut Pending) {
    let ship_id = world.ship.id;
    let pose = world.ship.body.pose;

    let explosion = world.make_explosion(pose.x, pose.y);
    let explosion_id = explosion.id;
    pending.spawn(explosion);

    debug!(tick = ctx.tick, asteroid = %asteroid_id, "ship struck");

    world.push_event(GameEvent::ship_struck(ctx.tick, ship_id, asteroid_id));
    world.push_event(GameEvent::explosion_spawned(ctx.tick, explosion_id, pose.x, pose.y));
}

fn bounce(world: &mut World, id: EntityId, other: EntityId, ctx: &SimContext) {
    let (Some(a), Some(b)) = (world.asteroids.get(&id), world.asteroids.get(&other)) else {
        return;
    };
    if !a.body.bounds().intersects(&b.body.bounds()) {
        return;
    }

    let (ax, ay) = a.body.center();
    let (bx, by) = b.body.center();
    let angle = impact_angle(bx - ax, by - ay);

    if let Some(a) = world.asteroids.get_mut(&id) {
        a.body.set_rotation(-angle + FULL_TURN);
        a.integrate(ctx);
    }
    if let Some(b) = world.asteroids.get_mut(&other) {
        b.body.set_rotation(angle);
        b.integrate(ctx);
    }

    trace!(asteroid = %id, other = %other, angle, "asteroids bounced");
    world.push_event(GameEvent::asteroids_bounced(ctx.tick, id, other, angle));
}

// =============================================================================
// REPLAY
// =============================================================================

/// Replay a run from recorded inputs.
///
/// Returns the final world and every event in order.
pub fn replay(
    config: SimConfig,
    recording: &InputRecording,
) -> Result<(World, Vec<GameEvent>), ConfigError> {
    let mut world = World::new(config)?;
    let mut all_events = Vec::new();

    for (_, input) in recording.replay_iter() {
        let result = tick(&mut world, input);
        all_events.extend(result.events);
    }

    Ok((world, all_events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::collision::UniformGrid;
    use crate::game::entity::{EntityKind, SizeTier};
    use crate::game::events::GameEventData;
    use crate::game::snapshot::RenderKind;

    fn empty_world() -> World {
        let mut config = SimConfig::default();
        config.initial_asteroids.clear();
        World::new(config).unwrap()
    }

    fn idle() -> InputFrame {
        InputFrame::new()
    }

    fn fire() -> InputFrame {
        InputFrame::with_flags(InputFrame::FLAG_FIRE)
    }

    #[test]
    fn test_tick_determinism() {
        let mut world1 = World::new(SimConfig::default()).unwrap();
        let mut world2 = World::new(SimConfig::default()).unwrap();

        for t in 0..300u32 {
            let input = InputFrame::from_keys(t % 7 == 0, t % 11 == 0, t % 3 == 0, t % 13 == 0, t % 9 == 0);
            tick(&mut world1, input);
            tick(&mut world2, input);
        }

        assert_eq!(world1.tick, world2.tick);
        assert_eq!(world1.compute_hash(), world2.compute_hash());
        assert_eq!(world1.live_counts(), world2.live_counts());
    }

    #[test]
    fn test_large_asteroid_splits_into_three() {
        let mut world = empty_world();
        let rock = world.spawn_asteroid(Pose::new(300, 300, 0), 4, SizeTier::Large);
        // Moves to (340, 305) during step 2, inside the rock's box
        let laser = world.spawn_projectile(340, 340, 90);

        let result = tick(&mut world, idle());

        assert!(!world.asteroids.contains_key(&rock));
        assert!(!world.projectiles.contains_key(&laser));
        assert_eq!(world.live_counts().asteroids, 3);
        assert_eq!(world.live_counts().explosions, 1);

        let explosion = world.explosions.values().next().unwrap();
        assert_eq!((explosion.body.pose.x, explosion.body.pose.y), (304, 300));

        let mut headings: Vec<i32> = world.asteroids.values().map(|a| a.body.pose.rotation).collect();
        headings.sort_unstable();
        assert_eq!(headings, vec![45, 90, 135]);

        for child in world.asteroids.values() {
            assert_eq!(child.asteroid_size(), Some(SizeTier::Medium));
            assert_eq!(child.body.velocity, 4);
            assert_eq!(child.body.traveled, 0, "fragments wait for the next tick");
        }

        // Parent center (352, 348), half size 48
        let straight = world
            .asteroids
            .values()
            .find(|a| a.body.pose.rotation == 90)
            .unwrap();
        assert_eq!((straight.body.pose.x, straight.body.pose.y), (352, 300));

        let destroyed = result
            .events
            .iter()
            .find_map(|e| match &e.data {
                GameEventData::AsteroidDestroyed { asteroid, children, .. } => Some((*asteroid, children.len())),
                _ => None,
            })
            .unwrap();
        assert_eq!(destroyed, (rock, 3));
    }

    #[test]
    fn test_small_asteroid_leaves_only_explosion() {
        let mut world = empty_world();
        let rock = world.spawn_asteroid(Pose::new(300, 300, 0), 0, SizeTier::Small);
        world.spawn_projectile(305, 340, 90);

        let result = tick(&mut world, idle());

        assert!(!world.asteroids.contains_key(&rock));
        assert_eq!(world.live_counts().asteroids, 0);
        assert_eq!(world.live_counts().projectiles, 0);
        assert_eq!(world.live_counts().explosions, 1);
        assert!(result.events.iter().any(|e| matches!(
            &e.data,
            GameEventData::AsteroidDestroyed { children, size: SizeTier::Small, .. } if children.is_empty()
        )));
    }

    #[test]
    fn test_first_laser_takes_the_hit() {
        let mut world = empty_world();
        world.spawn_asteroid(Pose::new(300, 300, 0), 0, SizeTier::Small);
        let first = world.spawn_projectile(305, 340, 90);
        let second = world.spawn_projectile(306, 340, 90);

        tick(&mut world, idle());

        assert!(!world.projectiles.contains_key(&first));
        assert!(world.projectiles.contains_key(&second));
    }

    #[test]
    fn test_identical_centers_bounce_to_zero() {
        let mut world = empty_world();
        let a = world.spawn_asteroid(Pose::new(200, 200, 30), 0, SizeTier::Large);
        let b = world.spawn_asteroid(Pose::new(200, 200, 120), 0, SizeTier::Large);

        let result = tick(&mut world, idle());

        assert_eq!(world.asteroids[&a].body.pose.rotation, 0);
        assert_eq!(world.asteroids[&b].body.pose.rotation, 0);
        let bounces = result
            .events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::AsteroidsBounced { .. }))
            .count();
        assert_eq!(bounces, 2);
    }

    #[test]
    fn test_bounce_headings_follow_impact_angle() {
        let mut world = empty_world();
        let a = world.spawn_asteroid(Pose::new(100, 100, 0), 0, SizeTier::Large);
        let b = world.spawn_asteroid(Pose::new(150, 130, 0), 0, SizeTier::Large);

        let result = tick(&mut world, idle());

        // a's turn: angle 30 -> a 330, b 30
        // b's turn: angle -150 -> b 150, a 210
        assert_eq!(world.asteroids[&a].body.pose.rotation, 210);
        assert_eq!(world.asteroids[&b].body.pose.rotation, 150);

        let angles: Vec<i32> = result
            .events
            .iter()
            .filter_map(|e| match e.data {
                GameEventData::AsteroidsBounced { impact_angle, .. } => Some(impact_angle),
                _ => None,
            })
            .collect();
        assert_eq!(angles, vec![30, -150]);
    }

    #[test]
    fn test_bounce_moves_both_asteroids_again() {
        let mut world = empty_world();
        let a = world.spawn_asteroid(Pose::new(200, 200, 0), 5, SizeTier::Large);
        let b = world.spawn_asteroid(Pose::new(270, 200, 180), 5, SizeTier::Large);

        tick(&mut world, idle());

        // a moves to 205 and hits b: both head 0 and step again (a 210, b 275).
        // b moves to 280 and hits a: angle 180, both head 180 and step back.
        let (a, b) = (&world.asteroids[&a].body, &world.asteroids[&b].body);
        assert_eq!(a.pose, Pose::new(205, 200, 180));
        assert_eq!(b.pose, Pose::new(275, 200, 180));
        assert_eq!(a.traveled, 15);
        assert_eq!(b.traveled, 15);
        assert_eq!(a.bounds(), crate::core::rect::Rect::new(205, 200, 96, 96));
    }

    #[test]
    fn test_ship_struck_spawns_explosion_and_survives() {
        let mut world = empty_world();
        world.ship.body.velocity = 3;
        let rock = world.spawn_asteroid(Pose::new(530, 280, 0), 0, SizeTier::Large);

        let result = tick(&mut world, idle());
        let ship_pose = world.ship.body.pose;

        assert_eq!(world.ship.body.velocity, 3);
        assert_eq!(world.live_counts().explosions, 1);
        let explosion = world.explosions.values().next().unwrap();
        assert_eq!((explosion.body.pose.x, explosion.body.pose.y), (ship_pose.x, ship_pose.y));
        assert!(result.events.iter().any(|e| e.data
            == GameEventData::ShipStruck {
                ship: world.ship.id,
                asteroid: rock,
            }));

        // Still overlapping: another explosion every tick
        tick(&mut world, idle());
        assert_eq!(world.live_counts().explosions, 2);
    }

    #[test]
    fn test_projectile_expires_after_range() {
        let mut world = empty_world();
        tick(&mut world, fire());
        assert_eq!(world.live_counts().projectiles, 1);
        let laser = *world.projectiles.keys().next().unwrap();

        // 17 steps of 35 = 595 < 600
        for _ in 1..17 {
            tick(&mut world, idle());
        }
        assert_eq!(world.projectiles[&laser].body.traveled, 595);

        let result = tick(&mut world, idle());
        assert!(world.projectiles.is_empty());
        assert!(result
            .events
            .iter()
            .any(|e| e.data == GameEventData::ProjectileExpired { projectile: laser }));
    }

    #[test]
    fn test_fire_spawns_at_muzzle_and_moves_same_tick() {
        let mut world = empty_world();
        let result = tick(&mut world, fire());

        let laser = world.projectiles.values().next().unwrap();
        assert_eq!((laser.body.pose.x, laser.body.pose.y), (570 + 35, 320));
        assert_eq!(laser.body.pose.rotation, 0);
        assert!(matches!(
            result.events[0].data,
            GameEventData::ProjectileFired { rotation: 0, .. }
        ));
        assert_eq!(
            result.snapshot.count_where(|k| *k == RenderKind::Projectile),
            1
        );
    }

    #[test]
    fn test_shot_splits_rock_and_explosion_lives_fifteen_ticks() {
        // Ship parked left of the first default asteroid's lane
        let config = SimConfig {
            ship_spawn: (0, 60),
            ..SimConfig::default()
        };
        let mut world = World::new(config).unwrap();
        assert_eq!(world.live_counts().asteroids, 2);
        assert!(world.asteroids.values().all(|a| a.asteroid_size() == Some(SizeTier::Large)));
        let target = *world.asteroids.keys().next().unwrap();

        let mut explosion = None;
        let mut visible = 0;
        for t in 0..40u32 {
            let input = if t == 0 { fire() } else { idle() };
            let result = tick(&mut world, input);

            for event in &result.events {
                if let GameEventData::AsteroidDestroyed { asteroid, .. } = event.data {
                    assert_eq!(asteroid, target);
                    assert_eq!(event.tick, 1);
                    assert_eq!(world.live_counts().asteroids, 4);
                }
                if let GameEventData::ExplosionSpawned { explosion: id, .. } = event.data {
                    explosion.get_or_insert(id);
                }
            }
            if let Some(id) = explosion {
                if result.snapshot.get(id).is_some() {
                    visible += 1;
                }
            }
        }

        assert!(explosion.is_some());
        assert_eq!(visible, 15);
    }

    #[test]
    fn test_explosions_never_collide() {
        let mut world = empty_world();
        world.spawn_explosion(550, 300);
        let laser = world.spawn_projectile(560, 310, 0);
        world.projectiles.get_mut(&laser).unwrap().body.velocity = 0;

        let result = tick(&mut world, idle());
        assert!(result.events.is_empty());
        assert_eq!(world.live_counts().projectiles, 1);
    }

    struct Blind;

    impl BroadPhase for Blind {
        fn candidates(&self, _subject: &crate::core::rect::Rect, _pool: &[PoolEntry]) -> Vec<usize> {
            Vec::new()
        }
    }

    #[test]
    fn test_custom_broad_phase_is_used() {
        let mut world = empty_world();
        world.spawn_asteroid(Pose::new(200, 200, 0), 0, SizeTier::Large);
        world.spawn_asteroid(Pose::new(210, 210, 0), 0, SizeTier::Large);

        let result = tick_with(&mut world, idle(), &Blind);
        assert!(result.events.is_empty());
    }

    #[test]
    fn test_grid_broad_phase_matches_brute_force() {
        let mut brute = World::with_scattered_field(SimConfig::default(), 7, 12).unwrap();
        let mut grid = brute.clone();
        let cells = UniformGrid::new(64);

        for t in 0..400u32 {
            let input = InputFrame::from_keys(t % 5 == 0, false, t % 4 == 0, t % 17 == 0, t % 6 == 0);
            let a = tick_with(&mut brute, input, &BruteForce);
            let b = tick_with(&mut grid, input, &cells);
            assert_eq!(a.events, b.events, "diverged at tick {}", t);
        }
        assert_eq!(brute.compute_hash(), grid.compute_hash());
    }

    #[test]
    fn test_ship_is_never_removed() {
        let mut world = World::with_scattered_field(SimConfig::default(), 3, 10).unwrap();
        let thrust = InputFrame::with_flags(InputFrame::FLAG_THRUST | InputFrame::FLAG_TURN_LEFT);
        for _ in 0..500 {
            let result = tick(&mut world, thrust);
            assert!(matches!(result.snapshot.entities[0].kind, RenderKind::Ship { .. }));
        }
        assert!(matches!(world.ship.kind, EntityKind::Ship(_)));
    }

    #[test]
    fn test_empty_replay_runs_no_ticks() {
        let (world, events) = replay(SimConfig::default(), &InputRecording::new()).unwrap();
        assert_eq!(world.tick, 0);
        assert!(events.is_empty());
        assert_eq!(
            world.compute_hash(),
            World::new(SimConfig::default()).unwrap().compute_hash()
        );
    }

    #[test]
    fn test_replay_determinism() {
        let mut world = World::new(SimConfig::default()).unwrap();
        let mut recording = InputRecording::new();

        for t in 0..200u32 {
            let input = InputFrame::from_keys(t % 3 == 0, false, t < 60, t > 150, t % 10 == 0);
            recording.record(world.tick, input);
            tick(&mut world, input);
        }

        let (replayed, events) = replay(SimConfig::default(), &recording).unwrap();
        assert_eq!(replayed.tick, world.tick);
        assert_eq!(replayed.compute_hash(), world.compute_hash());

        let (again, events_again) = replay(SimConfig::default(), &recording).unwrap();
        assert_eq!(again.compute_hash(), replayed.compute_hash());
        assert_eq!(events, events_again);
    }
}
