//! Asteroid Field
//!
//! Headless driver: runs a scripted session against the simulation core,
//! logs what happens, then replays the recorded inputs and checks that the
//! final state hash matches.
//!
//! Usage: `asteroid-field [config.json]`

use std::fs;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use asteroid_field::{
    TICK_RATE, VERSION,
    game::{
        config::SimConfig,
        events::GameEventData,
        input::{InputRecording, InputSampler, KeyState},
        state::World,
        tick::{replay, tick},
    },
};

/// Length of the scripted session (20 seconds at the reference rate).
const SESSION_TICKS: u32 = 20 * TICK_RATE;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Asteroid Field v{}", VERSION);

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            SimConfig::from_json(&json).with_context(|| format!("parsing config {}", path))?
        }
        None => SimConfig::default(),
    };
    info!(
        "Screen {}x{}, {} Hz, {} starting asteroids",
        config.screen.width,
        config.screen.height,
        config.tick_rate,
        config.initial_asteroids.len()
    );

    demo_session(config)
}

/// Scripted key state for a tick: sweep the guns around, tap fire, thrust
/// in bursts and brake near the end.
fn scripted_keys(t: u32) -> KeyState {
    KeyState {
        turn_left: (t / 45) % 2 == 0,
        turn_right: false,
        thrust: (t / 90) % 3 == 1,
        brake: t > SESSION_TICKS - 60,
        fire: t % 8 < 2,
    }
}

fn demo_session(config: SimConfig) -> Result<()> {
    info!("=== Starting Session ===");

    let mut world = World::new(config.clone()).context("building world")?;
    let mut sampler = InputSampler::new();
    let mut recording = InputRecording::new();

    let mut total_events = 0;
    for t in 0..SESSION_TICKS {
        let input = sampler.sample(scripted_keys(t));
        recording.record(world.tick, input);

        let result = tick(&mut world, input);
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::AsteroidDestroyed { asteroid, size, children, .. } => {
                    info!(
                        "Tick {}: asteroid {} ({:?}) destroyed, {} fragments",
                        event.tick,
                        asteroid,
                        size,
                        children.len()
                    );
                }
                GameEventData::ShipStruck { asteroid, .. } => {
                    info!("Tick {}: ship struck by asteroid {}", event.tick, asteroid);
                }
                _ => {}
            }
        }

        if result.tick % (5 * TICK_RATE) == 0 {
            let counts = world.live_counts();
            info!(
                "Tick {}: {} asteroids, {} lasers, {} explosions",
                result.tick, counts.asteroids, counts.projectiles, counts.explosions
            );
        }
    }

    info!("=== Session Results ===");
    let hash = world.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Total events: {}", total_events);
    info!("Recorded {} input changes", recording.delta_count());

    info!("=== Verifying Determinism ===");
    let (replayed, _) = replay(config, &recording).context("replaying session")?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("determinism failure: replay hash differs");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}
