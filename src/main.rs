use std::sync::Arc;

use arcade_drive::config::load_config;
use arcade_drive::state::GameState;
use arcade_drive::{InputCollector, Key, PhysicsWorld, ARCADE};
use nalgebra::UnitQuaternion;
use rapier3d::prelude::vector;
use tokio::sync::Mutex;
use tokio::time::{interval, sleep, Duration};
use tracing_subscriber::EnvFilter;

const TICK_HZ: u64 = 60;

/// Demo input: (held keys, duration in ms), looped forever.
const SCRIPT: &[(&[Key], u64)] = &[
    (&[], 1_000),
    (&[Key::Forward], 3_000),
    (&[Key::Forward, Key::Left], 1_500),
    (&[], 1_000),
    (&[Key::Back], 1_000),
    (&[Key::Right], 800),
    (&[Key::Flip], 100),
    (&[], 1_500),
    (&[Key::Reset], 100),
];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    tracing::info!("🚀 Starting arcade-drive host...");

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path).unwrap_or_else(|err| {
            tracing::error!(%err, "falling back to the ARCADE preset");
            ARCADE
        }),
        None => ARCADE,
    };

    let mut physics = PhysicsWorld::new();
    // ramp ahead of the spawn, rising toward +Z
    physics.add_static_box(
        vector![0.0, 0.0, 25.0],
        vector![4.0, 0.5, 6.0],
        UnitQuaternion::from_euler_angles(-0.25, 0.0, 0.0),
    );

    let mut game = GameState::new();
    let player = game.add_vehicle(&mut physics, config);

    // Single writer: the driver task. The tick loop reads one snapshot per tick.
    let input = Arc::new(Mutex::new(InputCollector::new()));
    tokio::spawn(scripted_driver(Arc::clone(&input)));

    // Fixed timestep: 60 Hz
    let dt = 1.0 / TICK_HZ as f32;
    let mut ticker = interval(Duration::from_micros(1_000_000 / TICK_HZ));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                tracing::info!("👋 shutting down");
                break;
            }
        }

        let held = input.lock().await.snapshot();
        game.update_input(&player, held);

        let snap = game.step_world(&mut physics, dt);

        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Ok(json) = serde_json::to_string(&snap) {
                tracing::debug!(%json, "snapshot");
            }
        }

        if snap.tick % TICK_HZ == 0 {
            if let Some(v) = snap.vehicles.first() {
                tracing::info!(
                    tick = snap.tick,
                    position = ?v.debug.chassis.position,
                    speed = format_args!("{:.2}", v.speed),
                    grounded = v.grounded_wheels,
                    "🚗 status"
                );
            }
        }
    }
}

async fn scripted_driver(input: Arc<Mutex<InputCollector>>) {
    loop {
        for (keys, ms) in SCRIPT {
            {
                let mut collector = input.lock().await;
                collector.release_all();
                for key in keys.iter() {
                    collector.key_down(*key);
                }
            }
            sleep(Duration::from_millis(*ms)).await;
        }
    }
}
