//! Asteroid Arena entry point
//!
//! Headless runner: loads settings, lets the autopilot play one run and
//! prints a JSON summary. A graphical shell drives `Session` the same way.
//!
//! Usage: `asteroid-arena [settings.json] [max_ticks]`

use std::process::ExitCode;

use glam::Vec2;

use asteroid_arena::sim::{GamePhase, Rotation, Snapshot, ViewKind};
use asteroid_arena::{Session, Settings, normalize_angle};

/// Give up after this many ticks (about 25 minutes of game time)
const DEFAULT_MAX_TICKS: u64 = 60_000;

/// Simple pilot: turn toward the nearest rock, shoot when lined up, jump
/// to hyperspace when something gets too close.
#[derive(Debug, Default)]
struct Autopilot {
    fire_cooldown: u32,
}

impl Autopilot {
    /// Ticks between shots (keeps the fire command edge-triggered)
    const FIRE_INTERVAL: u32 = 6;
    /// Heading error below which the pilot fires
    const AIM_TOLERANCE: f32 = 0.15;
    /// Hyperspace when a rock's centre is closer than this
    const PANIC_DISTANCE: f32 = 45.0;
    /// Thrust toward targets farther than this
    const CHASE_DISTANCE: f32 = 220.0;

    fn steer(&mut self, session: &mut Session, world: Vec2) {
        let snapshot = session.snapshot();
        let Some(craft) = snapshot.entities.iter().find(|v| v.kind == ViewKind::Craft) else {
            session.set_rotation(Rotation::None);
            session.set_thrust(false);
            return;
        };
        let craft_pos = craft.pos.as_vec2();

        let Some((offset, distance)) = nearest_rock(&snapshot, craft_pos, world) else {
            session.set_rotation(Rotation::None);
            session.set_thrust(false);
            return;
        };

        if distance < Self::PANIC_DISTANCE {
            session.trigger_hyperspace();
            return;
        }

        // Heading θ points along (-sin θ, cos θ)
        let desired = (-offset.x).atan2(offset.y);
        let error = normalize_angle(desired - craft.heading);
        let rotation = if error > Self::AIM_TOLERANCE / 2.0 {
            Rotation::Right
        } else if error < -Self::AIM_TOLERANCE / 2.0 {
            Rotation::Left
        } else {
            Rotation::None
        };
        session.set_rotation(rotation);
        session.set_thrust(distance > Self::CHASE_DISTANCE && error.abs() < Self::AIM_TOLERANCE);

        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);
        if error.abs() < Self::AIM_TOLERANCE && self.fire_cooldown == 0 {
            session.fire_once();
            self.fire_cooldown = Self::FIRE_INTERVAL;
        }
    }
}

/// Shortest toroidal offset and distance from the craft to the closest rock
fn nearest_rock(snapshot: &Snapshot, from: Vec2, world: Vec2) -> Option<(Vec2, f32)> {
    snapshot
        .entities
        .iter()
        .filter(|v| matches!(v.kind, ViewKind::Asteroid(_)))
        .map(|v| {
            let mut d = v.pos.as_vec2() - from;
            if d.x.abs() > world.x / 2.0 {
                d.x -= world.x.copysign(d.x);
            }
            if d.y.abs() > world.y / 2.0 {
                d.y -= world.y.copysign(d.y);
            }
            (d, d.length())
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Asteroid Arena (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match Settings::load_from_path(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("Failed to load settings from {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    let max_ticks = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_TICKS);

    let world = Vec2::new(settings.world_width as f32, settings.world_height as f32);
    let mut session = match Session::new(settings) {
        Ok(session) => session,
        Err(err) => {
            log::error!("Invalid settings: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut pilot = Autopilot::default();
    session.start();

    let mut ticks = 0;
    while ticks < max_ticks && session.phase() != GamePhase::GameOver {
        pilot.steer(&mut session, world);
        if let Err(err) = session.tick() {
            log::error!("Tick {ticks} aborted: {err}");
            return ExitCode::FAILURE;
        }
        ticks += 1;
    }

    let snapshot = session.snapshot();
    let summary = serde_json::json!({
        "ticks": ticks,
        "phase": snapshot.phase,
        "level": snapshot.level,
        "score": snapshot.score,
        "live_entities": snapshot.entities.len(),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            log::error!("Failed to encode summary: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
