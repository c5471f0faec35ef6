//! Asteroid Arena - a drifting-rock arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, waves, phases)
//! - `session`: Command surface for a presentation/input shell
//! - `settings`: Data-driven timings and world dimensions
//! - `error`: Invariant violations and configuration errors

pub mod error;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, SimError};
pub use session::Session;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed tick interval in milliseconds
    pub const TICK_INTERVAL_MS: u32 = 25;

    /// World dimensions
    pub const WORLD_WIDTH: i32 = 640;
    pub const WORLD_HEIGHT: i32 = 480;

    /// Asteroid tier sizes (square bounding boxes)
    pub const LARGE_SIZE: i32 = 57;
    pub const MEDIUM_SIZE: i32 = 29;
    pub const SMALL_SIZE: i32 = 15;

    /// Asteroid tier scores
    pub const LARGE_SCORE: u64 = 20;
    pub const MEDIUM_SCORE: u64 = 50;
    pub const SMALL_SCORE: u64 = 100;

    /// Large asteroids drift at a fixed speed plus a constant bias on both axes
    pub const LARGE_SPEED: f32 = 1.5;
    pub const LARGE_DRIFT_BIAS: f32 = 0.5;
    /// Fragments get a random speed in [FRAGMENT_MIN_SPEED, tier max)
    pub const FRAGMENT_MIN_SPEED: f32 = 1.0;
    pub const MEDIUM_MAX_SPEED: f32 = 2.5;
    pub const SMALL_MAX_SPEED: f32 = 4.0;
    /// Fragments produced by a Large or Medium asteroid
    pub const FRAGMENTS_PER_BREAK: usize = 2;

    /// Projectile defaults
    pub const PROJECTILE_SIZE: i32 = 3;
    pub const PROJECTILE_SPEED: f32 = 10.0;
    pub const PROJECTILE_TTL_MS: u32 = 700;
    pub const MAX_PLAYER_PROJECTILES: usize = 4;
    /// Projectiles spawn this far ahead of the craft
    pub const MUZZLE_OFFSET: f32 = 11.0;

    /// Craft defaults
    pub const CRAFT_WIDTH: i32 = 15;
    pub const CRAFT_HEIGHT: i32 = 23;
    /// Velocity multiplier applied every tick (space friction)
    pub const CRAFT_DECAY: f32 = 0.99;
    pub const CRAFT_ACCELERATION: f32 = 0.2;
    /// Thrust is ignored above this speed
    pub const CRAFT_MAX_SPEED: f32 = 7.0;
    /// Rotation step per tick (8 degrees)
    pub const CRAFT_ROTATION_STEP: f32 = std::f32::consts::TAU / 45.0;
    /// Initial heading (pointing up in screen coordinates)
    pub const CRAFT_START_HEADING: f32 = std::f32::consts::PI;

    /// Timed transitions in milliseconds
    pub const HYPERSPACE_MS: u32 = 500;
    pub const LEVEL_TRANSITION_MS: u32 = 1000;
    pub const GAME_OVER_DELAY_MS: u32 = 1000;

    /// Wave sizing: min(level + WAVE_BASE, MAX_WAVE_SIZE)
    pub const WAVE_BASE: u32 = 3;
    pub const MAX_WAVE_SIZE: u32 = 12;
    /// Wave asteroids spawn in an annulus around the craft
    pub const SPAWN_MIN_DISTANCE: f32 = 100.0;
    pub const SPAWN_MAX_DISTANCE: f32 = 240.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Wrap a coordinate onto a torus axis of length `bound`, yielding [0, bound)
#[inline]
pub fn wrap_axis(value: i32, bound: i32) -> i32 {
    value.rem_euclid(bound)
}

/// Unit direction for a heading angle.
///
/// Heading 0 points toward +y (down the screen), heading π points up.
#[inline]
pub fn heading_vector(theta: f32) -> Vec2 {
    Vec2::new(-theta.sin(), theta.cos())
}

/// Number of wave asteroids generated for a level
#[inline]
pub fn wave_size(level: u32, max_wave: u32) -> u32 {
    (level + consts::WAVE_BASE).min(max_wave)
}
