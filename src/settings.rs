//! Game settings
//!
//! World dimensions, timings and caps. Timings are stored in milliseconds and
//! converted to tick deadlines once per session.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Tunable parameters for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === World ===
    pub world_width: i32,
    pub world_height: i32,

    // === Timing ===
    /// Fixed tick interval
    pub tick_interval_ms: u32,
    /// Lifetime of every projectile
    pub projectile_ttl_ms: u32,
    /// How long the craft stays in hyperspace
    pub hyperspace_ms: u32,
    /// Delay between clearing a wave and the next wave appearing
    pub level_transition_ms: u32,
    /// Delay between the craft's destruction and the game over screen
    pub game_over_delay_ms: u32,

    // === Rules ===
    /// Cap on simultaneously live player-fired projectiles
    pub max_player_projectiles: usize,
    /// Cap on asteroids per wave
    pub max_wave_size: u32,

    /// RNG seed for wave layout and fragment headings
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,

            tick_interval_ms: TICK_INTERVAL_MS,
            projectile_ttl_ms: PROJECTILE_TTL_MS,
            hyperspace_ms: HYPERSPACE_MS,
            level_transition_ms: LEVEL_TRANSITION_MS,
            game_over_delay_ms: GAME_OVER_DELAY_MS,

            max_player_projectiles: MAX_PLAYER_PROJECTILES,
            max_wave_size: MAX_WAVE_SIZE,

            seed: 0x5EED_A57E,
        }
    }
}

impl Settings {
    /// Convert a duration to a whole number of ticks (at least one)
    pub fn ticks_for(&self, ms: u32) -> u64 {
        let interval = self.tick_interval_ms.max(1);
        u64::from(ms.div_ceil(interval)).max(1)
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_width <= 0 || self.world_height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "world must be non-empty, got {}x{}",
                self.world_width, self.world_height
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick interval must be positive".into()));
        }
        if self.max_player_projectiles == 0 {
            return Err(ConfigError::Invalid(
                "max_player_projectiles must be at least 1".into(),
            ));
        }
        if self.max_wave_size == 0 {
            return Err(ConfigError::Invalid("max_wave_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse settings from a JSON string (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
