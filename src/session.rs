//! Session command surface
//!
//! What a presentation/input shell talks to: lifecycle commands, per-frame
//! intents and read-only queries. Intents are buffered here and handed to the
//! simulation once per tick; one-shot intents are cleared afterwards.

use crate::error::{ConfigError, SimError};
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, Rotation, Snapshot, TickInput, tick};

/// A game session driven by an external shell
#[derive(Debug, Clone)]
pub struct Session {
    state: GameState,
    input: TickInput,
}

impl Session {
    /// Create an idle session. Fails if the settings are unusable.
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            state: GameState::new(settings)?,
            input: TickInput::default(),
        })
    }

    /// Begin a new run, discarding any previous one
    pub fn start(&mut self) {
        self.input = TickInput::default();
        self.state.start();
    }

    pub fn pause(&mut self) {
        self.state.pause();
    }

    pub fn resume(&mut self) {
        self.state.resume();
    }

    pub fn toggle_pause(&mut self) {
        self.state.toggle_pause();
    }

    /// Window lost focus: pause a running game
    pub fn focus_lost(&mut self) {
        self.state.pause();
    }

    /// True while a run is in progress (including paused and timed phases)
    fn in_run(&self) -> bool {
        !matches!(
            self.state.phase(),
            GamePhase::NotStarted | GamePhase::GameOver
        )
    }

    /// True while the craft accepts one-shot commands
    fn accepts_commands(&self) -> bool {
        matches!(
            self.state.phase(),
            GamePhase::Playing | GamePhase::LevelTransition
        )
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        if self.in_run() {
            self.input.rotation = rotation;
        }
    }

    pub fn set_thrust(&mut self, thrust: bool) {
        if self.in_run() {
            self.input.thrust = thrust;
        }
    }

    /// Request a single shot on the next tick (call once per key press)
    pub fn fire_once(&mut self) {
        if self.accepts_commands() {
            self.input.fire += 1;
        }
    }

    /// Request hyperspace on the next tick
    pub fn trigger_hyperspace(&mut self) {
        if self.accepts_commands() {
            self.input.hyperspace = true;
        }
    }

    /// Advance one frame. No-op before start, while paused and after game over.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let result = tick(&mut self.state, &self.input);

        // Clear one-shot inputs after processing
        self.input.fire = 0;
        self.input.hyperspace = false;
        result
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn score(&self) -> u64 {
        self.state.score()
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    /// Read-only access to the underlying simulation
    pub fn state(&self) -> &GameState {
        &self.state
    }
}
