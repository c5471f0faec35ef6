//! Game state and core simulation types
//!
//! A `GameState` is one running session: the entity registry, the live
//! counters derived from it, the phase machine and the seeded RNG.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityKind, Owner, Tier};
use super::tick::generate_wave;
use crate::error::{ConfigError, SimError};
use crate::settings::Settings;
use crate::wrap_axis;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No session yet, waiting for a start command
    NotStarted,
    /// Active gameplay
    Playing,
    /// Ticking suspended; every timer is frozen
    Paused,
    /// Wave cleared, next wave appears when the delay runs out
    LevelTransition,
    /// Craft lost, game over is shown when the delay runs out
    CraftDestroyed,
    /// Run ended; only a new start leaves this phase
    GameOver,
}

/// Rendering view of a single live entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewKind {
    Asteroid(Tier),
    Projectile(Owner),
    Craft,
}

/// Read-only entity data for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: ViewKind,
    pub pos: IVec2,
    pub size: IVec2,
    pub heading: f32,
}

/// Everything a shell needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub level: u32,
    pub score: u64,
    pub entities: Vec<EntityView>,
}

/// Complete state of one session (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Timings and caps for this session
    pub settings: Settings,
    /// Current level (1-based once started)
    pub level: u32,
    /// Simulation tick counter; only advances while ticking, so deadlines freeze on pause
    pub time_ticks: u64,
    pub(crate) phase: GamePhase,
    /// Phase to return to when unpausing
    pub(crate) resume_phase: GamePhase,
    /// Tick at which the current timed phase ends
    pub(crate) phase_deadline: Option<u64>,
    pub(crate) rng: Pcg32,
    score: u64,
    /// Live entities (sorted by id for determinism)
    entities: Vec<Entity>,
    craft_id: Option<EntityId>,
    live_hostiles: usize,
    live_player_projectiles: usize,
    next_id: EntityId,
}

impl GameState {
    /// Create an idle state; nothing exists until `start`.
    ///
    /// Settings are validated here, so a zero-sized world never reaches the
    /// wraparound math.
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let rng = Pcg32::seed_from_u64(settings.seed);
        Ok(Self {
            settings,
            level: 0,
            time_ticks: 0,
            phase: GamePhase::NotStarted,
            resume_phase: GamePhase::NotStarted,
            phase_deadline: None,
            rng,
            score: 0,
            entities: Vec::new(),
            craft_id: None,
            live_hostiles: 0,
            live_player_projectiles: 0,
            next_id: 1,
        })
    }

    /// Begin a fresh run: clear everything, place the craft, spawn wave one.
    ///
    /// Valid from any phase; the RNG keeps running so consecutive runs differ.
    pub fn start(&mut self) {
        self.entities.clear();
        self.live_hostiles = 0;
        self.live_player_projectiles = 0;
        self.next_id = 1;
        self.score = 0;
        self.time_ticks = 0;
        self.phase_deadline = None;
        self.level = 1;

        let center = self.world() / 2;
        let id = self.next_entity_id();
        self.entities.push(Entity::craft(id, center));
        self.craft_id = Some(id);

        generate_wave(self);
        self.phase = GamePhase::Playing;
        self.resume_phase = GamePhase::Playing;
        log::info!(
            "Session started: level {}, {} asteroids",
            self.level,
            self.live_hostiles
        );
    }

    /// World bounds used for wraparound
    #[inline]
    pub fn world(&self) -> IVec2 {
        IVec2::new(self.settings.world_width, self.settings.world_height)
    }

    /// Wrap a point into world bounds
    pub fn wrap(&self, pos: IVec2) -> IVec2 {
        let world = self.world();
        IVec2::new(wrap_axis(pos.x, world.x), wrap_axis(pos.y, world.y))
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Number of live hostile bodies; zero means the level is clear
    #[inline]
    pub fn live_hostiles(&self) -> usize {
        self.live_hostiles
    }

    /// Number of live player-fired projectiles
    #[inline]
    pub fn live_player_projectiles(&self) -> usize {
        self.live_player_projectiles
    }

    /// All entities in the registry, in id order
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Score only ever grows
    pub(crate) fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Registry index of the craft, if it is still present
    pub fn craft_index(&self) -> Option<usize> {
        let id = self.craft_id?;
        self.entities.iter().position(|e| e.id == id)
    }

    /// The craft, if it is still in the registry
    pub fn craft(&self) -> Option<&Entity> {
        self.craft_index().map(|idx| &self.entities[idx])
    }

    /// True once the craft has been destroyed (or was never created)
    pub fn craft_destroyed(&self) -> bool {
        self.craft().is_none_or(Entity::is_destroyed)
    }

    /// Add an asteroid to the registry
    pub fn spawn_asteroid(&mut self, pos: IVec2, tier: Tier, heading: f32) -> EntityId {
        let id = self.next_entity_id();
        let pos = self.wrap(pos);
        let asteroid = Entity::asteroid(id, pos, tier, heading, &mut self.rng);
        self.entities.push(asteroid);
        self.live_hostiles += 1;
        log::debug!("Spawned {:?} asteroid {} at {}", tier, id, pos);
        id
    }

    /// Add a projectile to the registry.
    ///
    /// Player shots are refused with `None` once the live cap is reached;
    /// hostile shots are never capped.
    pub fn spawn_projectile(&mut self, pos: IVec2, heading: f32, owner: Owner) -> Option<EntityId> {
        if owner == Owner::Player
            && self.live_player_projectiles >= self.settings.max_player_projectiles
        {
            log::debug!(
                "Shot refused: {} player projectiles live",
                self.live_player_projectiles
            );
            return None;
        }

        let id = self.next_entity_id();
        let pos = self.wrap(pos);
        let expires_at = self.time_ticks + self.settings.ticks_for(self.settings.projectile_ttl_ms);
        self.entities
            .push(Entity::projectile(id, pos, heading, owner, expires_at));
        if owner == Owner::Player {
            self.live_player_projectiles += 1;
        }
        Some(id)
    }

    /// Destroy the entity at `idx`, keeping the live counters in step
    pub(crate) fn destroy_at(&mut self, idx: usize) -> Result<(), SimError> {
        let entity = &mut self.entities[idx];
        entity.destroy()?;
        if entity.is_hostile() {
            self.live_hostiles -= 1;
        } else if entity.is_player_projectile() {
            self.live_player_projectiles -= 1;
        }
        Ok(())
    }

    /// Destroy an entity by id
    pub fn destroy(&mut self, id: EntityId) -> Result<(), SimError> {
        let idx = self
            .entities
            .iter()
            .position(|e| e.id == id)
            .ok_or(SimError::UnknownEntity { id })?;
        self.destroy_at(idx)
    }

    /// Drop every destroyed entity from the registry
    pub(crate) fn remove_destroyed(&mut self) {
        self.entities.retain(|e| !e.is_destroyed());
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }

    /// Suspend ticking. No-op unless a run is in progress.
    pub fn pause(&mut self) {
        match self.phase {
            GamePhase::Playing | GamePhase::LevelTransition | GamePhase::CraftDestroyed => {
                self.resume_phase = self.phase;
                self.phase = GamePhase::Paused;
                log::info!("Paused at tick {}", self.time_ticks);
            }
            _ => {}
        }
    }

    /// Resume ticking. No-op unless paused.
    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = self.resume_phase;
            log::info!("Resumed ({:?})", self.phase);
        }
    }

    /// Pause when running, resume when paused
    pub fn toggle_pause(&mut self) {
        if self.phase == GamePhase::Paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Render-ready view of the world. A craft in hyperspace is hidden.
    pub fn snapshot(&self) -> Snapshot {
        let entities = self
            .entities
            .iter()
            .filter(|e| !e.is_destroyed() && !e.is_invulnerable())
            .map(|e| EntityView {
                id: e.id,
                kind: match e.kind {
                    EntityKind::Asteroid { tier } => ViewKind::Asteroid(tier),
                    EntityKind::Projectile { owner, .. } => ViewKind::Projectile(owner),
                    EntityKind::Craft { .. } => ViewKind::Craft,
                },
                pos: e.pos,
                size: e.size(),
                heading: e.heading,
            })
            .collect();

        Snapshot {
            phase: self.phase,
            level: self.level,
            score: self.score,
            entities,
        }
    }

    /// Check registry-wide consistency rules
    pub fn validate_invariants(&self) -> Result<(), SimError> {
        let world = self.world();
        let mut hostiles = 0;
        let mut player_shots = 0;
        let mut crafts = 0;
        let mut last_id = 0;

        for e in &self.entities {
            if e.id <= last_id {
                return Err(SimError::InvariantBroken {
                    rule: "registry ids must be unique and ascending",
                });
            }
            last_id = e.id;

            if e.pos.x < 0 || e.pos.x >= world.x || e.pos.y < 0 || e.pos.y >= world.y {
                return Err(SimError::InvariantBroken {
                    rule: "entity outside world bounds",
                });
            }

            if e.is_destroyed() {
                continue;
            }
            if e.is_hostile() {
                e.tier()?;
                hostiles += 1;
            } else if e.is_player_projectile() {
                player_shots += 1;
            } else if e.is_craft() {
                crafts += 1;
            }
        }

        if hostiles != self.live_hostiles {
            return Err(SimError::InvariantBroken {
                rule: "live hostile count out of sync with registry",
            });
        }
        if player_shots != self.live_player_projectiles {
            return Err(SimError::InvariantBroken {
                rule: "live projectile count out of sync with registry",
            });
        }
        if player_shots > self.settings.max_player_projectiles {
            return Err(SimError::InvariantBroken {
                rule: "player projectile cap exceeded",
            });
        }
        if crafts > 1 {
            return Err(SimError::InvariantBroken {
                rule: "more than one craft",
            });
        }
        Ok(())
    }
}
