//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (timers are tick deadlines)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod state;
pub mod tick;

pub use collision::{Rect, bounding_rect, intersects};
pub use entity::{Entity, EntityId, EntityKind, Owner, Tier};
pub use state::{EntityView, GamePhase, GameState, Snapshot, ViewKind};
pub use tick::{Rotation, TickInput, generate_wave, spawn_fragments, tick};
