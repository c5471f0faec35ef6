//! Entities and their per-kind behaviour
//!
//! Every simulated object shares one record (`Entity`); what differs between
//! asteroids, projectiles and the craft lives in `EntityKind` and the small
//! set of methods that match on it.

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;
use crate::{heading_vector, wrap_axis};

/// Registry key, unique for the lifetime of a session
pub type EntityId = u32;

/// Asteroid size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Large,
    Medium,
    Small,
}

impl Tier {
    /// Side length of the square bounding box
    pub fn size(self) -> i32 {
        match self {
            Tier::Large => LARGE_SIZE,
            Tier::Medium => MEDIUM_SIZE,
            Tier::Small => SMALL_SIZE,
        }
    }

    /// Score awarded for destroying an asteroid of this tier
    pub fn score(self) -> u64 {
        match self {
            Tier::Large => LARGE_SCORE,
            Tier::Medium => MEDIUM_SCORE,
            Tier::Small => SMALL_SCORE,
        }
    }

    /// Tier of the fragments left behind, `None` for the smallest tier
    pub fn fragment_tier(self) -> Option<Tier> {
        match self {
            Tier::Large => Some(Tier::Medium),
            Tier::Medium => Some(Tier::Small),
            Tier::Small => None,
        }
    }

    /// Recover the tier from a bounding box width
    pub fn from_width(id: EntityId, width: i32) -> Result<Tier, SimError> {
        match width {
            LARGE_SIZE => Ok(Tier::Large),
            MEDIUM_SIZE => Ok(Tier::Medium),
            SMALL_SIZE => Ok(Tier::Small),
            _ => Err(SimError::NonStandardSize { id, width }),
        }
    }

    /// Drift velocity for a freshly spawned asteroid of this tier.
    ///
    /// Large rocks move at a fixed speed with a constant bias; fragments pick
    /// a random speed so smaller pieces are faster and less predictable.
    pub fn velocity(self, heading: f32, rng: &mut impl Rng) -> Vec2 {
        let dir = Vec2::new(heading.sin(), heading.cos());
        match self {
            Tier::Large => dir * LARGE_SPEED + Vec2::splat(LARGE_DRIFT_BIAS),
            Tier::Medium => dir * rng.random_range(FRAGMENT_MIN_SPEED..MEDIUM_MAX_SPEED),
            Tier::Small => dir * rng.random_range(FRAGMENT_MIN_SPEED..SMALL_MAX_SPEED),
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Hostile,
}

/// Kind-specific state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Fragmenting hostile body
    Asteroid { tier: Tier },
    /// Short-lived shot, destroyed when `expires_at` tick is reached
    Projectile { owner: Owner, expires_at: u64 },
    /// The player's craft; invulnerable and hidden until `hyperspace_until`
    Craft { hyperspace_until: Option<u64> },
}

/// A simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub pos: IVec2,
    pub vel: Vec2,
    /// Orientation in radians
    pub heading: f32,
    pub kind: EntityKind,
    /// Width and height, fixed at construction
    size: IVec2,
    destroyed: bool,
}

impl Entity {
    fn new(id: EntityId, pos: IVec2, size: IVec2, vel: Vec2, heading: f32, kind: EntityKind) -> Self {
        Self {
            id,
            pos,
            vel,
            heading,
            kind,
            size,
            destroyed: false,
        }
    }

    /// Create an asteroid drifting along `heading`
    pub fn asteroid(id: EntityId, pos: IVec2, tier: Tier, heading: f32, rng: &mut impl Rng) -> Self {
        let vel = tier.velocity(heading, rng);
        Self::new(
            id,
            pos,
            IVec2::splat(tier.size()),
            vel,
            heading,
            EntityKind::Asteroid { tier },
        )
    }

    /// Create a projectile travelling along `heading`
    pub fn projectile(id: EntityId, pos: IVec2, heading: f32, owner: Owner, expires_at: u64) -> Self {
        Self::new(
            id,
            pos,
            IVec2::splat(PROJECTILE_SIZE),
            heading_vector(heading) * PROJECTILE_SPEED,
            heading,
            EntityKind::Projectile { owner, expires_at },
        )
    }

    /// Create the player's craft at rest, pointing up
    pub fn craft(id: EntityId, pos: IVec2) -> Self {
        Self::new(
            id,
            pos,
            IVec2::new(CRAFT_WIDTH, CRAFT_HEIGHT),
            Vec2::ZERO,
            CRAFT_START_HEADING,
            EntityKind::Craft {
                hyperspace_until: None,
            },
        )
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        self.size
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Mark as destroyed. Destroying twice is a logic error.
    pub fn destroy(&mut self) -> Result<(), SimError> {
        if self.destroyed {
            return Err(SimError::AlreadyDestroyed { id: self.id });
        }
        self.destroyed = true;
        Ok(())
    }

    /// Hostile bodies can destroy the craft and count toward level clear
    #[inline]
    pub fn is_hostile(&self) -> bool {
        matches!(self.kind, EntityKind::Asteroid { .. })
    }

    #[inline]
    pub fn is_craft(&self) -> bool {
        matches!(self.kind, EntityKind::Craft { .. })
    }

    /// Live player-fired projectile (counts against the cap)
    #[inline]
    pub fn is_player_projectile(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Projectile {
                owner: Owner::Player,
                ..
            }
        )
    }

    /// Craft in hyperspace: immune to collisions and not rendered
    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Craft {
                hyperspace_until: Some(_)
            }
        )
    }

    /// Tier of an asteroid, checked against its actual size
    pub fn tier(&self) -> Result<Tier, SimError> {
        match self.kind {
            EntityKind::Asteroid { tier } => {
                let measured = Tier::from_width(self.id, self.size.x)?;
                if measured != tier || self.size.y != self.size.x {
                    return Err(SimError::NonStandardSize {
                        id: self.id,
                        width: self.size.x,
                    });
                }
                Ok(tier)
            }
            _ => Err(SimError::InvariantBroken {
                rule: "tier queried on a non-asteroid",
            }),
        }
    }

    /// Score for destroying this entity (hostiles only)
    pub fn score_value(&self) -> Result<u64, SimError> {
        self.tier().map(Tier::score)
    }

    /// Move by one tick of velocity, wrapping around the world edges.
    ///
    /// The craft also bleeds off a little speed every tick.
    pub fn advance(&mut self, world: IVec2) {
        if self.destroyed {
            return;
        }
        let x = (self.pos.x as f32 + self.vel.x) as i32;
        let y = (self.pos.y as f32 + self.vel.y) as i32;
        self.pos = IVec2::new(wrap_axis(x, world.x), wrap_axis(y, world.y));

        if self.is_craft() {
            self.vel *= CRAFT_DECAY;
        }
    }

    /// Accelerate along the current heading unless already at top speed
    pub fn thrust(&mut self) {
        if self.vel.length() <= CRAFT_MAX_SPEED {
            self.vel += heading_vector(self.heading) * CRAFT_ACCELERATION;
        }
    }

    /// Rotate one step; negative turns counter-clockwise
    pub fn rotate(&mut self, direction: f32) {
        self.heading += direction.signum() * CRAFT_ROTATION_STEP;
    }

    /// Test-only constructor for corrupted sizes
    #[cfg(test)]
    pub(crate) fn with_size(mut self, size: IVec2) -> Self {
        self.size = size;
        self
    }
}
