//! Collision detection
//!
//! Every entity is approximated by an axis-aligned box centred on its
//! position. Detection is side-effect free; resolution happens in the tick.

use glam::IVec2;

use super::entity::Entity;

/// Axis-aligned bounding rectangle (half-open: `min` inclusive, `max` exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min: IVec2,
    pub max: IVec2,
}

impl Rect {
    /// Box of `size` centred on `center`
    pub fn centered(center: IVec2, size: IVec2) -> Self {
        let min = center - size / 2;
        Self { min, max: min + size }
    }

    /// Strict overlap: boxes that only share an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Bounding rectangle of an entity
#[inline]
pub fn bounding_rect(entity: &Entity) -> Rect {
    Rect::centered(entity.pos, entity.size())
}

/// Check whether two entities collide.
///
/// A craft in hyperspace never collides with anything.
pub fn intersects(a: &Entity, b: &Entity) -> bool {
    if a.is_invulnerable() || b.is_invulnerable() {
        return false;
    }
    bounding_rect(a).overlaps(&bounding_rect(b))
}
