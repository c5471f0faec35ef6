//! Error types
//!
//! Simulation errors signal corrupted state (a logic bug), never a gameplay
//! outcome. Refused shots are `None`, not errors.

use crate::sim::EntityId;

/// Invariant violations raised by the simulation core
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// An entity was destroyed twice
    #[error("entity {id} already destroyed")]
    AlreadyDestroyed { id: EntityId },

    /// An asteroid's width does not match any tier
    #[error("asteroid {id} is not of standard size (width {width})")]
    NonStandardSize { id: EntityId, width: i32 },

    /// An operation referenced an entity that is not in the registry
    #[error("entity {id} is not in the registry")]
    UnknownEntity { id: EntityId },

    /// A registry-wide consistency rule failed
    #[error("invariant broken: {rule}")]
    InvariantBroken { rule: &'static str },
}

/// Settings loading and validation errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Value out of range
    #[error("Invalid settings: {0}")]
    Invalid(String),
}
