use thiserror::Error;

use crate::core::types::{EntityId, ResourceId, RoomId};

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{room} has no resources")]
    NoResources { room: RoomId },

    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Resource {0:?} has no occupants to displace")]
    EmptyResource(ResourceId),

    #[error("Entity {0} already holds a resource")]
    AlreadyHolding(EntityId),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("A round is already in progress")]
    RoundInProgress,

    #[error("No round is in progress")]
    NoActiveRound,

    #[error("Tournament already complete")]
    TournamentComplete,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
