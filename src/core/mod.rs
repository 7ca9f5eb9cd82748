pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, TournamentConfig};
pub use error::{ArenaError, Result};
pub use types::{Bounds, EntityId, ResourceId, RoomId, Vec2};
