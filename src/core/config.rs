//! Tournament configuration with documented constants
//!
//! Everything the simulation needs to know is supplied once, up front, and
//! never changes for the lifetime of a tournament. Values can come from
//! `Default`, from a TOML file, or be overridden by the CLI.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{ArenaError, Result};

/// Configuration for one tournament run
///
/// Distances are in world units (pixels for a typical host), times in
/// seconds of round time. The host supplies `dt` in the same unit as
/// `round_duration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    // === POPULATION ===
    /// Total number of competitors created at tournament start
    pub entity_count: u32,

    /// Identifier given to the single human-controlled competitor
    ///
    /// Autonomous competitors are numbered from 1 and skip this value,
    /// so identifiers stay unique whatever the population size.
    pub human_id: u32,

    /// Population slot the human occupies
    ///
    /// When absent (or out of range) slot 0 becomes the human.
    pub human_slot: Option<u32>,

    // === ROUNDS ===
    /// Preferred number of competitors per room
    ///
    /// Survivors are shuffled and chunked into groups of this size;
    /// the last group may be smaller.
    pub room_size: u32,

    /// Length of each round in seconds
    pub round_duration: f32,

    // === RESOURCES ===
    /// Occupant slots per resource
    pub resource_capacity: u32,

    /// Resources placed in every room
    pub resources_per_room: u32,

    /// Spacing between resource centers along the room's middle row
    pub resource_spacing: f32,

    /// Distance from a resource center at which entry is attempted
    pub capture_radius: f32,

    /// Half-width of the random square around a resource center that
    /// competitors aim for and settle into
    pub spot_jitter: f32,

    /// Extra distance past the capture radius a displaced occupant is pushed
    pub displacement_push: f32,

    // === MOVEMENT ===
    /// Autonomous movement speed (units per second)
    ///
    /// 78 u/s is 1.3 units per frame at 60 Hz.
    pub base_speed: f32,

    /// Human speed relative to `base_speed`
    pub human_speed_multiplier: f32,

    /// Autonomous competitors stop steering once this close to their aim point
    pub arrival_threshold: f32,

    /// Per-tick chance of a small random nudge on an autonomous competitor
    ///
    /// Breaks up clusters orbiting the capture radius without resolving.
    pub wander_chance: f32,

    /// Maximum nudge on each axis
    pub wander_magnitude: f32,

    /// Distance kept between the human and the room walls
    pub bounds_margin: f32,

    /// Distance from the room walls for spawn positions
    pub spawn_margin: f32,

    // === DISPLACEMENT ===
    /// Per-tick chance that an autonomous competitor blocked by a full
    /// resource evicts one of its occupants
    pub displacement_chance: f32,

    /// Reach of the human's attack action, measured from the resource center
    pub human_attack_radius: f32,

    /// Seconds of round time between human displacements
    ///
    /// 0 allows an attack every tick.
    pub human_attack_cooldown: f32,

    // === LAYOUT ===
    /// Room width in world units
    pub room_width: f32,

    /// Room height in world units
    pub room_height: f32,

    /// Rooms per row when laying out a round for display
    pub layout_columns: u32,

    /// Gap between neighbouring rooms
    pub layout_gap: f32,

    // === EXECUTION ===
    /// Shuffle the entity update order every tick
    ///
    /// With a single free slot left, whoever is updated first claims it.
    /// Shuffling removes the bias toward low roster positions.
    pub shuffle_update_order: bool,

    /// Advance the rooms of a round on the rayon thread pool
    pub parallel_rooms: bool,

    /// Master seed; a random one is drawn when absent
    pub seed: Option<u64>,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            entity_count: 50,
            human_id: 456,
            human_slot: None,

            room_size: 10,
            round_duration: 30.0,

            resource_capacity: 3,
            resources_per_room: 1,
            resource_spacing: 90.0,
            capture_radius: 18.0,
            spot_jitter: 10.0,
            displacement_push: 20.0,

            base_speed: 78.0,
            human_speed_multiplier: 1.2,
            arrival_threshold: 2.0,
            wander_chance: 0.005,
            wander_magnitude: 1.0,
            bounds_margin: 10.0,
            spawn_margin: 20.0,

            displacement_chance: 0.02,
            human_attack_radius: 22.0,
            human_attack_cooldown: 0.0,

            room_width: 250.0,
            room_height: 280.0,
            layout_columns: 3,
            layout_gap: 12.0,

            shuffle_update_order: true,
            parallel_rooms: true,
            seed: None,
        }
    }
}

impl TournamentConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TournamentConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Speed of the human competitor
    pub fn human_speed(&self) -> f32 {
        self.base_speed * self.human_speed_multiplier
    }

    /// Validate configuration before any simulation starts
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(ArenaError::InvalidConfig(msg)) };

        if self.entity_count == 0 {
            return invalid("entity_count must be at least 1".into());
        }
        if self.room_size == 0 {
            return invalid("room_size must be positive".into());
        }
        // Single-entity rooms never eliminate anyone, so the loop would never end
        if self.room_size < 2 && self.entity_count > 1 {
            return invalid(format!(
                "room_size ({}) must be at least 2 for {} entities to converge",
                self.room_size, self.entity_count
            ));
        }
        if self.resource_capacity == 0 {
            return invalid("resource_capacity must be positive".into());
        }
        if self.resources_per_room == 0 {
            return invalid("resources_per_room must be positive".into());
        }
        if !(self.round_duration > 0.0) {
            return invalid(format!("round_duration ({}) must be positive", self.round_duration));
        }
        if !(self.base_speed > 0.0) || !(self.human_speed_multiplier > 0.0) {
            return invalid("speeds must be positive".into());
        }
        for (name, p) in [
            ("displacement_chance", self.displacement_chance),
            ("wander_chance", self.wander_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{} ({}) must be within [0, 1]", name, p));
            }
        }
        if !(self.capture_radius > 0.0) || !(self.human_attack_radius > 0.0) {
            return invalid("capture and attack radii must be positive".into());
        }
        if self.spot_jitter < 0.0 || self.displacement_push < 0.0 {
            return invalid("spot_jitter and displacement_push cannot be negative".into());
        }
        if self.human_attack_cooldown < 0.0 {
            return invalid("human_attack_cooldown cannot be negative".into());
        }
        if self.layout_columns == 0 {
            return invalid("layout_columns must be positive".into());
        }
        if self.room_width <= 2.0 * self.spawn_margin || self.room_height <= 2.0 * self.spawn_margin
        {
            return invalid(format!(
                "room ({}x{}) is too small for spawn_margin {}",
                self.room_width, self.room_height, self.spawn_margin
            ));
        }
        let row_width = (self.resources_per_room - 1) as f32 * self.resource_spacing;
        if row_width > self.room_width - 2.0 * self.bounds_margin {
            return invalid(format!(
                "{} resources spaced {} apart do not fit a room {} wide",
                self.resources_per_room, self.resource_spacing, self.room_width
            ));
        }

        Ok(())
    }
}

/// Load and validate a config from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<TournamentConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    TournamentConfig::from_toml_str(&contents)
}
