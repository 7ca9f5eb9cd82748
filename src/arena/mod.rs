//! Shelter elimination tournament
//!
//! A population competes for capacity-limited shelters inside timed rooms.
//! Whoever is without shelter when a room's timer runs out is eliminated;
//! survivors are regrouped into new rooms until at most one remains.
//!
//! The host owns the clock and the input devices. It feeds `dt` and
//! [`HostInput`] into [`Tournament::tick`] (or calls the headless
//! [`Tournament::run`]) and reads [`RoomSnapshot`]s back for display.

pub mod entity;
pub mod events;
pub mod input;
pub mod output;
pub mod policy;
pub mod population;
pub mod resource;
pub mod room;
pub mod tournament;

pub use entity::{Control, Entity, ShelterState};
pub use events::{RoomEvent, RoomEventLog, RoomEventType};
pub use input::{HostInput, Pilot};
pub use output::{RoomSummary, RoundSummary, TournamentOutcome, TournamentResult};
pub use population::create_population;
pub use resource::{Displacement, Resource};
pub use room::{
    is_valid_step, layout_resources, EntitySnapshot, ResourceSnapshot, Room, RoomRules,
    RoomSnapshot, RoomStatus,
};
pub use tournament::{partition, room_bounds, Tournament, TournamentSnapshot, TournamentStatus};
