//! Host input and a scripted driver for the human competitor

use serde::{Deserialize, Serialize};

use crate::arena::room::RoomSnapshot;
use crate::core::types::{EntityId, Vec2};

/// Input gathered by the host for one tick
///
/// `direction` only matters for the human; any length is accepted and
/// normalized. `attack` is the single discrete action allowed per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HostInput {
    pub direction: Vec2,
    pub attack: bool,
}

impl HostInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn moving(direction: Vec2) -> Self {
        Self {
            direction,
            attack: false,
        }
    }

    pub fn attack() -> Self {
        Self {
            direction: Vec2::ZERO,
            attack: true,
        }
    }

    /// Build from four held direction keys; opposite keys cancel out
    pub fn from_keys(left: bool, right: bool, up: bool, down: bool, attack: bool) -> Self {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Self {
            direction: Vec2::new(axis(left, right), axis(up, down)),
            attack,
        }
    }
}

/// Plays the human from room snapshots, for headless runs and demos
///
/// Heads for the nearest resource with a free slot. When every resource is
/// full it walks to the nearest one and attacks once in reach.
#[derive(Debug, Clone, Copy)]
pub struct Pilot {
    pub attack_radius: f32,
}

impl Pilot {
    pub fn new(attack_radius: f32) -> Self {
        Self { attack_radius }
    }

    pub fn steer(&self, room: &RoomSnapshot, human: EntityId) -> HostInput {
        let Some(me) = room.entities.iter().find(|e| e.id == human) else {
            return HostInput::idle();
        };
        if !me.alive || me.holding.is_some() {
            return HostInput::idle();
        }

        let nearest = |open_only: bool| {
            room.resources
                .iter()
                .filter(|r| !open_only || r.occupancy < r.capacity)
                .min_by(|a, b| {
                    let da = a.position.distance(&me.position);
                    let db = b.position.distance(&me.position);
                    da.total_cmp(&db)
                })
        };

        if let Some(open) = nearest(true) {
            return HostInput::moving(open.position - me.position);
        }
        match nearest(false) {
            Some(full) if full.position.distance(&me.position) < self.attack_radius => {
                HostInput::attack()
            }
            Some(full) => HostInput::moving(full.position - me.position),
            None => HostInput::idle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_keys_cancel() {
        let input = HostInput::from_keys(true, true, false, true, false);
        assert_eq!(input.direction, Vec2::new(0.0, 1.0));
        assert!(!input.attack);
    }

    #[test]
    fn test_idle_has_no_action() {
        let input = HostInput::idle();
        assert!(input.direction.is_zero());
        assert!(!input.attack);
    }
}
