//! Capacity-limited shelters
//!
//! A resource tracks its occupants by roster slot (index into the owning
//! room's entity list). Both mutating operations update the resource and the
//! affected entities together, or change nothing at all.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::arena::entity::Entity;
use crate::core::error::{ArenaError, Result};
use crate::core::types::{EntityId, ResourceId, Vec2};

/// A shelter with a fixed number of slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub position: Vec2,
    pub capacity: u32,
    /// Entry is attempted from inside this distance
    pub capture_radius: f32,
    occupants: Vec<usize>,
}

/// Result of a successful forced displacement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    pub attacker: EntityId,
    pub victim: EntityId,
    pub victim_slot: usize,
}

impl Resource {
    pub fn new(id: ResourceId, position: Vec2, capacity: u32, capture_radius: f32) -> Self {
        Self {
            id,
            position,
            capacity,
            capture_radius,
            occupants: Vec::with_capacity(capacity as usize),
        }
    }

    pub fn occupancy(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity as usize
    }

    pub fn free_slots(&self) -> usize {
        (self.capacity as usize).saturating_sub(self.occupants.len())
    }

    /// Roster slots of the current occupants
    pub fn occupants(&self) -> &[usize] {
        &self.occupants
    }

    pub fn contains(&self, slot: usize) -> bool {
        self.occupants.contains(&slot)
    }

    pub fn occupant_ids(&self, roster: &[Entity]) -> Vec<EntityId> {
        self.occupants
            .iter()
            .filter_map(|&slot| roster.get(slot).map(|e| e.id))
            .collect()
    }

    /// Within capture range of `pos`
    pub fn in_reach(&self, pos: Vec2) -> bool {
        self.position.distance(&pos) < self.capture_radius
    }

    /// A point near the center, different on every call
    pub fn spot_position<R: Rng>(&self, rng: &mut R, jitter: f32) -> Vec2 {
        Vec2::new(
            self.position.x + rng.gen_range(-jitter..=jitter),
            self.position.y + rng.gen_range(-jitter..=jitter),
        )
    }

    pub(crate) fn reset(&mut self) {
        self.occupants.clear();
    }

    /// Claim a free slot for `roster[slot]`
    ///
    /// Entering a resource the entity already occupies succeeds without
    /// changing anything. Fails, leaving all state untouched, when the
    /// resource is full or the entity already holds a different resource.
    pub fn try_enter(&mut self, roster: &mut [Entity], slot: usize) -> bool {
        if self.contains(slot) {
            return true;
        }
        let Some(entity) = roster.get_mut(slot) else {
            return false;
        };
        if entity.is_holding() || self.is_full() {
            return false;
        }

        self.occupants.push(slot);
        entity.occupy(self.id);
        true
    }

    /// Evict a uniformly random occupant and give its slot to `roster[attacker]`
    ///
    /// The victim stays alive, loses its shelter and is pushed just outside
    /// the capture radius, directly away from the center. Occupancy is
    /// unchanged.
    pub fn force_displace<R: Rng>(
        &mut self,
        roster: &mut [Entity],
        attacker: usize,
        rng: &mut R,
        push: f32,
    ) -> Result<Displacement> {
        if self.occupants.is_empty() {
            return Err(ArenaError::EmptyResource(self.id));
        }
        let attacker_id = match roster.get(attacker) {
            Some(e) if e.is_holding() => return Err(ArenaError::AlreadyHolding(e.id)),
            Some(e) => e.id,
            None => {
                return Err(ArenaError::InvariantViolation(format!(
                    "attacker slot {} outside roster of {}",
                    attacker,
                    roster.len()
                )))
            }
        };
        let pick = rng.gen_range(0..self.occupants.len());
        let victim_slot = self.occupants[pick];
        if victim_slot >= roster.len() {
            return Err(ArenaError::InvariantViolation(format!(
                "occupant slot {} outside roster of {}",
                victim_slot,
                roster.len()
            )));
        }

        let away = self.push_direction(roster[victim_slot].position, rng);
        let victim = &mut roster[victim_slot];
        victim.evict(self.id, attacker_id);
        victim.position = self.position + away * (self.capture_radius + push);
        let victim_id = victim.id;

        self.occupants[pick] = attacker;
        roster[attacker].occupy(self.id);

        Ok(Displacement {
            attacker: attacker_id,
            victim: victim_id,
            victim_slot,
        })
    }

    fn push_direction<R: Rng>(&self, from: Vec2, rng: &mut R) -> Vec2 {
        let dir = (from - self.position).normalize();
        if dir.is_zero() {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            Vec2::new(angle.cos(), angle.sin())
        } else {
            dir
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn roster(n: u32) -> Vec<Entity> {
        (1..=n).map(|id| Entity::autonomous(id, 1.0)).collect()
    }

    fn hut(capacity: u32) -> Resource {
        Resource::new(ResourceId(0), Vec2::new(100.0, 100.0), capacity, 18.0)
    }

    #[test]
    fn test_enter_until_full() {
        let mut entities = roster(3);
        let mut r = hut(2);

        assert!(r.try_enter(&mut entities, 0));
        assert!(r.try_enter(&mut entities, 1));
        assert!(r.is_full());
        assert!(!r.try_enter(&mut entities, 2));

        assert_eq!(r.occupancy(), 2);
        assert_eq!(entities[0].held_resource(), Some(ResourceId(0)));
        assert!(entities[2].held_resource().is_none());
    }

    #[test]
    fn test_reentry_is_noop() {
        let mut entities = roster(1);
        let mut r = hut(3);

        assert!(r.try_enter(&mut entities, 0));
        assert!(r.try_enter(&mut entities, 0));
        assert_eq!(r.occupancy(), 1);
        assert_eq!(r.occupant_ids(&entities), vec![EntityId(1)]);
    }

    #[test]
    fn test_cannot_hold_two_resources() {
        let mut entities = roster(1);
        let mut a = hut(1);
        let mut b = Resource::new(ResourceId(1), Vec2::ZERO, 1, 18.0);

        assert!(a.try_enter(&mut entities, 0));
        assert!(!b.try_enter(&mut entities, 0));
        assert_eq!(b.occupancy(), 0);
        assert_eq!(entities[0].held_resource(), Some(ResourceId(0)));
    }

    #[test]
    fn test_displace_swaps_one_for_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut entities = roster(3);
        let mut r = hut(2);
        r.try_enter(&mut entities, 0);
        r.try_enter(&mut entities, 1);

        let d = r
            .force_displace(&mut entities, 2, &mut rng, 20.0)
            .expect("Should displace");

        assert_eq!(r.occupancy(), 2);
        assert!(r.contains(2));
        assert!(!r.contains(d.victim_slot));
        assert_eq!(d.attacker, EntityId(3));

        let victim = &entities[d.victim_slot];
        assert!(victim.alive);
        assert!(victim.held_resource().is_none());
        assert!(!r.in_reach(victim.position));
        assert_eq!(entities[2].held_resource(), Some(ResourceId(0)));
    }

    #[test]
    fn test_displace_empty_resource_fails_cleanly() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut entities = roster(1);
        let mut r = hut(2);

        let result = r.force_displace(&mut entities, 0, &mut rng, 20.0);
        assert!(matches!(result, Err(ArenaError::EmptyResource(_))));
        assert_eq!(r.occupancy(), 0);
        assert!(entities[0].held_resource().is_none());
    }

    #[test]
    fn test_displace_requires_shelterless_attacker() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut entities = roster(2);
        let mut r = hut(2);
        r.try_enter(&mut entities, 0);
        r.try_enter(&mut entities, 1);

        let result = r.force_displace(&mut entities, 0, &mut rng, 20.0);
        assert!(matches!(result, Err(ArenaError::AlreadyHolding(_))));
        assert_eq!(r.occupancy(), 2);
    }

    #[test]
    fn test_spot_position_stays_near_center() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let r = hut(1);
        for _ in 0..50 {
            let spot = r.spot_position(&mut rng, 10.0);
            assert!((spot.x - 100.0).abs() <= 10.0);
            assert!((spot.y - 100.0).abs() <= 10.0);
            assert!(r.in_reach(spot));
        }
    }
}
