//! Competitors and their movement
//!
//! Entities are created once per tournament and carried from room to room.
//! Shelter state is only ever changed by [`Resource`](crate::arena::resource::Resource),
//! so an entity's held resource and that resource's occupant list always agree.

use serde::{Deserialize, Serialize};

use crate::core::types::{Bounds, EntityId, ResourceId, Vec2};

/// Who drives an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    Human,
    Autonomous,
}

/// Where an entity stands with respect to shelter this round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShelterState {
    /// Has not held a resource yet this round
    #[default]
    Seeking,
    /// Occupies a slot in this resource
    Holding(ResourceId),
    /// Evicted from a resource this round; alive and competing again
    Displaced { from: ResourceId, by: EntityId },
}

/// One competitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vec2,
    pub alive: bool,
    pub control: Control,
    /// Units per second
    pub speed: f32,
    /// Resource an autonomous entity is currently heading for
    pub target: Option<ResourceId>,
    shelter: ShelterState,
    /// Round time left before the next attack is accepted
    attack_cooldown: f32,
}

impl Entity {
    pub fn new(id: EntityId, control: Control, speed: f32) -> Self {
        Self {
            id,
            position: Vec2::ZERO,
            alive: true,
            control,
            speed,
            target: None,
            shelter: ShelterState::Seeking,
            attack_cooldown: 0.0,
        }
    }

    pub fn autonomous(id: u32, speed: f32) -> Self {
        Self::new(EntityId(id), Control::Autonomous, speed)
    }

    pub fn human(id: u32, speed: f32) -> Self {
        Self::new(EntityId(id), Control::Human, speed)
    }

    pub fn is_human(&self) -> bool {
        self.control == Control::Human
    }

    pub fn shelter(&self) -> ShelterState {
        self.shelter
    }

    pub fn held_resource(&self) -> Option<ResourceId> {
        match self.shelter {
            ShelterState::Holding(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_holding(&self) -> bool {
        matches!(self.shelter, ShelterState::Holding(_))
    }

    /// Alive and still looking for shelter
    pub fn is_competing(&self) -> bool {
        self.alive && !self.is_holding()
    }

    pub fn can_attack(&self) -> bool {
        self.is_competing() && self.attack_cooldown <= 0.0
    }

    pub fn distance_to(&self, pos: Vec2) -> f32 {
        self.position.distance(&pos)
    }

    /// Put the entity back at the start line for a new round
    pub(crate) fn reset_for_round(&mut self, position: Vec2) {
        self.position = position;
        self.alive = true;
        self.target = None;
        self.shelter = ShelterState::Seeking;
        self.attack_cooldown = 0.0;
    }

    pub(crate) fn occupy(&mut self, resource: ResourceId) {
        self.shelter = ShelterState::Holding(resource);
        self.target = Some(resource);
    }

    pub(crate) fn evict(&mut self, from: ResourceId, by: EntityId) {
        self.shelter = ShelterState::Displaced { from, by };
        self.target = None;
    }

    pub(crate) fn start_attack_cooldown(&mut self, seconds: f32) {
        self.attack_cooldown = seconds;
    }

    pub(crate) fn cool_down(&mut self, dt: f32) {
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        }
    }

    /// Move along the host's directional input, staying inside `bounds`
    pub fn step_directed(&mut self, direction: Vec2, dt: f32, bounds: &Bounds) {
        if !direction.is_zero() {
            let dir = direction.normalize();
            self.position = self.position + dir * (self.speed * dt);
        }
        self.position = bounds.clamp(self.position);
    }

    /// Move toward `aim` unless already within `arrival_threshold` of it
    pub fn step_toward(&mut self, aim: Vec2, dt: f32, arrival_threshold: f32) {
        let offset = aim - self.position;
        let dist = offset.length();
        if dist > arrival_threshold {
            self.position = self.position + offset.normalize() * (self.speed * dt);
        }
    }
}
