//! One timed elimination round
//!
//! Each tick: cooldowns -> human action -> movement -> entry/displacement -> timer.
//! The room is `Active` until the timer reaches its limit, then flips to
//! `Ended` exactly once, eliminating everyone without shelter.

use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::arena::entity::{Control, Entity};
use crate::arena::events::{RoomEventLog, RoomEventType};
use crate::arena::input::HostInput;
use crate::arena::output::RoomSummary;
use crate::arena::policy;
use crate::arena::resource::{Displacement, Resource};
use crate::core::config::TournamentConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::{Bounds, EntityId, ResourceId, RoomId, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Active,
    Ended,
}

/// The slice of the tournament config a room plays by
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomRules {
    pub time_limit: f32,
    pub displacement_chance: f32,
    pub displacement_push: f32,
    pub human_attack_radius: f32,
    pub human_attack_cooldown: f32,
    pub spot_jitter: f32,
    pub arrival_threshold: f32,
    pub wander_chance: f32,
    pub wander_magnitude: f32,
    pub bounds_margin: f32,
    pub spawn_margin: f32,
    pub shuffle_update_order: bool,
}

impl From<&TournamentConfig> for RoomRules {
    fn from(config: &TournamentConfig) -> Self {
        Self {
            time_limit: config.round_duration,
            displacement_chance: config.displacement_chance,
            displacement_push: config.displacement_push,
            human_attack_radius: config.human_attack_radius,
            human_attack_cooldown: config.human_attack_cooldown,
            spot_jitter: config.spot_jitter,
            arrival_threshold: config.arrival_threshold,
            wander_chance: config.wander_chance,
            wander_magnitude: config.wander_magnitude,
            bounds_margin: config.bounds_margin,
            spawn_margin: config.spawn_margin,
            shuffle_update_order: config.shuffle_update_order,
        }
    }
}

impl Default for RoomRules {
    fn default() -> Self {
        Self::from(&TournamentConfig::default())
    }
}

/// Whether `dt` can advance a round: finite and not negative
pub fn is_valid_step(dt: f32) -> bool {
    dt.is_finite() && dt >= 0.0
}

/// Place a room's resources along its middle row
///
/// Every room, in every round, offers at most `entrants - 1` slots (but at
/// least one), even when the configured capacity would shelter everyone.
/// A room built here therefore always eliminates someone once it has two or
/// more entrants. Resources are filled in order up to `resource_capacity`
/// until that budget is spent.
pub fn layout_resources(
    bounds: &Bounds,
    config: &TournamentConfig,
    entrants: usize,
) -> Vec<Resource> {
    let count = config.resources_per_room as usize;
    let mut budget = (count * config.resource_capacity as usize)
        .min(entrants.saturating_sub(1))
        .max(1);
    let center = bounds.center();
    let mut resources = Vec::with_capacity(count);

    for i in 0..count {
        if budget == 0 {
            break;
        }
        let capacity = budget.min(config.resource_capacity as usize);
        budget -= capacity;
        let offset = (i as f32 - (count as f32 - 1.0) / 2.0) * config.resource_spacing;
        resources.push(Resource::new(
            ResourceId(i as u32),
            Vec2::new(center.x + offset, center.y),
            capacity as u32,
            config.capture_radius,
        ));
    }
    resources
}

/// One arena running one round
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub bounds: Bounds,
    resources: Vec<Resource>,
    entities: Vec<Entity>,
    slot_of: AHashMap<EntityId, usize>,
    rules: RoomRules,
    elapsed: f64,
    tick: u64,
    status: RoomStatus,
    rng: ChaCha8Rng,
    log: RoomEventLog,
}

impl Room {
    /// Build a room with resources laid out from the tournament config
    pub fn new(
        id: RoomId,
        bounds: Bounds,
        entities: Vec<Entity>,
        config: &TournamentConfig,
        seed: u64,
    ) -> Result<Self> {
        let resources = layout_resources(&bounds, config, entities.len());
        Self::with_resources(id, bounds, entities, resources, RoomRules::from(config), seed)
    }

    /// Build a room around explicit resources
    ///
    /// Fails when there are no resources, a resource has no capacity, or an
    /// entity appears twice. Entities are revived, cleared of shelter and
    /// scattered inside the room.
    pub fn with_resources(
        id: RoomId,
        bounds: Bounds,
        mut entities: Vec<Entity>,
        mut resources: Vec<Resource>,
        rules: RoomRules,
        seed: u64,
    ) -> Result<Self> {
        if resources.is_empty() {
            return Err(ArenaError::NoResources { room: id });
        }
        if let Some(r) = resources.iter().find(|r| r.capacity == 0) {
            return Err(ArenaError::InvalidConfig(format!(
                "resource {:?} in {} has zero capacity",
                r.id, id
            )));
        }
        if !(rules.time_limit > 0.0) {
            return Err(ArenaError::InvalidConfig(format!(
                "time limit ({}) must be positive",
                rules.time_limit
            )));
        }

        let mut slot_of = AHashMap::with_capacity(entities.len());
        for (slot, entity) in entities.iter().enumerate() {
            if slot_of.insert(entity.id, slot).is_some() {
                return Err(ArenaError::InvalidConfig(format!(
                    "entity {} entered {} twice",
                    entity.id, id
                )));
            }
        }

        for (i, resource) in resources.iter_mut().enumerate() {
            resource.id = ResourceId(i as u32);
            resource.reset();
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let spawn = bounds.inset(rules.spawn_margin);
        for entity in entities.iter_mut() {
            let pos = Vec2::new(
                rng.gen_range(spawn.min.x..=spawn.max.x),
                rng.gen_range(spawn.min.y..=spawn.max.y),
            );
            entity.reset_for_round(pos);
        }

        let mut log = RoomEventLog::new();
        log.push(
            RoomEventType::RoundStarted {
                entrants: entities.len(),
            },
            0,
        );

        Ok(Self {
            id,
            bounds,
            resources,
            entities,
            slot_of,
            rules,
            elapsed: 0.0,
            tick: 0,
            status: RoomStatus::Active,
            rng,
            log,
        })
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == RoomStatus::Active
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    pub fn time_limit(&self) -> f32 {
        self.rules.time_limit
    }

    pub fn remaining(&self) -> f32 {
        (self.rules.time_limit as f64 - self.elapsed).max(0.0) as f32
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn rules(&self) -> &RoomRules {
        &self.rules
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn events(&self) -> &RoomEventLog {
        &self.log
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.slot_of.get(&id).map(|&slot| &self.entities[slot])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.slot_of.contains_key(&id)
    }

    pub fn human(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_human())
    }

    pub fn holders(&self) -> usize {
        self.entities.iter().filter(|e| e.is_holding()).count()
    }

    pub fn survivors(&self) -> usize {
        self.entities.iter().filter(|e| e.alive).count()
    }

    /// Advance the round by `dt` seconds
    ///
    /// A NaN, infinite or negative `dt` is ignored. Cooldowns count down
    /// before the attack phase, so an attack made on this tick blocks
    /// further attacks for the full cooldown.
    pub fn tick(&mut self, dt: f32, input: &HostInput) -> RoomStatus {
        if self.status == RoomStatus::Ended {
            return self.status;
        }
        if !is_valid_step(dt) {
            tracing::warn!("{}: ignoring tick of {}s", self.id, dt);
            return self.status;
        }
        if self.entities.is_empty() {
            self.finish();
            return self.status;
        }
        self.tick += 1;

        for entity in self.entities.iter_mut() {
            entity.cool_down(dt);
        }
        if input.attack {
            self.human_attack();
        }

        let mut order: Vec<usize> = (0..self.entities.len()).collect();
        if self.rules.shuffle_update_order {
            order.shuffle(&mut self.rng);
        }
        for &slot in &order {
            self.advance(slot, dt, input.direction);
        }
        for &slot in &order {
            self.resolve_contact(slot);
        }

        self.elapsed += dt as f64;
        if self.elapsed >= self.rules.time_limit as f64 {
            self.finish();
        }

        debug_assert!(
            self.verify_invariants().is_ok(),
            "{:?}",
            self.verify_invariants()
        );
        self.status
    }

    /// Tick with idle input until the timer expires
    pub fn run_to_completion(&mut self, dt: f32) -> Result<RoomSummary> {
        if !(is_valid_step(dt) && dt > 0.0) {
            return Err(ArenaError::InvalidConfig(format!(
                "tick length ({}) must be positive",
                dt
            )));
        }
        let idle = HostInput::idle();
        while self.tick(dt, &idle) == RoomStatus::Active {}
        Ok(self.summary())
    }

    fn advance(&mut self, slot: usize, dt: f32, direction: Vec2) {
        let rules = self.rules;
        let entity = &mut self.entities[slot];
        if !entity.is_competing() {
            return;
        }

        match entity.control {
            Control::Human => {
                let walls = self.bounds.inset(rules.bounds_margin);
                entity.step_directed(direction, dt, &walls);
            }
            Control::Autonomous => {
                entity.target =
                    policy::select_target(&self.resources, entity.target, &mut self.rng);
                if let Some(target) = entity.target {
                    let aim = self.resources[target.index()]
                        .spot_position(&mut self.rng, rules.spot_jitter);
                    entity.step_toward(aim, dt, rules.arrival_threshold);
                }
                let (chance, magnitude) = (rules.wander_chance, rules.wander_magnitude);
                if let Some(nudge) = policy::wander(&mut self.rng, chance, magnitude) {
                    entity.position = entity.position + nudge;
                }
            }
        }
    }

    /// Try every resource in reach; autonomous entities may displace when blocked
    fn resolve_contact(&mut self, slot: usize) {
        let entity = &self.entities[slot];
        if !entity.is_competing() {
            return;
        }
        let pos = entity.position;
        let autonomous = entity.control == Control::Autonomous;

        for idx in 0..self.resources.len() {
            if !self.resources[idx].in_reach(pos) {
                continue;
            }
            if self.resources[idx].try_enter(&mut self.entities, slot) {
                self.settle(slot, idx);
                let resource = self.resources[idx].id;
                tracing::trace!("{}: {} entered {:?}", self.id, self.entities[slot].id, resource);
                self.log.push(
                    RoomEventType::Entered {
                        entity: self.entities[slot].id,
                        resource,
                    },
                    self.tick,
                );
                return;
            }
            let chance = self.rules.displacement_chance;
            if autonomous && policy::roll_displacement(&mut self.rng, chance) {
                if self.displace(idx, slot, false).is_ok() {
                    return;
                }
            }
        }
    }

    /// The human's attack: evict someone from the first full resource in reach
    fn human_attack(&mut self) {
        let Some(slot) = self.entities.iter().position(|e| e.is_human()) else {
            return;
        };
        if !self.entities[slot].can_attack() {
            return;
        }
        let pos = self.entities[slot].position;
        let reach = self.rules.human_attack_radius;
        let Some(idx) = self
            .resources
            .iter()
            .position(|r| r.is_full() && r.position.distance(&pos) < reach)
        else {
            return;
        };

        if self.displace(idx, slot, true).is_ok() {
            let cooldown = self.rules.human_attack_cooldown;
            self.entities[slot].start_attack_cooldown(cooldown);
        }
    }

    fn displace(&mut self, idx: usize, attacker: usize, by_human: bool) -> Result<Displacement> {
        let push = self.rules.displacement_push;
        let result =
            self.resources[idx].force_displace(&mut self.entities, attacker, &mut self.rng, push);
        match &result {
            Ok(d) => {
                self.settle(attacker, idx);
                tracing::debug!(
                    "{}: {} displaced {} from {:?}",
                    self.id,
                    d.attacker,
                    d.victim,
                    self.resources[idx].id
                );
                self.log.push(
                    RoomEventType::Displaced {
                        attacker: d.attacker,
                        victim: d.victim,
                        resource: self.resources[idx].id,
                        by_human,
                    },
                    self.tick,
                );
            }
            Err(e) => tracing::warn!("{}: displacement failed: {}", self.id, e),
        }
        result
    }

    /// Snap a new occupant into a spot inside the resource
    fn settle(&mut self, slot: usize, idx: usize) {
        let spot = self.resources[idx].spot_position(&mut self.rng, self.rules.spot_jitter);
        self.entities[slot].position = spot;
    }

    /// Timer expiry: everyone without shelter is out
    fn finish(&mut self) {
        if self.status == RoomStatus::Ended {
            return;
        }
        for entity in self.entities.iter_mut() {
            if !entity.is_holding() {
                entity.alive = false;
                self.log.push(RoomEventType::Eliminated { entity: entity.id }, self.tick);
            }
        }
        let survivors = self.survivors();
        self.log.push(RoomEventType::RoundEnded { survivors }, self.tick);
        self.status = RoomStatus::Ended;
        tracing::debug!(
            "{} ended after {} ticks: {}/{} survived",
            self.id,
            self.tick,
            survivors,
            self.entities.len()
        );
    }

    /// Check occupancy limits and the holder/occupant agreement
    pub fn verify_invariants(&self) -> Result<()> {
        let violation = |msg: String| -> Result<()> { Err(ArenaError::InvariantViolation(msg)) };

        for resource in &self.resources {
            if resource.occupancy() > resource.capacity as usize {
                return violation(format!(
                    "{:?} holds {} of {}",
                    resource.id,
                    resource.occupancy(),
                    resource.capacity
                ));
            }
            for (i, slot) in resource.occupants().iter().enumerate() {
                if resource.occupants()[..i].contains(slot) {
                    return violation(format!("{:?} lists slot {} twice", resource.id, slot));
                }
                match self.entities.get(*slot) {
                    Some(e) if e.held_resource() == Some(resource.id) => {}
                    Some(e) => {
                        return violation(format!(
                            "{:?} lists {} which holds {:?}",
                            resource.id,
                            e.id,
                            e.held_resource()
                        ))
                    }
                    None => {
                        return violation(format!("{:?} lists unknown slot {}", resource.id, slot))
                    }
                }
            }
        }

        for (slot, entity) in self.entities.iter().enumerate() {
            if let Some(held) = entity.held_resource() {
                let listed = self
                    .resources
                    .get(held.index())
                    .is_some_and(|r| r.contains(slot));
                if !listed {
                    return violation(format!("{} holds {:?} but is not listed", entity.id, held));
                }
            }
            if self.status == RoomStatus::Ended && entity.alive != entity.is_holding() {
                return violation(format!(
                    "{} alive={} holding={} after round end",
                    entity.id,
                    entity.alive,
                    entity.is_holding()
                ));
            }
        }

        Ok(())
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room: self.id,
            entrants: self.entities.len(),
            survivors: self.survivors(),
            displacements: self.log.displacements(),
            human_present: self.human().is_some(),
            ticks: self.tick,
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id,
            bounds: self.bounds,
            status: self.status,
            elapsed: self.elapsed(),
            remaining: self.remaining(),
            entities: self
                .entities
                .iter()
                .map(|e| EntitySnapshot {
                    id: e.id,
                    position: e.position,
                    alive: e.alive,
                    human: e.is_human(),
                    holding: e.held_resource(),
                })
                .collect(),
            resources: self
                .resources
                .iter()
                .map(|r| ResourceSnapshot {
                    id: r.id,
                    position: r.position,
                    occupancy: r.occupancy(),
                    capacity: r.capacity as usize,
                })
                .collect(),
        }
    }

    /// Hand the roster back once the round is over
    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}

/// Display state of a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub bounds: Bounds,
    pub status: RoomStatus,
    pub elapsed: f32,
    pub remaining: f32,
    pub entities: Vec<EntitySnapshot>,
    pub resources: Vec<ResourceSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub position: Vec2,
    pub alive: bool,
    pub human: bool,
    pub holding: Option<ResourceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub id: ResourceId,
    pub position: Vec2,
    pub occupancy: usize,
    pub capacity: usize,
}

impl ResourceSnapshot {
    /// "2/3" style occupancy label
    pub fn label(&self) -> String {
        format!("{}/{}", self.occupancy, self.capacity)
    }
}
