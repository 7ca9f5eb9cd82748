//! Tournament controller
//!
//! Round loop: partition survivors -> build rooms -> run rooms -> collect
//! survivors, until at most one competitor is left.
//!
//! Each room gets its own seed, drawn from the master stream in room order
//! when the round starts. A room's outcome therefore does not depend on
//! which thread runs it or in what order rooms finish.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::arena::entity::Entity;
use crate::arena::input::HostInput;
use crate::arena::output::{RoundSummary, TournamentOutcome, TournamentResult};
use crate::arena::population::create_population;
use crate::arena::room::{is_valid_step, Room, RoomSnapshot};
use crate::core::config::TournamentConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::{Bounds, EntityId, RoomId, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentStatus {
    /// Between rounds; `start_round` begins the next one
    AwaitingRound,
    /// Rooms are live
    InRound,
    /// One or zero competitors remain
    Complete,
}

/// Shuffle and cut into groups of `size`; the last group may be smaller
pub fn partition<T, R: Rng>(mut items: Vec<T>, size: usize, rng: &mut R) -> Vec<Vec<T>> {
    let size = size.max(1);
    items.shuffle(rng);

    let mut groups = Vec::with_capacity(items.len().div_ceil(size));
    let mut items = items.into_iter().peekable();
    while items.peek().is_some() {
        groups.push(items.by_ref().take(size).collect());
    }
    groups
}

/// Where room `index` of `count` sits on the display grid
pub fn room_bounds(index: usize, count: usize, config: &TournamentConfig) -> Bounds {
    let cols = (config.layout_columns as usize).min(count).max(1);
    let col = index % cols;
    let row = index / cols;
    let gap = config.layout_gap;
    let origin = Vec2::new(
        gap + col as f32 * (config.room_width + gap),
        gap + row as f32 * (config.room_height + gap),
    );
    Bounds::from_origin(origin, config.room_width, config.room_height)
}

/// Display state of the whole tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub round: u32,
    pub status: TournamentStatus,
    pub survivors: usize,
    pub rooms: Vec<RoomSnapshot>,
}

pub struct Tournament {
    config: TournamentConfig,
    seed: u64,
    rng: ChaCha8Rng,
    round: u32,
    /// Competitors still in the tournament, empty while their rooms are live
    survivors: Vec<Entity>,
    eliminated: Vec<Entity>,
    rooms: Vec<Room>,
    history: Vec<RoundSummary>,
    round_entrants: usize,
}

impl Tournament {
    /// Validate the config and create the population
    pub fn new(config: TournamentConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let survivors = create_population(&config);

        tracing::info!(
            "Tournament created: {} entities, rooms of {}, seed {}",
            survivors.len(),
            config.room_size,
            seed
        );

        Ok(Self {
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            round: 0,
            survivors,
            eliminated: Vec::new(),
            rooms: Vec::new(),
            history: Vec::new(),
            round_entrants: 0,
        })
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rounds started so far
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn status(&self) -> TournamentStatus {
        if !self.rooms.is_empty() {
            TournamentStatus::InRound
        } else if self.survivors.len() <= 1 {
            TournamentStatus::Complete
        } else {
            TournamentStatus::AwaitingRound
        }
    }

    /// Competitors still in contention, including those in live rooms
    pub fn survivor_count(&self) -> usize {
        if self.rooms.is_empty() {
            self.survivors.len()
        } else {
            self.round_entrants
        }
    }

    /// Survivors between rounds; empty while a round is live
    pub fn survivors(&self) -> &[Entity] {
        &self.survivors
    }

    pub fn eliminated(&self) -> &[Entity] {
        &self.eliminated
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn history(&self) -> &[RoundSummary] {
        &self.history
    }

    pub fn human_id(&self) -> EntityId {
        EntityId(self.config.human_id)
    }

    /// The live room holding `id`, if any
    pub fn room_of(&self, id: EntityId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.contains(id))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.rooms
            .iter()
            .find_map(|r| r.entity(id))
            .or_else(|| self.survivors.iter().find(|e| e.id == id))
            .or_else(|| self.eliminated.iter().find(|e| e.id == id))
    }

    /// Partition the survivors and open the next round's rooms
    pub fn start_round(&mut self) -> Result<&[Room]> {
        match self.status() {
            TournamentStatus::InRound => return Err(ArenaError::RoundInProgress),
            TournamentStatus::Complete => return Err(ArenaError::TournamentComplete),
            TournamentStatus::AwaitingRound => {}
        }

        let entrants = std::mem::take(&mut self.survivors);
        let groups = partition(entrants, self.config.room_size as usize, &mut self.rng);
        let count = groups.len();
        let seeds: Vec<u64> = (0..count).map(|_| self.rng.gen()).collect();

        self.round += 1;
        self.round_entrants = groups.iter().map(Vec::len).sum();

        let mut rooms = Vec::with_capacity(count);
        for (i, (group, seed)) in groups.into_iter().zip(seeds).enumerate() {
            let bounds = room_bounds(i, count, &self.config);
            rooms.push(Room::new(RoomId(i as u32 + 1), bounds, group, &self.config, seed)?);
        }
        self.rooms = rooms;

        tracing::info!(
            "Round {} started: {} entities in {} rooms",
            self.round,
            self.round_entrants,
            count
        );
        Ok(self.rooms.as_slice())
    }

    /// Advance every live room by `dt`; closes the round once all have ended
    pub fn tick(&mut self, dt: f32, input: &HostInput) -> Result<Option<RoundSummary>> {
        if self.rooms.is_empty() {
            return Err(ArenaError::NoActiveRound);
        }
        if !is_valid_step(dt) {
            return Err(ArenaError::InvalidConfig(format!(
                "tick length ({}) must be finite and not negative",
                dt
            )));
        }

        if self.config.parallel_rooms {
            self.rooms.par_iter_mut().for_each(|room| {
                room.tick(dt, input);
            });
        } else {
            for room in self.rooms.iter_mut() {
                room.tick(dt, input);
            }
        }

        if self.rooms.iter().all(|r| !r.is_active()) {
            return self.finish_round().map(Some);
        }
        Ok(None)
    }

    /// Collect survivors from ended rooms and discard the rooms
    pub fn finish_round(&mut self) -> Result<RoundSummary> {
        if self.rooms.is_empty() {
            return Err(ArenaError::NoActiveRound);
        }
        if self.rooms.iter().any(Room::is_active) {
            return Err(ArenaError::RoundInProgress);
        }

        let rooms = std::mem::take(&mut self.rooms);
        let mut summaries = Vec::with_capacity(rooms.len());
        for room in rooms {
            summaries.push(room.summary());
            for entity in room.into_entities() {
                if entity.alive {
                    self.survivors.push(entity);
                } else {
                    self.eliminated.push(entity);
                }
            }
        }

        let summary = RoundSummary {
            round: self.round,
            survivors_before: self.round_entrants,
            survivors_after: self.survivors.len(),
            rooms: summaries,
        };
        self.round_entrants = 0;

        if summary.eliminated() == 0 {
            tracing::warn!("Round {} eliminated nobody", summary.round);
        }
        tracing::info!(
            "Round {} finished: {} -> {} survivors",
            summary.round,
            summary.survivors_before,
            summary.survivors_after
        );

        self.history.push(summary.clone());
        Ok(summary)
    }

    /// Play a whole round headless, with idle human input
    pub fn run_round(&mut self, dt: f32) -> Result<RoundSummary> {
        if self.status() == TournamentStatus::AwaitingRound {
            self.start_round()?;
        }
        self.complete_rooms(dt)?;
        self.finish_round()
    }

    /// Play rounds until the tournament is decided
    pub fn run(&mut self, dt: f32) -> Result<TournamentResult> {
        while self.status() != TournamentStatus::Complete {
            self.run_round(dt)?;
        }
        Ok(self.result())
    }

    fn complete_rooms(&mut self, dt: f32) -> Result<()> {
        if self.rooms.is_empty() {
            return Err(ArenaError::NoActiveRound);
        }
        let results: Vec<Result<_>> = if self.config.parallel_rooms {
            self.rooms
                .par_iter_mut()
                .map(|room| room.run_to_completion(dt))
                .collect()
        } else {
            self.rooms
                .iter_mut()
                .map(|room| room.run_to_completion(dt))
                .collect()
        };
        for result in results {
            result?;
        }
        Ok(())
    }

    /// Outcome so far; final once `status()` is `Complete`
    pub fn result(&self) -> TournamentResult {
        let outcome = match self.survivors.as_slice() {
            [winner] if self.rooms.is_empty() => TournamentOutcome::Winner(winner.id),
            _ => TournamentOutcome::NoWinner,
        };
        let human_id = self.human_id();
        let human_won = outcome == TournamentOutcome::Winner(human_id);

        if self.status() == TournamentStatus::Complete {
            match outcome {
                TournamentOutcome::Winner(id) => {
                    tracing::info!("Tournament decided after {} rounds: winner {}", self.round, id)
                }
                TournamentOutcome::NoWinner => {
                    tracing::info!("Tournament ended after {} rounds with no winner", self.round)
                }
            }
        }

        TournamentResult {
            outcome,
            human_id,
            human_won,
            seed: self.seed,
            entity_count: self.config.entity_count as usize,
            rounds: self.history.clone(),
        }
    }

    pub fn snapshot(&self) -> TournamentSnapshot {
        TournamentSnapshot {
            round: self.round,
            status: self.status(),
            survivors: self.survivor_count(),
            rooms: self.rooms.iter().map(Room::snapshot).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn small_config(seed: u64) -> TournamentConfig {
        TournamentConfig {
            entity_count: 12,
            room_size: 5,
            round_duration: 10.0,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_partition_covers_without_duplicates() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let groups = partition((0..23).collect::<Vec<u32>>(), 10, &mut rng);

        assert_eq!(groups.iter().map(Vec::len).collect::<Vec<_>>(), vec![10, 10, 3]);
        let all: HashSet<u32> = groups.iter().flatten().copied().collect();
        assert_eq!(all.len(), 23);
    }

    #[test]
    fn test_partition_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let groups = partition(Vec::<u32>::new(), 4, &mut rng);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_room_bounds_grid() {
        let config = TournamentConfig::default();
        let first = room_bounds(0, 5, &config);
        let fourth = room_bounds(3, 5, &config);
        assert_eq!(first.min, Vec2::new(12.0, 12.0));
        assert_eq!(fourth.min.x, first.min.x);
        assert!(fourth.min.y > first.max.y);
    }

    #[test]
    fn test_invalid_config_fails_before_play() {
        let config = TournamentConfig {
            resources_per_room: 0,
            ..Default::default()
        };
        assert!(Tournament::new(config).is_err());
    }

    #[test]
    fn test_round_partitions_survivors() {
        let mut t = Tournament::new(small_config(3)).expect("Should build");
        let rooms = t.start_round().expect("Should start");

        assert_eq!(rooms.len(), 3);
        let mut seen = HashSet::new();
        for room in rooms {
            for e in room.entities() {
                assert!(seen.insert(e.id), "{} placed twice", e.id);
            }
        }
        assert_eq!(seen.len(), 12);
        assert_eq!(t.survivor_count(), 12);
        assert!(t.survivors().is_empty());
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut t = Tournament::new(small_config(3)).expect("Should build");
        t.start_round().expect("Should start");
        assert!(matches!(t.start_round(), Err(ArenaError::RoundInProgress)));
        assert!(matches!(t.finish_round(), Err(ArenaError::RoundInProgress)));
    }

    #[test]
    fn test_tick_without_round_fails() {
        let mut t = Tournament::new(small_config(3)).expect("Should build");
        let result = t.tick(0.1, &HostInput::idle());
        assert!(matches!(result, Err(ArenaError::NoActiveRound)));
    }

    #[test]
    fn test_tick_rejects_bad_step() {
        let mut t = Tournament::new(small_config(3)).expect("Should build");
        t.start_round().expect("Should start");

        for dt in [f32::NAN, f32::INFINITY, -1.0 / 60.0] {
            let result = t.tick(dt, &HostInput::idle());
            assert!(matches!(result, Err(ArenaError::InvalidConfig(_))), "dt {}", dt);
        }
        assert!(t.rooms().iter().all(|r| r.ticks() == 0 && r.elapsed() == 0.0));
        assert!(t.tick(0.0, &HostInput::idle()).expect("Zero step is a pause").is_none());
    }

    #[test]
    fn test_host_ticks_close_the_round() {
        let mut t = Tournament::new(small_config(5)).expect("Should build");
        t.start_round().expect("Should start");

        let mut summary = None;
        for _ in 0..1000 {
            summary = t.tick(0.05, &HostInput::idle()).expect("Tick should succeed");
            if summary.is_some() {
                break;
            }
        }
        let summary = summary.expect("Round should close within 10s of ticks");
        assert_eq!(summary.round, 1);
        assert!(summary.survivors_after < 12);
        assert_eq!(t.status(), TournamentStatus::AwaitingRound);
        assert_eq!(t.survivors().len() + t.eliminated().len(), 12);
    }

    #[test]
    fn test_run_reaches_a_decision() {
        let mut t = Tournament::new(small_config(8)).expect("Should build");
        let result = t.run(0.05).expect("Tournament should run");

        assert_eq!(t.status(), TournamentStatus::Complete);
        assert!(t.survivors().len() <= 1);
        let counts = result.survivor_counts();
        assert!(counts.windows(2).all(|w| w[1] < w[0]));
        if let Some(winner) = result.winner() {
            assert!(t.entity(winner).is_some_and(|e| e.alive));
        }
    }

    #[test]
    fn test_single_entity_is_immediate_winner() {
        let config = TournamentConfig {
            entity_count: 1,
            room_size: 1,
            seed: Some(1),
            ..Default::default()
        };
        let mut t = Tournament::new(config).expect("Should build");
        assert_eq!(t.status(), TournamentStatus::Complete);
        let result = t.run(0.1).expect("Should resolve");
        assert_eq!(result.outcome, TournamentOutcome::Winner(EntityId(456)));
        assert!(result.human_won);
        assert!(result.rounds.is_empty());
    }

    #[test]
    fn test_same_seed_same_result() {
        let mut first = Tournament::new(small_config(21)).expect("Should build");
        let mut second = Tournament::new(small_config(21)).expect("Should build");
        let a = first.run(0.05).expect("Should run");
        let b = second.run(0.05).expect("Should run");
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.rounds, b.rounds);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let parallel = small_config(34);
        let sequential = TournamentConfig {
            parallel_rooms: false,
            ..small_config(34)
        };
        let a = Tournament::new(parallel).expect("Should build").run(0.05).expect("Should run");
        let b = Tournament::new(sequential).expect("Should build").run(0.05).expect("Should run");
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.rounds, b.rounds);
    }
}
