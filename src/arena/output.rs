//! Round and tournament results

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, RoomId};

/// How one room's round went
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room: RoomId,
    pub entrants: usize,
    pub survivors: usize,
    pub displacements: usize,
    pub human_present: bool,
    pub ticks: u64,
}

impl RoomSummary {
    pub fn eliminated(&self) -> usize {
        self.entrants.saturating_sub(self.survivors)
    }
}

/// How one round went across all rooms
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u32,
    pub survivors_before: usize,
    pub survivors_after: usize,
    pub rooms: Vec<RoomSummary>,
}

impl RoundSummary {
    pub fn eliminated(&self) -> usize {
        self.survivors_before.saturating_sub(self.survivors_after)
    }

    pub fn displacements(&self) -> usize {
        self.rooms.iter().map(|r| r.displacements).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentOutcome {
    Winner(EntityId),
    /// Everyone left was eliminated in the same round
    NoWinner,
}

/// Complete tournament output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentResult {
    pub outcome: TournamentOutcome,
    pub human_id: EntityId,
    pub human_won: bool,
    pub seed: u64,
    pub entity_count: usize,
    pub rounds: Vec<RoundSummary>,
}

impl TournamentResult {
    pub fn winner(&self) -> Option<EntityId> {
        match self.outcome {
            TournamentOutcome::Winner(id) => Some(id),
            TournamentOutcome::NoWinner => None,
        }
    }

    /// Survivor count after each round, starting with the initial population
    pub fn survivor_counts(&self) -> Vec<usize> {
        std::iter::once(self.entity_count)
            .chain(self.rounds.iter().map(|r| r.survivors_after))
            .collect()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        let mut lines = Vec::with_capacity(self.rounds.len() + 1);
        for round in &self.rounds {
            lines.push(format!(
                "Round {}: {} rooms, {} -> {} survivors, {} displacements",
                round.round,
                round.rooms.len(),
                round.survivors_before,
                round.survivors_after,
                round.displacements(),
            ));
        }
        lines.push(match self.outcome {
            TournamentOutcome::Winner(id) if self.human_won => {
                format!("Winner: Player {} (YOU)", id.0)
            }
            TournamentOutcome::Winner(id) => format!("Winner: Player {}", id.0),
            TournamentOutcome::NoWinner => "No winner (everyone eliminated)".to_string(),
        });
        lines.join("\n")
    }
}
