//! Per-room event log

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, ResourceId};

/// Something that happened in a room, stamped with the tick it happened on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomEvent {
    pub tick: u64,
    pub event_type: RoomEventType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoomEventType {
    RoundStarted { entrants: usize },
    Entered { entity: EntityId, resource: ResourceId },
    Displaced {
        attacker: EntityId,
        victim: EntityId,
        resource: ResourceId,
        by_human: bool,
    },
    Eliminated { entity: EntityId },
    RoundEnded { survivors: usize },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomEventLog {
    pub events: Vec<RoomEvent>,
}

impl RoomEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event_type: RoomEventType, tick: u64) {
        self.events.push(RoomEvent { tick, event_type });
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoomEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn displacements(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.event_type, RoomEventType::Displaced { .. }))
            .count()
    }

    pub fn eliminations(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.event_type, RoomEventType::Eliminated { .. }))
            .count()
    }
}
