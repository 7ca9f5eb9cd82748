//! Initial population

use crate::arena::entity::{Control, Entity};
use crate::core::config::TournamentConfig;
use crate::core::types::EntityId;

/// Create the tournament's competitors
///
/// Autonomous ids run from 1 upward, skipping `human_id`. The configured
/// human slot is marked during generation; if nothing was marked by the end
/// (no slot configured, or slot out of range) slot 0 is assigned afterwards.
pub fn create_population(config: &TournamentConfig) -> Vec<Entity> {
    let count = config.entity_count as usize;
    let designated = config.human_slot.map(|s| s as usize).filter(|&s| s < count);

    let mut entities = Vec::with_capacity(count);
    let mut next_id = 1u32;
    for slot in 0..count {
        if designated == Some(slot) {
            entities.push(Entity::new(
                EntityId(config.human_id),
                Control::Human,
                config.human_speed(),
            ));
            continue;
        }
        if next_id == config.human_id {
            next_id += 1;
        }
        entities.push(Entity::new(EntityId(next_id), Control::Autonomous, config.base_speed));
        next_id += 1;
    }

    if designated.is_none() {
        if let Some(first) = entities.first_mut() {
            *first = Entity::new(EntityId(config.human_id), Control::Human, config.human_speed());
        }
    }

    tracing::debug!(
        "Created {} entities, human {} in slot {}",
        entities.len(),
        config.human_id,
        designated.unwrap_or(0)
    );
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn humans(entities: &[Entity]) -> Vec<&Entity> {
        entities.iter().filter(|e| e.is_human()).collect()
    }

    #[test]
    fn test_exactly_one_human_by_default() {
        let entities = create_population(&TournamentConfig::default());
        assert_eq!(entities.len(), 50);
        let h = humans(&entities);
        assert_eq!(h.len(), 1);
        assert_eq!(h[0].id, EntityId(456));
        assert!(entities[0].is_human());
    }

    #[test]
    fn test_configured_slot_is_used() {
        let config = TournamentConfig {
            entity_count: 10,
            human_slot: Some(7),
            ..Default::default()
        };
        let entities = create_population(&config);
        assert!(entities[7].is_human());
        assert_eq!(humans(&entities).len(), 1);
    }

    #[test]
    fn test_out_of_range_slot_falls_back() {
        let config = TournamentConfig {
            entity_count: 5,
            human_slot: Some(99),
            ..Default::default()
        };
        let entities = create_population(&config);
        assert!(entities[0].is_human());
        assert_eq!(humans(&entities).len(), 1);
    }

    #[test]
    fn test_ids_unique_when_population_passes_human_id() {
        let config = TournamentConfig {
            entity_count: 600,
            human_slot: Some(300),
            ..Default::default()
        };
        let entities = create_population(&config);
        let ids: HashSet<EntityId> = entities.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 600);
        assert_eq!(humans(&entities).len(), 1);
    }

    #[test]
    fn test_human_is_faster() {
        let config = TournamentConfig::default();
        let entities = create_population(&config);
        let human = humans(&entities)[0];
        let bot = entities.iter().find(|e| !e.is_human()).expect("Should have bots");
        assert!(human.speed > bot.speed);
    }
}
