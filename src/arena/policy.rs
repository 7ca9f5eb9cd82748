//! Decision policy for autonomous competitors
//!
//! Target choice is deliberately uninformed: any resource with room is as good
//! as any other, and when everything is full an entity commits to a random
//! resource and waits for a chance to displace someone.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::arena::resource::Resource;
use crate::core::types::{ResourceId, Vec2};

/// Keep the current target while it still has room, otherwise pick again
pub fn select_target<R: Rng>(
    resources: &[Resource],
    current: Option<ResourceId>,
    rng: &mut R,
) -> Option<ResourceId> {
    if let Some(id) = current {
        if resources.get(id.index()).is_some_and(|r| !r.is_full()) {
            return Some(id);
        }
    }

    let open: Vec<&Resource> = resources.iter().filter(|r| !r.is_full()).collect();
    if let Some(r) = open.choose(rng) {
        return Some(r.id);
    }
    resources.choose(rng).map(|r| r.id)
}

/// Roll for a displacement attempt this tick
pub fn roll_displacement<R: Rng>(rng: &mut R, chance: f32) -> bool {
    chance > 0.0 && rng.gen::<f32>() < chance
}

/// Occasional small nudge, `None` on most ticks
pub fn wander<R: Rng>(rng: &mut R, chance: f32, magnitude: f32) -> Option<Vec2> {
    if chance <= 0.0 || rng.gen::<f32>() >= chance {
        return None;
    }
    Some(Vec2::new(
        (rng.gen::<f32>() - 0.5) * 2.0 * magnitude,
        (rng.gen::<f32>() - 0.5) * 2.0 * magnitude,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::entity::Entity;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn resources(caps: &[u32]) -> Vec<Resource> {
        caps.iter()
            .enumerate()
            .map(|(i, &c)| {
                let pos = Vec2::new(i as f32 * 90.0, 0.0);
                Resource::new(ResourceId(i as u32), pos, c, 18.0)
            })
            .collect()
    }

    #[test]
    fn test_keeps_open_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let rs = resources(&[2, 2, 2]);
        for _ in 0..20 {
            assert_eq!(select_target(&rs, Some(ResourceId(1)), &mut rng), Some(ResourceId(1)));
        }
    }

    #[test]
    fn test_abandons_full_target_for_open_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut rs = resources(&[1, 1]);
        let mut roster = vec![Entity::autonomous(1, 1.0)];
        assert!(rs[0].try_enter(&mut roster, 0));

        for _ in 0..20 {
            assert_eq!(select_target(&rs, Some(ResourceId(0)), &mut rng), Some(ResourceId(1)));
        }
    }

    #[test]
    fn test_all_full_still_picks_something() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut rs = resources(&[1, 1]);
        let mut roster = vec![Entity::autonomous(1, 1.0), Entity::autonomous(2, 1.0)];
        rs[0].try_enter(&mut roster, 0);
        rs[1].try_enter(&mut roster, 1);

        let mut seen = [false; 2];
        for _ in 0..50 {
            let pick = select_target(&rs, None, &mut rng).expect("Should pick a resource");
            seen[pick.index()] = true;
        }
        assert!(seen[0] && seen[1], "Both full resources should be chosen at random");
    }

    #[test]
    fn test_no_resources_no_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(select_target(&[], None, &mut rng).is_none());
    }

    #[test]
    fn test_roll_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            assert!(!roll_displacement(&mut rng, 0.0));
            assert!(roll_displacement(&mut rng, 1.0));
        }
    }

    #[test]
    fn test_wander_is_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        for _ in 0..100 {
            let nudge = wander(&mut rng, 1.0, 1.0).expect("Chance 1 should always nudge");
            assert!(nudge.x.abs() <= 1.0 && nudge.y.abs() <= 1.0);
            assert!(wander(&mut rng, 0.0, 1.0).is_none());
        }
    }
}
