use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mingle_arena::arena::{Entity, HostInput, Room, RoomStatus, Tournament};
use mingle_arena::core::config::TournamentConfig;
use mingle_arena::core::types::{Bounds, RoomId, Vec2};

fn bench_room(c: &mut Criterion) {
    let config = TournamentConfig::default();
    let bounds = Bounds::from_origin(Vec2::ZERO, config.room_width, config.room_height);
    let entities: Vec<Entity> = (1..=10)
        .map(|id| Entity::autonomous(id, config.base_speed))
        .collect();

    c.bench_function("room_tick_10", |b| {
        let mut room = Room::new(RoomId(1), bounds, entities.clone(), &config, 42).unwrap();
        let idle = HostInput::idle();
        b.iter(|| {
            if room.tick(black_box(1.0 / 60.0), &idle) == RoomStatus::Ended {
                room = Room::new(RoomId(1), bounds, entities.clone(), &config, 42).unwrap();
            }
        })
    });

    c.bench_function("room_full_round_10", |b| {
        b.iter(|| {
            let seed = black_box(42);
            let mut room = Room::new(RoomId(1), bounds, entities.clone(), &config, seed).unwrap();
            room.run_to_completion(1.0 / 60.0).unwrap()
        })
    });
}

fn bench_tournament(c: &mut Criterion) {
    let mut group = c.benchmark_group("tournament");
    group.sample_size(10);

    for (name, parallel) in [("parallel_500", true), ("sequential_500", false)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let config = TournamentConfig {
                    entity_count: 500,
                    seed: Some(black_box(7)),
                    parallel_rooms: parallel,
                    ..Default::default()
                };
                Tournament::new(config).unwrap().run(1.0 / 30.0).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_room, bench_tournament);
criterion_main!(benches);
