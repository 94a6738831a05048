use criterion::{black_box, criterion_group, criterion_main, Criterion};

use villager_sim::core::config::{PathfindingConfig, SimulationConfig};
use villager_sim::core::types::{Rect, Vec2};
use villager_sim::pathfinding::Pathfinder;
use villager_sim::world::scenario;
use villager_sim::world::terrain::Terrain;

fn maze() -> Vec<Rect> {
    (0..8)
        .map(|i| {
            let x = 100.0 + 200.0 * i as f32;
            if i % 2 == 0 {
                Rect::new(x, 0.0, 20.0, 1400.0)
            } else {
                Rect::new(x, 200.0, 20.0, 1400.0)
            }
        })
        .collect()
}

fn bench_plan(c: &mut Criterion) {
    let config = PathfindingConfig::default();
    let open = Terrain::new(1600.0, 1600.0, Vec::new(), Vec::new(), &config);
    let walled = Terrain::new(1600.0, 1600.0, maze(), Vec::new(), &config);

    c.bench_function("astar_open_diagonal", |b| {
        let pathfinder = Pathfinder::new(&open.blocked, &config);
        b.iter(|| pathfinder.plan(black_box(Vec2::new(10.0, 10.0)), black_box(Vec2::new(1590.0, 1590.0))))
    });

    c.bench_function("astar_maze", |b| {
        let pathfinder = Pathfinder::new(&walled.blocked, &config);
        b.iter(|| pathfinder.plan(black_box(Vec2::new(10.0, 800.0)), black_box(Vec2::new(1590.0, 800.0))))
    });
}

fn bench_blocked_table(c: &mut Criterion) {
    let config = PathfindingConfig::default();
    c.bench_function("blocked_table_build", |b| {
        b.iter(|| Terrain::new(1600.0, 1600.0, black_box(maze()), Vec::new(), &config))
    });
}

fn bench_world_tick(c: &mut Criterion) {
    c.bench_function("demo_world_100_ticks", |b| {
        b.iter_batched(
            || scenario::demo(3, 8).build(SimulationConfig::default(), 3),
            |world| {
                if let Ok(mut world) = world {
                    for _ in 0..100 {
                        let _ = world.step(0.1);
                    }
                }
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_plan, bench_blocked_table, bench_world_tick);
criterion_main!(benches);
