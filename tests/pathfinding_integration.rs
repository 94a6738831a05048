//! Path planner scenarios on small hand-built terrains

use villager_sim::core::config::PathfindingConfig;
use villager_sim::core::types::{Rect, Vec2};
use villager_sim::pathfinding::{PathCache, Pathfinder, SearchFailure};
use villager_sim::world::terrain::{Gate, Terrain};

fn terrain(size: f32, obstacles: Vec<Rect>, gates: Vec<Gate>, config: &PathfindingConfig) -> Terrain {
    Terrain::new(size, size, obstacles, gates, config)
}

#[test]
fn test_open_grid_diagonal_has_ten_waypoints() {
    let config = PathfindingConfig::default();
    let terrain = terrain(200.0, Vec::new(), Vec::new(), &config);
    let pathfinder = Pathfinder::new(&terrain.blocked, &config);

    let path = pathfinder
        .plan(Vec2::new(10.0, 10.0), Vec2::new(190.0, 190.0))
        .unwrap();
    assert_eq!(path.len(), 10);
    assert_eq!(path[0], Vec2::new(10.0, 10.0));
    assert_eq!(path[9], Vec2::new(190.0, 190.0));
}

#[test]
fn test_wall_forces_detour() {
    let config = PathfindingConfig::default();
    let wall = Rect::new(100.0, 0.0, 20.0, 300.0);
    let open = terrain(400.0, Vec::new(), Vec::new(), &config);
    let walled = terrain(400.0, vec![wall], Vec::new(), &config);

    let start = Vec2::new(50.0, 50.0);
    let goal = Vec2::new(250.0, 50.0);
    let straight = Pathfinder::new(&open.blocked, &config).plan(start, goal).unwrap();
    let detour = Pathfinder::new(&walled.blocked, &config).plan(start, goal).unwrap();

    assert_eq!(straight.len(), 11);
    assert!(detour.len() >= straight.len() + 2);
    assert!(detour.iter().all(|p| !wall.contains(*p)));
}

#[test]
fn test_waypoints_avoid_blocked_cells_and_lethal_gates() {
    let config = PathfindingConfig::default();
    let pond = Gate::new(Rect::new(150.0, 100.0, 100.0, 200.0), true);
    let safe = Gate::new(Rect::new(60.0, 60.0, 40.0, 40.0), false);
    let terrain = terrain(400.0, vec![Rect::new(300.0, 0.0, 20.0, 250.0)], vec![pond, safe], &config);
    let pathfinder = Pathfinder::new(&terrain.blocked, &config);

    let path = pathfinder
        .plan(Vec2::new(30.0, 200.0), Vec2::new(370.0, 200.0))
        .unwrap();
    for waypoint in &path {
        let cell = terrain.blocked.world_to_grid(*waypoint);
        assert!(!terrain.blocked.is_blocked(cell), "blocked waypoint {waypoint:?}");
        assert!(!terrain.lethal_gate_at(*waypoint));
    }
    // Safe gates do not block
    let through_safe = pathfinder.plan(Vec2::new(70.0, 70.0), Vec2::new(90.0, 90.0));
    assert!(through_safe.is_ok());
}

#[test]
fn test_exhausted_search_returns_no_partial_path() {
    let config = PathfindingConfig {
        max_expansions: 5,
        ..PathfindingConfig::default()
    };
    let terrain = terrain(400.0, Vec::new(), Vec::new(), &config);
    let pathfinder = Pathfinder::new(&terrain.blocked, &config);

    let result = pathfinder.plan(Vec2::new(10.0, 10.0), Vec2::new(390.0, 390.0));
    assert!(matches!(result, Err(SearchFailure::Exhausted { .. })));

    let mut cache = PathCache::new();
    assert!(pathfinder
        .find_path(Vec2::new(10.0, 10.0), Vec2::new(390.0, 390.0), &mut cache, 0.0)
        .is_none());
    assert!(cache.cached_key().is_none());
}

#[test]
fn test_enclosed_goal_is_unreachable() {
    let config = PathfindingConfig {
        relocate_radius: 0,
        ..PathfindingConfig::default()
    };
    // Closed box around (200, 200)
    let walls = vec![
        Rect::new(140.0, 140.0, 120.0, 10.0),
        Rect::new(140.0, 250.0, 120.0, 10.0),
        Rect::new(140.0, 140.0, 10.0, 120.0),
        Rect::new(250.0, 140.0, 10.0, 120.0),
    ];
    let terrain = terrain(400.0, walls, Vec::new(), &config);
    let pathfinder = Pathfinder::new(&terrain.blocked, &config);

    let result = pathfinder.plan(Vec2::new(10.0, 10.0), Vec2::new(200.0, 200.0));
    assert!(result.is_err());
}
