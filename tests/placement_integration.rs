use bevy::prelude::*;

use rampart::game::fixed_math::{FixedNum, FixedVec2};
use rampart::game::grid::{
    Building, Footprint, GridLocation, GridMap, GridRect, GridSize, PlaceBuildingCommand,
    RemoveEntityCommand,
};
use rampart::game::pathfinding::{FlowFieldManager, UNREACHABLE};
use rampart::game::simulation::{layers, Collider, SimPosition};
use rampart::game::GamePlugin;

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(GamePlugin);
    app.update();
    app
}

fn tick(app: &mut App) {
    app.world_mut().run_schedule(First);
    app.world_mut().run_schedule(FixedUpdate);
    app.world_mut().run_schedule(Update);
    app.world_mut().run_schedule(Last);
}

fn spawn_building(app: &mut App, size: GridSize) -> Entity {
    app.world_mut()
        .spawn((
            Building,
            Footprint(size),
            SimPosition::default(),
            Collider {
                radius: FixedNum::from_num(0.5),
                layer: layers::BUILDING,
                mask: layers::NONE,
            },
        ))
        .id()
}

/// Distance from `probe` to target `(x, y)` per the manager's cached field.
fn field_distance(app: &mut App, target: GridLocation, probe: GridLocation) -> FixedNum {
    app.world_mut()
        .resource_scope(|world, mut manager: Mut<FlowFieldManager>| {
            let map = world.resource::<GridMap>();
            manager.get_flow_field(target, map).distance_at(probe)
        })
}

fn builds(app: &App) -> usize {
    app.world().resource::<FlowFieldManager>().builds()
}

#[test]
fn successful_placement_occupies_and_centers_the_building() {
    let mut app = test_app();
    let building = spawn_building(&mut app, GridSize::new(2, 2));
    let location = GridLocation::new(3, 3);

    app.world_mut().write_message(PlaceBuildingCommand { entity: building, location });
    tick(&mut app);

    let map = app.world().resource::<GridMap>();
    let rect = GridRect::new(location, GridSize::new(2, 2));
    assert!(!map.is_free(rect));
    assert_eq!(map.entity_at(GridLocation::new(4, 4)), Some(building));

    let expected_center = map.center_point_for_rect(rect);
    let pos = app.world().get::<SimPosition>(building).expect("position").0;
    assert_eq!(pos, expected_center);
}

#[test]
fn overlapping_placement_is_rejected_without_side_effects() {
    let mut app = test_app();
    let first = spawn_building(&mut app, GridSize::new(2, 2));
    let second = spawn_building(&mut app, GridSize::new(2, 2));

    app.world_mut().write_message(PlaceBuildingCommand {
        entity: first,
        location: GridLocation::new(3, 3),
    });
    tick(&mut app);
    app.world_mut().write_message(PlaceBuildingCommand {
        entity: second,
        location: GridLocation::new(4, 4),
    });
    tick(&mut app);

    let map = app.world().resource::<GridMap>();
    assert_eq!(map.obstacles().len(), 1);
    assert_eq!(map.entity_at(GridLocation::new(4, 4)), Some(first));
    assert_eq!(map.entity_at(GridLocation::new(5, 5)), None);

    // The rejected building was never moved.
    let pos = app.world().get::<SimPosition>(second).expect("position").0;
    assert_eq!(pos, FixedVec2::ZERO);
}

#[test]
fn out_of_bounds_placement_is_rejected() {
    let mut app = test_app();
    let building = spawn_building(&mut app, GridSize::new(2, 2));

    app.world_mut().write_message(PlaceBuildingCommand {
        entity: building,
        location: GridLocation::new(-1, 0),
    });
    tick(&mut app);

    assert!(app.world().resource::<GridMap>().obstacles().is_empty());
}

#[test]
fn removal_frees_cells_and_despawns_the_entity() {
    let mut app = test_app();
    let building = spawn_building(&mut app, GridSize::new(1, 1));
    let location = GridLocation::new(6, 6);

    app.world_mut().write_message(PlaceBuildingCommand { entity: building, location });
    tick(&mut app);
    assert!(app.world().resource::<GridMap>().is_occupied(location));

    app.world_mut().write_message(RemoveEntityCommand { entity: building });
    tick(&mut app);

    assert!(!app.world().resource::<GridMap>().is_occupied(location));
    assert!(app.world().get_entity(building).is_err(), "despawned");
}

#[test]
fn placement_invalidates_previously_cached_flow_fields() {
    let mut app = test_app();

    // Prime the cache for an unrelated target.
    let target = GridLocation::new(12, 8);
    let probe = GridLocation::new(6, 6);
    let before = field_distance(&mut app, target, probe);
    assert_eq!(builds(&app), 1);
    assert_ne!(before, UNREACHABLE);

    // Re-fetching without any obstacle change is a pure cache hit.
    field_distance(&mut app, target, probe);
    assert_eq!(builds(&app), 1);

    // Drop a building onto the probe cell.
    let building = spawn_building(&mut app, GridSize::new(1, 1));
    app.world_mut().write_message(PlaceBuildingCommand { entity: building, location: probe });
    tick(&mut app);

    let after = field_distance(&mut app, target, probe);
    assert_eq!(builds(&app), 2, "stale field must be rebuilt");
    assert_eq!(after, UNREACHABLE);
    assert_ne!(before, after);
}
