use bevy::prelude::*;

use rampart::game::fixed_math::{FixedNum, FixedVec2};
use rampart::game::grid::{
    Building, Footprint, GridLocation, GridMap, GridSize, PlaceBuildingCommand,
};
use rampart::game::simulation::{layers, AgentKind, Collider, SimPosition, SpawnAgentCommand};
use rampart::game::unit::Unit;
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

fn place_building(app: &mut App, location: GridLocation, size: GridSize) {
    let entity = app
        .world_mut()
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
        .id();
    app.world_mut().write_message(PlaceBuildingCommand { entity, location });
    tick(app);
}

#[test]
fn an_agent_routes_around_a_wall_to_its_goal() {
    let mut app = test_app();

    // Wall across column 10 with a gap at rows 7-8 (default 24x16 map).
    place_building(&mut app, GridLocation::new(10, 0), GridSize::new(1, 7));
    place_building(&mut app, GridLocation::new(10, 9), GridSize::new(1, 7));

    let goal = GridLocation::new(18, 12);
    let start = {
        let map = app.world().resource::<GridMap>();
        // Same row band as the goal but on the wrong side of the wall.
        map.center_point_for(GridLocation::new(3, 12))
    };

    app.world_mut().write_message(SpawnAgentCommand {
        position: start,
        kind: AgentKind::Enemy,
        goal: Some(goal),
    });
    tick(&mut app);

    let mut query = app.world_mut().query_filtered::<Entity, With<Unit>>();
    let agent = query.iter(app.world()).next().expect("agent spawned");

    let goal_center = app.world().resource::<GridMap>().center_point_for(goal);

    let mut closest = (goal_center - start).length();
    for _ in 0..800 {
        tick(&mut app);
        let pos = app.world().get::<SimPosition>(agent).expect("position").0;
        let dist = (goal_center - pos).length();
        closest = closest.min(dist);
        if dist <= FixedNum::from_num(0.5) {
            break;
        }
    }

    assert!(
        closest <= FixedNum::from_num(0.5),
        "agent never reached the goal; closest approach {:?}",
        closest
    );
}

#[test]
fn a_wave_sharing_one_goal_reuses_a_single_field() {
    let mut app = test_app();

    let goal = GridLocation::new(20, 8);
    for i in 0..8 {
        app.world_mut().write_message(SpawnAgentCommand {
            position: FixedVec2::from_f32(-8.0, -4.0 + i as f32),
            kind: AgentKind::Enemy,
            goal: Some(goal),
        });
    }

    for _ in 0..20 {
        tick(&mut app);
    }

    let manager = app.world().resource::<rampart::game::pathfinding::FlowFieldManager>();
    assert_eq!(manager.builds(), 1, "one field serves the whole wave");
    assert_eq!(manager.cache_size(), 1);
}

#[test]
fn avoidance_keeps_a_marching_column_spread_out() {
    let mut app = test_app();

    // Two enemies stacked almost on top of each other, same goal.
    let goal = GridLocation::new(20, 8);
    for i in 0..2 {
        app.world_mut().write_message(SpawnAgentCommand {
            position: FixedVec2::from_f32(-6.0, 0.2 * i as f32),
            kind: AgentKind::Enemy,
            goal: Some(goal),
        });
    }
    tick(&mut app);

    for _ in 0..40 {
        tick(&mut app);
    }

    let mut query = app.world_mut().query_filtered::<&SimPosition, With<Unit>>();
    let positions: Vec<FixedVec2> = query.iter(app.world()).map(|p| p.0).collect();
    assert_eq!(positions.len(), 2);

    let separation = (positions[0] - positions[1]).length();
    let touch = FixedNum::from_num(0.6); // below 2 * agent_radius
    assert!(
        separation > touch,
        "avoidance should hold agents apart, separation {:?}",
        separation
    );
}
