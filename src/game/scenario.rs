//! Headless demo scenario.
//!
//! Applies the built-in demo layout and launches a wave of route-seeking
//! agents at the wall gap. Doubles as a stress harness: raise
//! `demo_agent_count` in the config to scale the wave.

use bevy::prelude::*;
use rand::{rng, Rng};

use crate::game::config::InitialConfig;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::grid::{Building, Footprint, GridLocation, GridMap, PlaceBuildingCommand};
use crate::game::map::demo_layout;
use crate::game::simulation::{
    layers, AgentKind, Collider, SimPosition, SimSet, SimTick, SpawnAgentCommand,
};
use crate::game::unit::Unit;

/// Where the demo wave is headed. The binary reads this for its end-of-run
/// summary.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ScenarioGoal(pub GridLocation);

pub struct ScenarioPlugin;

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            setup_scenario.after(crate::game::grid::init_grid_map),
        );
        app.add_systems(FixedUpdate, log_progress.after(SimSet::Movement));
    }
}

/// Instantiate the demo layout and queue the wave.
fn setup_scenario(
    mut commands: Commands,
    mut placements: MessageWriter<PlaceBuildingCommand>,
    mut spawns: MessageWriter<SpawnAgentCommand>,
    config: Res<InitialConfig>,
    map: Res<GridMap>,
) {
    let layout = demo_layout();
    let cell = map.cell_size();

    for site in &layout.buildings {
        let radius = FixedNum::from_num(site.size.w.min(site.size.h)) * cell
            / FixedNum::from_num(2);
        let entity = commands
            .spawn((
                Building,
                Footprint(site.size),
                SimPosition::default(),
                Collider {
                    radius,
                    layer: layers::BUILDING,
                    mask: layers::NONE,
                },
            ))
            .id();
        placements.write(PlaceBuildingCommand { entity, location: site.location });
    }

    // The wave routes into the stronghold's origin cell.
    let goal = GridLocation::new(20, 7);
    commands.insert_resource(ScenarioGoal(goal));

    let muster = map.center_point_for(GridLocation::new(1, 8));
    let spread = config.demo_spawn_spread;
    let mut rng = rng();
    for _ in 0..config.demo_agent_count {
        let jitter = FixedVec2::from_f32(
            rng.random_range(-spread..spread),
            rng.random_range(-spread..spread),
        );
        spawns.write(SpawnAgentCommand {
            position: muster + jitter,
            kind: AgentKind::Enemy,
            goal: Some(goal),
        });
    }

    info!(
        "Demo scenario: {} buildings placed, {} agents mustering at ({:.1}, {:.1})",
        layout.buildings.len(),
        config.demo_agent_count,
        muster.x.to_num::<f32>(),
        muster.y.to_num::<f32>()
    );
}

/// Periodic wave status.
fn log_progress(
    tick: Res<SimTick>,
    goal: Option<Res<ScenarioGoal>>,
    map: Option<Res<GridMap>>,
    units: Query<&SimPosition, With<Unit>>,
) {
    if tick.0 == 0 || tick.0 % 100 != 0 {
        return;
    }
    let (Some(goal), Some(map)) = (goal, map) else {
        return;
    };

    let goal_center = map.center_point_for(goal.0);
    let mut arrived = 0;
    let mut farthest = FixedNum::ZERO;
    for pos in units.iter() {
        let dist = (goal_center - pos.0).length();
        if dist <= FixedNum::from_num(2.0) {
            arrived += 1;
        }
        farthest = farthest.max(dist);
    }

    info!(
        "[WAVE] tick {} | {} units | {} arrived | farthest {:.1}",
        tick.0,
        units.iter().len(),
        arrived,
        farthest.to_num::<f32>()
    );
}
