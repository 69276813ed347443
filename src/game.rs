use bevy::prelude::*;

pub mod config;
pub mod fixed_math;
pub mod grid;
pub mod map;
pub mod pathfinding;
pub mod scenario;
pub mod simulation;
pub mod unit;

use config::GameConfigPlugin;
use grid::GridPlugin;
use pathfinding::PathfindingPlugin;
use simulation::SimulationPlugin;

/// The complete kinetic core: configuration, occupancy grid, flow-field
/// cache, and the fixed-tick simulation. Rendering, input, and combat
/// resolution live with the embedding application.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            GameConfigPlugin,
            GridPlugin,
            PathfindingPlugin,
            SimulationPlugin,
        ));
    }
}
