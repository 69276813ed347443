use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Static configuration loaded once at startup. These values define the
/// map geometry and agent kinetics; changing them mid-run would break the
/// deterministic replay of a tick sequence, so nothing hot-reloads them.
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
pub struct InitialConfig {
    // Simulation timing
    pub tick_rate: f64,

    // Map geometry
    pub map_columns: i32,
    pub map_rows: i32,
    pub cell_size: f32,

    // Agent kinetics
    pub agent_radius: f32,
    pub agent_mass: f32,
    pub linear_damping: f32,
    pub max_speed: f32,
    pub min_velocity: f32,

    // Steering
    pub move_force: f32,
    pub avoid_strength: f32,
    pub arrival_radius: f32,
    pub snap_radius: f32,

    // Headless demo scenario
    pub demo_agent_count: usize,
    pub demo_spawn_spread: f32,
    pub demo_tick_count: u64,
}

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_initial_config);
    }
}

/// Load static initial configuration synchronously at startup.
/// This must complete before any game state that depends on these values.
pub fn load_initial_config(mut commands: Commands) {
    let initial_config_path = "assets/initial_config.ron";

    match std::fs::read_to_string(initial_config_path) {
        Ok(contents) => match ron::from_str::<InitialConfig>(&contents) {
            Ok(config) => {
                info!("Loaded initial config from {}", initial_config_path);
                commands.insert_resource(config);
            }
            Err(e) => {
                error!("Failed to parse initial config: {}", e);
                error!("Using default InitialConfig");
                commands.insert_resource(InitialConfig::default());
            }
        },
        Err(e) => {
            error!("Failed to read {}: {}", initial_config_path, e);
            error!("Using default InitialConfig");
            commands.insert_resource(InitialConfig::default());
        }
    }
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20.0,
            map_columns: 24,
            map_rows: 16,
            cell_size: 1.0,
            agent_radius: 0.4,
            agent_mass: 1.0,
            linear_damping: 2.0,
            max_speed: 4.0,
            min_velocity: 0.01,
            move_force: 20.0,
            avoid_strength: 40.0,
            arrival_radius: 1.0,
            snap_radius: 0.05,
            demo_agent_count: 40,
            demo_spawn_spread: 2.0,
            demo_tick_count: 600,
        }
    }
}
