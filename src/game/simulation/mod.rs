/// Simulation layer - deterministic kinetic core.
///
/// This module is organized into:
/// - **components**: Kinetic components (position, velocity, collider)
/// - **resources**: Configuration, tick counter, body snapshot
/// - **events**: Commands for controlling agents
/// - **physics**: Integration primitives
/// - **systems**: Command processing, snapshot refresh, integration

use bevy::prelude::*;

// Module declarations
pub mod components;
pub mod events;
pub mod physics;
pub mod resources;
pub mod systems;

// Re-export commonly used items
pub use components::*;
pub use events::*;
pub use resources::*;

// System sets for organizing execution order
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum SimSet {
    Input,    // Processing commands into state changes
    Movement, // Steering forces + kinetic integration
}

/// Main simulation plugin
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Configure FixedUpdate timestep; re-aligned with the configured
        // tick rate at startup.
        app.insert_resource(Time::<Fixed>::from_seconds(1.0 / 20.0));

        app.init_resource::<SimConfig>();
        app.init_resource::<SimPerformance>();
        app.init_resource::<SimTick>();
        app.init_resource::<BodyCache>();

        // Register commands
        app.add_message::<SpawnAgentCommand>();
        app.add_message::<MoveCommand>();
        app.add_message::<StopCommand>();
        app.add_message::<ImpulseCommand>();

        // Configure System Sets
        app.configure_sets(FixedUpdate, (SimSet::Input, SimSet::Movement).chain());

        // Startup systems
        app.add_systems(
            Startup,
            systems::init_sim_config_from_initial.after(crate::game::config::load_initial_config),
        );

        // Fixed update systems (deterministic simulation)
        app.add_systems(FixedUpdate, (
            // Increment tick counter first (before all other systems)
            systems::increment_sim_tick.before(systems::sim_start),

            // Pre-simulation
            systems::sim_start.before(SimSet::Input),

            // Command processing
            systems::process_commands.in_set(SimSet::Input),

            // Movement: snapshot refresh, then the sequential integrate pass
            systems::refresh_body_cache
                .in_set(SimSet::Movement)
                .before(systems::integrate_motion),
            systems::integrate_motion.in_set(SimSet::Movement),

            // Post-simulation
            systems::sim_end.after(SimSet::Movement),
        ));
    }
}
