/// Core simulation systems.
///
/// This module contains systems for:
/// - Tick counting
/// - Command processing (spawn, move, stop, impulse)
/// - Body snapshot refresh
/// - Sequential steering + kinetic integration
/// - Simulation timing/performance tracking

use bevy::prelude::*;
use rampart_macros::profile;

use crate::game::config::InitialConfig;
use crate::game::grid::GridMap;
use crate::game::pathfinding::FlowFieldManager;
use crate::game::unit::{CombatTarget, Health, Mobility, Steering, SteeringContext, Unit};
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::profile_log;

use super::components::*;
use super::events::*;
use super::physics;
use super::resources::*;

// ============================================================================
// Tick Management
// ============================================================================

/// Increment the global simulation tick counter.
///
/// This system runs first in the FixedUpdate schedule to ensure all other
/// systems have access to the current tick value for deterministic logic
/// and conditional logging.
pub fn increment_sim_tick(mut tick: ResMut<SimTick>) {
    tick.increment();
}

// ============================================================================
// Configuration
// ============================================================================

/// Convert the float-based initial configuration into the fixed-point
/// [`SimConfig`] and align the fixed timestep with the configured tick rate.
pub fn init_sim_config_from_initial(
    mut sim_config: ResMut<SimConfig>,
    mut fixed_time: ResMut<Time<Fixed>>,
    config: Res<InitialConfig>,
) {
    sim_config.tick_rate = config.tick_rate;
    sim_config.agent_radius = FixedNum::from_num(config.agent_radius);
    sim_config.agent_mass = FixedNum::from_num(config.agent_mass);
    sim_config.linear_damping = FixedNum::from_num(config.linear_damping);
    sim_config.max_speed = FixedNum::from_num(config.max_speed);
    sim_config.min_velocity = FixedNum::from_num(config.min_velocity);
    sim_config.move_force = FixedNum::from_num(config.move_force);
    sim_config.avoid_strength = FixedNum::from_num(config.avoid_strength);
    sim_config.arrival_radius = FixedNum::from_num(config.arrival_radius);
    sim_config.snap_radius = FixedNum::from_num(config.snap_radius);

    fixed_time.set_timestep_hz(config.tick_rate);

    info!("SimConfig initialized at {} Hz", config.tick_rate);
}

// ============================================================================
// Command Processing
// ============================================================================

/// Apply queued agent commands in arrival order.
pub fn process_commands(
    mut commands: Commands,
    mut spawns: MessageReader<SpawnAgentCommand>,
    mut moves: MessageReader<MoveCommand>,
    mut stops: MessageReader<StopCommand>,
    mut impulses: MessageReader<ImpulseCommand>,
    mut agents: Query<(&mut Mobility, &mut SimVelocity)>,
    sim_config: Res<SimConfig>,
) {
    for command in moves.read() {
        if let Ok((mut mobility, _)) = agents.get_mut(command.entity) {
            mobility.target = Some(command.target);
        }
    }

    for command in stops.read() {
        if let Ok((mut mobility, mut vel)) = agents.get_mut(command.entity) {
            mobility.target = None;
            vel.0 = FixedVec2::ZERO;
        }
    }

    for command in impulses.read() {
        if let Ok((mobility, mut vel)) = agents.get_mut(command.entity) {
            vel.0 = physics::impulse_velocity(vel.0, command.impulse, mobility.mass);
        }
    }

    for command in spawns.read() {
        spawn_agent(&mut commands, command, &sim_config);
    }
}

fn spawn_agent(commands: &mut Commands, command: &SpawnAgentCommand, config: &SimConfig) {
    let (collider, steering) = match command.kind {
        AgentKind::Enemy => (
            Collider {
                radius: config.agent_radius,
                layer: layers::ENEMY,
                mask: layers::BUILDING | layers::WORKER | layers::ENEMY,
            },
            Steering::enemy(command.goal, config.avoid_strength),
        ),
        AgentKind::Worker => (
            Collider {
                radius: config.agent_radius,
                layer: layers::WORKER,
                mask: layers::NONE,
            },
            Steering::worker(),
        ),
    };

    commands.spawn((
        Unit,
        Health { current: 100.0, max: 100.0 },
        SimPosition(command.position),
        SimVelocity(FixedVec2::ZERO),
        Mobility::from_config(config),
        steering,
        collider,
        CombatTarget::default(),
    ));
}

// ============================================================================
// Body Snapshot
// ============================================================================

/// Rebuild the per-tick body snapshot from every collidable entity.
#[profile]
pub fn refresh_body_cache(
    mut bodies: ResMut<BodyCache>,
    query: Query<(Entity, &SimPosition, &Collider)>,
) {
    bodies.rebuild(query.iter().map(|(entity, pos, collider)| Body {
        entity,
        position: pos.0,
        radius: collider.radius,
        layer: collider.layer,
    }));
}

// ============================================================================
// Steering + Integration
// ============================================================================

/// Advance every steering agent by one tick, sequentially.
///
/// Per agent: snap inside the snap radius, sum behavior forces, integrate
/// velocity under mass/damping/speed cap, integrate position, update
/// facing. The agent's entry in [`BodyCache`] is refreshed immediately, so
/// agents later in the iteration see this agent's new position.
#[profile(2)]
pub fn integrate_motion(
    mut agents: Query<(
        Entity,
        &mut SimPosition,
        &mut SimVelocity,
        &mut Mobility,
        &Steering,
        &Collider,
        Option<&CombatTarget>,
    )>,
    mut bodies: ResMut<BodyCache>,
    mut fields: ResMut<FlowFieldManager>,
    map: Res<GridMap>,
    sim_config: Res<SimConfig>,
    #[allow(unused_variables)] tick: Res<SimTick>,
) {
    let dt = FixedNum::ONE / FixedNum::from_num(sim_config.tick_rate);

    for (entity, mut pos, mut vel, mut mobility, steering, collider, combat) in agents.iter_mut() {
        // 1. Snap to target when close enough; kills arrival jitter.
        if let Some(target) = mobility.target {
            if (target - pos.0).length() <= mobility.snap_radius {
                pos.0 = target;
                vel.0 = FixedVec2::ZERO;
            }
        }

        // The combat target is live while the entity it points at is still
        // a simulated body this tick.
        let engaged = combat
            .and_then(|target| target.0)
            .map(|victim| bodies.contains(victim))
            .unwrap_or(false);

        // 2. Sum steering forces.
        let mut net_force = FixedVec2::ZERO;
        {
            let mut ctx = SteeringContext {
                entity,
                position: pos.0,
                velocity: vel.0,
                mobility: &*mobility,
                collider,
                engaged,
                bodies: &*bodies,
                map: &*map,
                fields: &mut *fields,
                dt,
            };
            for behavior in steering.behaviors.iter() {
                net_force = net_force + behavior.compute_force(&mut ctx);
            }
        }

        if net_force != FixedVec2::ZERO {
            mobility.facing = net_force.normalize();
        }

        // 3-5. Velocity under force, damping, and the hard speed cap.
        vel.0 = physics::accelerate(vel.0, net_force, mobility.mass, dt);
        vel.0 = physics::dampen(vel.0, mobility.linear_damping, sim_config.min_velocity, dt);
        vel.0 = vel.0.clamp_length(mobility.max_speed);

        // 6. Position.
        if vel.0 != FixedVec2::ZERO {
            pos.0 = pos.0 + vel.0 * dt;
        }

        // 7. Facing follows inertia when no behavior fired.
        if net_force == FixedVec2::ZERO && vel.0 != FixedVec2::ZERO {
            mobility.facing = vel.0.normalize();
        }

        bodies.set_position(entity, pos.0);
    }

    profile_log!(tick, "[INTEGRATE] agents: {}", agents.iter().count());
}

// ============================================================================
// Performance Tracking
// ============================================================================

/// Log simulation status periodically
pub fn sim_start(
    #[allow(unused_variables)] stats: Res<SimPerformance>,
    #[allow(unused_variables)] tick: Res<SimTick>,
    #[allow(unused_variables)] units_query: Query<Entity, With<Unit>>,
) {
    profile_log!(
        tick,
        "[SIM STATUS] Tick: {} | Units: {} | Last sim duration: {:?}",
        tick.0,
        units_query.iter().len(),
        stats.last_duration
    );
}

/// Update simulation performance stats
///
/// NOTE: Individual system timing is handled by #[profile] macro.
/// This tracks overall fixed update duration for monitoring.
#[profile(16)]
pub fn sim_end(mut stats: ResMut<SimPerformance>, time: Res<Time<Fixed>>) {
    stats.last_duration = time.delta();
}
