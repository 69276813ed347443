use bevy::prelude::*;

use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::simulation::SimConfig;

/// Marks an entity as a steering agent.
#[derive(Component)]
pub struct Unit;

/// Health pool. Damage resolution happens outside the kinetic core; this
/// exists so external combat systems have somewhere to account against.
#[derive(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

/// The combat collaborator's "currently fighting" signal.
///
/// External attack logic points this at whatever the agent is engaging and
/// clears it when the fight ends. The pause-while-attacking decorator treats
/// the target as live while the pointed-at entity is still simulated.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CombatTarget(pub Option<Entity>);

/// Per-agent kinetic parameters and movement intent.
///
/// Velocity and position live in `SimVelocity`/`SimPosition`; this carries
/// everything the integrator and the steering behaviors read per agent.
#[derive(Component, Debug, Clone)]
pub struct Mobility {
    pub mass: FixedNum,
    /// Per-second fractional velocity decay.
    pub linear_damping: FixedNum,
    /// Hard speed cap after integration.
    pub max_speed: FixedNum,
    /// Base steering force magnitude.
    pub move_force: FixedNum,
    /// Distance at which seek-style behaviors start easing off.
    pub arrival_radius: FixedNum,
    /// Distance inside which the agent snaps onto its target and stops.
    pub snap_radius: FixedNum,
    /// Current movement target, if any.
    pub target: Option<FixedVec2>,
    /// Last non-zero facing direction.
    pub facing: FixedVec2,
}

impl Mobility {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            mass: config.agent_mass,
            linear_damping: config.linear_damping,
            max_speed: config.max_speed,
            move_force: config.move_force,
            arrival_radius: config.arrival_radius,
            snap_radius: config.snap_radius,
            target: None,
            facing: FixedVec2::new(FixedNum::ZERO, -FixedNum::ONE),
        }
    }

    /// "Moving" as other systems understand it: has a target it is not
    /// standing on. The integrator itself never branches on this.
    pub fn is_moving(&self, position: FixedVec2) -> bool {
        self.target.is_some_and(|target| target != position)
    }
}
