//! Composable steering behaviors.
//!
//! Each behavior produces a force from the agent's current state; an
//! agent's behaviors are summed by the integrator every tick. Behaviors are
//! a tagged variant behind one dispatch method so any of them (including
//! the pause decorator's inner behavior) is substitutable for any other.

use bevy::prelude::*;
use smallvec::{smallvec, SmallVec};

use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::grid::{GridLocation, GridMap};
use crate::game::pathfinding::FlowFieldManager;
use crate::game::simulation::{layers, BodyCache, Collider};

use super::components::Mobility;

#[cfg(test)]
#[path = "steering_tests.rs"]
mod tests;

/// Everything a behavior may read while computing its force. Behaviors have
/// no side effects beyond the flow-field cache filling on demand.
pub struct SteeringContext<'a> {
    pub entity: Entity,
    pub position: FixedVec2,
    pub velocity: FixedVec2,
    pub mobility: &'a Mobility,
    pub collider: &'a Collider,
    /// True while the agent's combat target is live this tick.
    pub engaged: bool,
    pub bodies: &'a BodyCache,
    pub map: &'a GridMap,
    pub fields: &'a mut FlowFieldManager,
    /// Part of the behavior contract; the current behaviors are
    /// impulse-free and do not read it.
    pub dt: FixedNum,
}

/// A pluggable force producer.
#[derive(Debug, Clone)]
pub enum SteeringBehavior {
    /// Ease-in arrival toward the agent's movement target.
    Seek,
    /// Pairwise repulsion from overlapping bodies the agent's collider
    /// mask selects. O(N) per agent over the body snapshot.
    Avoid { strength: FixedNum },
    /// Follow the flow field toward a goal cell, with a direct-seek
    /// fallback so a missing goal or empty sample never stalls the agent.
    RouteSeek { goal: Option<GridLocation> },
    /// Decorator: zero force while the agent is fighting, otherwise the
    /// wrapped behavior unchanged.
    PauseWhenAttacking(Box<SteeringBehavior>),
}

impl SteeringBehavior {
    pub fn compute_force(&self, ctx: &mut SteeringContext) -> FixedVec2 {
        match self {
            SteeringBehavior::Seek => seek_force(ctx),
            SteeringBehavior::Avoid { strength } => avoid_force(ctx, *strength),
            SteeringBehavior::RouteSeek { goal } => route_seek_force(ctx, *goal),
            SteeringBehavior::PauseWhenAttacking(inner) => {
                if ctx.engaged {
                    FixedVec2::ZERO
                } else {
                    inner.compute_force(ctx)
                }
            }
        }
    }

    fn route_goal_mut(&mut self) -> Option<&mut Option<GridLocation>> {
        match self {
            SteeringBehavior::RouteSeek { goal } => Some(goal),
            SteeringBehavior::PauseWhenAttacking(inner) => inner.route_goal_mut(),
            _ => None,
        }
    }
}

/// An agent's ordered behavior list. Forces sum, so order does not change
/// the net force; it only decides which behavior logs/faces last.
#[derive(Component, Debug, Clone)]
pub struct Steering {
    pub behaviors: SmallVec<[SteeringBehavior; 4]>,
}

impl Steering {
    pub fn new(behaviors: impl IntoIterator<Item = SteeringBehavior>) -> Self {
        Self { behaviors: behaviors.into_iter().collect() }
    }

    /// Default enemy wiring: route toward the goal unless fighting, and
    /// shoulder past buildings, workers, and other enemies.
    pub fn enemy(goal: Option<GridLocation>, avoid_strength: FixedNum) -> Self {
        Self {
            behaviors: smallvec![
                SteeringBehavior::PauseWhenAttacking(Box::new(SteeringBehavior::RouteSeek {
                    goal
                })),
                SteeringBehavior::Avoid { strength: avoid_strength },
            ],
        }
    }

    /// Default worker wiring: direct seek only.
    pub fn worker() -> Self {
        Self { behaviors: smallvec![SteeringBehavior::Seek] }
    }

    /// The route goal, looked up through any pause decorators.
    pub fn route_goal_mut(&mut self) -> Option<&mut Option<GridLocation>> {
        self.behaviors
            .iter_mut()
            .find_map(|behavior| behavior.route_goal_mut())
    }
}

// ============================================================================
// Behavior implementations
// ============================================================================

/// Seek the mobility target with ease-in arrival: full force beyond the
/// arrival radius, tapering linearly to zero at the target.
fn seek_force(ctx: &SteeringContext) -> FixedVec2 {
    match ctx.mobility.target {
        Some(target) if target != ctx.position => seek_toward(ctx, target),
        _ => FixedVec2::ZERO,
    }
}

fn seek_toward(ctx: &SteeringContext, target: FixedVec2) -> FixedVec2 {
    let to_target = target - ctx.position;
    let dist = to_target.length();
    if dist <= FixedNum::ZERO {
        return FixedVec2::ZERO;
    }
    let dir = to_target / dist;
    let arrival = ctx.mobility.arrival_radius.max(FixedNum::from_num(0.0001));
    let factor = (dist / arrival).min(FixedNum::ONE);
    dir * (ctx.mobility.move_force * factor)
}

/// Repulsion from every overlapping body whose layer the agent's mask
/// selects, scaled by penetration depth. Coincident centers have no
/// defined push direction and are skipped.
fn avoid_force(ctx: &SteeringContext, strength: FixedNum) -> FixedVec2 {
    if ctx.collider.mask == layers::NONE {
        return FixedVec2::ZERO;
    }

    let mut force = FixedVec2::ZERO;
    for body in ctx.bodies.iter() {
        if body.entity == ctx.entity {
            continue;
        }
        if body.layer & ctx.collider.mask == 0 {
            continue;
        }

        let offset = ctx.position - body.position;
        let dist = offset.length();
        if dist <= FixedNum::ZERO {
            continue;
        }

        let touch_dist = ctx.collider.radius + body.radius;
        if touch_dist <= FixedNum::ZERO {
            continue;
        }
        let penetration = touch_dist - dist;
        if penetration <= FixedNum::ZERO {
            continue;
        }

        let dir = offset / dist;
        force = force + dir * (strength * penetration / touch_dist);
    }
    force
}

/// Flow-field following with a precise final approach: inside the arrival
/// radius of the goal cell's center the agent seeks the exact point;
/// outside it rides the field. Anything missing degrades to direct seek.
fn route_seek_force(ctx: &mut SteeringContext, goal: Option<GridLocation>) -> FixedVec2 {
    let Some(goal) = goal else {
        return seek_force(ctx);
    };

    let approach = ctx.map.center_point_for(goal);
    if (approach - ctx.position).length() <= ctx.mobility.arrival_radius {
        return seek_toward(ctx, approach);
    }

    let direction = {
        let field = ctx.fields.get_flow_field(goal, ctx.map);
        field.direction_at_world(ctx.position, ctx.map)
    };

    if direction != FixedVec2::ZERO {
        direction * ctx.mobility.move_force
    } else {
        seek_toward(ctx, approach)
    }
}
