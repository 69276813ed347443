use bevy::prelude::*;

use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::grid::{GridLocation, GridMap};
use crate::game::pathfinding::FlowFieldManager;
use crate::game::simulation::{layers, Body, BodyCache, Collider, SimConfig};

use crate::game::unit::Mobility;

use super::{Steering, SteeringBehavior, SteeringContext};

fn num(v: f32) -> FixedNum {
    FixedNum::from_num(v)
}

fn assert_close(actual: FixedNum, expected: FixedNum) {
    let tolerance = num(0.01);
    let diff = if actual > expected { actual - expected } else { expected - actual };
    assert!(diff <= tolerance, "expected {:?}, got {:?}", expected, actual);
}

/// Owns everything a steering context borrows, with config defaults. All
/// entity ids come from the rig's own world so they never collide.
struct Rig {
    world: World,
    entity: Entity,
    position: FixedVec2,
    mobility: Mobility,
    collider: Collider,
    engaged: bool,
    bodies: BodyCache,
    map: GridMap,
    fields: FlowFieldManager,
}

impl Rig {
    fn new() -> Self {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        let config = SimConfig::default();
        Self {
            world,
            entity,
            position: FixedVec2::ZERO,
            mobility: Mobility::from_config(&config),
            collider: Collider::default(),
            engaged: false,
            bodies: BodyCache::default(),
            map: GridMap::new(8, 8, FixedNum::ONE),
            fields: FlowFieldManager::default(),
        }
    }

    fn body_at(&mut self, x: f32, y: f32, radius: f32, layer: u32) -> Body {
        Body {
            entity: self.world.spawn_empty().id(),
            position: FixedVec2::from_f32(x, y),
            radius: FixedNum::from_num(radius),
            layer,
        }
    }

    fn ctx(&mut self) -> SteeringContext<'_> {
        SteeringContext {
            entity: self.entity,
            position: self.position,
            velocity: FixedVec2::ZERO,
            mobility: &self.mobility,
            collider: &self.collider,
            engaged: self.engaged,
            bodies: &self.bodies,
            map: &self.map,
            fields: &mut self.fields,
            dt: num(0.05),
        }
    }
}

// ------------------------------------------------------------------
// Seek
// ------------------------------------------------------------------

#[test]
fn seek_is_zero_without_a_target() {
    let mut rig = Rig::new();
    assert_eq!(SteeringBehavior::Seek.compute_force(&mut rig.ctx()), FixedVec2::ZERO);
}

#[test]
fn seek_is_zero_standing_on_the_target() {
    let mut rig = Rig::new();
    rig.mobility.target = Some(rig.position);
    assert_eq!(SteeringBehavior::Seek.compute_force(&mut rig.ctx()), FixedVec2::ZERO);
}

#[test]
fn seek_runs_at_full_force_beyond_the_arrival_radius() {
    let mut rig = Rig::new();
    rig.mobility.target = Some(FixedVec2::from_f32(4.0, 0.0));

    let force = SteeringBehavior::Seek.compute_force(&mut rig.ctx());
    assert_close(force.length(), rig.mobility.move_force);
    assert!(force.x > FixedNum::ZERO);
    assert_eq!(force.y, FixedNum::ZERO);
}

#[test]
fn seek_tapers_linearly_inside_the_arrival_radius() {
    let mut rig = Rig::new();
    // arrival_radius is 1.0; at half that distance the force halves.
    rig.mobility.target = Some(FixedVec2::from_f32(0.5, 0.0));

    let force = SteeringBehavior::Seek.compute_force(&mut rig.ctx());
    assert_close(force.length(), rig.mobility.move_force / num(2.0));
}

// ------------------------------------------------------------------
// Avoid
// ------------------------------------------------------------------

#[test]
fn avoid_pushes_away_from_an_overlapping_building() {
    let mut rig = Rig::new();
    let strength = num(40.0);
    rig.collider.radius = num(0.5);
    let building = rig.body_at(0.6, 0.0, 0.5, layers::BUILDING);
    rig.bodies.rebuild([building].into_iter());

    let force = SteeringBehavior::Avoid { strength }.compute_force(&mut rig.ctx());
    // penetration 0.4 over touch distance 1.0, directed away from the body.
    assert!(force.x < FixedNum::ZERO);
    assert_close(force.length(), strength * num(0.4));
}

#[test]
fn avoid_ignores_separated_bodies() {
    let mut rig = Rig::new();
    rig.collider.radius = num(0.5);
    let building = rig.body_at(3.0, 0.0, 0.5, layers::BUILDING);
    rig.bodies.rebuild([building].into_iter());

    let force = SteeringBehavior::Avoid { strength: num(40.0) }.compute_force(&mut rig.ctx());
    assert_eq!(force, FixedVec2::ZERO);
}

#[test]
fn avoid_skips_coincident_centers() {
    let mut rig = Rig::new();
    let building = rig.body_at(0.0, 0.0, 0.5, layers::BUILDING);
    rig.bodies.rebuild([building].into_iter());

    let force = SteeringBehavior::Avoid { strength: num(40.0) }.compute_force(&mut rig.ctx());
    assert_eq!(force, FixedVec2::ZERO);
}

#[test]
fn avoid_only_reacts_to_masked_layers() {
    let mut rig = Rig::new();
    let projectile = rig.body_at(0.3, 0.0, 0.5, layers::PROJECTILE);
    rig.bodies.rebuild([projectile].into_iter());

    let force = SteeringBehavior::Avoid { strength: num(40.0) }.compute_force(&mut rig.ctx());
    assert_eq!(force, FixedVec2::ZERO, "projectiles are not avoided");
}

#[test]
fn unmasked_agents_never_avoid() {
    let mut rig = Rig::new();
    rig.collider.layer = layers::WORKER;
    rig.collider.mask = layers::NONE;
    let building = rig.body_at(0.3, 0.0, 0.5, layers::BUILDING);
    rig.bodies.rebuild([building].into_iter());

    let force = SteeringBehavior::Avoid { strength: num(40.0) }.compute_force(&mut rig.ctx());
    assert_eq!(force, FixedVec2::ZERO);
}

#[test]
fn avoid_accumulates_over_all_overlapping_bodies() {
    let mut rig = Rig::new();
    rig.collider.radius = num(0.5);
    let left = rig.body_at(0.6, 0.0, 0.5, layers::BUILDING);
    let right = rig.body_at(-0.6, 0.0, 0.5, layers::ENEMY);
    rig.bodies.rebuild([left, right].into_iter());

    // Symmetric pushes cancel.
    let force = SteeringBehavior::Avoid { strength: num(40.0) }.compute_force(&mut rig.ctx());
    assert_close(force.length(), FixedNum::ZERO);
}

// ------------------------------------------------------------------
// RouteSeek
// ------------------------------------------------------------------

#[test]
fn route_seek_rides_the_flow_field_when_far_from_the_goal() {
    let mut rig = Rig::new();
    let goal = GridLocation::new(6, 4);
    rig.position = rig.map.center_point_for(GridLocation::new(1, 4));

    let behavior = SteeringBehavior::RouteSeek { goal: Some(goal) };
    let force = behavior.compute_force(&mut rig.ctx());

    // On an open map the field at (1,4) points straight at the goal row.
    assert_close(force.x, rig.mobility.move_force);
    assert_close(force.y, FixedNum::ZERO);
    assert_eq!(rig.fields.builds(), 1);
}

#[test]
fn route_seek_switches_to_precise_seek_inside_the_arrival_radius() {
    let mut rig = Rig::new();
    let goal = GridLocation::new(6, 4);
    let goal_center = rig.map.center_point_for(goal);
    rig.position = goal_center + FixedVec2::from_f32(0.5, 0.0);

    let behavior = SteeringBehavior::RouteSeek { goal: Some(goal) };
    let force = behavior.compute_force(&mut rig.ctx());

    // Direct ease-in seek toward the exact cell center: half force, no
    // field build.
    assert!(force.x < FixedNum::ZERO);
    assert_close(force.length(), rig.mobility.move_force / num(2.0));
    assert_eq!(rig.fields.builds(), 0);
}

#[test]
fn route_seek_without_a_goal_falls_back_to_direct_seek() {
    let mut rig = Rig::new();
    rig.mobility.target = Some(FixedVec2::from_f32(4.0, 0.0));

    let routed = SteeringBehavior::RouteSeek { goal: None }.compute_force(&mut rig.ctx());
    let sought = SteeringBehavior::Seek.compute_force(&mut rig.ctx());
    assert_eq!(routed, sought);
}

#[test]
fn route_seek_with_a_dead_end_sample_seeks_straight() {
    let mut rig = Rig::new();
    // Stand far outside the map: the field sample there is zero, so the
    // behavior must fall back to seeking the goal center directly.
    let goal = GridLocation::new(6, 4);
    rig.position = FixedVec2::from_f32(-100.0, 0.0);

    let behavior = SteeringBehavior::RouteSeek { goal: Some(goal) };
    let force = behavior.compute_force(&mut rig.ctx());
    assert!(force.x > FixedNum::ZERO, "must head back toward the map");
}

// ------------------------------------------------------------------
// PauseWhenAttacking
// ------------------------------------------------------------------

#[test]
fn pause_decorator_halts_movement_while_engaged() {
    let mut rig = Rig::new();
    rig.mobility.target = Some(FixedVec2::from_f32(4.0, 0.0));
    let behavior = SteeringBehavior::PauseWhenAttacking(Box::new(SteeringBehavior::Seek));

    rig.engaged = true;
    assert_eq!(behavior.compute_force(&mut rig.ctx()), FixedVec2::ZERO);

    rig.engaged = false;
    let force = behavior.compute_force(&mut rig.ctx());
    assert_close(force.length(), rig.mobility.move_force);
}

#[test]
fn route_goal_is_reachable_through_the_decorator() {
    let goal = GridLocation::new(3, 3);
    let mut steering = Steering::enemy(Some(goal), FixedNum::from_num(40.0));

    assert_eq!(*steering.route_goal_mut().expect("goal slot"), Some(goal));

    *steering.route_goal_mut().expect("goal slot") = None;
    assert_eq!(*steering.route_goal_mut().expect("goal slot"), None);
}

#[test]
fn worker_wiring_has_no_avoidance() {
    let steering = Steering::worker();
    assert_eq!(steering.behaviors.len(), 1);
    assert!(matches!(steering.behaviors[0], SteeringBehavior::Seek));
}
