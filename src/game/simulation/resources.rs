/// Resource definitions for the simulation.
///
/// This module contains the simulation configuration, tick counter,
/// performance tracking, and the per-tick body snapshot used by the
/// avoidance pass.

use bevy::prelude::*;
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};

use crate::game::fixed_math::{FixedNum, FixedVec2};

// ============================================================================
// Tick & Performance Tracking
// ============================================================================

/// Global simulation tick counter, incremented once per FixedUpdate before
/// any other system runs.
#[derive(Resource, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

/// Performance tracking for simulation ticks
#[derive(Resource)]
pub struct SimPerformance {
    pub start_time: Option<Instant>,
    pub last_duration: Duration,
}

impl Default for SimPerformance {
    fn default() -> Self {
        Self {
            start_time: None,
            last_duration: Duration::from_secs(0),
        }
    }
}

// ============================================================================
// Simulation Configuration
// ============================================================================

/// Runtime simulation configuration with fixed-point values for
/// deterministic kinetics.
///
/// All values are converted once from [`crate::game::config::InitialConfig`]
/// (f32/f64, human-readable RON) at startup. Config files stay in floats;
/// the simulation layer only ever sees fixed point.
#[derive(Resource)]
pub struct SimConfig {
    pub tick_rate: f64,
    pub agent_radius: FixedNum,
    pub agent_mass: FixedNum,
    pub linear_damping: FixedNum,
    pub max_speed: FixedNum,
    pub min_velocity: FixedNum,
    pub move_force: FixedNum,
    pub avoid_strength: FixedNum,
    pub arrival_radius: FixedNum,
    pub snap_radius: FixedNum,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20.0,
            agent_radius: FixedNum::from_num(0.4),
            agent_mass: FixedNum::from_num(1.0),
            linear_damping: FixedNum::from_num(2.0),
            max_speed: FixedNum::from_num(4.0),
            min_velocity: FixedNum::from_num(0.01),
            move_force: FixedNum::from_num(20.0),
            avoid_strength: FixedNum::from_num(40.0),
            arrival_radius: FixedNum::from_num(1.0),
            snap_radius: FixedNum::from_num(0.05),
        }
    }
}

// ============================================================================
// Body Snapshot
// ============================================================================

/// One collidable body as the avoidance pass sees it.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub entity: Entity,
    pub position: FixedVec2,
    pub radius: FixedNum,
    pub layer: u32,
}

/// Per-tick snapshot of every collidable body.
///
/// Rebuilt at the start of each tick, then updated in place as the
/// integrator walks agents sequentially. A later agent's avoidance pass
/// therefore observes an earlier agent's already-updated position for the
/// same tick, matching the sequential in-place update model.
#[derive(Resource, Default)]
pub struct BodyCache {
    bodies: Vec<Body>,
    index: FxHashMap<Entity, usize>,
}

impl BodyCache {
    pub fn rebuild(&mut self, bodies: impl Iterator<Item = Body>) {
        self.bodies.clear();
        self.index.clear();
        for body in bodies {
            self.index.insert(body.entity, self.bodies.len());
            self.bodies.push(body);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    pub fn get(&self, entity: Entity) -> Option<&Body> {
        self.index.get(&entity).map(|&idx| &self.bodies[idx])
    }

    pub fn set_position(&mut self, entity: Entity, position: FixedVec2) {
        if let Some(&idx) = self.index.get(&entity) {
            self.bodies[idx].position = position;
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
