/// Component definitions for the simulation layer.
///
/// This module contains the kinetic state shared by every simulated body:
/// position, velocity, and the collision circle with its classification
/// bits.

use bevy::prelude::*;

use crate::game::fixed_math::{FixedNum, FixedVec2};

// ============================================================================
// Position & Physics Components
// ============================================================================

/// Logical position of an entity in the simulation world.
/// We use FixedVec2 for deterministic gameplay.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SimPosition(pub FixedVec2);

/// Logical velocity of an entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SimVelocity(pub FixedVec2);

// ============================================================================
// Collision & Classification
// ============================================================================

/// Classification bits carried by every collidable body. Targeting and
/// avoidance filters match on these.
pub mod layers {
    pub const NONE: u32 = 0;
    pub const ENEMY: u32 = 1 << 0;
    pub const ALLY: u32 = 1 << 1;
    pub const BUILDING: u32 = 1 << 2;
    pub const WORKER: u32 = 1 << 3;
    pub const PROJECTILE: u32 = 1 << 4;
    pub const ALL: u32 = u32::MAX;
}

/// Collision circle plus classification.
///
/// `layer` is what this body is; `mask` is which layers it steers away
/// from. Only enemies carry a non-empty mask in the default wiring, so
/// everything else ignores the avoidance pass.
#[derive(Component, Debug, Clone, Copy)]
pub struct Collider {
    pub radius: FixedNum,
    pub layer: u32,
    pub mask: u32,
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            radius: FixedNum::from_num(0.5),
            layer: layers::ENEMY,
            mask: layers::BUILDING | layers::WORKER | layers::ENEMY,
        }
    }
}
