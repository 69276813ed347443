/// Kinetic integration primitives.
///
/// Pure functions over fixed-point state; the per-agent step order lives in
/// `systems::integrate_motion`, which calls these in sequence.

use crate::game::fixed_math::{FixedNum, FixedVec2};

/// Accelerate by `net_force / mass * dt`. Non-positive mass means the body
/// does not respond to forces.
pub fn accelerate(vel: FixedVec2, net_force: FixedVec2, mass: FixedNum, dt: FixedNum) -> FixedVec2 {
    if mass <= FixedNum::ZERO {
        return vel;
    }
    vel + net_force / mass * dt
}

/// Apply per-second linear damping, zeroing the velocity outright once it
/// falls under `min_velocity` so agents settle instead of creeping.
pub fn dampen(
    vel: FixedVec2,
    damping: FixedNum,
    min_velocity: FixedNum,
    dt: FixedNum,
) -> FixedVec2 {
    let keep = (FixedNum::ONE - damping * dt).max(FixedNum::ZERO);
    let damped = vel * keep;
    if damped.length() < min_velocity {
        FixedVec2::ZERO
    } else {
        damped
    }
}

/// Instantaneous momentum change: `impulse / mass` added to velocity.
pub fn impulse_velocity(vel: FixedVec2, impulse: FixedVec2, mass: FixedNum) -> FixedVec2 {
    if mass <= FixedNum::ZERO {
        return vel;
    }
    vel + impulse / mass
}

#[cfg(test)]
#[path = "physics_tests.rs"]
mod tests;
