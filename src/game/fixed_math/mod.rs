//! Deterministic fixed-point mathematics library.
//!
//! All simulation state (positions, velocities, forces, distances) uses
//! fixed-point arithmetic so a tick sequence replays identically across
//! platforms and architectures. Floats only appear at the edges: config
//! files and log output.

use fixed::types::I48F16;

pub use vec2::FixedVec2;

mod vec2;

/// Fixed-point number type used throughout the simulation.
///
/// Uses I48F16 format: 48 bits for the integer part, 16 bits for the
/// fractional part. This provides a range of approximately ±140 trillion
/// with a precision of ~0.000015.
pub type FixedNum = I48F16;
