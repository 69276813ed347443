//! Agent-level components and the steering behavior family.

mod components;
mod steering;

pub use components::{CombatTarget, Health, Mobility, Unit};
pub use steering::{Steering, SteeringBehavior, SteeringContext};
