//! Flow-field pathfinding.
//!
//! One [`FlowField`] per target cell, cached by [`FlowFieldManager`] and
//! rebuilt whenever building placement changes the obstacle layout. Agents
//! sample the field at their world position each tick instead of holding
//! individual paths.

use bevy::prelude::*;

mod flow_field;
mod manager;


pub use flow_field::{FlowField, UNREACHABLE};
pub use manager::FlowFieldManager;

pub struct PathfindingPlugin;

impl Plugin for PathfindingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlowFieldManager>();
    }
}
