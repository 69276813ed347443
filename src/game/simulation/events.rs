/// Events and commands for simulation control.
///
/// External systems (input, combat, wave logic) drive the kinetic core
/// through these messages; nothing outside the simulation mutates agent
/// state directly.

use bevy::prelude::*;

use crate::game::fixed_math::FixedVec2;
use crate::game::grid::GridLocation;

// ============================================================================
// Agent Commands
// ============================================================================

/// Steering wiring applied to a spawned agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// Route-seeks its goal cell through the flow field, pauses while
    /// attacking, and avoids buildings, workers, and other enemies.
    Enemy,
    /// Direct-seeks its move target; no avoidance.
    Worker,
}

/// Command to spawn a new steering agent.
#[derive(Event, Message, Debug, Clone)]
pub struct SpawnAgentCommand {
    pub position: FixedVec2,
    pub kind: AgentKind,
    pub goal: Option<GridLocation>,
}

/// Command to move an agent to a world-space target point.
#[derive(Event, Message, Debug, Clone)]
pub struct MoveCommand {
    pub entity: Entity,
    pub target: FixedVec2,
}

/// Command to stop an agent's movement.
#[derive(Event, Message, Debug, Clone)]
pub struct StopCommand {
    pub entity: Entity,
}

/// Instantaneous momentum change (knockback). Adds `impulse / mass` to the
/// agent's velocity directly; this is not a steering force and skips the
/// force integration path.
#[derive(Event, Message, Debug, Clone)]
pub struct ImpulseCommand {
    pub entity: Entity,
    pub impulse: FixedVec2,
}
