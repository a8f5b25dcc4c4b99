//! Spawning and despawning live agents.
//!
//! Shared by `enter_world`, `leave_world`, disconnect cleanup and the housekeeping tick so that
//! an agent row never outlives its field occupancy rows.

use crate::{schema::*, world::movement_settings_for};
use shared::AgentStatus;
use spacetimedb::{ReducerContext, Table};

/// Spawn a live agent from the player's persisted pose and link it back.
pub fn spawn_agent(ctx: &ReducerContext, mut player: Player) -> Result<Agent, String> {
    let settings = movement_settings_for(ctx)?;
    let mut status =
        AgentStatus::spawn(player.position.into(), player.rotation.into(), &settings);
    status.health.current = player.health.clamp(0.0, status.health.max);
    if status.health.is_dead() {
        status.health.current = status.health.max;
    }

    let agent = ctx.db.agent().insert(Agent {
        id: 0,
        identity: player.identity,
        state: AgentState::from(&status),
    });
    log::info!("Agent {} spawned for {:?}", agent.id, player.identity);

    player.agent_id = Some(agent.id);
    ctx.db.player().identity().update(player);
    Ok(agent)
}

/// Persist the agent's pose and health to the player row, then delete the agent and its
/// field occupancy.
pub fn despawn_agent(ctx: &ReducerContext, mut player: Player) {
    let Some(agent_id) = player.agent_id else {
        return;
    };

    if let Some(agent) = ctx.db.agent().id().find(agent_id) {
        player.position = agent.state.position;
        player.rotation = agent.state.rotation;
        player.health = agent.state.health;
        ctx.db.agent().id().delete(agent.id);
    }
    clear_field_occupancy(ctx, agent_id);

    player.agent_id = None;
    ctx.db.player().identity().update(player);
}

pub fn clear_field_occupancy(ctx: &ReducerContext, agent_id: u64) {
    let rows: Vec<FieldOccupant> = ctx.db.field_occupant().agent_id().filter(agent_id).collect();
    for row in rows {
        ctx.db.field_occupant().id().delete(row.id);
    }
}
